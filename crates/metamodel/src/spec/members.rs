//! Object members: properties, collections and actions
//!
//! Members are built once, at full introspection, and are immutable
//! afterwards. Each carries its facets and, when contributed by a mixin,
//! the [`MixinOrigin`] needed to instantiate the mixin for a given mixee.

use crate::facets::{ChoicesFacet, DefaultedFacet, FacetHolder};
use crate::interaction::{
    is_usable_result, is_valid_result, is_visible_result, InteractionContext, InteractionEvent,
    InteractionEventKind, InteractionHead, InteractionInitiatedBy, InteractionResult,
};
use causeway_core::{
    Class, FeatureKind, Identifier, LogicalType, MetamodelError, MetamodelResult,
    MethodDescriptor, Pojo, TypeRef, Value,
};
use std::sync::Arc;

/// Mixin class contributing a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinOrigin {
    mixin_class: Class,
    main: String,
}

impl MixinOrigin {
    /// Contributed by `mixin_class` through its `main` method
    pub fn new(mixin_class: Class, main: impl Into<String>) -> Self {
        Self {
            mixin_class,
            main: main.into(),
        }
    }

    /// The mixin class
    pub fn mixin_class(&self) -> &Class {
        &self.mixin_class
    }

    /// The mixin's main method name
    pub fn main(&self) -> &str {
        &self.main
    }

    /// Create the mixin instance for `mixee`
    pub fn instantiate(&self, mixee: &Pojo) -> MetamodelResult<Pojo> {
        self.mixin_class.instantiate_mixin(mixee).ok_or_else(|| {
            MetamodelError::illegal_state(format!(
                "mixin {} has no constructor",
                self.mixin_class
            ))
        })
    }
}

/// What a method does for the member it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodRole {
    /// Property or collection getter
    Accessor,
    /// Property setter
    Modifier,
    /// Property clear method
    Clearer,
    /// Action body
    Action,
    /// `hideX`
    Hide,
    /// `disableX`
    Disable,
    /// `validateX` (property or whole action)
    Validate,
    /// `validate<N>X`
    ValidateParam(usize),
    /// `defaultX`
    Default,
    /// `default<N>X`
    DefaultParam(usize),
    /// `choicesX`
    Choices,
    /// `choices<N>X`
    ChoicesParam(usize),
}

impl MethodRole {
    /// True for hide/disable/validate/default/choices methods
    pub fn is_supporting(&self) -> bool {
        !matches!(
            self,
            MethodRole::Accessor | MethodRole::Modifier | MethodRole::Clearer | MethodRole::Action
        )
    }
}

#[derive(Debug, Clone)]
struct MemberCore {
    id: String,
    identifier: Identifier,
    facets: FacetHolder,
    mixin: Option<MixinOrigin>,
}

impl MemberCore {
    fn new(logical_type: &LogicalType, id: &str, kind: FeatureKind, facets: FacetHolder) -> Self {
        Self {
            id: id.to_string(),
            identifier: Identifier::member_identifier(logical_type, id, kind),
            facets,
            mixin: None,
        }
    }

    fn mixed_into(&self, mixee: &LogicalType, member_name: &str, origin: MixinOrigin) -> Self {
        Self {
            id: member_name.to_string(),
            identifier: Identifier::member_identifier(mixee, member_name, self.identifier.kind()),
            facets: self.facets.clone(),
            mixin: Some(origin),
        }
    }

    fn head_for(&self, owner: &Pojo) -> MetamodelResult<InteractionHead> {
        match &self.mixin {
            Some(origin) => Ok(InteractionHead::mixin(owner.clone(), origin.instantiate(owner)?)),
            None => Ok(InteractionHead::regular(owner.clone())),
        }
    }

    fn context(&self, head: &InteractionHead, by: InteractionInitiatedBy) -> InteractionContext {
        InteractionContext::new(head.clone(), self.identifier.clone(), by)
    }

    fn event(&self, kind: InteractionEventKind, head: &InteractionHead) -> InteractionEvent {
        InteractionEvent::new(kind, self.identifier.clone(), head.owner().clone())
    }
}

fn invoke(method: &MethodDescriptor, target: &Pojo, args: &[Value]) -> MetamodelResult<Value> {
    Ok(method.invoke(target, args)?)
}

macro_rules! member_accessors {
    () => {
        /// Member id, unique within the owning type
        pub fn id(&self) -> &str {
            &self.core.id
        }

        /// Full identifier
        pub fn identifier(&self) -> &Identifier {
            &self.core.identifier
        }

        /// Facets
        pub fn facets(&self) -> &FacetHolder {
            &self.core.facets
        }

        /// Facets, for post-processing
        pub fn facets_mut(&mut self) -> &mut FacetHolder {
            &mut self.core.facets
        }

        /// Mixin origin, for contributed members
        pub fn mixin(&self) -> Option<&MixinOrigin> {
            self.core.mixin.as_ref()
        }

        /// True if contributed by a mixin
        pub fn is_mixed_in(&self) -> bool {
            self.core.mixin.is_some()
        }

        /// Interaction head for `owner`; instantiates the mixin if needed
        pub fn head_for(&self, owner: &Pojo) -> MetamodelResult<InteractionHead> {
            self.core.head_for(owner)
        }
    };
}

// ============================================================================
// Properties
// ============================================================================

/// Scalar association (property)
#[derive(Debug, Clone)]
pub struct OneToOneAssociation {
    core: MemberCore,
    getter: MethodDescriptor,
    setter: Option<MethodDescriptor>,
    clearer: Option<MethodDescriptor>,
    type_ref: TypeRef,
}

impl OneToOneAssociation {
    pub(crate) fn new(
        logical_type: &LogicalType,
        id: &str,
        getter: MethodDescriptor,
        setter: Option<MethodDescriptor>,
        clearer: Option<MethodDescriptor>,
        facets: FacetHolder,
    ) -> Self {
        Self {
            core: MemberCore::new(logical_type, id, FeatureKind::Property, facets),
            type_ref: getter.returns().clone(),
            getter,
            setter,
            clearer,
        }
    }

    member_accessors!();

    /// Declared type
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Getter method
    pub fn getter(&self) -> &MethodDescriptor {
        &self.getter
    }

    /// Setter method
    pub fn setter(&self) -> Option<&MethodDescriptor> {
        self.setter.as_ref()
    }

    /// Clear method
    pub fn clearer(&self) -> Option<&MethodDescriptor> {
        self.clearer.as_ref()
    }

    /// True if the property can be written
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    /// Visibility check
    pub fn is_visible(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::PropertyVisibility, head);
        is_visible_result(&self.core.facets, &ctx, event)
    }

    /// Usability check
    pub fn is_usable(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::PropertyUsability, head);
        is_usable_result(&self.core.facets, &ctx, event)
    }

    /// Validity of setting `proposed`
    pub fn is_association_valid(
        &self,
        head: &InteractionHead,
        proposed: &Value,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by).with_proposed(proposed.clone());
        let event = self.core.event(
            InteractionEventKind::PropertyModify {
                proposed: proposed.clone(),
            },
            head,
        );
        is_valid_result(&self.core.facets, &ctx, event)
    }

    /// Current value
    pub fn get(&self, head: &InteractionHead) -> MetamodelResult<Value> {
        invoke(&self.getter, head.target(), &[])
    }

    /// Write `value`
    ///
    /// # Errors
    ///
    /// `IllegalState` if there is no setter.
    pub fn set(&self, head: &InteractionHead, value: Value) -> MetamodelResult<()> {
        let setter = self.setter.as_ref().ok_or_else(|| {
            MetamodelError::illegal_state(format!("{} has no setter", self.core.identifier))
        })?;
        invoke(setter, head.target(), &[value])?;
        Ok(())
    }

    /// Clear: the clear method if declared, else set to null
    pub fn clear(&self, head: &InteractionHead) -> MetamodelResult<()> {
        match &self.clearer {
            Some(clearer) => invoke(clearer, head.target(), &[]).map(|_| ()),
            None => self.set(head, Value::Null),
        }
    }

    /// Default value, if a default method is declared
    pub fn default_value(&self, head: &InteractionHead) -> MetamodelResult<Option<Value>> {
        self.core
            .facets
            .get::<DefaultedFacet>()
            .map(|f| f.default_value(head.target()))
            .transpose()
    }

    /// Choices, empty if none are declared
    pub fn choices(&self, head: &InteractionHead) -> MetamodelResult<Vec<Value>> {
        match self.core.facets.get::<ChoicesFacet>() {
            Some(f) => f.choices(head.target()),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn mixed_into(&self, mixee: &LogicalType, name: &str, origin: MixinOrigin) -> Self {
        Self {
            core: self.core.mixed_into(mixee, name, origin),
            ..self.clone()
        }
    }
}

// ============================================================================
// Collections
// ============================================================================

/// Plural association (collection or map)
#[derive(Debug, Clone)]
pub struct OneToManyAssociation {
    core: MemberCore,
    getter: MethodDescriptor,
    type_ref: TypeRef,
}

impl OneToManyAssociation {
    pub(crate) fn new(
        logical_type: &LogicalType,
        id: &str,
        getter: MethodDescriptor,
        facets: FacetHolder,
    ) -> Self {
        Self {
            core: MemberCore::new(logical_type, id, FeatureKind::Collection, facets),
            type_ref: getter.returns().clone(),
            getter,
        }
    }

    member_accessors!();

    /// Declared plural type
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// True if this is a map rather than a list
    pub fn is_map(&self) -> bool {
        matches!(self.type_ref, TypeRef::Map(_))
    }

    /// Getter method
    pub fn getter(&self) -> &MethodDescriptor {
        &self.getter
    }

    /// Visibility check
    pub fn is_visible(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::CollectionVisibility, head);
        is_visible_result(&self.core.facets, &ctx, event)
    }

    /// Usability check
    pub fn is_usable(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::CollectionUsability, head);
        is_usable_result(&self.core.facets, &ctx, event)
    }

    /// Current contents (a list or map value)
    pub fn get(&self, head: &InteractionHead) -> MetamodelResult<Value> {
        invoke(&self.getter, head.target(), &[])
    }

    pub(crate) fn mixed_into(&self, mixee: &LogicalType, name: &str, origin: MixinOrigin) -> Self {
        Self {
            core: self.core.mixed_into(mixee, name, origin),
            ..self.clone()
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Action parameter
#[derive(Debug, Clone)]
pub struct ActionParameter {
    position: usize,
    type_ref: TypeRef,
    facets: FacetHolder,
}

impl ActionParameter {
    pub(crate) fn new(position: usize, type_ref: TypeRef, facets: FacetHolder) -> Self {
        Self {
            position,
            type_ref,
            facets,
        }
    }

    /// Zero-based position
    pub fn position(&self) -> usize {
        self.position
    }

    /// Declared type
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Facets
    pub fn facets(&self) -> &FacetHolder {
        &self.facets
    }
}

/// Action
#[derive(Debug, Clone)]
pub struct ObjectAction {
    core: MemberCore,
    method: MethodDescriptor,
    params: Vec<ActionParameter>,
}

impl ObjectAction {
    pub(crate) fn new(
        logical_type: &LogicalType,
        id: &str,
        method: MethodDescriptor,
        params: Vec<ActionParameter>,
        facets: FacetHolder,
    ) -> Self {
        Self {
            core: MemberCore::new(logical_type, id, FeatureKind::Action, facets),
            method,
            params,
        }
    }

    member_accessors!();

    /// Action method
    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Parameters
    pub fn parameters(&self) -> &[ActionParameter] {
        &self.params
    }

    /// Return type
    pub fn return_type(&self) -> &TypeRef {
        self.method.returns()
    }

    /// Visibility check
    pub fn is_visible(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::ActionVisibility, head);
        is_visible_result(&self.core.facets, &ctx, event)
    }

    /// Usability check
    pub fn is_usable(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        let ctx = self.core.context(head, by);
        let event = self.core.event(InteractionEventKind::ActionUsability, head);
        is_usable_result(&self.core.facets, &ctx, event)
    }

    /// Validity of `args`: each parameter in turn, then the whole set.
    /// Returns the first vetoed result, else the whole-set result.
    ///
    /// # Errors
    ///
    /// `IllegalArgument` if the argument count does not match.
    pub fn is_arguments_valid(
        &self,
        head: &InteractionHead,
        args: &[Value],
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        if args.len() != self.params.len() {
            return Err(MetamodelError::illegal_argument(format!(
                "{} expects {} argument(s), got {}",
                self.core.identifier,
                self.params.len(),
                args.len()
            )));
        }
        for (param, arg) in self.params.iter().zip(args) {
            let ctx = self
                .core
                .context(head, by)
                .with_position(param.position)
                .with_proposed(arg.clone());
            let event = self.core.event(
                InteractionEventKind::ActionArgument {
                    position: param.position,
                    proposed: arg.clone(),
                },
                head,
            );
            let result = is_valid_result(&param.facets, &ctx, event)?;
            if result.is_vetoed() {
                return Ok(result);
            }
        }
        let ctx = self.core.context(head, by).with_args(args.to_vec());
        let event = self.core.event(
            InteractionEventKind::ActionInvocation {
                args: args.to_vec(),
            },
            head,
        );
        is_valid_result(&self.core.facets, &ctx, event)
    }

    /// Run the action
    pub fn execute(&self, head: &InteractionHead, args: &[Value]) -> MetamodelResult<Value> {
        invoke(&self.method, head.target(), args)
    }

    /// Default per parameter; null where none is declared
    pub fn defaults(&self, head: &InteractionHead) -> MetamodelResult<Vec<Value>> {
        self.params
            .iter()
            .map(|p| match p.facets.get::<DefaultedFacet>() {
                Some(f) => f.default_value(head.target()),
                None => Ok(Value::Null),
            })
            .collect()
    }

    /// Choices for the parameter at `position`
    pub fn choices(&self, head: &InteractionHead, position: usize) -> MetamodelResult<Vec<Value>> {
        let param = self.params.get(position).ok_or_else(|| {
            MetamodelError::illegal_argument(format!(
                "{} has no parameter {}",
                self.core.identifier, position
            ))
        })?;
        match param.facets.get::<ChoicesFacet>() {
            Some(f) => f.choices(head.target()),
            None => Ok(Vec::new()),
        }
    }

    pub(crate) fn mixed_into(&self, mixee: &LogicalType, name: &str, origin: MixinOrigin) -> Self {
        Self {
            core: self.core.mixed_into(mixee, name, origin),
            ..self.clone()
        }
    }
}

// ============================================================================
// Any member
// ============================================================================

/// A property, collection or action
#[derive(Debug, Clone)]
pub enum ObjectMember {
    /// Property
    Property(Arc<OneToOneAssociation>),
    /// Collection
    Collection(Arc<OneToManyAssociation>),
    /// Action
    Action(Arc<ObjectAction>),
}

impl ObjectMember {
    /// Member id
    pub fn id(&self) -> &str {
        match self {
            ObjectMember::Property(p) => p.id(),
            ObjectMember::Collection(c) => c.id(),
            ObjectMember::Action(a) => a.id(),
        }
    }

    /// Full identifier
    pub fn identifier(&self) -> &Identifier {
        match self {
            ObjectMember::Property(p) => p.identifier(),
            ObjectMember::Collection(c) => c.identifier(),
            ObjectMember::Action(a) => a.identifier(),
        }
    }

    /// Feature kind
    pub fn kind(&self) -> FeatureKind {
        self.identifier().kind()
    }

    /// Facets
    pub fn facets(&self) -> &FacetHolder {
        match self {
            ObjectMember::Property(p) => p.facets(),
            ObjectMember::Collection(c) => c.facets(),
            ObjectMember::Action(a) => a.facets(),
        }
    }

    /// Mixin origin
    pub fn mixin(&self) -> Option<&MixinOrigin> {
        match self {
            ObjectMember::Property(p) => p.mixin(),
            ObjectMember::Collection(c) => c.mixin(),
            ObjectMember::Action(a) => a.mixin(),
        }
    }

    /// Interaction head for `owner`
    pub fn head_for(&self, owner: &Pojo) -> MetamodelResult<InteractionHead> {
        match self {
            ObjectMember::Property(p) => p.head_for(owner),
            ObjectMember::Collection(c) => c.head_for(owner),
            ObjectMember::Action(a) => a.head_for(owner),
        }
    }

    /// Visibility check
    pub fn is_visible(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        match self {
            ObjectMember::Property(p) => p.is_visible(head, by),
            ObjectMember::Collection(c) => c.is_visible(head, by),
            ObjectMember::Action(a) => a.is_visible(head, by),
        }
    }

    /// Usability check
    pub fn is_usable(
        &self,
        head: &InteractionHead,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        match self {
            ObjectMember::Property(p) => p.is_usable(head, by),
            ObjectMember::Collection(c) => c.is_usable(head, by),
            ObjectMember::Action(a) => a.is_usable(head, by),
        }
    }

    pub(crate) fn mixed_into(&self, mixee: &LogicalType, name: &str, origin: MixinOrigin) -> Self {
        match self {
            ObjectMember::Property(p) => {
                ObjectMember::Property(Arc::new(p.mixed_into(mixee, name, origin)))
            }
            ObjectMember::Collection(c) => {
                ObjectMember::Collection(Arc::new(c.mixed_into(mixee, name, origin)))
            }
            ObjectMember::Action(a) => {
                ObjectMember::Action(Arc::new(a.mixed_into(mixee, name, origin)))
            }
        }
    }
}
