//! Runtime class model
//!
//! Domain types are described by a [`ClassDescriptor`]: name, superclass,
//! domain nature, logical naming, substitution hints and the declared
//! methods, each carrying an invocation handle. The metamodel introspects
//! these descriptors the way a reflective framework introspects classes.
//!
//! Descriptors are assembled with [`ClassBuilder`], which turns typed
//! closures over the domain struct into type-erased [`MethodHandle`]s.

use crate::error::InvocationError;
use crate::value::{Pojo, Value};
use smallvec::SmallVec;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased method body
pub type MethodHandle =
    Arc<dyn Fn(&Pojo, &[Value]) -> Result<Value, InvocationError> + Send + Sync>;

/// Creates a mixin's state from its mixee
pub type MixinConstructor = Arc<dyn Fn(&Pojo) -> Box<dyn Any + Send + Sync> + Send + Sync>;

// ============================================================================
// Type references
// ============================================================================

/// Declared type of a parameter or return value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// No value
    Void,
    /// Built-in value type, by name (`String`, `bool`, `i64`, `f64`)
    Value(String),
    /// Domain class, by fully qualified name
    Class(String),
    /// Collection of elements
    Collection(Box<TypeRef>),
    /// String-keyed map of values
    Map(Box<TypeRef>),
}

impl TypeRef {
    /// `String`
    pub fn string() -> Self {
        TypeRef::Value("String".to_string())
    }

    /// `i64`
    pub fn int() -> Self {
        TypeRef::Value("i64".to_string())
    }

    /// `bool`
    pub fn boolean() -> Self {
        TypeRef::Value("bool".to_string())
    }

    /// Domain class reference
    pub fn class(name: impl Into<String>) -> Self {
        TypeRef::Class(name.into())
    }

    /// Collection of `element`
    pub fn list_of(element: TypeRef) -> Self {
        TypeRef::Collection(Box::new(element))
    }

    /// Map with `value` values
    pub fn map_of(value: TypeRef) -> Self {
        TypeRef::Map(Box::new(value))
    }

    /// True for collections and maps
    pub fn is_plural(&self) -> bool {
        matches!(self, TypeRef::Collection(_) | TypeRef::Map(_))
    }

    /// True for [`TypeRef::Void`]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Name of the referenced type, looking through plurals to the element
    pub fn element_type_name(&self) -> Option<&str> {
        match self {
            TypeRef::Void => None,
            TypeRef::Value(name) | TypeRef::Class(name) => Some(name),
            TypeRef::Collection(inner) | TypeRef::Map(inner) => inner.element_type_name(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Value(name) | TypeRef::Class(name) => write!(f, "{}", name),
            TypeRef::Collection(inner) => write!(f, "List<{}>", inner),
            TypeRef::Map(inner) => write!(f, "Map<String, {}>", inner),
        }
    }
}

// ============================================================================
// Annotations
// ============================================================================

/// What kind of member a mixin contributes to its mixee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixinContribution {
    /// Contributes an action
    Action,
    /// Contributes a derived, read-only property
    Property,
    /// Contributes a derived, read-only collection
    Collection,
}

/// Declared domain nature of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainNature {
    /// No declaration; the classifier decides
    Unspecified,
    /// Persistent entity
    Entity,
    /// View model
    ViewModel,
    /// Managed bean (domain service); contributing beans show up in menus
    ManagedBean {
        /// Whether its actions are exposed
        contributing: bool,
    },
    /// Mixin contributing a member to `mixee`
    Mixin {
        /// Fully qualified name of the mixee class
        mixee: String,
        /// Name of the method implementing the contributed member
        main: String,
        /// Kind of member contributed
        contribution: MixinContribution,
        /// Explicit member name; derived from the class name when absent
        member_name: Option<String>,
    },
    /// Value type
    Value,
    /// Explicitly excluded from the metamodel
    Vetoed,
}

/// Member-level annotations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberAnnotations {
    /// Always hidden
    pub hidden: bool,
    /// Always disabled, with the given reason
    pub disabled: Option<String>,
    /// Null values are acceptable
    pub optional: bool,
    /// Maximum length for string values
    pub max_length: Option<usize>,
    /// Excluded from the metamodel
    pub programmatic: bool,
    /// Marked deprecated
    pub deprecated: bool,
}

// ============================================================================
// Methods
// ============================================================================

/// A declared method with its invocation handle
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<TypeRef>,
    returns: TypeRef,
    annotations: MemberAnnotations,
    handle: MethodHandle,
}

impl MethodDescriptor {
    /// Create a descriptor from a raw handle
    pub fn new(
        name: impl Into<String>,
        params: Vec<TypeRef>,
        returns: TypeRef,
        handle: MethodHandle,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            returns,
            annotations: MemberAnnotations::default(),
            handle,
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameter types
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Number of parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Return type
    pub fn returns(&self) -> &TypeRef {
        &self.returns
    }

    /// Member annotations
    pub fn annotations(&self) -> &MemberAnnotations {
        &self.annotations
    }

    /// Invoke on `target`
    ///
    /// # Errors
    ///
    /// Returns `Arity` if `args` does not match the declared parameters, or
    /// whatever the method body returns.
    pub fn invoke(&self, target: &Pojo, args: &[Value]) -> Result<Value, InvocationError> {
        if args.len() != self.params.len() {
            return Err(InvocationError::Arity {
                method: self.name.clone(),
                expected: self.params.len(),
                actual: args.len(),
            });
        }
        (self.handle)(target, args)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

// ============================================================================
// Class
// ============================================================================

/// Everything known about a class
pub struct ClassDescriptor {
    name: String,
    superclass: Option<Class>,
    is_abstract: bool,
    is_anonymous: bool,
    nature: DomainNature,
    logical_type_name: Option<String>,
    aliases: SmallVec<[String; 2]>,
    editing_disabled: bool,
    proxy_of: Option<Class>,
    never_introspect: bool,
    mixin_constructor: Option<MixinConstructor>,
    methods: Vec<MethodDescriptor>,
}

/// Handle to a class; identity is the fully qualified name
#[derive(Clone)]
pub struct Class(Arc<ClassDescriptor>);

impl Class {
    /// Fully qualified name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Name after the last `.`
    pub fn simple_name(&self) -> &str {
        self.0.name.rsplit('.').next().unwrap_or(&self.0.name)
    }

    /// Direct superclass
    pub fn superclass(&self) -> Option<&Class> {
        self.0.superclass.as_ref()
    }

    /// Abstract classes cannot be instantiated or bookmarked
    pub fn is_abstract(&self) -> bool {
        self.0.is_abstract
    }

    /// False for anonymous classes
    pub fn has_type_identity(&self) -> bool {
        !self.0.is_anonymous
    }

    /// Declared domain nature
    pub fn nature(&self) -> &DomainNature {
        &self.0.nature
    }

    /// True if declared as a mixin
    pub fn is_mixin(&self) -> bool {
        matches!(self.0.nature, DomainNature::Mixin { .. })
    }

    /// Explicit logical type name
    pub fn logical_type_name(&self) -> Option<&str> {
        self.0.logical_type_name.as_deref()
    }

    /// Declared aliases
    pub fn aliases(&self) -> &[String] {
        &self.0.aliases
    }

    /// Object-level editing disabled
    pub fn is_editing_disabled(&self) -> bool {
        self.0.editing_disabled
    }

    /// Set on enhancement proxies: the class being proxied
    pub fn proxy_of(&self) -> Option<&Class> {
        self.0.proxy_of.as_ref()
    }

    /// Marked as never to be introspected
    pub fn is_never_introspect(&self) -> bool {
        self.0.never_introspect
    }

    /// Methods declared directly on this class
    pub fn declared_methods(&self) -> &[MethodDescriptor] {
        &self.0.methods
    }

    /// Declared plus inherited methods; a subclass method hides a
    /// superclass method of the same name. Superclass methods come first.
    pub fn all_methods(&self) -> Vec<MethodDescriptor> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(class) = current {
            chain.push(class);
            current = class.superclass();
        }
        let mut methods: Vec<MethodDescriptor> = Vec::new();
        for class in chain.into_iter().rev() {
            for method in class.declared_methods() {
                match methods.iter().position(|m| m.name() == method.name()) {
                    Some(pos) => methods[pos] = method.clone(),
                    None => methods.push(method.clone()),
                }
            }
        }
        methods
    }

    /// Find a method by name, searching up the hierarchy
    pub fn find_method(&self, name: &str) -> Option<MethodDescriptor> {
        let mut current = Some(self);
        while let Some(class) = current {
            if let Some(m) = class.declared_methods().iter().find(|m| m.name() == name) {
                return Some(m.clone());
            }
            current = class.superclass();
        }
        None
    }

    /// True if `self` is `other` or one of its subclasses
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        let mut current = Some(self);
        while let Some(class) = current {
            if class == other {
                return true;
            }
            current = class.superclass();
        }
        false
    }

    /// Create a mixin instance bound to `mixee`
    pub fn instantiate_mixin(&self, mixee: &Pojo) -> Option<Pojo> {
        self.0
            .mixin_constructor
            .as_ref()
            .map(|ctor| Pojo::from_boxed(self.clone(), ctor(mixee)))
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.name == other.0.name
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.name.hash(state);
    }
}

impl PartialOrd for Class {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Class {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.name.cmp(&other.0.name)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Class({})", self.0.name)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds a [`Class`] whose instances hold a `T`
pub struct ClassBuilder<T> {
    descriptor: ClassDescriptor,
    _state: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> ClassBuilder<T> {
    /// Start a class with the given fully qualified name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            descriptor: ClassDescriptor {
                name: name.into(),
                superclass: None,
                is_abstract: false,
                is_anonymous: false,
                nature: DomainNature::Unspecified,
                logical_type_name: None,
                aliases: SmallVec::new(),
                editing_disabled: false,
                proxy_of: None,
                never_introspect: false,
                mixin_constructor: None,
                methods: Vec::new(),
            },
            _state: PhantomData,
        }
    }

    /// Set the superclass
    pub fn extends(mut self, superclass: &Class) -> Self {
        self.descriptor.superclass = Some(superclass.clone());
        self
    }

    /// Mark abstract
    pub fn abstract_type(mut self) -> Self {
        self.descriptor.is_abstract = true;
        self
    }

    /// Mark anonymous (no type identity)
    pub fn anonymous(mut self) -> Self {
        self.descriptor.is_anonymous = true;
        self
    }

    /// Set the domain nature
    pub fn nature(mut self, nature: DomainNature) -> Self {
        self.descriptor.nature = nature;
        self
    }

    /// Declare as entity
    pub fn entity(self) -> Self {
        self.nature(DomainNature::Entity)
    }

    /// Declare as view model
    pub fn view_model(self) -> Self {
        self.nature(DomainNature::ViewModel)
    }

    /// Declare as managed bean
    pub fn managed_bean(self, contributing: bool) -> Self {
        self.nature(DomainNature::ManagedBean { contributing })
    }

    /// Declare as value type
    pub fn value(self) -> Self {
        self.nature(DomainNature::Value)
    }

    /// Exclude from the metamodel
    pub fn vetoed(self) -> Self {
        self.nature(DomainNature::Vetoed)
    }

    /// Declare as a mixin of `mixee`, implemented by method `main`.
    /// `ctor` builds the mixin state from the mixee instance.
    pub fn mixin(
        mut self,
        mixee: impl Into<String>,
        main: impl Into<String>,
        contribution: MixinContribution,
        ctor: impl Fn(&Pojo) -> T + Send + Sync + 'static,
    ) -> Self {
        self.descriptor.nature = DomainNature::Mixin {
            mixee: mixee.into(),
            main: main.into(),
            contribution,
            member_name: None,
        };
        self.descriptor.mixin_constructor = Some(Arc::new(move |mixee: &Pojo| {
            Box::new(ctor(mixee)) as Box<dyn Any + Send + Sync>
        }));
        self
    }

    /// Override the member name a mixin contributes
    pub fn mixin_member_name(mut self, member: impl Into<String>) -> Self {
        if let DomainNature::Mixin { member_name, .. } = &mut self.descriptor.nature {
            *member_name = Some(member.into());
        }
        self
    }

    /// Explicit logical type name
    pub fn named(mut self, logical_type_name: impl Into<String>) -> Self {
        self.descriptor.logical_type_name = Some(logical_type_name.into());
        self
    }

    /// Add an alias logical type name
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.descriptor.aliases.push(alias.into());
        self
    }

    /// Disable editing of every property
    pub fn editing_disabled(mut self) -> Self {
        self.descriptor.editing_disabled = true;
        self
    }

    /// Mark as an enhancement proxy of `target`
    pub fn proxy_of(mut self, target: &Class) -> Self {
        self.descriptor.proxy_of = Some(target.clone());
        self
    }

    /// Never introspect this class
    pub fn never_introspect(mut self) -> Self {
        self.descriptor.never_introspect = true;
        self
    }

    /// Declare a method whose body mutably borrows the state
    pub fn method(
        mut self,
        name: impl Into<String>,
        params: Vec<TypeRef>,
        returns: TypeRef,
        body: impl Fn(&mut T, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    ) -> Self {
        let handle: MethodHandle =
            Arc::new(move |pojo: &Pojo, args: &[Value]| pojo.write(|state: &mut T| body(state, args))?);
        self.descriptor
            .methods
            .push(MethodDescriptor::new(name, params, returns, handle));
        self
    }

    /// Declare a method whose body only reads the state
    pub fn query(
        mut self,
        name: impl Into<String>,
        params: Vec<TypeRef>,
        returns: TypeRef,
        body: impl Fn(&T, &[Value]) -> Result<Value, InvocationError> + Send + Sync + 'static,
    ) -> Self {
        let handle: MethodHandle =
            Arc::new(move |pojo: &Pojo, args: &[Value]| pojo.read(|state: &T| body(state, args))?);
        self.descriptor
            .methods
            .push(MethodDescriptor::new(name, params, returns, handle));
        self
    }

    /// Declare `get<Property>`
    pub fn getter(
        self,
        property: &str,
        returns: TypeRef,
        body: impl Fn(&T) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.query(
            format!("get{}", capitalize(property)),
            Vec::new(),
            returns,
            move |state, _| Ok(body(state)),
        )
    }

    /// Declare `set<Property>`
    pub fn setter(
        self,
        property: &str,
        param: TypeRef,
        body: impl Fn(&mut T, &Value) -> Result<(), InvocationError> + Send + Sync + 'static,
    ) -> Self {
        self.method(
            format!("set{}", capitalize(property)),
            vec![param],
            TypeRef::Void,
            move |state, args| {
                body(state, &args[0])?;
                Ok(Value::Null)
            },
        )
    }

    /// Edit the annotations of an already declared method
    pub fn annotate(
        mut self,
        method: &str,
        edit: impl FnOnce(&mut MemberAnnotations),
    ) -> Self {
        if let Some(m) = self
            .descriptor
            .methods
            .iter_mut()
            .find(|m| m.name == method)
        {
            edit(&mut m.annotations);
        }
        self
    }

    /// Finish the class
    pub fn build(self) -> Class {
        Class(Arc::new(self.descriptor))
    }
}

/// `name` → `Name`
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `Name` → `name`
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
