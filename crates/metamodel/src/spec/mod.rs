//! Object specifications
//!
//! One [`ObjectSpecification`] per (substituted) class. A spec is created
//! cheaply by the loader and then introspected in stages:
//!
//! - TYPE level: superclass link, type-level facets, alias registration,
//!   mixin index registration
//! - FULL level: members built by convention, member facets, post-processing
//!
//! Introspection state only ever moves forward. Each spec has its own
//! re-entrant introspection guard; a nested request for a stage that is
//! already being introspected on the same thread is a no-op. Guards are
//! taken subclass before superclass and holder before mixin.

pub mod introspector;
pub mod members;
pub mod mixins;

use crate::facets::{FacetHolder, LogicalTypeFacet, MixinFacet, TitleFacet};
use crate::facets::factories::ClassProcessingContext;
use crate::interaction::{
    is_valid_result, InteractionContext, InteractionEvent, InteractionEventKind, InteractionHead,
    InteractionInitiatedBy, InteractionResult,
};
use crate::programming_model::ProgrammingModel;
use causeway_core::{
    BeanSort, Class, Identifier, IntrospectionState, LogicalType, MetamodelError,
    MetamodelResult, Pojo, TypeRef,
};
use members::{MethodRole, ObjectAction, ObjectMember, OneToManyAssociation, OneToOneAssociation};
use mixins::MixinIndex;
use parking_lot::{Mutex, ReentrantMutex, RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

/// What a spec needs from its loader while introspecting
pub trait IntrospectionContext: Send + Sync {
    /// Active programming model
    fn programming_model(&self) -> Arc<dyn ProgrammingModel>;

    /// Load (creating if needed) the spec of `class` up to `up_to`
    fn load_spec(
        &self,
        class: &Class,
        up_to: IntrospectionState,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>>;

    /// Resolve a type reference to a class
    fn resolve_class(&self, type_ref: &TypeRef) -> Option<Class>;

    /// Register the spec's alias names
    fn register_aliases(&self, spec: &ObjectSpecification);

    /// The mixin index
    fn mixin_index(&self) -> &MixinIndex;
}

/// Include mixed-in members or not
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixedIn {
    /// Declared and contributed members
    Included,
    /// Declared members only
    Excluded,
}

/// Members built at full introspection
#[derive(Debug, Default)]
pub(crate) struct DeclaredMembers {
    pub(crate) properties: Vec<Arc<OneToOneAssociation>>,
    pub(crate) collections: Vec<Arc<OneToManyAssociation>>,
    pub(crate) actions: Vec<Arc<ObjectAction>>,
    pub(crate) method_index: FxHashMap<String, (ObjectMember, MethodRole)>,
    pub(crate) orphaned: Vec<String>,
}

impl DeclaredMembers {
    fn find(&self, id: &str) -> Option<ObjectMember> {
        self.properties
            .iter()
            .find(|p| p.id() == id)
            .map(|p| ObjectMember::Property(Arc::clone(p)))
            .or_else(|| {
                self.collections
                    .iter()
                    .find(|c| c.id() == id)
                    .map(|c| ObjectMember::Collection(Arc::clone(c)))
            })
            .or_else(|| {
                self.actions
                    .iter()
                    .find(|a| a.id() == id)
                    .map(|a| ObjectMember::Action(Arc::clone(a)))
            })
    }

    fn all(&self) -> Vec<ObjectMember> {
        self.properties
            .iter()
            .map(|p| ObjectMember::Property(Arc::clone(p)))
            .chain(
                self.collections
                    .iter()
                    .map(|c| ObjectMember::Collection(Arc::clone(c))),
            )
            .chain(self.actions.iter().map(|a| ObjectMember::Action(Arc::clone(a))))
            .collect()
    }
}

struct MixedInMemo {
    generation: u64,
    members: Arc<Vec<ObjectMember>>,
}

/// The metamodel's description of one class
pub struct ObjectSpecification {
    class: Class,
    logical_type: LogicalType,
    bean_sort: BeanSort,
    state: AtomicU8,
    introspection_guard: ReentrantMutex<()>,
    context: Weak<dyn IntrospectionContext>,
    superclass: RwLock<Option<Arc<ObjectSpecification>>>,
    subclasses: RwLock<Vec<Class>>,
    facets: RwLock<FacetHolder>,
    members: RwLock<DeclaredMembers>,
    mixed_in: Mutex<Option<MixedInMemo>>,
}

impl ObjectSpecification {
    /// A new, not yet introspected spec
    pub fn new(class: Class, bean_sort: BeanSort, context: Weak<dyn IntrospectionContext>) -> Self {
        Self {
            logical_type: LogicalType::infer(&class),
            class,
            bean_sort,
            state: AtomicU8::new(IntrospectionState::NotIntrospected.as_u8()),
            introspection_guard: ReentrantMutex::new(()),
            context,
            superclass: RwLock::new(None),
            subclasses: RwLock::new(Vec::new()),
            facets: RwLock::new(FacetHolder::new()),
            members: RwLock::new(DeclaredMembers::default()),
            mixed_in: Mutex::new(None),
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    /// Corresponding class
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Logical type
    pub fn logical_type(&self) -> &LogicalType {
        &self.logical_type
    }

    /// Logical type name
    pub fn logical_type_name(&self) -> &str {
        self.logical_type.logical_name()
    }

    /// Alias logical type names
    pub fn aliases(&self) -> &[String] {
        self.class.aliases()
    }

    /// Identifier of the type
    pub fn identifier(&self) -> Identifier {
        Identifier::class_identifier(&self.logical_type)
    }

    /// Bean sort
    pub fn bean_sort(&self) -> BeanSort {
        self.bean_sort
    }

    /// True for mixin specs
    pub fn is_mixin(&self) -> bool {
        self.bean_sort.is_mixin()
    }

    /// True for value specs
    pub fn is_value(&self) -> bool {
        self.bean_sort.is_value()
    }

    /// True for abstract types
    pub fn is_abstract(&self) -> bool {
        self.class.is_abstract()
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Current introspection state
    pub fn introspection_state(&self) -> IntrospectionState {
        IntrospectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: IntrospectionState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }

    /// Bring this spec at least up to `up_to`. Never regresses; a no-op if
    /// already there, or if this thread is already introspecting the spec.
    pub fn introspect_up_to(&self, up_to: IntrospectionState) -> MetamodelResult<()> {
        if !self.introspection_state().is_less_than(up_to) {
            return Ok(());
        }
        let _guard = self.introspection_guard.lock();
        let state = self.introspection_state();
        if state.is_being_introspected() || !state.is_less_than(up_to) {
            return Ok(());
        }

        if state.is_less_than(IntrospectionState::TypeIntrospected) {
            self.set_state(IntrospectionState::TypeBeingIntrospected);
            if let Err(e) = self.introspect_type() {
                self.set_state(state);
                return Err(e);
            }
            self.set_state(IntrospectionState::TypeIntrospected);
        }

        if IntrospectionState::TypeIntrospected.is_less_than(up_to) {
            self.set_state(IntrospectionState::MembersBeingIntrospected);
            if let Err(e) = self.introspect_members() {
                self.set_state(IntrospectionState::TypeIntrospected);
                return Err(e);
            }
            self.set_state(IntrospectionState::FullyIntrospected);
        }
        Ok(())
    }

    fn context(&self) -> MetamodelResult<Arc<dyn IntrospectionContext>> {
        self.context.upgrade().ok_or_else(|| {
            MetamodelError::illegal_state(format!(
                "metamodel of {} has been disposed",
                self.class
            ))
        })
    }

    fn introspect_type(&self) -> MetamodelResult<()> {
        let ctx = self.context()?;

        if let Some(superclass) = self.class.superclass() {
            let superclass_spec =
                ctx.load_spec(superclass, IntrospectionState::TypeIntrospected)?;
            if let Some(superclass_spec) = &superclass_spec {
                superclass_spec.add_subclass(&self.class);
            }
            *self.superclass.write() = superclass_spec;
        }

        let mut facets = FacetHolder::new();
        for factory in ctx.programming_model().factories() {
            factory.process_class(&mut ClassProcessingContext {
                class: &self.class,
                facets: &mut facets,
            })?;
        }
        let mixin = facets.get::<MixinFacet>().cloned();
        *self.facets.write() = facets;

        ctx.register_aliases(self);
        if let Some(mixin) = mixin {
            ctx.mixin_index().register(mixin.mixee(), self.class.clone());
        }

        debug!(
            target: "causeway::spec",
            spec = %self.logical_type,
            sort = %self.bean_sort,
            "Type introspected"
        );
        Ok(())
    }

    fn introspect_members(&self) -> MetamodelResult<()> {
        let ctx = self.context()?;
        let members = introspector::build_members(self, ctx.as_ref())?;
        debug!(
            target: "causeway::spec",
            spec = %self.logical_type,
            properties = members.properties.len(),
            collections = members.collections.len(),
            actions = members.actions.len(),
            "Members introspected"
        );
        *self.members.write() = members;
        Ok(())
    }

    fn ensure_fully_introspected(&self) -> MetamodelResult<()> {
        self.introspect_up_to(IntrospectionState::FullyIntrospected)
    }

    // ========================================================================
    // Hierarchy and facets
    // ========================================================================

    /// Superclass spec, once TYPE introspected
    pub fn superclass(&self) -> Option<Arc<ObjectSpecification>> {
        self.superclass.read().clone()
    }

    /// Known direct subclasses
    pub fn subclasses(&self) -> Vec<Class> {
        self.subclasses.read().clone()
    }

    fn add_subclass(&self, class: &Class) {
        let mut subclasses = self.subclasses.write();
        if !subclasses.contains(class) {
            subclasses.push(class.clone());
        }
    }

    /// Type-level facets
    pub fn facets(&self) -> RwLockReadGuard<'_, FacetHolder> {
        self.facets.read()
    }

    /// Mixin facet, for mixin specs at TYPE level or beyond
    pub fn mixin_facet(&self) -> Option<MixinFacet> {
        self.facets.read().get::<MixinFacet>().cloned()
    }

    /// Logical type as recorded by its facet, falling back to the inferred one
    pub fn logical_type_from_facet(&self) -> LogicalType {
        self.facets
            .read()
            .get::<LogicalTypeFacet>()
            .map(|f| f.logical_type().clone())
            .unwrap_or_else(|| self.logical_type.clone())
    }

    /// Title of `pojo`
    pub fn title(&self, pojo: &Pojo) -> MetamodelResult<String> {
        self.introspect_up_to(IntrospectionState::TypeIntrospected)?;
        let title = self.facets.read().get::<TitleFacet>().cloned();
        match title {
            Some(facet) => facet.title(pojo),
            None => Ok(self.logical_type.logical_simple_name().to_string()),
        }
    }

    /// Object-level validity of `pojo`
    pub fn is_object_valid(
        &self,
        pojo: &Pojo,
        by: InteractionInitiatedBy,
    ) -> MetamodelResult<InteractionResult> {
        self.introspect_up_to(IntrospectionState::TypeIntrospected)?;
        let head = InteractionHead::regular(pojo.clone());
        let ctx = InteractionContext::new(head, self.identifier(), by);
        let event = InteractionEvent::new(
            InteractionEventKind::ObjectValidity,
            self.identifier(),
            pojo.clone(),
        );
        let facets = self.facets.read().clone();
        is_valid_result(&facets, &ctx, event)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Member declared by this class (no mixins, no introspection forced)
    pub fn declared_member(&self, id: &str) -> Option<ObjectMember> {
        self.members.read().find(id)
    }

    /// Members contributed by mixins, memoized against the mixin index
    pub fn mixed_in_members(&self) -> MetamodelResult<Arc<Vec<ObjectMember>>> {
        self.ensure_fully_introspected()?;
        let ctx = self.context()?;
        let generation = ctx.mixin_index().generation();
        if let Some(memo) = self.mixed_in.lock().as_ref() {
            if memo.generation == generation {
                return Ok(Arc::clone(&memo.members));
            }
        }
        let members = Arc::new(mixins::compute_mixed_in_members(self, ctx.as_ref())?);
        *self.mixed_in.lock() = Some(MixedInMemo {
            generation,
            members: Arc::clone(&members),
        });
        Ok(members)
    }

    /// All members
    pub fn members(&self, mixed_in: MixedIn) -> MetamodelResult<Vec<ObjectMember>> {
        self.ensure_fully_introspected()?;
        let mut members = self.members.read().all();
        if mixed_in == MixedIn::Included {
            members.extend(self.mixed_in_members()?.iter().cloned());
        }
        Ok(members)
    }

    /// Properties
    pub fn properties(&self, mixed_in: MixedIn) -> MetamodelResult<Vec<Arc<OneToOneAssociation>>> {
        Ok(self
            .members(mixed_in)?
            .into_iter()
            .filter_map(|m| match m {
                ObjectMember::Property(p) => Some(p),
                _ => None,
            })
            .collect())
    }

    /// Collections
    pub fn collections(
        &self,
        mixed_in: MixedIn,
    ) -> MetamodelResult<Vec<Arc<OneToManyAssociation>>> {
        Ok(self
            .members(mixed_in)?
            .into_iter()
            .filter_map(|m| match m {
                ObjectMember::Collection(c) => Some(c),
                _ => None,
            })
            .collect())
    }

    /// Actions
    pub fn actions(&self, mixed_in: MixedIn) -> MetamodelResult<Vec<Arc<ObjectAction>>> {
        Ok(self
            .members(mixed_in)?
            .into_iter()
            .filter_map(|m| match m {
                ObjectMember::Action(a) => Some(a),
                _ => None,
            })
            .collect())
    }

    /// Member by id, declared or mixed in
    pub fn member(&self, id: &str) -> MetamodelResult<Option<ObjectMember>> {
        self.ensure_fully_introspected()?;
        if let Some(member) = self.declared_member(id) {
            return Ok(Some(member));
        }
        Ok(self.mixed_in_members()?.iter().find(|m| m.id() == id).cloned())
    }

    /// Property by id
    pub fn property(&self, id: &str) -> MetamodelResult<Option<Arc<OneToOneAssociation>>> {
        Ok(match self.member(id)? {
            Some(ObjectMember::Property(p)) => Some(p),
            _ => None,
        })
    }

    /// Collection by id
    pub fn collection(&self, id: &str) -> MetamodelResult<Option<Arc<OneToManyAssociation>>> {
        Ok(match self.member(id)? {
            Some(ObjectMember::Collection(c)) => Some(c),
            _ => None,
        })
    }

    /// Action by id
    pub fn action(&self, id: &str) -> MetamodelResult<Option<Arc<ObjectAction>>> {
        Ok(match self.member(id)? {
            Some(ObjectMember::Action(a)) => Some(a),
            _ => None,
        })
    }

    /// Resolve a method name to its member and role. Declared methods are
    /// indexed by method name; mixed-in members by member id.
    pub fn lookup_method(&self, name: &str) -> MetamodelResult<Option<(ObjectMember, MethodRole)>> {
        self.ensure_fully_introspected()?;
        if let Some(entry) = self.members.read().method_index.get(name) {
            return Ok(Some(entry.clone()));
        }
        Ok(self
            .mixed_in_members()?
            .iter()
            .find(|m| m.id() == name)
            .map(|m| {
                let role = match m {
                    ObjectMember::Action(_) => MethodRole::Action,
                    _ => MethodRole::Accessor,
                };
                (m.clone(), role)
            }))
    }

    /// The mixed-in member `mixin_class` contributes to this type
    pub fn mixed_in_member_for(&self, mixin_class: &Class) -> MetamodelResult<Option<ObjectMember>> {
        Ok(self
            .mixed_in_members()?
            .iter()
            .find(|m| m.mixin().map_or(false, |o| o.mixin_class() == mixin_class))
            .cloned())
    }

    /// Supporting methods that matched no member; empty until fully
    /// introspected
    pub fn orphaned_supporting_methods(&self) -> Vec<String> {
        self.members.read().orphaned.clone()
    }
}

impl fmt::Debug for ObjectSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpecification")
            .field("class", &self.class.name())
            .field("logical_type", &self.logical_type.logical_name())
            .field("bean_sort", &self.bean_sort)
            .field("state", &self.introspection_state())
            .finish()
    }
}
