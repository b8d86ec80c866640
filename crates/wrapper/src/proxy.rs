//! Wrapper factory and wrapped handles
//!
//! [`WrapperFactory`] creates rule-enforcing wrappers around domain objects,
//! mixins and the plurals their collections return. A wrapper is a handle:
//! cloning it is cheap and every clone talks to the same underlying object.
//!
//! ```ignore
//! let factory = WrapperFactory::new(loader);
//! let customer = factory.wrap(&pojo)?;
//! customer.set_property("name", "Bob".into())?;     // checked, then executed
//! let orders = customer.get_collection("orders")?;   // wrapped collection
//! ```

use crate::control::SyncControl;
use crate::error::{WrapperError, WrapperResult};
use crate::handler::domain_object::DomainObjectHandler;
use crate::handler::plural::{Plural, PluralHandler};
use crate::handler::WrapperContext;
use crate::listener::InteractionListener;
use causeway_core::{Class, InvocationError, Pojo, SharedList, SharedMap, Value};
use causeway_metamodel::{
    ObjectMember, ObjectSpecification, OneToManyAssociation, SpecificationLoader,
};
use std::fmt;
use std::sync::Arc;

/// Persists objects saved through a wrapper
pub trait ObjectPersister: Send + Sync {
    /// Persist `pojo`
    fn persist(&self, pojo: &Pojo) -> Result<(), InvocationError>;
}

/// Creates wrappers
pub trait ProxyGenerator {
    /// Wrap a domain object
    fn object_proxy(&self, pojo: &Pojo, control: SyncControl) -> WrapperResult<WrappedObject>;

    /// Wrap a new instance of `mixin_class` bound to `mixee`
    fn mixin_proxy(
        &self,
        mixin_class: &Class,
        mixee: &Pojo,
        control: SyncControl,
    ) -> WrapperResult<WrappedObject>;

    /// Wrap `list`, read from `collection` of `owner`
    fn collection_proxy(
        &self,
        list: SharedList,
        owner: &WrappedObject,
        collection: &Arc<OneToManyAssociation>,
    ) -> WrapperResult<WrappedCollection>;

    /// Wrap `map`, read from `collection` of `owner`
    fn map_proxy(
        &self,
        map: SharedMap,
        owner: &WrappedObject,
        collection: &Arc<OneToManyAssociation>,
    ) -> WrapperResult<WrappedMap>;
}

// ============================================================================
// Factory
// ============================================================================

/// Default [`ProxyGenerator`]; also owns the interaction listeners
pub struct WrapperFactory {
    ctx: Arc<WrapperContext>,
}

impl WrapperFactory {
    /// Factory over `loader`, without a persister
    pub fn new(loader: Arc<dyn SpecificationLoader>) -> Self {
        Self {
            ctx: Arc::new(WrapperContext::new(loader, None)),
        }
    }

    /// Factory over `loader`; `save` hands objects to `persister`
    pub fn with_persister(
        loader: Arc<dyn SpecificationLoader>,
        persister: Arc<dyn ObjectPersister>,
    ) -> Self {
        Self {
            ctx: Arc::new(WrapperContext::new(loader, Some(persister))),
        }
    }

    /// Register a listener for every wrapper of this factory
    pub fn add_listener(&self, listener: impl InteractionListener + 'static) {
        self.ctx.add_listener(Arc::new(listener));
    }

    /// Remove all listeners
    pub fn clear_listeners(&self) {
        self.ctx.clear_listeners();
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.ctx.listener_count()
    }

    /// Wrap `pojo` under the default control
    pub fn wrap(&self, pojo: &Pojo) -> WrapperResult<WrappedObject> {
        self.object_proxy(pojo, SyncControl::control())
    }

    /// Wrap a mixin of `mixee` under the default control
    pub fn wrap_mixin(&self, mixin_class: &Class, mixee: &Pojo) -> WrapperResult<WrappedObject> {
        self.mixin_proxy(mixin_class, mixee, SyncControl::control())
    }
}

impl ProxyGenerator for WrapperFactory {
    fn object_proxy(&self, pojo: &Pojo, control: SyncControl) -> WrapperResult<WrappedObject> {
        Ok(WrappedObject {
            handler: DomainObjectHandler::for_object(Arc::clone(&self.ctx), pojo.clone(), control)?,
        })
    }

    fn mixin_proxy(
        &self,
        mixin_class: &Class,
        mixee: &Pojo,
        control: SyncControl,
    ) -> WrapperResult<WrappedObject> {
        Ok(WrappedObject {
            handler: DomainObjectHandler::for_mixin(
                Arc::clone(&self.ctx),
                mixin_class,
                mixee.clone(),
                control,
            )?,
        })
    }

    fn collection_proxy(
        &self,
        list: SharedList,
        owner: &WrappedObject,
        collection: &Arc<OneToManyAssociation>,
    ) -> WrapperResult<WrappedCollection> {
        Ok(WrappedCollection::new(plural_handler(
            owner,
            collection,
            Plural::List(list),
        )?))
    }

    fn map_proxy(
        &self,
        map: SharedMap,
        owner: &WrappedObject,
        collection: &Arc<OneToManyAssociation>,
    ) -> WrapperResult<WrappedMap> {
        Ok(WrappedMap::new(plural_handler(owner, collection, Plural::Map(map))?))
    }
}

fn plural_handler(
    owner: &WrappedObject,
    collection: &Arc<OneToManyAssociation>,
    plural: Plural,
) -> WrapperResult<PluralHandler> {
    let head = owner
        .handler
        .head_for(&ObjectMember::Collection(Arc::clone(collection)))?;
    Ok(PluralHandler::new(
        Arc::clone(owner.handler.context()),
        head,
        Arc::clone(collection),
        owner.control().clone(),
        plural,
    ))
}

// ============================================================================
// Results
// ============================================================================

/// What a wrapped call returned
#[derive(Debug, Clone)]
pub enum Invoked {
    /// A plain value (null when execution was skipped)
    Value(Value),
    /// A collection read through an association, wrapped
    Collection(WrappedCollection),
    /// A map read through an association, wrapped
    Map(WrappedMap),
}

impl Invoked {
    /// The value, unwrapping plurals to their underlying value
    pub fn into_value(self) -> Value {
        match self {
            Invoked::Value(value) => value,
            Invoked::Collection(c) => c.to_value(),
            Invoked::Map(m) => m.to_value(),
        }
    }

    /// The plain value, if this is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Invoked::Value(value) => Some(value),
            _ => None,
        }
    }

    /// The wrapped collection, if this is one
    pub fn into_collection(self) -> Option<WrappedCollection> {
        match self {
            Invoked::Collection(c) => Some(c),
            _ => None,
        }
    }

    /// The wrapped map, if this is one
    pub fn into_map(self) -> Option<WrappedMap> {
        match self {
            Invoked::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// What a wrapper wraps
#[derive(Debug, Clone)]
pub struct Origin {
    pojo: Pojo,
    mixee: Option<Pojo>,
    control: SyncControl,
}

impl Origin {
    /// The wrapped object (the mixin instance for mixin wrappers)
    pub fn pojo(&self) -> &Pojo {
        &self.pojo
    }

    /// The mixee, for mixin wrappers
    pub fn mixee(&self) -> Option<&Pojo> {
        self.mixee.as_ref()
    }

    /// Control the wrapper was created with
    pub fn control(&self) -> &SyncControl {
        &self.control
    }
}

// ============================================================================
// Wrapped object
// ============================================================================

/// Rule-enforcing wrapper around a domain object or mixin
#[derive(Clone)]
pub struct WrappedObject {
    handler: DomainObjectHandler,
}

impl WrappedObject {
    /// Call `method` by name: a member method, a special method (`title`,
    /// `toString`, `equals`, `hashCode`) or a wrapper method
    /// ([`crate::intent::SAVE_METHOD`], [`crate::intent::ORIGIN_METHOD`])
    pub fn invoke(&self, method: &str, args: &[Value]) -> WrapperResult<Invoked> {
        self.handler.invoke(method, args)
    }

    /// Read property `id`
    pub fn get_property(&self, id: &str) -> WrapperResult<Value> {
        self.handler.guard(
            || match self.handler.member(id)? {
                ObjectMember::Property(p) => self.handler.read_property(&p),
                other => Err(not_a(id, "property", &other)),
            },
            |v| v,
        )
    }

    /// Write property `id`
    pub fn set_property(&self, id: &str, value: Value) -> WrapperResult<()> {
        self.handler.guard(
            || match self.handler.member(id)? {
                ObjectMember::Property(p) => self.handler.modify_property(&p, value),
                other => Err(not_a(id, "property", &other)),
            },
            |_| (),
        )
    }

    /// Clear property `id`
    pub fn clear_property(&self, id: &str) -> WrapperResult<()> {
        self.handler.guard(
            || match self.handler.member(id)? {
                ObjectMember::Property(p) => self.handler.clear_property(&p),
                other => Err(not_a(id, "property", &other)),
            },
            |_| (),
        )
    }

    /// Read collection `id`; lists and maps come back wrapped
    pub fn get_collection(&self, id: &str) -> WrapperResult<Invoked> {
        self.handler.guard(
            || match self.handler.member(id)? {
                ObjectMember::Collection(c) => self.handler.read_collection(&c),
                other => Err(not_a(id, "collection", &other)),
            },
            Invoked::Value,
        )
    }

    /// Run action `id`
    pub fn invoke_action(&self, id: &str, args: &[Value]) -> WrapperResult<Value> {
        self.handler.guard(
            || match self.handler.member(id)? {
                ObjectMember::Action(a) => self.handler.execute_action(&a, args),
                other => Err(not_a(id, "action", &other)),
            },
            |v| v,
        )
    }

    /// Title of the wrapped object
    pub fn title(&self) -> WrapperResult<String> {
        self.handler
            .guard(|| self.handler.title(), |v| v.as_str().unwrap_or_default().to_string())
    }

    /// Validate the object, then persist it
    pub fn save(&self) -> WrapperResult<()> {
        self.handler.guard(|| self.handler.save(), |_| ())
    }

    /// The wrapped object, its mixee and control
    pub fn origin(&self) -> Origin {
        Origin {
            pojo: self.handler.target().clone(),
            mixee: self.handler.mixee().cloned(),
            control: self.handler.control().clone(),
        }
    }

    /// Spec of the wrapped object's class
    pub fn spec(&self) -> &Arc<ObjectSpecification> {
        self.handler.spec()
    }

    /// Control this wrapper applies
    pub fn control(&self) -> &SyncControl {
        self.handler.control()
    }

    /// True for mixin wrappers
    pub fn is_mixin(&self) -> bool {
        self.handler.mixee().is_some()
    }
}

impl fmt::Debug for WrappedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedObject")
            .field("spec", &self.handler.spec().logical_type_name())
            .field("target", self.handler.target())
            .field("mixin", &self.is_mixin())
            .finish()
    }
}

fn not_a(id: &str, expected: &str, found: &ObjectMember) -> WrapperError {
    WrapperError::illegal_argument(format!(
        "'{}' is not a {} ({:?})",
        id,
        expected,
        found.kind()
    ))
}

// ============================================================================
// Wrapped plurals
// ============================================================================

fn to_bool(value: Value) -> bool {
    matches!(value, Value::Bool(true))
}

fn to_len(value: Value) -> usize {
    value
        .as_int()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(0)
}

/// Wrapped collection; reads are checked, mutations are vetoed
#[derive(Clone)]
pub struct WrappedCollection {
    handler: PluralHandler,
}

impl WrappedCollection {
    pub(crate) fn new(handler: PluralHandler) -> Self {
        Self { handler }
    }

    /// Call `method` by name
    pub fn invoke(&self, method: &str, args: &[Value]) -> WrapperResult<Value> {
        self.handler.invoke(method, args)
    }

    /// Whether `value` is an element
    pub fn contains(&self, value: &Value) -> WrapperResult<bool> {
        self.invoke("contains", std::slice::from_ref(value)).map(to_bool)
    }

    /// Number of elements
    pub fn size(&self) -> WrapperResult<usize> {
        self.invoke("size", &[]).map(to_len)
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> WrapperResult<bool> {
        self.invoke("is_empty", &[]).map(to_bool)
    }

    /// Element at `index`, or null
    pub fn get(&self, index: usize) -> WrapperResult<Value> {
        self.invoke("get", &[Value::Int(index as i64)])
    }

    /// Vetoed
    pub fn add(&self, value: Value) -> WrapperResult<bool> {
        self.invoke("add", &[value]).map(to_bool)
    }

    /// Vetoed
    pub fn remove(&self, value: &Value) -> WrapperResult<bool> {
        self.invoke("remove", std::slice::from_ref(value)).map(to_bool)
    }

    /// Vetoed
    pub fn clear(&self) -> WrapperResult<()> {
        self.invoke("clear", &[]).map(|_| ())
    }

    /// Vetoed
    pub fn retain_all(&self, keep: &[Value]) -> WrapperResult<bool> {
        self.invoke("retain_all", keep).map(to_bool)
    }

    /// Association the collection was read from
    pub fn association(&self) -> &Arc<OneToManyAssociation> {
        self.handler.association()
    }

    fn to_value(&self) -> Value {
        match self.handler.plural() {
            Plural::List(list) => Value::List(list.clone()),
            Plural::Map(map) => Value::Map(map.clone()),
        }
    }
}

impl fmt::Debug for WrappedCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedCollection")
            .field("association", self.association().identifier())
            .finish()
    }
}

/// Wrapped map; reads are checked, mutations are vetoed
#[derive(Clone)]
pub struct WrappedMap {
    handler: PluralHandler,
}

impl WrappedMap {
    pub(crate) fn new(handler: PluralHandler) -> Self {
        Self { handler }
    }

    /// Call `method` by name
    pub fn invoke(&self, method: &str, args: &[Value]) -> WrapperResult<Value> {
        self.handler.invoke(method, args)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> WrapperResult<bool> {
        self.invoke("contains_key", &[Value::from(key)]).map(to_bool)
    }

    /// Whether `value` is present
    pub fn contains_value(&self, value: &Value) -> WrapperResult<bool> {
        self.invoke("contains_value", std::slice::from_ref(value))
            .map(to_bool)
    }

    /// Number of entries
    pub fn size(&self) -> WrapperResult<usize> {
        self.invoke("size", &[]).map(to_len)
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> WrapperResult<bool> {
        self.invoke("is_empty", &[]).map(to_bool)
    }

    /// Value under `key`, or null
    pub fn get(&self, key: &str) -> WrapperResult<Value> {
        self.invoke("get", &[Value::from(key)])
    }

    /// Vetoed
    pub fn put(&self, key: &str, value: Value) -> WrapperResult<Value> {
        self.invoke("put", &[Value::from(key), value])
    }

    /// Vetoed
    pub fn remove(&self, key: &str) -> WrapperResult<Value> {
        self.invoke("remove", &[Value::from(key)])
    }

    /// Vetoed
    pub fn clear(&self) -> WrapperResult<()> {
        self.invoke("clear", &[]).map(|_| ())
    }

    /// Association the map was read from
    pub fn association(&self) -> &Arc<OneToManyAssociation> {
        self.handler.association()
    }

    fn to_value(&self) -> Value {
        match self.handler.plural() {
            Plural::List(list) => Value::List(list.clone()),
            Plural::Map(map) => Value::Map(map.clone()),
        }
    }
}

impl fmt::Debug for WrappedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedMap")
            .field("association", self.association().identifier())
            .finish()
    }
}
