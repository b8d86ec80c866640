//! Runtime values flowing through method handles
//!
//! - [`Value`]: unified value enum passed to and returned from method handles
//! - [`Pojo`]: a shared, lockable domain object instance tagged with its class
//! - [`SharedList`] / [`SharedMap`]: plural values with shared ownership, so a
//!   collection returned by a getter aliases the collection held by the object

use crate::class::Class;
use crate::error::InvocationError;
use parking_lot::RwLock;
use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Pojo
// ============================================================================

type PojoState = Box<dyn Any + Send + Sync>;

/// A domain object instance.
///
/// Cloning a `Pojo` clones the handle, not the object: all clones observe
/// the same state. Equality is instance identity.
#[derive(Clone)]
pub struct Pojo {
    class: Class,
    state: Arc<RwLock<PojoState>>,
}

impl Pojo {
    /// Wrap `state` as an instance of `class`
    pub fn new<T: Any + Send + Sync>(class: Class, state: T) -> Self {
        Self {
            class,
            state: Arc::new(RwLock::new(Box::new(state))),
        }
    }

    pub(crate) fn from_boxed(class: Class, state: PojoState) -> Self {
        Self {
            class,
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// The class this instance belongs to
    pub fn class(&self) -> &Class {
        &self.class
    }

    /// Borrow the state as `T`
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the state is not a `T`.
    pub fn read<T: Any, R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, InvocationError> {
        let guard = self.state.read();
        match guard.downcast_ref::<T>() {
            Some(state) => Ok(f(state)),
            None => Err(self.mismatch::<T>()),
        }
    }

    /// Mutably borrow the state as `T`
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` if the state is not a `T`.
    pub fn write<T: Any, R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, InvocationError> {
        let mut guard = self.state.write();
        match guard.downcast_mut::<T>() {
            Some(state) => Ok(f(state)),
            None => Err(self.mismatch::<T>()),
        }
    }

    /// True if both handles point at the same instance
    pub fn same_instance(&self, other: &Pojo) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Identity hash, stable for the lifetime of the instance
    pub fn identity_hash(&self) -> u64 {
        Arc::as_ptr(&self.state) as *const () as usize as u64
    }

    fn mismatch<T>(&self) -> InvocationError {
        InvocationError::TypeMismatch {
            expected: type_name::<T>().to_string(),
            actual: self.class.name().to_string(),
        }
    }
}

impl PartialEq for Pojo {
    fn eq(&self, other: &Self) -> bool {
        self.same_instance(other)
    }
}

impl fmt::Debug for Pojo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:x}", self.class.name(), self.identity_hash())
    }
}

// ============================================================================
// Plurals
// ============================================================================

/// Shared, mutable list of values
#[derive(Clone, Default)]
pub struct SharedList(Arc<RwLock<Vec<Value>>>);

impl SharedList {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// List holding `values`
    pub fn from_vec(values: Vec<Value>) -> Self {
        Self(Arc::new(RwLock::new(values)))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True if there are no elements
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Element at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.read().get(index).cloned()
    }

    /// True if any element equals `value`
    pub fn contains(&self, value: &Value) -> bool {
        self.0.read().iter().any(|v| v == value)
    }

    /// Append `value`
    pub fn push(&self, value: Value) {
        self.0.write().push(value);
    }

    /// Remove the first element equal to `value`
    pub fn remove(&self, value: &Value) -> bool {
        let mut list = self.0.write();
        match list.iter().position(|v| v == value) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Keep only elements contained in `keep`
    pub fn retain_all(&self, keep: &[Value]) -> bool {
        let mut list = self.0.write();
        let before = list.len();
        list.retain(|v| keep.contains(v));
        before != list.len()
    }

    /// Remove all elements
    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Point-in-time copy of the elements
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.read().clone()
    }

    /// True if both handles alias the same list
    pub fn same_list(&self, other: &SharedList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedList {
    fn eq(&self, other: &Self) -> bool {
        self.same_list(other) || self.to_vec() == other.to_vec()
    }
}

impl fmt::Debug for SharedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.read().iter()).finish()
    }
}

/// Shared, mutable string-keyed map of values
#[derive(Clone, Default)]
pub struct SharedMap(Arc<RwLock<BTreeMap<String, Value>>>);

impl SharedMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding `entries`
    pub fn from_map(entries: BTreeMap<String, Value>) -> Self {
        Self(Arc::new(RwLock::new(entries)))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// True if there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Value stored under `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// True if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// True if any entry's value equals `value`
    pub fn contains_value(&self, value: &Value) -> bool {
        self.0.read().values().any(|v| v == value)
    }

    /// Insert, returning the previous value
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.write().insert(key.into(), value)
    }

    /// Remove `key`, returning its value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.write().remove(key)
    }

    /// Remove all entries
    pub fn clear(&self) {
        self.0.write().clear();
    }

    /// Point-in-time copy of the entries
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.0.read().clone()
    }

    /// True if both handles alias the same map
    pub fn same_map(&self, other: &SharedMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for SharedMap {
    fn eq(&self, other: &Self) -> bool {
        self.same_map(other) || self.snapshot() == other.snapshot()
    }
}

impl fmt::Debug for SharedMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.read().iter()).finish()
    }
}

// ============================================================================
// Value
// ============================================================================

/// Unified value type for arguments and results of method handles
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value (`void` results, unset references)
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// String
    Str(String),
    /// Reference to a domain object
    Object(Pojo),
    /// Shared collection
    List(SharedList),
    /// Shared map
    Map(SharedMap),
}

impl Value {
    /// Short name of the variant, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "i64",
            Value::Float(_) => "f64",
            Value::Str(_) => "String",
            Value::Object(_) => "object",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// True for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean contents, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer contents, if this is an int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Object reference, if this is an object
    pub fn as_object(&self) -> Option<&Pojo> {
        match self {
            Value::Object(p) => Some(p),
            _ => None,
        }
    }

    /// List handle, if this is a list
    pub fn as_list(&self) -> Option<&SharedList> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// Map handle, if this is a map
    pub fn as_map(&self) -> Option<&SharedMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Argument conversion used by method handles
    ///
    /// # Errors
    ///
    /// Returns `BadArgument` if the value is not a string.
    pub fn to_string_arg(&self, position: usize) -> Result<String, InvocationError> {
        self.as_str()
            .map(str::to_owned)
            .ok_or_else(|| self.bad_arg(position, "String"))
    }

    /// Argument conversion used by method handles
    ///
    /// # Errors
    ///
    /// Returns `BadArgument` if the value is not an int.
    pub fn to_int_arg(&self, position: usize) -> Result<i64, InvocationError> {
        self.as_int().ok_or_else(|| self.bad_arg(position, "i64"))
    }

    /// Argument conversion used by method handles
    ///
    /// # Errors
    ///
    /// Returns `BadArgument` if the value is not a bool.
    pub fn to_bool_arg(&self, position: usize) -> Result<bool, InvocationError> {
        self.as_bool().ok_or_else(|| self.bad_arg(position, "bool"))
    }

    /// Argument conversion used by method handles
    ///
    /// # Errors
    ///
    /// Returns `BadArgument` if the value is not an object.
    pub fn to_object_arg(&self, position: usize) -> Result<Pojo, InvocationError> {
        self.as_object()
            .cloned()
            .ok_or_else(|| self.bad_arg(position, "object"))
    }

    fn bad_arg(&self, position: usize, expected: &str) -> InvocationError {
        InvocationError::bad_argument(
            position,
            format!("expected {}, got {}", expected, self.type_name()),
        )
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Object(p) => write!(f, "{:?}", p),
            Value::List(l) => write!(f, "{:?}", l),
            Value::Map(m) => write!(f, "{:?}", m),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<Pojo> for Value {
    fn from(p: Pojo) -> Self {
        Value::Object(p)
    }
}

impl From<SharedList> for Value {
    fn from(l: SharedList) -> Self {
        Value::List(l)
    }
}

impl From<SharedMap> for Value {
    fn from(m: SharedMap) -> Self {
        Value::Map(m)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}
