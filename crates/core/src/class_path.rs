//! Class path: the set of classes known to the application
//!
//! Acts as the class loader for the metamodel: resolves class references by
//! name and serves as the scan source for the bean type registry. Built-in
//! value classes are always present.

use crate::class::{Class, ClassBuilder, TypeRef};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

/// Names of the built-in value classes
pub const BUILTIN_VALUE_TYPES: &[&str] = &["String", "bool", "i64", "f64"];

static BUILTIN_VALUE_CLASSES: Lazy<Vec<Class>> = Lazy::new(|| {
    BUILTIN_VALUE_TYPES
        .iter()
        .map(|name| ClassBuilder::<()>::new(*name).value().build())
        .collect()
});

/// The built-in value classes
pub fn builtin_value_classes() -> &'static [Class] {
    &BUILTIN_VALUE_CLASSES
}

#[derive(Default)]
struct ClassPathInner {
    by_name: FxHashMap<String, Class>,
    order: Vec<Class>,
}

/// Registry of classes, by fully qualified name
///
/// Thread-safe; registration order is preserved for scanning.
pub struct ClassPath {
    inner: RwLock<ClassPathInner>,
}

impl ClassPath {
    /// Class path holding only the built-in value classes
    pub fn new() -> Self {
        let path = Self {
            inner: RwLock::new(ClassPathInner::default()),
        };
        for class in builtin_value_classes() {
            path.register(class.clone());
        }
        path
    }

    /// Class path holding the built-ins plus `classes`
    pub fn with_classes(classes: impl IntoIterator<Item = Class>) -> Self {
        let path = Self::new();
        for class in classes {
            path.register(class);
        }
        path
    }

    /// Add a class, replacing any class of the same name.
    /// The superclass chain is registered too.
    pub fn register(&self, class: Class) {
        let mut chain = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            current = c.superclass().cloned();
            chain.push(c);
        }
        let mut inner = self.inner.write();
        for c in chain.into_iter().rev() {
            if let Some(existing) = inner.by_name.insert(c.name().to_string(), c.clone()) {
                if let Some(pos) = inner.order.iter().position(|o| *o == existing) {
                    inner.order[pos] = c;
                }
            } else {
                inner.order.push(c);
            }
        }
    }

    /// Look up a class by name
    pub fn lookup(&self, name: &str) -> Option<Class> {
        self.inner.read().by_name.get(name).cloned()
    }

    /// Resolve the class a type reference points at. For plurals this is
    /// the element class.
    pub fn resolve(&self, type_ref: &TypeRef) -> Option<Class> {
        type_ref.element_type_name().and_then(|name| self.lookup(name))
    }

    /// True if a class of this name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.inner.read().by_name.contains_key(name)
    }

    /// All classes, in registration order
    pub fn classes(&self) -> Vec<Class> {
        self.inner.read().order.clone()
    }

    /// Number of registered classes
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// True if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }
}

impl Default for ClassPath {
    fn default() -> Self {
        Self::new()
    }
}
