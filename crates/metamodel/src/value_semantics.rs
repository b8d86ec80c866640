//! Value semantics: which classes are treated as values

use causeway_core::{builtin_value_classes, Class, ClassPath, DomainNature};
use std::sync::Arc;

/// Knows which classes have value semantics
pub trait ValueSemanticsResolver: Send + Sync {
    /// True if `class` is handled as a value
    fn has_value_semantics(&self, class: &Class) -> bool;

    /// Value classes known up front, primed during metamodel creation
    fn value_classes(&self) -> Vec<Class>;
}

/// Built-in value classes plus every class declared with value nature
pub struct ValueSemanticsResolverDefault {
    class_path: Arc<ClassPath>,
}

impl ValueSemanticsResolverDefault {
    /// Resolver over `class_path`
    pub fn new(class_path: Arc<ClassPath>) -> Self {
        Self { class_path }
    }
}

impl ValueSemanticsResolver for ValueSemanticsResolverDefault {
    fn has_value_semantics(&self, class: &Class) -> bool {
        matches!(class.nature(), DomainNature::Value) || builtin_value_classes().contains(class)
    }

    fn value_classes(&self) -> Vec<Class> {
        let mut classes: Vec<Class> = builtin_value_classes().to_vec();
        for class in self.class_path.classes() {
            if self.has_value_semantics(&class) && !classes.contains(&class) {
                classes.push(class);
            }
        }
        classes
    }
}
