//! Bean type classification and registry
//!
//! The classifier decides the [`BeanSort`] of a single class. The registry
//! scans a [`ClassPath`] once, classifies every class and serves the
//! introspectable types grouped by sort. The loader falls back to the
//! classifier for classes the scan did not see.

use crate::value_semantics::ValueSemanticsResolver;
use causeway_core::{BeanSort, Class, ClassPath, DomainNature};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Decides the bean sort of a class
pub trait CausewayBeanTypeClassifier: Send + Sync {
    /// Bean sort of `class`
    fn classify(&self, class: &Class) -> BeanSort;
}

/// Classifies by declared domain nature
pub struct CausewayBeanTypeClassifierDefault {
    values: Arc<dyn ValueSemanticsResolver>,
}

impl CausewayBeanTypeClassifierDefault {
    /// Classifier consulting `values` for value semantics
    pub fn new(values: Arc<dyn ValueSemanticsResolver>) -> Self {
        Self { values }
    }
}

impl CausewayBeanTypeClassifier for CausewayBeanTypeClassifierDefault {
    fn classify(&self, class: &Class) -> BeanSort {
        match class.nature() {
            DomainNature::Vetoed => return BeanSort::Vetoed,
            DomainNature::Value => return BeanSort::Value,
            DomainNature::Mixin { .. } => return BeanSort::Mixin,
            _ => {}
        }
        if self.values.has_value_semantics(class) {
            return BeanSort::Value;
        }
        if class.is_abstract() {
            return BeanSort::Abstract;
        }
        match class.nature() {
            DomainNature::Entity => BeanSort::Entity,
            DomainNature::ViewModel => BeanSort::ViewModel,
            DomainNature::ManagedBean { contributing: true } => BeanSort::ManagedBeanContributing,
            DomainNature::ManagedBean { contributing: false } => {
                BeanSort::ManagedBeanNotContributing
            }
            _ => BeanSort::Unknown,
        }
    }
}

/// Introspectable types discovered by scanning
pub trait CausewayBeanTypeRegistry: Send + Sync {
    /// Every eagerly introspected type with its sort, in scan order
    fn introspectable_types(&self) -> Vec<(Class, BeanSort)>;

    /// Sort recorded for `class` by the scan
    fn bean_sort(&self, class: &Class) -> Option<BeanSort>;

    /// Value types
    fn value_types(&self) -> Vec<Class> {
        self.of_sort(BeanSort::is_value)
    }

    /// Entities
    fn entity_types(&self) -> Vec<Class> {
        self.of_sort(BeanSort::is_entity)
    }

    /// View models
    fn view_model_types(&self) -> Vec<Class> {
        self.of_sort(BeanSort::is_view_model)
    }

    /// Mixins
    fn mixin_types(&self) -> Vec<Class> {
        self.of_sort(BeanSort::is_mixin)
    }

    /// Managed beans, contributing or not
    fn managed_bean_types(&self) -> Vec<Class> {
        self.of_sort(BeanSort::is_managed_bean)
    }

    /// Introspectable types whose sort matches `pred`
    fn of_sort(&self, pred: fn(&BeanSort) -> bool) -> Vec<Class> {
        self.introspectable_types()
            .into_iter()
            .filter(|(_, sort)| pred(sort))
            .map(|(class, _)| class)
            .collect()
    }

    /// Forget the scan; the next query rescans
    fn clear(&self);
}

/// Registry scanning a [`ClassPath`] on first use
pub struct CausewayBeanTypeRegistryDefault {
    class_path: Arc<ClassPath>,
    classifier: Arc<dyn CausewayBeanTypeClassifier>,
    scanned: Mutex<Option<Arc<Vec<(Class, BeanSort)>>>>,
}

impl CausewayBeanTypeRegistryDefault {
    /// Registry over `class_path`
    pub fn new(class_path: Arc<ClassPath>, classifier: Arc<dyn CausewayBeanTypeClassifier>) -> Self {
        Self {
            class_path,
            classifier,
            scanned: Mutex::new(None),
        }
    }

    fn scan(&self) -> Arc<Vec<(Class, BeanSort)>> {
        let mut scanned = self.scanned.lock();
        if let Some(types) = scanned.as_ref() {
            return Arc::clone(types);
        }
        let types: Vec<(Class, BeanSort)> = self
            .class_path
            .classes()
            .into_iter()
            .map(|class| {
                let sort = self.classifier.classify(&class);
                (class, sort)
            })
            .filter(|(_, sort)| sort.is_eagerly_introspected())
            .collect();
        debug!(
            target: "causeway::metamodel",
            scanned = self.class_path.len(),
            introspectable = types.len(),
            "Scanned class path"
        );
        let types = Arc::new(types);
        *scanned = Some(Arc::clone(&types));
        types
    }
}

impl CausewayBeanTypeRegistry for CausewayBeanTypeRegistryDefault {
    fn introspectable_types(&self) -> Vec<(Class, BeanSort)> {
        self.scan().as_ref().clone()
    }

    fn bean_sort(&self, class: &Class) -> Option<BeanSort> {
        self.scan()
            .iter()
            .find(|(c, _)| c == class)
            .map(|(_, sort)| *sort)
    }

    fn clear(&self) {
        *self.scanned.lock() = None;
    }
}
