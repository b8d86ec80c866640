//! Default specification loader
//!
//! # Bootstrap order
//!
//! 1. additional types, primed
//! 2. value types, primed
//! 3. introspectable types classified into value / mixin / domain specs
//! 4. everything to TYPE level (fills the mixin index), values FULL, mixins
//!    FULL, menu bars, domain specs FULL
//! 5. in full mode: every cached spec FULL, mixins first
//! 6. validation result memoized
//!
//! # Locking
//!
//! The cache lock is only held while a spec is constructed. Introspection
//! takes per-spec guards (see [`ObjectSpecification`]). Validation passes are
//! serialized by the validation queue. While a pass runs,
//! `get_or_assess_validation_result` returns the last memoized result (empty
//! if there is none) rather than starting a second pass.

use super::validation_queue::{Admission, ValidationQueue, ValidationRun};
use super::SpecificationLoader;
use crate::bean_types::{CausewayBeanTypeClassifier, CausewayBeanTypeRegistry};
use crate::cache::SpecificationCache;
use crate::config::MetamodelConfig;
use crate::logical_type_resolver::LogicalTypeResolver;
use crate::menubars::{MenuBars, MenuBarsService};
use crate::programming_model::{ProgrammingModel, ProgrammingModelInitFilter};
use crate::spec::mixins::MixinIndex;
use crate::spec::{IntrospectionContext, ObjectSpecification};
use crate::substitutor::ClassSubstitutorRegistry;
use crate::validation::{run_validators, ValidationFailures};
use crate::value_semantics::ValueSemanticsResolver;
use causeway_core::{
    BeanSort, Class, ClassPath, IntrospectionState, LogicalType, MetamodelError, MetamodelResult,
    TypeRef,
};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Collaborators of a loader, assembled by the builder
pub(crate) struct LoaderParts {
    pub(crate) config: MetamodelConfig,
    pub(crate) class_path: Arc<ClassPath>,
    pub(crate) programming_model: Arc<dyn ProgrammingModel>,
    pub(crate) init_filter: ProgrammingModelInitFilter,
    pub(crate) substitutors: ClassSubstitutorRegistry,
    pub(crate) classifier: Arc<dyn CausewayBeanTypeClassifier>,
    pub(crate) bean_types: Arc<dyn CausewayBeanTypeRegistry>,
    pub(crate) value_semantics: Arc<dyn ValueSemanticsResolver>,
    pub(crate) menu_bars: Arc<dyn MenuBarsService>,
    pub(crate) additional_types: Vec<Class>,
}

/// The default [`SpecificationLoader`]
pub struct SpecificationLoaderDefault {
    self_ref: Weak<SpecificationLoaderDefault>,
    parts: LoaderParts,
    cache: SpecificationCache<ObjectSpecification>,
    resolver: LogicalTypeResolver,
    mixins: MixinIndex,
    fully_introspected: AtomicBool,
    validation: ValidationQueue,
    validation_memo: Mutex<Option<Arc<ValidationFailures>>>,
}

impl std::fmt::Debug for SpecificationLoaderDefault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecificationLoaderDefault")
            .field("config", &self.parts.config)
            .field("specs", &self.cache.len())
            .field(
                "fully_introspected",
                &self.fully_introspected.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl SpecificationLoaderDefault {
    pub(crate) fn new(parts: LoaderParts) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            self_ref: self_ref.clone(),
            validation: ValidationQueue::new(parts.config.validator.queue_capacity),
            parts,
            cache: SpecificationCache::new(),
            resolver: LogicalTypeResolver::new(),
            mixins: MixinIndex::new(),
            fully_introspected: AtomicBool::new(false),
            validation_memo: Mutex::new(None),
        })
    }

    /// Logical type resolver
    pub fn logical_type_resolver(&self) -> &LogicalTypeResolver {
        &self.resolver
    }

    /// Menu bars, built on first call
    pub fn menu_bars(&self) -> MetamodelResult<Arc<MenuBars>> {
        self.parts.menu_bars.menu_bars(self)
    }

    fn create_spec(&self, class: &Class) -> ObjectSpecification {
        let bean_sort = self
            .parts
            .bean_types
            .bean_sort(class)
            .unwrap_or_else(|| self.parts.classifier.classify(class));
        let context: Weak<dyn IntrospectionContext> = self.self_ref.clone();
        ObjectSpecification::new(class.clone(), bean_sort, context)
    }

    fn prime(&self, class: &Class) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.load_specification(class, IntrospectionState::NotIntrospected)
    }

    fn introspect(
        &self,
        specs: &[Arc<ObjectSpecification>],
        up_to: IntrospectionState,
    ) -> MetamodelResult<()> {
        let introspect_one = |spec: &Arc<ObjectSpecification>| {
            spec.introspect_up_to(up_to).map_err(|e| {
                error!(
                    target: "causeway::metamodel",
                    spec = %spec.logical_type(),
                    error = %e,
                    "Introspection failed"
                );
                e
            })
        };
        if self.parts.config.introspector.parallelize {
            specs.par_iter().try_for_each(introspect_one)
        } else {
            specs.iter().try_for_each(introspect_one)
        }
    }

    /// Run validators until no further requests were queued during the run
    fn run_pass(&self, run: ValidationRun<'_>) -> MetamodelResult<Arc<ValidationFailures>> {
        loop {
            *self.validation_memo.lock() = None;
            let failures = Arc::new(run_validators(
                &self.parts.programming_model.validators(),
                self,
                self.parts.config.validator.parallelize,
            )?);
            *self.validation_memo.lock() = Some(Arc::clone(&failures));
            let drained = run.drain_or_finish();
            if drained == 0 {
                return Ok(failures);
            }
            debug!(
                target: "causeway::validation",
                drained,
                "Re-validating for specs discovered during validation"
            );
        }
    }
}

impl SpecificationLoader for SpecificationLoaderDefault {
    fn config(&self) -> &MetamodelConfig {
        &self.parts.config
    }

    fn class_path(&self) -> &ClassPath {
        &self.parts.class_path
    }

    fn create_meta_model(&self) -> MetamodelResult<()> {
        let started = Instant::now();
        self.parts.programming_model.init(self.parts.init_filter);

        for class in &self.parts.additional_types {
            self.prime(class)?;
        }

        let mut value_specs = Vec::new();
        for class in self.parts.value_semantics.value_classes() {
            value_specs.extend(self.prime(&class)?);
        }

        let mut mixin_specs = Vec::new();
        let mut domain_specs = Vec::new();
        for (class, sort) in self.parts.bean_types.introspectable_types() {
            let Some(spec) = self.prime(&class)? else {
                continue;
            };
            match sort {
                BeanSort::Mixin => mixin_specs.push(spec),
                BeanSort::Value => {
                    if !value_specs.iter().any(|v| Arc::ptr_eq(v, &spec)) {
                        value_specs.push(spec);
                    }
                }
                _ => domain_specs.push(spec),
            }
        }
        info!(
            target: "causeway::metamodel",
            values = value_specs.len(),
            mixins = mixin_specs.len(),
            domain = domain_specs.len(),
            "Discovered types"
        );

        self.introspect(&self.cache.snapshot(), IntrospectionState::TypeIntrospected)?;
        self.introspect(&value_specs, IntrospectionState::FullyIntrospected)?;
        self.introspect(&mixin_specs, IntrospectionState::FullyIntrospected)?;
        self.parts.menu_bars.menu_bars(self)?;
        self.introspect(&domain_specs, IntrospectionState::FullyIntrospected)?;

        if self.parts.config.is_full_introspect() {
            let (mixins, others): (Vec<_>, Vec<_>) =
                self.cache.snapshot().into_iter().partition(|s| s.is_mixin());
            self.introspect(&mixins, IntrospectionState::FullyIntrospected)?;
            self.introspect(&others, IntrospectionState::FullyIntrospected)?;
        }

        self.fully_introspected.store(true, Ordering::Release);
        let failures = self.get_or_assess_validation_result()?;
        info!(
            target: "causeway::metamodel",
            specs = self.cache.len(),
            failures = failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Metamodel created"
        );
        Ok(())
    }

    fn dispose_meta_model(&self) {
        let timeout = self.parts.config.dispose_timeout();
        if !self.validation.wait_idle(timeout) {
            warn!(
                target: "causeway::metamodel",
                timeout_ms = timeout.as_millis() as u64,
                "Validation still running at dispose; clearing anyway"
            );
        }
        self.fully_introspected.store(false, Ordering::Release);
        self.resolver.clear();
        self.cache.clear();
        *self.validation_memo.lock() = None;
        self.parts.bean_types.clear();
        self.parts.substitutors.clear();
        self.parts.menu_bars.invalidate();
        self.mixins.clear();
        info!(target: "causeway::metamodel", "Metamodel disposed");
    }

    fn is_metamodel_fully_introspected(&self) -> bool {
        self.fully_introspected.load(Ordering::Acquire)
    }

    fn load_specification(
        &self,
        class: &Class,
        up_to: IntrospectionState,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        let Some(class) = self.parts.substitutors.substitution(class).apply(class) else {
            return Ok(None);
        };
        let (spec, created) = self
            .cache
            .compute_if_absent(&class, |c| Ok(self.create_spec(c)))?;
        if created {
            self.resolver.register(spec.logical_type());
        }
        spec.introspect_up_to(up_to)?;

        if created
            && self.is_metamodel_fully_introspected()
            && self.parts.config.introspector.validate_incrementally
        {
            self.validate_later(&spec)?;
        }
        Ok(Some(spec))
    }

    fn reload_specification(&self, class: &Class) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.invalidate_cache(class)?;
        self.load_specification(class, IntrospectionState::FullyIntrospected)
    }

    fn invalidate_cache(&self, class: &Class) -> MetamodelResult<()> {
        let mut current = self.load_specification(class, IntrospectionState::FullyIntrospected)?;
        while let Some(spec) = current {
            debug!(
                target: "causeway::metamodel",
                spec = %spec.logical_type(),
                "Invalidating cached spec"
            );
            self.cache.remove(spec.class());
            current = spec.superclass();
        }
        *self.validation_memo.lock() = None;
        Ok(())
    }

    fn snapshot_specifications(&self) -> Vec<Arc<ObjectSpecification>> {
        self.cache.snapshot()
    }

    fn for_each(&self, f: &mut dyn FnMut(&Arc<ObjectSpecification>)) {
        self.cache.for_each_concurrent(f)
    }

    fn lookup_logical_type(&self, logical_type_name: &str) -> Option<LogicalType> {
        if let Some(logical_type) = self.resolver.lookup(logical_type_name) {
            return Some(logical_type);
        }
        // not yet discovered; the name may be a class name
        let class = self.parts.class_path.lookup(logical_type_name)?;
        match self.load_specification(&class, IntrospectionState::TypeIntrospected) {
            Ok(spec) => spec.map(|s| s.logical_type().clone()),
            Err(e) => {
                warn!(
                    target: "causeway::metamodel",
                    name = logical_type_name,
                    error = %e,
                    "Failed to load spec while resolving logical type"
                );
                None
            }
        }
    }

    fn validate_later(&self, spec: &Arc<ObjectSpecification>) -> MetamodelResult<()> {
        match self.validation.admit(spec.class())? {
            Admission::Queued => {
                debug!(
                    target: "causeway::validation",
                    spec = %spec.logical_type(),
                    "Validation in progress; queued"
                );
                Ok(())
            }
            Admission::Run(run) => self.run_pass(run)?.to_result(),
        }
    }

    fn get_or_assess_validation_result(&self) -> MetamodelResult<Arc<ValidationFailures>> {
        loop {
            if let Some(run) = self.validation.try_begin() {
                // idle: the memo, if any, is the outcome of a finished pass
                if let Some(memo) = self.validation_result() {
                    return Ok(memo);
                }
                return self.run_pass(run);
            }
            if self.validation.is_running_on_current_thread() {
                // asked from inside the running pass
                return Ok(self.validation_result().unwrap_or_default());
            }
            let timeout = self.parts.config.dispose_timeout();
            if !self.validation.wait_idle(timeout) {
                warn!(
                    target: "causeway::validation",
                    timeout_ms = timeout.as_millis() as u64,
                    "Timed out waiting for a running validation pass"
                );
                return Err(MetamodelError::illegal_state(format!(
                    "validation still running after {}ms",
                    timeout.as_millis()
                )));
            }
        }
    }

    fn validation_result(&self) -> Option<Arc<ValidationFailures>> {
        self.validation_memo.lock().clone()
    }
}

impl IntrospectionContext for SpecificationLoaderDefault {
    fn programming_model(&self) -> Arc<dyn ProgrammingModel> {
        Arc::clone(&self.parts.programming_model)
    }

    fn load_spec(
        &self,
        class: &Class,
        up_to: IntrospectionState,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.load_specification(class, up_to)
    }

    fn resolve_class(&self, type_ref: &TypeRef) -> Option<Class> {
        self.parts.class_path.resolve(type_ref)
    }

    fn register_aliases(&self, spec: &ObjectSpecification) {
        self.resolver.register_aliases(spec.logical_type(), spec.aliases());
    }

    fn mixin_index(&self) -> &MixinIndex {
        &self.mixins
    }
}
