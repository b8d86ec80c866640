//! Validation through the loader
//!
//! Built-in validators report structural problems at build time. Specs
//! discovered after creation are validated incrementally, and specs
//! discovered while a pass is running are queued and picked up by a
//! follow-up pass of the same run.

use crate::common::*;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

fn messages(err: MetamodelError) -> Vec<String> {
    match err {
        MetamodelError::Validation { messages } => messages,
        other => panic!("expected validation error, got {:?}", other),
    }
}

// ============================================================================
// Built-in validators
// ============================================================================

#[test]
fn test_fixture_model_is_valid() {
    let model = Model::new();
    let loader = model.build();
    let failures = loader.get_or_assess_validation_result().unwrap();
    assert!(failures.is_empty(), "{:?}", failures.messages());
}

#[test]
fn test_duplicate_logical_type_name_fails() {
    struct A;
    struct B;
    let a = ClassBuilder::<A>::new("demo.A").entity().named("demo.Dup").build();
    let b = ClassBuilder::<B>::new("demo.B").entity().named("demo.Dup").build();

    let err = MetamodelBuilder::with_classes([a, b]).build().unwrap_err();
    let messages = messages(err);
    assert!(messages
        .iter()
        .any(|m| m.contains("Logical type name 'demo.Dup' mapped to multiple non-abstract classes")));
}

#[test]
fn test_alias_clash_fails() {
    struct A;
    struct B;
    let a = ClassBuilder::<A>::new("demo.A").entity().alias("demo.Shared").build();
    let b = ClassBuilder::<B>::new("demo.B").entity().alias("demo.Shared").build();

    let err = MetamodelBuilder::with_classes([a, b]).build().unwrap_err();
    assert!(messages(err).iter().any(|m| m.contains("'demo.Shared'")));
}

#[test]
fn test_orphaned_supporting_method_fails() {
    struct Thing;
    let thing = ClassBuilder::<Thing>::new("demo.Thing")
        .entity()
        .query("hideNothing", vec![], TypeRef::boolean(), |_, _| Ok(true.into()))
        .build();

    let err = MetamodelBuilder::with_classes([thing]).build().unwrap_err();
    assert!(messages(err)
        .iter()
        .any(|m| m.contains("Supporting method 'hideNothing' does not match any member")));
}

#[test]
fn test_mixin_of_unknown_mixee_fails() {
    struct Ghostly;
    let mixin = ClassBuilder::<Ghostly>::new("demo.Ghost_haunt")
        .mixin("demo.Ghost", "act", MixinContribution::Action, |_| Ghostly)
        .method("act", vec![], TypeRef::Void, |_, _| Ok(Value::Null))
        .build();

    let err = MetamodelBuilder::with_classes([mixin]).build().unwrap_err();
    assert!(messages(err)
        .iter()
        .any(|m| m.contains("mixee class 'demo.Ghost' is not on the class path")));
}

#[test]
fn test_open_then_assess_reports_without_failing() {
    let loader = MetamodelBuilder::with_classes(Model::new().classes())
        .programming_model(Arc::new(
            DefaultProgrammingModel::new().with_validator(Arc::new(RejectingValidator)),
        ))
        .open()
        .unwrap();
    loader.create_meta_model().unwrap();

    let failures = loader.get_or_assess_validation_result().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures.to_result().is_err());
    assert_eq!(loader.validation_result().unwrap().len(), 1);
}

// ============================================================================
// Incremental validation
// ============================================================================

fn counted(model: &Model, config: MetamodelConfig) -> (Arc<SpecificationLoaderDefault>, Arc<CountingValidator>) {
    init_tracing();
    let counter = Arc::new(CountingValidator::default());
    let loader = model
        .builder()
        .config(config)
        .programming_model(Arc::new(
            DefaultProgrammingModel::new().with_validator(Arc::clone(&counter) as Arc<dyn MetaModelValidator>),
        ))
        .build()
        .unwrap();
    (loader, counter)
}

#[test]
fn test_build_validates_once() {
    let model = Model::new();
    let (loader, counter) = counted(&model, MetamodelConfig::default());
    assert_eq!(counter.passes(), 1);

    // memoized
    loader.get_or_assess_validation_result().unwrap();
    assert_eq!(counter.passes(), 1);
}

#[test]
fn test_late_discovery_is_validated() {
    let model = Model::new();
    let (loader, counter) = counted(&model, MetamodelConfig::default());
    assert!(!counter.saw("demo.Address"));

    loader
        .load_specification(&model.address, IntrospectionState::FullyIntrospected)
        .unwrap();
    assert_eq!(counter.passes(), 2);
    assert!(counter.saw("demo.Address"));

    // already cached: no new pass
    loader
        .load_specification(&model.address, IntrospectionState::FullyIntrospected)
        .unwrap();
    assert_eq!(counter.passes(), 2);
}

#[test]
fn test_incremental_validation_can_be_disabled() {
    let model = Model::new();
    let mut config = MetamodelConfig::default();
    config.introspector.validate_incrementally = false;
    let (loader, counter) = counted(&model, config);

    loader
        .load_specification(&model.address, IntrospectionState::FullyIntrospected)
        .unwrap();
    assert_eq!(counter.passes(), 1);
}

/// Loads a class from inside its first pass
struct DiscoveringValidator {
    class: Class,
    loaded: AtomicBool,
    passes: AtomicUsize,
    saw_class_on_pass: AtomicUsize,
}

impl MetaModelValidator for DiscoveringValidator {
    fn name(&self) -> &'static str {
        "DiscoveringValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        _failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        let pass = self.passes.fetch_add(1, Ordering::SeqCst) + 1;
        if loader
            .snapshot_specifications()
            .iter()
            .any(|s| s.class() == &self.class)
        {
            self.saw_class_on_pass.compare_exchange(0, pass, Ordering::SeqCst, Ordering::SeqCst).ok();
        }
        if !self.loaded.swap(true, Ordering::SeqCst) {
            loader.load_specification(&self.class, IntrospectionState::FullyIntrospected)?;
        }
        Ok(())
    }
}

#[test]
fn test_discovery_during_validation_is_drained() {
    let model = Model::new();
    let validator = Arc::new(DiscoveringValidator {
        class: model.address.clone(),
        loaded: AtomicBool::new(false),
        passes: AtomicUsize::new(0),
        saw_class_on_pass: AtomicUsize::new(0),
    });
    let loader = model
        .builder()
        .programming_model(Arc::new(
            DefaultProgrammingModel::new().with_validator(Arc::clone(&validator) as Arc<dyn MetaModelValidator>),
        ))
        .build()
        .unwrap();

    // the first pass queued the address spec; a second pass saw it
    assert_eq!(validator.passes.load(Ordering::SeqCst), 2);
    assert_eq!(validator.saw_class_on_pass.load(Ordering::SeqCst), 2);
    assert!(loader
        .snapshot_specifications()
        .iter()
        .any(|s| s.class() == &model.address));
}

#[test]
fn test_invalidation_forgets_validation_result() {
    let model = Model::new();
    let (loader, counter) = counted(&model, MetamodelConfig::default());
    assert!(loader.validation_result().is_some());

    loader.invalidate_cache(&model.order).unwrap();
    assert!(loader.validation_result().is_none());

    loader.get_or_assess_validation_result().unwrap();
    assert_eq!(counter.passes(), 2);
}

/// Loads one more class on each pass until none are left
struct CascadingValidator {
    pending: Mutex<Vec<Class>>,
    passes: AtomicUsize,
}

impl MetaModelValidator for CascadingValidator {
    fn name(&self) -> &'static str {
        "CascadingValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        for spec in loader.snapshot_specifications() {
            let name = spec.class().name();
            if name.starts_with("demo.Extra") {
                failures.add(name, format!("{} discovered", name));
            }
        }
        let next = self.pending.lock().pop();
        if let Some(class) = next {
            loader.load_specification(&class, IntrospectionState::FullyIntrospected)?;
        }
        Ok(())
    }
}

#[test]
fn test_cascading_discoveries_end_in_one_result() {
    init_tracing();
    let model = Model::new();
    let extras: Vec<Class> = (0..3)
        .map(|i| ClassBuilder::<()>::new(&format!("demo.Extra{}", i)).build())
        .collect();
    let validator = Arc::new(CascadingValidator {
        pending: Mutex::new(extras.iter().rev().cloned().collect()),
        passes: AtomicUsize::new(0),
    });

    let mut classes = model.classes();
    classes.extend(extras.iter().cloned());
    let loader = MetamodelBuilder::with_classes(classes)
        .programming_model(Arc::new(
            DefaultProgrammingModel::new()
                .with_validator(Arc::clone(&validator) as Arc<dyn MetaModelValidator>),
        ))
        .open()
        .unwrap();
    loader.create_meta_model().unwrap();
    assert!(!loader
        .snapshot_specifications()
        .iter()
        .any(|s| s.class().name().starts_with("demo.Extra")));

    let failures = loader.get_or_assess_validation_result().unwrap();

    // one pass per discovered class, plus the one that found nothing new
    assert_eq!(validator.passes.load(Ordering::SeqCst), extras.len() + 1);
    assert_eq!(failures.len(), extras.len());
    for extra in &extras {
        let expected = format!("{} discovered", extra.name());
        assert!(failures.messages().iter().any(|m| m.contains(&expected)));
    }
    assert!(Arc::ptr_eq(&failures, &loader.validation_result().unwrap()));

    let report = serde_json::to_value(&*failures).unwrap();
    assert!(report.to_string().contains("demo.Extra2 discovered"));
}

/// Rejects every pass; the first pass waits on `entered` and then lingers
struct GatedRejectingValidator {
    entered: Barrier,
    gated: AtomicBool,
}

impl MetaModelValidator for GatedRejectingValidator {
    fn name(&self) -> &'static str {
        "GatedRejectingValidator"
    }

    fn validate(
        &self,
        _loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        if !self.gated.swap(true, Ordering::SeqCst) {
            self.entered.wait();
            thread::sleep(Duration::from_millis(50));
        }
        failures.add("demo", "rejected");
        Ok(())
    }
}

#[test]
fn test_concurrent_assessment_waits_for_running_pass() {
    init_tracing();
    let model = Model::new();
    let validator = Arc::new(GatedRejectingValidator {
        entered: Barrier::new(2),
        gated: AtomicBool::new(false),
    });
    let loader = model
        .builder()
        .programming_model(Arc::new(
            DefaultProgrammingModel::new()
                .with_validator(Arc::clone(&validator) as Arc<dyn MetaModelValidator>),
        ))
        .open()
        .unwrap();
    loader.create_meta_model().unwrap();

    let owner = {
        let loader = Arc::clone(&loader);
        thread::spawn(move || loader.get_or_assess_validation_result().unwrap().len())
    };

    // the owner is now inside its pass
    validator.entered.wait();
    let concurrent = loader.get_or_assess_validation_result().unwrap();

    assert_eq!(concurrent.len(), 1);
    assert_eq!(owner.join().unwrap(), 1);
    assert_eq!(loader.validation_result().unwrap().len(), 1);
}
