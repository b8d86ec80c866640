//! Wrapped domain objects: properties, actions and special methods

use crate::common::*;
use crate::{record_events, Fixture};
use causeway::wrapper::{ObjectPersister, WrapperError, WrapperFactory, SAVE_METHOD};
use causeway::InteractionEventKind;
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_property_round_trip() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();

    assert_eq!(customer.get_property("name").unwrap(), Value::from("Ann"));
    customer.set_property("name", "Bob".into()).unwrap();
    assert_eq!(customer.get_property("name").unwrap(), Value::from("Bob"));
    assert_eq!(Model::customer_name(&pojo), "Bob");
}

#[test]
fn test_calls_by_method_name() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();

    customer.invoke("setName", &["Cy".into()]).unwrap();
    let name = customer.invoke("getName", &[]).unwrap().into_value();
    assert_eq!(name, Value::from("Cy"));
}

#[test]
fn test_hidden_wins_over_disabled() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    let err = customer.set_property("secret", "x".into()).unwrap_err();
    assert!(err.is_hidden(), "{:?}", err);
    match err {
        WrapperError::Hidden(e) => assert_eq!(e.reason(), "Hidden"),
        other => panic!("expected hidden, got {:?}", other),
    }

    assert!(customer.get_property("secret").unwrap_err().is_hidden());
}

#[test]
fn test_immutable_property_is_disabled() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    assert_eq!(customer.get_property("archived").unwrap(), Value::Bool(false));
    let err = customer.set_property("archived", true.into()).unwrap_err();
    assert!(err.is_disabled());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Immutable property")
    );
}

#[test]
fn test_invalid_proposals_are_rejected() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();

    let err = customer.set_property("name", "".into()).unwrap_err();
    assert!(err.is_invalid());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Name cannot be empty")
    );

    // mandatory
    assert!(customer.set_property("name", Value::Null).unwrap_err().is_invalid());
    assert!(customer.clear_property("name").unwrap_err().is_invalid());

    // max length
    let long = "x".repeat(41);
    assert!(customer.set_property("name", long.into()).unwrap_err().is_invalid());

    assert_eq!(Model::customer_name(&pojo), "Ann");
}

#[test]
fn test_optional_property_can_be_cleared() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    customer.set_property("email", "ann@example.com".into()).unwrap();
    assert_eq!(
        customer.get_property("email").unwrap(),
        Value::from("ann@example.com")
    );
    customer.clear_property("email").unwrap();
    assert_eq!(customer.get_property("email").unwrap(), Value::Null);
}

#[test]
fn test_wrong_member_kind_is_a_programming_error() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    let err = customer.get_property("archive").unwrap_err();
    assert!(err.is_programming_error());
    let err = customer.get_property("nope").unwrap_err();
    assert!(matches!(err, WrapperError::IllegalArgument(_)));
    let err = customer.invoke("nope", &[]).unwrap_err();
    assert!(matches!(err, WrapperError::IllegalArgument(_)));
}

#[test]
fn test_supporting_methods_cannot_be_called() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    let err = customer.invoke("disableArchive", &[]).unwrap_err();
    assert!(matches!(err, WrapperError::Unsupported(_)));
}

// ============================================================================
// Actions
// ============================================================================

#[test]
fn test_action_usability_follows_state() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();

    customer.invoke_action("archive", &[]).unwrap();
    assert_eq!(customer.get_property("archived").unwrap(), Value::Bool(true));

    let err = customer.invoke_action("archive", &[]).unwrap_err();
    assert!(err.is_disabled());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Already archived")
    );
}

#[test]
fn test_domain_failure_is_recoverable() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    let err = customer.invoke_action("fail", &[]).unwrap_err();
    assert_eq!(
        err,
        WrapperError::Recoverable("Payment service unavailable".to_string())
    );
    assert!(!err.is_programming_error());
}

#[test]
fn test_action_returning_an_object() {
    let fx = Fixture::new();
    let menu_class = fx.model.menu.clone();
    let menu = fx
        .factory
        .wrap(&Pojo::new(menu_class, CustomerMenu))
        .unwrap();

    let created = menu.invoke_action("newCustomer", &["Dee".into()]).unwrap();
    let pojo = created.as_object().unwrap().clone();
    assert_eq!(Model::customer_name(&pojo), "Dee");

    let wrapped = fx.factory.wrap(&pojo).unwrap();
    assert_eq!(wrapped.title().unwrap(), "Dee");
}

// ============================================================================
// Special methods
// ============================================================================

#[test]
fn test_title_and_to_string() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    assert_eq!(customer.title().unwrap(), "Ann");
    assert!(events.lock().iter().any(|(kind, _)| matches!(
        kind,
        InteractionEventKind::ObjectTitle { title } if title == "Ann"
    )));

    let via_invoke = customer.invoke("toString", &[]).unwrap().into_value();
    assert_eq!(via_invoke, Value::from("Ann"));
}

#[test]
fn test_equals_hash_code_and_origin() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let other = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();

    let same = customer.invoke("equals", &[Value::Object(pojo.clone())]).unwrap();
    assert_eq!(same.into_value(), Value::Bool(true));
    let different = customer.invoke("equals", &[Value::Object(other)]).unwrap();
    assert_eq!(different.into_value(), Value::Bool(false));

    let hash = customer.invoke("hashCode", &[]).unwrap().into_value();
    assert_eq!(hash, Value::Int(pojo.identity_hash() as i64));

    let origin = customer.origin();
    assert!(origin.pojo().same_instance(&pojo));
    assert!(origin.mixee().is_none());
    assert!(!customer.is_mixin());
}

#[test]
fn test_proxy_instances_use_domain_spec() {
    let fx = Fixture::new();
    let pojo = Pojo::new(fx.model.proxy.clone(), Customer::new("Ann"));
    let customer = fx.factory.wrap(&pojo).unwrap();
    assert_eq!(customer.spec().logical_type_name(), "demo.Customer");
    assert_eq!(customer.get_property("name").unwrap(), Value::from("Ann"));
}

#[test]
fn test_never_introspected_objects_cannot_be_wrapped() {
    let fx = Fixture::new();
    let pojo = Pojo::new(fx.model.internal.clone(), ());
    assert!(matches!(
        fx.factory.wrap(&pojo),
        Err(WrapperError::Metamodel(MetamodelError::NotFound { .. }))
    ));
}

// ============================================================================
// Save
// ============================================================================

#[derive(Default)]
struct RecordingPersister {
    saved: Mutex<Vec<Pojo>>,
}

impl ObjectPersister for RecordingPersister {
    fn persist(&self, pojo: &Pojo) -> Result<(), InvocationError> {
        self.saved.lock().push(pojo.clone());
        Ok(())
    }
}

#[test]
fn test_save_validates_then_persists() {
    let fx = Fixture::new();
    let persister = Arc::new(RecordingPersister::default());
    let factory = WrapperFactory::with_persister(fx.loader.clone(), persister.clone());

    let pojo = fx.model.new_customer("Ann");
    factory.wrap(&pojo).unwrap().save().unwrap();
    assert_eq!(persister.saved.lock().len(), 1);
    assert!(persister.saved.lock()[0].same_instance(&pojo));

    let nameless = fx.model.new_customer("");
    let err = factory.wrap(&nameless).unwrap().save().unwrap_err();
    assert!(err.is_invalid());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Customer needs a name")
    );
    assert_eq!(persister.saved.lock().len(), 1);

    // also reachable by name
    factory.wrap(&pojo).unwrap().invoke(SAVE_METHOD, &[]).unwrap();
    assert_eq!(persister.saved.lock().len(), 2);
}

#[test]
fn test_save_without_persister_is_illegal_state() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    assert!(matches!(
        customer.save(),
        Err(WrapperError::IllegalState(_))
    ));
}
