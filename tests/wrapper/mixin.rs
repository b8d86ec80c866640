//! Mixin wrappers: the main method runs the contributed member's rules
//! against the mixee and its body against the mixin instance

use crate::common::*;
use crate::Fixture;
use causeway::wrapper::{WrapperError, ORIGIN_METHOD};

#[test]
fn test_main_method_places_order() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    let mixin = fx.factory.wrap_mixin(&fx.model.place_order, &customer).unwrap();
    assert!(mixin.is_mixin());

    let placed = mixin
        .invoke("act", &["Widget".into(), 3i64.into()])
        .unwrap()
        .into_value();
    let order = placed.as_object().unwrap().clone();
    assert_eq!(
        order.read(|o: &Order| (o.product.clone(), o.quantity)).unwrap(),
        ("Widget".to_string(), 3)
    );
    let orders = customer.read(|c: &Customer| c.orders.len()).unwrap();
    assert_eq!(orders, 1);
}

#[test]
fn test_contributed_rules_apply() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    let mixin = fx.factory.wrap_mixin(&fx.model.place_order, &customer).unwrap();

    let err = mixin
        .invoke("act", &["Widget".into(), 0i64.into()])
        .unwrap_err();
    assert!(err.is_invalid());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Quantity must be positive")
    );

    // mandatory parameter
    assert!(mixin
        .invoke("act", &[Value::Null, 1i64.into()])
        .unwrap_err()
        .is_invalid());

    fx.factory
        .wrap(&customer)
        .unwrap()
        .invoke_action("archive", &[])
        .unwrap();
    let err = mixin
        .invoke("act", &["Widget".into(), 1i64.into()])
        .unwrap_err();
    assert!(err.is_disabled());
    assert_eq!(
        err.event().and_then(|e| e.reason()).as_deref(),
        Some("Customer is archived")
    );
    assert_eq!(customer.read(|c: &Customer| c.orders.len()).unwrap(), 0);
}

#[test]
fn test_mixed_in_action_through_mixee() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    let wrapped = fx.factory.wrap(&customer).unwrap();

    wrapped
        .invoke_action("placeOrder", &["Widget".into(), 2i64.into()])
        .unwrap();
    wrapped
        .invoke("placeOrder", &["Gadget".into(), 1i64.into()])
        .unwrap();
    assert_eq!(customer.read(|c: &Customer| c.orders.len()).unwrap(), 2);
}

#[test]
fn test_only_main_method_is_callable() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    let mixin = fx.factory.wrap_mixin(&fx.model.place_order, &customer).unwrap();

    assert!(matches!(
        mixin.invoke("validate1Act", &[1i64.into()]),
        Err(WrapperError::IllegalArgument(_))
    ));
    assert!(matches!(
        mixin.get_property("name"),
        Err(WrapperError::IllegalArgument(_))
    ));
}

#[test]
fn test_mixin_origin_names_mixee() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    let mixin = fx.factory.wrap_mixin(&fx.model.place_order, &customer).unwrap();

    let origin = mixin.origin();
    assert!(origin.mixee().unwrap().same_instance(&customer));
    assert_eq!(origin.pojo().class(), &fx.model.place_order);

    let by_name = mixin.invoke(ORIGIN_METHOD, &[]).unwrap().into_value();
    assert!(by_name.as_object().unwrap().same_instance(origin.pojo()));
}

#[test]
fn test_non_mixin_class_is_rejected() {
    let fx = Fixture::new();
    let customer = fx.model.new_customer("Ann");
    assert!(matches!(
        fx.factory.wrap_mixin(&fx.model.order, &customer),
        Err(WrapperError::IllegalArgument(_))
    ));
}
