//! Collections and maps read through a wrapper

use crate::common::*;
use crate::{record_events, Fixture};
use causeway::wrapper::{ProxyGenerator, SyncControl, WrapperError, WrapperResult};
use causeway::InteractionEventKind;

fn place_order(fx: &Fixture, customer: &Pojo, product: &str, quantity: i64) -> Pojo {
    let wrapped = fx.factory.wrap(customer).unwrap();
    let order = wrapped
        .invoke_action("placeOrder", &[product.into(), quantity.into()])
        .unwrap();
    order.as_object().unwrap().clone()
}

#[test]
fn test_wrapped_collection_reads() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let first = place_order(&fx, &pojo, "Widget", 3);
    place_order(&fx, &pojo, "Gadget", 1);

    let customer = fx.factory.wrap(&pojo).unwrap();
    let orders = customer
        .get_collection("orders")
        .unwrap()
        .into_collection()
        .unwrap();
    assert_eq!(orders.size().unwrap(), 2);
    assert!(!orders.is_empty().unwrap());
    assert!(orders.contains(&Value::Object(first.clone())).unwrap());
    assert_eq!(orders.get(0).unwrap(), Value::Object(first));
    assert_eq!(orders.get(5).unwrap(), Value::Null);
    assert_eq!(orders.association().id(), "orders");
}

#[test]
fn test_wrapped_collection_is_live() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();
    let orders = customer
        .get_collection("orders")
        .unwrap()
        .into_collection()
        .unwrap();
    assert!(orders.is_empty().unwrap());

    place_order(&fx, &pojo, "Widget", 3);
    assert_eq!(orders.size().unwrap(), 1);
}

#[test]
fn test_collection_mutators_are_vetoed() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();
    let orders = customer
        .get_collection("orders")
        .unwrap()
        .into_collection()
        .unwrap();

    let err = orders.add(Value::from("x")).unwrap_err();
    assert_eq!(
        err,
        WrapperError::Unsupported("Method 'add' may not be called directly.".to_string())
    );
    assert!(orders.remove(&Value::from("x")).is_err());
    assert!(orders.clear().is_err());
    assert!(orders.retain_all(&[]).is_err());
    assert!(matches!(
        orders.invoke("sort", &[]),
        Err(WrapperError::IllegalArgument(_))
    ));
    assert!(orders.is_empty().unwrap());
}

#[test]
fn test_vetoes_bypass_the_exception_handler() {
    let fx = Fixture::new();
    let control = SyncControl::control()
        .with_exception_handler(|_err: WrapperError| -> WrapperResult<Value> { Ok(Value::Null) });
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), control)
        .unwrap();
    let orders = customer
        .get_collection("orders")
        .unwrap()
        .into_collection()
        .unwrap();
    assert!(matches!(
        orders.add(Value::Null),
        Err(WrapperError::Unsupported(_))
    ));
}

#[test]
fn test_wrapped_map_reads_and_vetoes() {
    let fx = Fixture::new();
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    let tags = customer.get_collection("tags").unwrap().into_map().unwrap();

    assert_eq!(tags.size().unwrap(), 1);
    assert!(tags.contains_key("tier").unwrap());
    assert!(tags.contains_value(&Value::from("gold")).unwrap());
    assert_eq!(tags.get("tier").unwrap(), Value::from("gold"));
    assert_eq!(tags.get("nope").unwrap(), Value::Null);

    let err = tags.put("tier", Value::from("silver")).unwrap_err();
    assert_eq!(
        err,
        WrapperError::Unsupported("Method 'put' may not be called directly.".to_string())
    );
    assert!(tags.remove("tier").is_err());
    assert!(tags.clear().is_err());
    assert_eq!(tags.get("tier").unwrap(), Value::from("gold"));
}

#[test]
fn test_plural_calls_publish_events() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    let orders = customer
        .get_collection("orders")
        .unwrap()
        .into_collection()
        .unwrap();
    orders.size().unwrap();

    let events = events.lock();
    assert!(events
        .iter()
        .any(|(kind, _)| matches!(kind, InteractionEventKind::CollectionAccess)));
    assert!(events.iter().any(|(kind, _)| matches!(
        kind,
        InteractionEventKind::CollectionMethod { method, .. } if method == "size"
    )));
}

#[test]
fn test_skipped_execution_yields_no_plural() {
    let fx = Fixture::new();
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), SyncControl::control().with_skip_execute())
        .unwrap();
    let read = customer.get_collection("orders").unwrap();
    assert!(read.as_value().map_or(false, Value::is_null));
}

#[test]
fn test_collection_proxy_from_factory() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let customer = fx.factory.wrap(&pojo).unwrap();
    let association = customer.spec().collection("orders").unwrap().unwrap();
    let list = SharedList::from_vec(vec![Value::from("a"), Value::from("b")]);

    let wrapped = fx
        .factory
        .collection_proxy(list, &customer, &association)
        .unwrap();
    assert_eq!(wrapped.size().unwrap(), 2);
    assert!(wrapped.contains(&Value::from("b")).unwrap());
}

#[test]
fn test_skipped_execution_skips_plural_reads() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    let pojo = fx.model.new_customer("Ann");
    place_order(&fx, &pojo, "Widget", 3);

    let dry_run = fx
        .factory
        .object_proxy(&pojo, SyncControl::control().with_skip_execute())
        .unwrap();
    let association = dry_run.spec().collection("orders").unwrap().unwrap();
    let orders = pojo.read(|c: &Customer| c.orders.clone()).unwrap();
    let wrapped = fx
        .factory
        .collection_proxy(orders, &dry_run, &association)
        .unwrap();
    events.lock().clear();

    assert_eq!(wrapped.get(0).unwrap(), Value::Null);
    assert_eq!(wrapped.size().unwrap(), 0);
    assert!(!wrapped.contains(&Value::from("x")).unwrap());

    // the visibility re-check still runs; nothing is delegated
    let events = events.lock();
    assert!(events
        .iter()
        .all(|(kind, _)| matches!(kind, InteractionEventKind::CollectionVisibility)));
    assert!(!events.is_empty());
}
