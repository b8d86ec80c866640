//! Loader behaviour over the fixture model
//!
//! - one spec per class, also under concurrent first loads
//! - proxies resolve to their domain class, never-introspect classes to none
//! - logical type names, aliases and bookmarks resolve to the same spec
//! - introspection only moves forward
//! - invalidation drops the superclass chain

use crate::common::*;
use causeway::metamodel::MethodRole;
use std::sync::{Arc, Barrier};
use std::thread;

// ============================================================================
// Creation
// ============================================================================

#[test]
fn test_build_creates_domain_specs() {
    let model = Model::new();
    let loader = model.build();

    assert!(loader.is_metamodel_fully_introspected());
    let names: Vec<String> = loader
        .snapshot_specifications()
        .iter()
        .map(|s| s.class().name().to_string())
        .collect();
    for expected in [
        "demo.Customer",
        "demo.Order",
        "demo.Customer_placeOrder",
        "demo.CustomerMenu",
    ] {
        assert!(names.iter().any(|n| n == expected), "missing {}", expected);
    }
    // loaded on demand only
    assert!(!names.iter().any(|n| n == "demo.Address"));
    assert!(!names.iter().any(|n| n == "demo.Internal"));

    let customer = loader.spec_for_type_else_fail(&model.customer).unwrap();
    assert_eq!(
        customer.introspection_state(),
        IntrospectionState::FullyIntrospected
    );
}

#[test]
fn test_open_does_not_create() {
    let model = Model::new();
    let loader = model.builder().open().unwrap();
    assert!(!loader.is_metamodel_fully_introspected());
    assert!(loader.snapshot_specifications().is_empty());

    loader.create_meta_model().unwrap();
    assert!(loader.is_metamodel_fully_introspected());
    assert!(!loader.snapshot_specifications().is_empty());
}

#[test]
fn test_dispose_then_recreate() {
    let model = Model::new();
    let loader = model.build();
    let before = loader.spec_for_type_else_fail(&model.customer).unwrap();

    loader.dispose_meta_model();
    assert!(!loader.is_metamodel_fully_introspected());
    assert!(loader.snapshot_specifications().is_empty());
    assert!(loader.lookup_logical_type("legacy.Client").is_none());

    loader.create_meta_model().unwrap();
    let after = loader.spec_for_type_else_fail(&model.customer).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(loader.lookup_logical_type("legacy.Client").is_some());
}

// ============================================================================
// Cache identity
// ============================================================================

#[test]
fn test_repeated_loads_return_same_spec() {
    let model = Model::new();
    let loader = model.build();
    let a = loader.spec_for_type_else_fail(&model.customer).unwrap();
    let b = loader
        .load_specification(&model.customer, IntrospectionState::FullyIntrospected)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_concurrent_first_loads_agree() {
    let model = Model::new();
    let loader = model.build();
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let loader = Arc::clone(&loader);
            let barrier = Arc::clone(&barrier);
            let address = model.address.clone();
            thread::spawn(move || {
                barrier.wait();
                loader
                    .load_specification(&address, IntrospectionState::FullyIntrospected)
                    .unwrap()
                    .unwrap()
            })
        })
        .collect();

    let specs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for spec in &specs[1..] {
        assert!(Arc::ptr_eq(&specs[0], spec));
    }
    let count = loader
        .snapshot_specifications()
        .iter()
        .filter(|s| s.class().name() == "demo.Address")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn test_proxy_resolves_to_domain_class() {
    let model = Model::new();
    let loader = model.build();
    let via_proxy = loader.spec_for_type_else_fail(&model.proxy).unwrap();
    let direct = loader.spec_for_type_else_fail(&model.customer).unwrap();
    assert!(Arc::ptr_eq(&via_proxy, &direct));
}

#[test]
fn test_never_introspected_class_has_no_spec() {
    let model = Model::new();
    let loader = model.build();
    assert!(loader.spec_for_type(&model.internal).unwrap().is_none());
    assert!(matches!(
        loader.spec_for_type_else_fail(&model.internal),
        Err(MetamodelError::NotFound { .. })
    ));
}

#[test]
fn test_load_specifications_requires_every_class() {
    let model = Model::new();
    let loader = model.build();

    assert!(loader
        .load_specifications(&[model.order.clone(), model.address.clone()])
        .unwrap());
    assert!(!loader
        .load_specifications(&[model.internal.clone(), model.order.clone()])
        .unwrap());
    assert!(!loader
        .load_specifications(&[model.order.clone(), model.internal.clone()])
        .unwrap());
    assert!(loader.load_specifications(&[]).unwrap());
}

// ============================================================================
// Introspection levels
// ============================================================================

#[test]
fn test_introspection_never_regresses() {
    let model = Model::new();
    let loader = model.build();

    let spec = loader
        .load_specification(&model.address, IntrospectionState::TypeIntrospected)
        .unwrap()
        .unwrap();
    assert!(spec.introspection_state() >= IntrospectionState::TypeIntrospected);

    loader
        .load_specification(&model.address, IntrospectionState::FullyIntrospected)
        .unwrap();
    assert_eq!(
        spec.introspection_state(),
        IntrospectionState::FullyIntrospected
    );

    let again = loader
        .load_specification(&model.address, IntrospectionState::TypeIntrospected)
        .unwrap()
        .unwrap();
    assert!(Arc::ptr_eq(&spec, &again));
    assert_eq!(
        again.introspection_state(),
        IntrospectionState::FullyIntrospected
    );
}

#[test]
fn test_member_queries_force_full_introspection() {
    let model = Model::new();
    let loader = model.build();
    let spec = loader
        .load_specification(&model.address, IntrospectionState::TypeIntrospected)
        .unwrap()
        .unwrap();

    let properties = spec.properties(MixedIn::Excluded).unwrap();
    assert_eq!(properties.len(), 1);
    assert_eq!(properties[0].id(), "street");
    assert_eq!(
        spec.introspection_state(),
        IntrospectionState::FullyIntrospected
    );
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_customer_members() {
    let model = Model::new();
    let loader = model.build();
    let spec = loader.spec_for_type_else_fail(&model.customer).unwrap();

    let properties: Vec<String> = spec
        .properties(MixedIn::Excluded)
        .unwrap()
        .iter()
        .map(|p| p.id().to_string())
        .collect();
    for id in ["name", "email", "secret", "archived"] {
        assert!(properties.iter().any(|p| p == id), "missing property {}", id);
    }

    let collections: Vec<String> = spec
        .collections(MixedIn::Excluded)
        .unwrap()
        .iter()
        .map(|c| c.id().to_string())
        .collect();
    assert_eq!(collections.len(), 2);
    assert!(collections.iter().any(|c| c == "orders"));
    assert!(collections.iter().any(|c| c == "tags"));

    let declared: Vec<String> = spec
        .actions(MixedIn::Excluded)
        .unwrap()
        .iter()
        .map(|a| a.id().to_string())
        .collect();
    assert!(declared.iter().any(|a| a == "archive"));
    // supporting and special methods never become members
    assert!(!declared.iter().any(|a| a == "disableArchive"));
    assert!(!declared.iter().any(|a| a == "title"));
    assert!(!declared.iter().any(|a| a == "placeOrder"));

    assert!(spec.orphaned_supporting_methods().is_empty());
}

#[test]
fn test_mixin_contributes_action() {
    let model = Model::new();
    let loader = model.build();
    let spec = loader.spec_for_type_else_fail(&model.customer).unwrap();

    let actions = spec.actions(MixedIn::Included).unwrap();
    assert!(actions.iter().any(|a| a.id() == "placeOrder"));

    let member = spec.mixed_in_member_for(&model.place_order).unwrap().unwrap();
    assert_eq!(member.id(), "placeOrder");
    assert!(member.mixin().is_some());

    let (found, role) = spec.lookup_method("placeOrder").unwrap().unwrap();
    assert_eq!(found.id(), "placeOrder");
    assert!(matches!(role, MethodRole::Action));
}

#[test]
fn test_method_lookup_by_accessor_name() {
    let model = Model::new();
    let loader = model.build();
    let spec = loader.spec_for_type_else_fail(&model.customer).unwrap();

    let (member, role) = spec.lookup_method("getName").unwrap().unwrap();
    assert_eq!(member.id(), "name");
    assert!(matches!(role, MethodRole::Accessor));

    let (member, role) = spec.lookup_method("setName").unwrap().unwrap();
    assert_eq!(member.id(), "name");
    assert!(matches!(role, MethodRole::Modifier));

    let (member, role) = spec.lookup_method("disableArchive").unwrap().unwrap();
    assert_eq!(member.id(), "archive");
    assert!(matches!(role, MethodRole::Disable));

    assert!(spec.lookup_method("nope").unwrap().is_none());
}

#[test]
fn test_title_uses_title_method() {
    let model = Model::new();
    let loader = model.build();
    let spec = loader.spec_for_type_else_fail(&model.customer).unwrap();
    assert_eq!(spec.title(&model.new_customer("Ann")).unwrap(), "Ann");
}

// ============================================================================
// Logical types and bookmarks
// ============================================================================

#[test]
fn test_logical_type_lookup_and_alias() {
    let model = Model::new();
    let loader = model.build();

    let by_name = loader.lookup_logical_type("demo.Customer").unwrap();
    assert_eq!(by_name.corresponding_class(), &model.customer);

    let by_alias = loader.lookup_logical_type("legacy.Client").unwrap();
    assert_eq!(by_alias.logical_name(), "demo.Customer");
    assert_eq!(by_alias.corresponding_class(), &model.customer);

    assert!(loader.lookup_logical_type("demo.Nope").is_none());
    assert!(matches!(
        loader.lookup_logical_type_else_fail("demo.Nope"),
        Err(MetamodelError::NotFound { .. })
    ));
}

#[test]
fn test_logical_type_lookup_is_stable() {
    let model = Model::new();
    let loader = model.build();
    let first = loader.lookup_logical_type("demo.Order").unwrap();
    for _ in 0..3 {
        let again = loader.lookup_logical_type("demo.Order").unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_bookmark_resolves_spec() {
    let model = Model::new();
    let loader = model.build();

    let bookmark: Bookmark = "demo.Customer:42".parse().unwrap();
    let spec = loader.spec_for_bookmark_else_fail(&bookmark).unwrap();
    assert!(Arc::ptr_eq(
        &spec,
        &loader.spec_for_type_else_fail(&model.customer).unwrap()
    ));

    let via_alias = Bookmark::new("legacy.Client", "42");
    assert!(loader.spec_for_bookmark(&via_alias).unwrap().is_some());

    let unknown = Bookmark::new("demo.Nope", "1");
    assert!(loader.spec_for_bookmark(&unknown).unwrap().is_none());
    assert!(loader.spec_for_bookmark_else_fail(&unknown).is_err());
}

// ============================================================================
// Invalidation
// ============================================================================

fn cached(loader: &SpecificationLoaderDefault, name: &str) -> bool {
    loader
        .snapshot_specifications()
        .iter()
        .any(|s| s.class().name() == name)
}

#[test]
fn test_invalidate_drops_superclass_chain() {
    let model = Model::new();
    let loader = model.build();
    let before = loader.spec_for_type_else_fail(&model.employee).unwrap();
    assert!(cached(&loader, "demo.Employee"));
    assert!(cached(&loader, "demo.Person"));
    assert!(cached(&loader, "demo.Party"));

    loader.invalidate_cache(&model.employee).unwrap();
    assert!(!cached(&loader, "demo.Employee"));
    assert!(!cached(&loader, "demo.Person"));
    assert!(!cached(&loader, "demo.Party"));
    assert!(cached(&loader, "demo.Customer"));

    let after = loader.spec_for_type_else_fail(&model.employee).unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert!(cached(&loader, "demo.Person"));
}

#[test]
fn test_reload_replaces_spec() {
    let model = Model::new();
    let loader = model.build();
    let before = loader.spec_for_type_else_fail(&model.order).unwrap();
    let after = loader.reload_specification(&model.order).unwrap().unwrap();
    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(
        after.introspection_state(),
        IntrospectionState::FullyIntrospected
    );
    assert_eq!(after.logical_type_name(), "demo.Order");
}
