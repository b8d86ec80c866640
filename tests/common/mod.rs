//! Shared domain fixtures for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's
//! main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

pub use causeway::metamodel::{
    DefaultProgrammingModel, IntrospectionMode, MetaModelValidator, MetamodelBuilder,
    MetamodelConfig, MixedIn, ObjectMember, SpecificationLoader, SpecificationLoaderDefault,
    ValidationFailures,
};
pub use causeway::types::{
    Bookmark, Class, ClassBuilder, IntrospectionState, InvocationError, MetamodelError,
    MetamodelResult, MixinContribution, Pojo, SharedList, SharedMap, TypeRef, Value,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

// ============================================================================
// Logging
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Domain state
// ============================================================================

pub struct Customer {
    pub name: String,
    pub email: Option<String>,
    pub secret: String,
    pub archived: bool,
    pub orders: SharedList,
    pub tags: SharedMap,
}

impl Customer {
    pub fn new(name: &str) -> Self {
        let mut tags = BTreeMap::new();
        tags.insert("tier".to_string(), Value::from("gold"));
        Self {
            name: name.to_string(),
            email: None,
            secret: "s3cret".to_string(),
            archived: false,
            orders: SharedList::new(),
            tags: SharedMap::from_map(tags),
        }
    }
}

pub struct Order {
    pub product: String,
    pub quantity: i64,
}

pub struct PlaceOrder {
    customer: Pojo,
}

pub struct CustomerMenu;

pub struct Party;

pub struct Person {
    pub name: String,
}

pub struct Employee {
    pub name: String,
}

pub struct Address {
    pub street: String,
}

// ============================================================================
// Classes
// ============================================================================

pub fn order_class() -> Class {
    ClassBuilder::<Order>::new("demo.Order")
        .entity()
        .getter("product", TypeRef::string(), |o| o.product.clone().into())
        .getter("quantity", TypeRef::int(), |o| o.quantity.into())
        .query("title", vec![], TypeRef::string(), |o, _| {
            Ok(format!("{} x {}", o.quantity, o.product).into())
        })
        .build()
}

pub fn customer_class() -> Class {
    ClassBuilder::<Customer>::new("demo.Customer")
        .entity()
        .alias("legacy.Client")
        .getter("name", TypeRef::string(), |c| c.name.clone().into())
        .setter("name", TypeRef::string(), |c, v| {
            c.name = v.to_string_arg(0)?;
            Ok(())
        })
        .annotate("getName", |a| a.max_length = Some(40))
        .query("validateName", vec![TypeRef::string()], TypeRef::string(), |_, args| {
            Ok(match args[0].as_str() {
                Some("") => "Name cannot be empty".into(),
                _ => Value::Null,
            })
        })
        .getter("email", TypeRef::string(), |c| match &c.email {
            Some(email) => email.clone().into(),
            None => Value::Null,
        })
        .setter("email", TypeRef::string(), |c, v| {
            c.email = if v.is_null() { None } else { Some(v.to_string_arg(0)?) };
            Ok(())
        })
        .annotate("getEmail", |a| a.optional = true)
        .getter("secret", TypeRef::string(), |c| c.secret.clone().into())
        .setter("secret", TypeRef::string(), |c, v| {
            c.secret = v.to_string_arg(0)?;
            Ok(())
        })
        .annotate("getSecret", |a| {
            a.hidden = true;
            a.disabled = Some("Locked".to_string());
        })
        .getter("archived", TypeRef::boolean(), |c| c.archived.into())
        .getter("orders", TypeRef::list_of(TypeRef::class("demo.Order")), |c| {
            Value::List(c.orders.clone())
        })
        .getter("tags", TypeRef::map_of(TypeRef::string()), |c| {
            Value::Map(c.tags.clone())
        })
        .method("archive", vec![], TypeRef::Void, |c, _| {
            c.archived = true;
            Ok(Value::Null)
        })
        .query("disableArchive", vec![], TypeRef::string(), |c, _| {
            Ok(if c.archived {
                "Already archived".into()
            } else {
                Value::Null
            })
        })
        .method("fail", vec![], TypeRef::Void, |_, _| {
            Err(InvocationError::domain("Payment service unavailable"))
        })
        .query("title", vec![], TypeRef::string(), |c, _| Ok(c.name.clone().into()))
        .query("validate", vec![], TypeRef::string(), |c, _| {
            Ok(if c.name.is_empty() {
                "Customer needs a name".into()
            } else {
                Value::Null
            })
        })
        .build()
}

/// Contributes `placeOrder` to customers
pub fn place_order_class(order: &Class) -> Class {
    let order = order.clone();
    ClassBuilder::<PlaceOrder>::new("demo.Customer_placeOrder")
        .mixin(
            "demo.Customer",
            "act",
            MixinContribution::Action,
            |mixee| PlaceOrder {
                customer: mixee.clone(),
            },
        )
        .method(
            "act",
            vec![TypeRef::string(), TypeRef::int()],
            TypeRef::class("demo.Order"),
            move |m, args| {
                let placed = Pojo::new(
                    order.clone(),
                    Order {
                        product: args[0].to_string_arg(0)?,
                        quantity: args[1].to_int_arg(1)?,
                    },
                );
                let orders = m.customer.read(|c: &Customer| c.orders.clone())?;
                orders.push(Value::Object(placed.clone()));
                Ok(Value::Object(placed))
            },
        )
        .query("validate1Act", vec![TypeRef::int()], TypeRef::string(), |_, args| {
            Ok(match args[0].as_int() {
                Some(q) if q <= 0 => "Quantity must be positive".into(),
                _ => Value::Null,
            })
        })
        .query("disableAct", vec![], TypeRef::string(), |m, _| {
            let archived = m.customer.read(|c: &Customer| c.archived)?;
            Ok(if archived {
                "Customer is archived".into()
            } else {
                Value::Null
            })
        })
        .build()
}

pub fn customer_menu_class(customer: &Class) -> Class {
    let customer = customer.clone();
    ClassBuilder::<CustomerMenu>::new("demo.CustomerMenu")
        .managed_bean(true)
        .query(
            "newCustomer",
            vec![TypeRef::string()],
            TypeRef::class("demo.Customer"),
            move |_, args| {
                let name = args[0].to_string_arg(0)?;
                Ok(Value::Object(Pojo::new(customer.clone(), Customer::new(&name))))
            },
        )
        .build()
}

/// Enhancement proxy standing in for `customer`
pub fn customer_proxy_class(customer: &Class) -> Class {
    ClassBuilder::<Customer>::new("demo.Customer$Proxy")
        .proxy_of(customer)
        .build()
}

pub fn party_class() -> Class {
    ClassBuilder::<Party>::new("demo.Party")
        .abstract_type()
        .entity()
        .build()
}

pub fn person_class(party: &Class) -> Class {
    ClassBuilder::<Person>::new("demo.Person")
        .extends(party)
        .entity()
        .getter("name", TypeRef::string(), |p| p.name.clone().into())
        .build()
}

pub fn employee_class(person: &Class) -> Class {
    ClassBuilder::<Employee>::new("demo.Employee")
        .extends(person)
        .entity()
        .getter("name", TypeRef::string(), |e| e.name.clone().into())
        .build()
}

/// Not a domain type; only loaded on demand
pub fn address_class() -> Class {
    ClassBuilder::<Address>::new("demo.Address")
        .getter("street", TypeRef::string(), |a| a.street.clone().into())
        .build()
}

pub fn internal_class() -> Class {
    ClassBuilder::<()>::new("demo.Internal")
        .never_introspect()
        .build()
}

// ============================================================================
// Model
// ============================================================================

/// Every fixture class, plus a loader over them
pub struct Model {
    pub customer: Class,
    pub order: Class,
    pub place_order: Class,
    pub menu: Class,
    pub proxy: Class,
    pub party: Class,
    pub person: Class,
    pub employee: Class,
    pub address: Class,
    pub internal: Class,
}

impl Model {
    pub fn new() -> Self {
        let customer = customer_class();
        let order = order_class();
        let place_order = place_order_class(&order);
        let menu = customer_menu_class(&customer);
        let proxy = customer_proxy_class(&customer);
        let party = party_class();
        let person = person_class(&party);
        let employee = employee_class(&person);
        Self {
            customer,
            order,
            place_order,
            menu,
            proxy,
            party,
            person,
            employee,
            address: address_class(),
            internal: internal_class(),
        }
    }

    pub fn classes(&self) -> Vec<Class> {
        vec![
            self.customer.clone(),
            self.order.clone(),
            self.place_order.clone(),
            self.menu.clone(),
            self.proxy.clone(),
            self.party.clone(),
            self.person.clone(),
            self.employee.clone(),
            self.address.clone(),
            self.internal.clone(),
        ]
    }

    pub fn builder(&self) -> MetamodelBuilder {
        MetamodelBuilder::with_classes(self.classes())
    }

    /// Created and validated
    pub fn build(&self) -> Arc<SpecificationLoaderDefault> {
        init_tracing();
        self.builder().build().unwrap()
    }

    pub fn new_customer(&self, name: &str) -> Pojo {
        Pojo::new(self.customer.clone(), Customer::new(name))
    }

    pub fn customer_name(pojo: &Pojo) -> String {
        pojo.read(|c: &Customer| c.name.clone()).unwrap()
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Counts passes and records which specs each pass saw
#[derive(Default)]
pub struct CountingValidator {
    pub passes: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl CountingValidator {
    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }

    pub fn saw(&self, name: &str) -> bool {
        self.seen.lock().iter().any(|s| s == name)
    }
}

impl MetaModelValidator for CountingValidator {
    fn name(&self) -> &'static str {
        "CountingValidator"
    }

    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        _failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        self.passes.fetch_add(1, Ordering::SeqCst);
        let mut seen = self.seen.lock();
        for spec in loader.snapshot_specifications() {
            seen.push(spec.class().name().to_string());
        }
        Ok(())
    }
}

/// Adds the same failure on every pass
pub struct RejectingValidator;

impl MetaModelValidator for RejectingValidator {
    fn name(&self) -> &'static str {
        "RejectingValidator"
    }

    fn validate(
        &self,
        _loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()> {
        failures.add("demo", "rejected");
        Ok(())
    }
}
