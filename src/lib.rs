//! Causeway - metamodel and wrapper layer for domain objects
//!
//! Causeway introspects domain classes into object specifications, caches
//! and validates them, and mediates calls on domain objects through
//! rule-checking wrappers.
//!
//! # Quick Start
//!
//! ```ignore
//! use causeway::{ClassBuilder, MetamodelBuilder, Pojo, TypeRef, WrapperFactory};
//!
//! let customer = ClassBuilder::<Customer>::new("demo.Customer")
//!     .entity()
//!     .getter("name", TypeRef::string(), |c| c.name.clone().into())
//!     .build();
//! let loader = MetamodelBuilder::with_classes([customer.clone()]).build()?;
//!
//! let factory = WrapperFactory::new(loader);
//! let wrapped = factory.wrap(&Pojo::new(customer, Customer::default()))?;
//! let name = wrapped.get_property("name")?;
//! ```
//!
//! # Architecture
//!
//! | Crate | Provides |
//! |-------|----------|
//! | `causeway-core` | classes, values, logical types, bookmarks, errors |
//! | `causeway-metamodel` | specification loader, cache, resolver, validation |
//! | `causeway-wrapper` | wrapper factory, sync control, interaction exceptions |

pub use causeway_core::{
    Bookmark, Class, ClassBuilder, ClassPath, DomainNature, FeatureKind, Identifier,
    IntrospectionState, InvocationError, LogicalType, MemberAnnotations, MetamodelError,
    MetamodelResult, MixinContribution, Pojo, SharedList, SharedMap, TypeRef, Value,
};
pub use causeway_metamodel::{
    InteractionEvent, InteractionEventKind, InteractionInitiatedBy, MetaModelValidator,
    MetamodelBuilder, MetamodelConfig, ObjectSpecification, SpecificationLoader,
    SpecificationLoaderDefault, ValidationFailures,
};
pub use causeway_wrapper::{
    SyncControl, WrappedCollection, WrappedMap, WrappedObject, WrapperError, WrapperFactory,
    WrapperResult,
};

/// The core types crate
pub use causeway_core as types;
/// The metamodel crate
pub use causeway_metamodel as metamodel;
/// The wrapper crate
pub use causeway_wrapper as wrapper;
