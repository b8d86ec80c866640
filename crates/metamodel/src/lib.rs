//! Metamodel for Causeway
//!
//! This crate builds, caches and validates the reflective object model:
//! - SpecificationLoader: create/dispose, on-demand loading, lookups,
//!   invalidation, incremental validation
//! - SpecificationCache: class → spec with concurrency-tolerant traversal
//! - LogicalTypeResolver: logical type names and aliases
//! - ObjectSpecification: staged introspection, members, mixins
//! - Facets and the programming model (factories, validators,
//!   post-processors)
//! - Interaction model: visibility, usability and validity checks
//!
//! Viewers and the wrapper layer only see [`SpecificationLoader`] and the
//! specs it hands out.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bean_types;
pub mod builder;
pub mod cache;
pub mod config;
pub mod facets;
pub mod interaction;
pub mod loader;
pub mod logical_type_resolver;
pub mod menubars;
pub mod programming_model;
pub mod spec;
pub mod substitutor;
pub mod validation;
pub mod value_semantics;

pub use bean_types::{
    CausewayBeanTypeClassifier, CausewayBeanTypeClassifierDefault, CausewayBeanTypeRegistry,
    CausewayBeanTypeRegistryDefault,
};
pub use builder::MetamodelBuilder;
pub use cache::SpecificationCache;
pub use config::{IntrospectionMode, MetamodelConfig};
pub use interaction::{
    Consent, EventCategory, InteractionContext, InteractionEvent, InteractionEventKind,
    InteractionHead, InteractionInitiatedBy, InteractionResult, Veto,
};
pub use loader::{SpecificationLoader, SpecificationLoaderDefault};
pub use logical_type_resolver::LogicalTypeResolver;
pub use menubars::{Menu, MenuBars, MenuBarsService, MenuBarsServiceDefault};
pub use programming_model::{
    DefaultProgrammingModel, Marker, PostProcessor, ProgrammingModel, ProgrammingModelInitFilter,
};
pub use spec::members::{
    ActionParameter, MethodRole, MixinOrigin, ObjectAction, ObjectMember, OneToManyAssociation,
    OneToOneAssociation,
};
pub use spec::mixins::MixinIndex;
pub use spec::{IntrospectionContext, MixedIn, ObjectSpecification};
pub use substitutor::{ClassSubstitutor, ClassSubstitutorDefault, ClassSubstitutorRegistry, Substitution};
pub use validation::{MetaModelValidator, ValidationFailure, ValidationFailures};
pub use value_semantics::{ValueSemanticsResolver, ValueSemanticsResolverDefault};
