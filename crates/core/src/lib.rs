//! Core types for the Causeway metamodel
//!
//! This crate defines the foundational types used throughout the system:
//! - Class model: `Class`, `ClassDescriptor`, `ClassBuilder`, `MethodDescriptor`, `TypeRef`
//! - ClassPath: name → class resolution and scan source
//! - Value: unified value enum, `Pojo` instances and shared plurals
//! - BeanSort: classification of discovered types
//! - IntrospectionState: staged introspection progress
//! - LogicalType / Identifier: stable type and member naming
//! - Bookmark: instance identity by logical type name
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bean_sort;
pub mod bookmark;
pub mod class;
pub mod class_path;
pub mod error;
pub mod introspection;
pub mod logical_type;
pub mod value;

pub use bean_sort::BeanSort;
pub use bookmark::{Bookmark, BookmarkParseError};
pub use class::{
    capitalize, decapitalize, Class, ClassBuilder, DomainNature, MemberAnnotations,
    MethodDescriptor, MethodHandle, MixinContribution, TypeRef,
};
pub use class_path::{builtin_value_classes, ClassPath, BUILTIN_VALUE_TYPES};
pub use error::{InvocationError, MetamodelError, MetamodelResult};
pub use introspection::IntrospectionState;
pub use logical_type::{FeatureKind, Identifier, LogicalType};
pub use value::{Pojo, SharedList, SharedMap, Value};
