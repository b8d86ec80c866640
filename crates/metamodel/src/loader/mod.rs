//! Specification loader
//!
//! The public face of the metamodel: creates and disposes it, loads specs
//! on demand, resolves logical types and bookmarks, invalidates cached
//! specs and drives (incremental) validation.
//!
//! Every `Option`-returning lookup has an `_else_fail` variant returning a
//! not-found error that names what was searched for.

pub(crate) mod default;
mod validation_queue;

pub use default::SpecificationLoaderDefault;

use crate::config::MetamodelConfig;
use crate::spec::ObjectSpecification;
use crate::validation::ValidationFailures;
use causeway_core::{
    Bookmark, Class, ClassPath, IntrospectionState, LogicalType, MetamodelError,
    MetamodelResult,
};
use std::sync::Arc;

/// Loads, caches and validates object specifications
pub trait SpecificationLoader: Send + Sync {
    /// Active configuration
    fn config(&self) -> &MetamodelConfig;

    /// Class path used to resolve type references
    fn class_path(&self) -> &ClassPath;

    /// Discover, introspect and validate all eagerly introspected types
    fn create_meta_model(&self) -> MetamodelResult<()>;

    /// Wait (bounded) for validation to go idle, then clear all state
    fn dispose_meta_model(&self);

    /// True once `create_meta_model` has completed
    fn is_metamodel_fully_introspected(&self) -> bool;

    /// Spec of `class` (after substitution), introspected at least up to
    /// `up_to`. `None` if the class is never introspected.
    fn load_specification(
        &self,
        class: &Class,
        up_to: IntrospectionState,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>>;

    /// Load each of `classes` to TYPE level. Stops at the first class that
    /// yields no spec and returns false; true if every class loaded.
    fn load_specifications(&self, classes: &[Class]) -> MetamodelResult<bool> {
        for class in classes {
            if self
                .load_specification(class, IntrospectionState::TypeIntrospected)?
                .is_none()
            {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Remove `class`'s spec and its superclass specs, then load it afresh
    fn reload_specification(&self, class: &Class) -> MetamodelResult<Option<Arc<ObjectSpecification>>>;

    /// Remove `class`'s spec and every superclass spec from the cache
    fn invalidate_cache(&self, class: &Class) -> MetamodelResult<()>;

    /// Point-in-time copy of all cached specs
    fn snapshot_specifications(&self) -> Vec<Arc<ObjectSpecification>>;

    /// Visit every cached spec, including specs loaded during the visit
    fn for_each(&self, f: &mut dyn FnMut(&Arc<ObjectSpecification>));

    /// Logical type registered under `logical_type_name`
    fn lookup_logical_type(&self, logical_type_name: &str) -> Option<LogicalType>;

    /// Queue `spec` for re-validation; runs the validators unless a pass is
    /// already in progress, in which case that pass picks it up
    fn validate_later(&self, spec: &Arc<ObjectSpecification>) -> MetamodelResult<()>;

    /// Memoized validation result, assessing it if necessary
    fn get_or_assess_validation_result(&self) -> MetamodelResult<Arc<ValidationFailures>>;

    /// Memoized validation result, if assessed
    fn validation_result(&self) -> Option<Arc<ValidationFailures>>;

    // ========================================================================
    // Derived lookups
    // ========================================================================

    /// [`SpecificationLoader::lookup_logical_type`] or not-found
    fn lookup_logical_type_else_fail(&self, logical_type_name: &str) -> MetamodelResult<LogicalType> {
        self.lookup_logical_type(logical_type_name).ok_or_else(|| {
            MetamodelError::not_found(format!("logical type '{}'", logical_type_name))
        })
    }

    /// Spec of `class` at TYPE level
    fn spec_for_type(&self, class: &Class) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.load_specification(class, IntrospectionState::TypeIntrospected)
    }

    /// [`SpecificationLoader::spec_for_type`] or not-found
    fn spec_for_type_else_fail(&self, class: &Class) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.spec_for_type(class)?.ok_or_else(|| {
            MetamodelError::not_found(format!("specification for type {}", class))
        })
    }

    /// Spec of the class bound to `logical_type`
    fn spec_for_logical_type(
        &self,
        logical_type: &LogicalType,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.spec_for_type(logical_type.corresponding_class())
    }

    /// [`SpecificationLoader::spec_for_logical_type`] or not-found
    fn spec_for_logical_type_else_fail(
        &self,
        logical_type: &LogicalType,
    ) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.spec_for_logical_type(logical_type)?.ok_or_else(|| {
            MetamodelError::not_found(format!("specification for logical type {}", logical_type))
        })
    }

    /// Spec registered under `logical_type_name`
    fn spec_for_logical_type_name(
        &self,
        logical_type_name: &str,
    ) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        match self.lookup_logical_type(logical_type_name) {
            Some(logical_type) => self.spec_for_logical_type(&logical_type),
            None => Ok(None),
        }
    }

    /// [`SpecificationLoader::spec_for_logical_type_name`] or not-found
    fn spec_for_logical_type_name_else_fail(
        &self,
        logical_type_name: &str,
    ) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.spec_for_logical_type_name(logical_type_name)?.ok_or_else(|| {
            MetamodelError::not_found(format!(
                "specification for logical type name '{}'",
                logical_type_name
            ))
        })
    }

    /// Spec of the type a bookmark points at
    fn spec_for_bookmark(&self, bookmark: &Bookmark) -> MetamodelResult<Option<Arc<ObjectSpecification>>> {
        self.spec_for_logical_type_name(bookmark.logical_type_name())
    }

    /// [`SpecificationLoader::spec_for_bookmark`] or not-found
    fn spec_for_bookmark_else_fail(&self, bookmark: &Bookmark) -> MetamodelResult<Arc<ObjectSpecification>> {
        self.spec_for_bookmark(bookmark)?.ok_or_else(|| {
            MetamodelError::not_found(format!("specification for bookmark {}", bookmark))
        })
    }
}
