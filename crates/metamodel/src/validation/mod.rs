//! Metamodel validation
//!
//! Validators inspect the specs already in the cache and report structural
//! problems into a [`ValidationFailures`] accumulator. They never force
//! introspection; anything they need that is not yet loaded is simply not
//! examined in this pass. A later pass, triggered by `validate_later`, sees
//! the newly discovered specs.

pub mod validators;

use crate::loader::SpecificationLoader;
use causeway_core::{MetamodelError, MetamodelResult};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

/// One validation failure
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Full identity of the offending type or member
    pub origin: String,
    /// What is wrong
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.origin, self.message)
    }
}

/// Accumulated validation failures, ordered and without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailures {
    failures: BTreeSet<ValidationFailure>,
}

impl ValidationFailures {
    /// No failures
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure
    pub fn add(&mut self, origin: impl Into<String>, message: impl Into<String>) {
        self.failures.insert(ValidationFailure {
            origin: origin.into(),
            message: message.into(),
        });
    }

    /// Absorb all failures of `other`
    pub fn merge(&mut self, other: ValidationFailures) {
        self.failures.extend(other.failures);
    }

    /// True if anything failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of failures
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// True if nothing failed
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures in order
    pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.failures.iter()
    }

    /// Messages in order, `origin: message`
    pub fn messages(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.to_string()).collect()
    }

    /// `Ok` if empty, else an aggregate validation error
    pub fn to_result(&self) -> MetamodelResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MetamodelError::Validation {
                messages: self.messages(),
            })
        }
    }
}

/// A metamodel validator
pub trait MetaModelValidator: Send + Sync {
    /// Name, for diagnostics
    fn name(&self) -> &'static str;

    /// Inspect the loaded specs and record failures
    fn validate(
        &self,
        loader: &dyn SpecificationLoader,
        failures: &mut ValidationFailures,
    ) -> MetamodelResult<()>;
}

/// Run every validator, sequentially or fanned out. A validator error is
/// logged and returned; it aborts the pass.
pub(crate) fn run_validators(
    validators: &[Arc<dyn MetaModelValidator>],
    loader: &dyn SpecificationLoader,
    parallelize: bool,
) -> MetamodelResult<ValidationFailures> {
    let run_one = |validator: &Arc<dyn MetaModelValidator>| -> MetamodelResult<ValidationFailures> {
        let mut failures = ValidationFailures::new();
        validator.validate(loader, &mut failures).map_err(|e| {
            error!(
                target: "causeway::validation",
                validator = validator.name(),
                error = %e,
                "Validator failed"
            );
            e
        })?;
        Ok(failures)
    };

    let results: Vec<ValidationFailures> = if parallelize {
        validators.par_iter().map(run_one).collect::<MetamodelResult<_>>()?
    } else {
        validators.iter().map(run_one).collect::<MetamodelResult<_>>()?
    };

    let mut failures = ValidationFailures::new();
    for result in results {
        failures.merge(result);
    }
    info!(
        target: "causeway::validation",
        validators = validators.len(),
        failures = failures.len(),
        "Metamodel validated"
    );
    Ok(failures)
}
