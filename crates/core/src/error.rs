//! Error types for the metamodel
//!
//! This module defines the error taxonomy shared by the loader and the
//! wrapper layer. We use `thiserror` for automatic `Display` and `Error`
//! trait implementations.
//!
//! Discovery skips are not errors: they are expressed as `Ok(None)` by the
//! loader. Not-found conditions are `Option`s unless the caller asks for an
//! `..._else_fail` variant, which produces [`MetamodelError::NotFound`].

use thiserror::Error;

/// Result type alias for metamodel operations
pub type MetamodelResult<T> = std::result::Result<T, MetamodelError>;

/// Error raised by a method handle when invoking into a pojo
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvocationError {
    /// The pojo's state is not of the type the handle was built for
    #[error("type mismatch: expected {expected}, found instance of {actual}")]
    TypeMismatch {
        /// Rust type the handle expected
        expected: String,
        /// Class of the pojo actually passed
        actual: String,
    },

    /// An argument could not be converted to the parameter's type
    #[error("bad argument at position {position}: {reason}")]
    BadArgument {
        /// Zero-based argument position
        position: usize,
        /// Why conversion failed
        reason: String,
    },

    /// Wrong number of arguments passed to the method
    #[error("arity mismatch for '{method}': expected {expected}, got {actual}")]
    Arity {
        /// Method name
        method: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// The domain code itself failed
    #[error("{0}")]
    Domain(String),
}

impl InvocationError {
    /// Domain-level failure raised by user code inside a method body
    pub fn domain(msg: impl Into<String>) -> Self {
        InvocationError::Domain(msg.into())
    }

    /// Argument conversion failure
    pub fn bad_argument(position: usize, reason: impl Into<String>) -> Self {
        InvocationError::BadArgument {
            position,
            reason: reason.into(),
        }
    }
}

/// Error types for metamodel construction, lookup and validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetamodelError {
    /// A required lookup found nothing
    #[error("no such element: {what}")]
    NotFound {
        /// Description of what was searched for
        what: String,
    },

    /// Unrecoverable framework condition
    #[error("unrecoverable: {0}")]
    Unrecoverable(String),

    /// Framework invariant violated
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Caller passed an argument the operation cannot accept
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Aggregate of all metamodel validation failures
    #[error("metamodel validation failed ({} failure(s)):\n{}", messages.len(), messages.join("\n"))]
    Validation {
        /// One entry per failure, in report order
        messages: Vec<String>,
    },

    /// Introspecting a class failed
    #[error("failed to introspect {class}: {reason}")]
    Introspection {
        /// Fully qualified class name
        class: String,
        /// Cause
        reason: String,
    },

    /// Invoking a method handle failed
    #[error("invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    /// Invalid or unreadable configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl MetamodelError {
    /// Not-found error naming the thing searched for
    pub fn not_found(what: impl Into<String>) -> Self {
        MetamodelError::NotFound { what: what.into() }
    }

    /// Invariant violation
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        MetamodelError::IllegalState(msg.into())
    }

    /// Bad caller input
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        MetamodelError::IllegalArgument(msg.into())
    }

    /// Unrecoverable condition
    pub fn unrecoverable(msg: impl Into<String>) -> Self {
        MetamodelError::Unrecoverable(msg.into())
    }

    /// Introspection failure for a class
    pub fn introspection(class: impl Into<String>, reason: impl Into<String>) -> Self {
        MetamodelError::Introspection {
            class: class.into(),
            reason: reason.into(),
        }
    }

    /// Configuration failure
    pub fn config(msg: impl Into<String>) -> Self {
        MetamodelError::Config(msg.into())
    }

    /// True for [`MetamodelError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetamodelError::NotFound { .. })
    }
}
