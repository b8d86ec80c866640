//! Error types for wrapped invocations
//!
//! A vetoed check becomes one of the three interaction exceptions, each
//! carrying the [`InteractionEvent`] that was vetoed:
//!
//! | Event category | Error |
//! |----------------|-------|
//! | Visibility | [`WrapperError::Hidden`] |
//! | Usability | [`WrapperError::Disabled`] |
//! | Validity | [`WrapperError::Invalid`] |
//!
//! Misuse of the wrapper (`Unsupported`, `IllegalState`, `IllegalArgument`)
//! is never handed to a [`crate::ExceptionHandler`]; everything else is.

use causeway_core::{InvocationError, MetamodelError};
use causeway_metamodel::{EventCategory, InteractionEvent, InteractionResult};
use thiserror::Error;

/// Result type alias for wrapper operations
pub type WrapperResult<T> = std::result::Result<T, WrapperError>;

macro_rules! interaction_exception {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Error)]
        #[error("{reason}")]
        pub struct $name {
            reason: String,
            event: InteractionEvent,
        }

        impl $name {
            /// Exception for the vetoed `event`
            pub fn new(event: InteractionEvent) -> Self {
                Self {
                    reason: event.reason().unwrap_or_default(),
                    event,
                }
            }

            /// The vetoed event
            pub fn event(&self) -> &InteractionEvent {
                &self.event
            }

            /// Combined veto reason
            pub fn reason(&self) -> &str {
                &self.reason
            }
        }
    };
}

interaction_exception!(
    /// The member is not visible to the caller
    HiddenException
);
interaction_exception!(
    /// The member is visible but may not be used
    DisabledException
);
interaction_exception!(
    /// The proposed value or arguments were rejected
    InvalidException
);

/// Errors raised by wrapped objects and plurals
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WrapperError {
    /// Visibility veto
    #[error("hidden: {0}")]
    Hidden(HiddenException),

    /// Usability veto
    #[error("disabled: {0}")]
    Disabled(DisabledException),

    /// Validity veto
    #[error("invalid: {0}")]
    Invalid(InvalidException),

    /// Domain code failed in a way the caller may recover from
    #[error("{0}")]
    Recoverable(String),

    /// Call the wrapper does not allow
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Wrapper invariant violated
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// Caller passed something the wrapper cannot accept
    #[error("illegal argument: {0}")]
    IllegalArgument(String),

    /// Metamodel lookup or introspection failed
    #[error("{0}")]
    Metamodel(MetamodelError),

    /// A method handle failed outside domain code
    #[error("invocation failed: {0}")]
    Invocation(InvocationError),
}

impl WrapperError {
    /// Call the wrapper does not allow
    pub fn unsupported(msg: impl Into<String>) -> Self {
        WrapperError::Unsupported(msg.into())
    }

    /// Invariant violation
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        WrapperError::IllegalState(msg.into())
    }

    /// Bad caller input
    pub fn illegal_argument(msg: impl Into<String>) -> Self {
        WrapperError::IllegalArgument(msg.into())
    }

    /// The exception a vetoed result raises; `None` if not vetoed or if the
    /// event is informational
    pub fn from_veto(result: InteractionResult) -> Option<Self> {
        if result.is_not_vetoed() {
            return None;
        }
        let event = result.into_event();
        match event.category() {
            EventCategory::Visibility => Some(WrapperError::Hidden(HiddenException::new(event))),
            EventCategory::Usability => Some(WrapperError::Disabled(DisabledException::new(event))),
            EventCategory::Validity => Some(WrapperError::Invalid(InvalidException::new(event))),
            EventCategory::Access => None,
        }
    }

    /// True for [`WrapperError::Hidden`]
    pub fn is_hidden(&self) -> bool {
        matches!(self, WrapperError::Hidden(_))
    }

    /// True for [`WrapperError::Disabled`]
    pub fn is_disabled(&self) -> bool {
        matches!(self, WrapperError::Disabled(_))
    }

    /// True for [`WrapperError::Invalid`]
    pub fn is_invalid(&self) -> bool {
        matches!(self, WrapperError::Invalid(_))
    }

    /// The vetoed event, for interaction exceptions
    pub fn event(&self) -> Option<&InteractionEvent> {
        match self {
            WrapperError::Hidden(e) => Some(e.event()),
            WrapperError::Disabled(e) => Some(e.event()),
            WrapperError::Invalid(e) => Some(e.event()),
            _ => None,
        }
    }

    /// Misuse of the wrapper; propagated without consulting the exception
    /// handler
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            WrapperError::Unsupported(_)
                | WrapperError::IllegalState(_)
                | WrapperError::IllegalArgument(_)
        )
    }
}

impl From<MetamodelError> for WrapperError {
    fn from(err: MetamodelError) -> Self {
        match err {
            MetamodelError::Invocation(inner) => inner.into(),
            other => WrapperError::Metamodel(other),
        }
    }
}

impl From<InvocationError> for WrapperError {
    fn from(err: InvocationError) -> Self {
        match err {
            InvocationError::Domain(msg) => WrapperError::Recoverable(msg),
            other => WrapperError::Invocation(other),
        }
    }
}
