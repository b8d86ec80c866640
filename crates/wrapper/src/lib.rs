//! Wrapper layer for Causeway
//!
//! Wraps domain objects, mixins and the collections they expose so that
//! every call is mediated by the metamodel's business rules:
//! - visibility, usability and validity are checked in that order, and a
//!   veto raises the matching interaction exception
//! - command listeners hear about state changes before they execute
//! - interaction listeners hear about every check and access
//! - failures go to the caller's exception handler
//!
//! [`SyncControl`] decides per wrapper whether rules are checked and whether
//! members are executed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod error;
mod handler;
pub mod intent;
pub mod listener;
pub mod proxy;

pub use control::{
    Command, CommandListener, ExceptionHandler, ExecutionMode, RethrowExceptionHandler,
    SyncControl,
};
pub use error::{DisabledException, HiddenException, InvalidException, WrapperError, WrapperResult};
pub use intent::{MemberIntent, ORIGIN_METHOD, SAVE_METHOD};
pub use listener::InteractionListener;
pub use proxy::{
    Invoked, ObjectPersister, Origin, ProxyGenerator, WrappedCollection, WrappedMap,
    WrappedObject, WrapperFactory,
};
