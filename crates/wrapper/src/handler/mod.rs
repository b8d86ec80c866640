//! Invocation handlers
//!
//! | Module | Handles |
//! |--------|---------|
//! | `domain_object` | calls on wrapped domain objects and mixins |
//! | `plural` | calls on collections and maps read through a wrapper |
//!
//! Each call runs its phases in a fixed order: visibility, usability,
//! validity (mutators only), command listeners, execution, access event.
//! [`Phases`] implements the rule and execution phases on top of a
//! [`SyncControl`]; the handlers only decide which checks apply.

pub(crate) mod domain_object;
pub(crate) mod plural;

use crate::control::{Command, SyncControl};
use crate::error::{WrapperError, WrapperResult};
use crate::listener::InteractionListener;
use crate::proxy::ObjectPersister;
use causeway_core::{MetamodelResult, Value};
use causeway_metamodel::{
    InteractionEvent, InteractionInitiatedBy, InteractionResult, SpecificationLoader,
};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// State shared by a factory and every wrapper it creates
pub(crate) struct WrapperContext {
    pub(crate) loader: Arc<dyn SpecificationLoader>,
    pub(crate) persister: Option<Arc<dyn ObjectPersister>>,
    listeners: RwLock<Vec<Arc<dyn InteractionListener>>>,
}

impl WrapperContext {
    pub(crate) fn new(
        loader: Arc<dyn SpecificationLoader>,
        persister: Option<Arc<dyn ObjectPersister>>,
    ) -> Self {
        Self {
            loader,
            persister,
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub(crate) fn add_listener(&self, listener: Arc<dyn InteractionListener>) {
        self.listeners.write().push(listener);
    }

    pub(crate) fn clear_listeners(&self) {
        self.listeners.write().clear();
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Tell every listener; the lock is not held while they run
    pub(crate) fn notify(&self, event: &InteractionEvent) {
        let listeners = self.listeners.read().clone();
        for listener in &listeners {
            listener.on_event(event);
        }
    }
}

/// Rule and execution phases of one wrapped call
pub(crate) struct Phases<'a> {
    ctx: &'a WrapperContext,
    control: &'a SyncControl,
}

impl<'a> Phases<'a> {
    pub(crate) fn new(ctx: &'a WrapperContext, control: &'a SyncControl) -> Self {
        Self { ctx, control }
    }

    /// Run one check unless rules are skipped; listeners hear the outcome
    /// before a veto is raised
    pub(crate) fn check(
        &self,
        check: impl FnOnce(InteractionInitiatedBy) -> MetamodelResult<InteractionResult>,
    ) -> WrapperResult<()> {
        if self.control.is_skip_rules() {
            return Ok(());
        }
        let result = check(self.control.initiated_by())?;
        self.ctx.notify(result.event());
        match WrapperError::from_veto(result) {
            Some(err) => {
                debug!(target: "causeway::wrapper", error = %err, "vetoed");
                Err(err)
            }
            None => Ok(()),
        }
    }

    /// Tell the command listeners
    pub(crate) fn command(&self, command: Command) {
        for listener in self.control.command_listeners() {
            listener.on_command(&command);
        }
    }

    /// Run `execute` unless execution is skipped, in which case the call
    /// yields null
    pub(crate) fn execute(
        &self,
        execute: impl FnOnce() -> WrapperResult<Value>,
    ) -> WrapperResult<Value> {
        if self.control.is_skip_execution() {
            return Ok(Value::Null);
        }
        execute()
    }

    pub(crate) fn notify(&self, event: InteractionEvent) {
        self.ctx.notify(&event);
    }
}

/// Hand a failed call to the control's exception handler. Programming
/// errors bypass the handler.
pub(crate) fn handle_failure<T>(
    control: &SyncControl,
    result: WrapperResult<T>,
    recover: impl FnOnce(Value) -> T,
) -> WrapperResult<T> {
    match result {
        Err(err) if !err.is_programming_error() => {
            control.exception_handler().handle(err).map(recover)
        }
        other => other,
    }
}

/// The single argument of a one-argument call
pub(crate) fn single_arg<'v>(method: &str, args: &'v [Value]) -> WrapperResult<&'v Value> {
    match args {
        [arg] => Ok(arg),
        _ => Err(WrapperError::illegal_argument(format!(
            "Method '{}' takes 1 argument, got {}",
            method,
            args.len()
        ))),
    }
}
