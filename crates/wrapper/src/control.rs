//! Per-call control of wrapped invocations
//!
//! A [`SyncControl`] travels with every wrapped object and decides, for each
//! call, whether business rules are checked, whether the member is actually
//! executed, who initiated the call, which command listeners hear about it and
//! what happens to failures.
//!
//! ```ignore
//! // dry run: check the rules, change nothing
//! let wrapped = factory.object_proxy(&customer, SyncControl::control().with_skip_execute())?;
//! wrapped.set_property("name", "Bob".into())?;
//! ```

use crate::error::WrapperResult;
use crate::intent::MemberIntent;
use crate::WrapperError;
use causeway_core::{Identifier, Pojo, Value};
use causeway_metamodel::InteractionInitiatedBy;
use std::fmt;
use std::sync::Arc;

/// Which phases of a wrapped call run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExecutionMode {
    skip_rules: bool,
    skip_execution: bool,
}

impl ExecutionMode {
    /// Check rules and execute
    pub fn execute() -> Self {
        Self::default()
    }

    /// True if visibility, usability and validity are not checked
    pub fn is_skip_rules(&self) -> bool {
        self.skip_rules
    }

    /// True if the member is not executed
    pub fn is_skip_execution(&self) -> bool {
        self.skip_execution
    }
}

/// Decides what happens to a failed wrapped call
pub trait ExceptionHandler: Send + Sync {
    /// Translate, suppress (return a value) or rethrow `error`
    fn handle(&self, error: WrapperError) -> WrapperResult<Value>;
}

impl<F> ExceptionHandler for F
where
    F: Fn(WrapperError) -> WrapperResult<Value> + Send + Sync,
{
    fn handle(&self, error: WrapperError) -> WrapperResult<Value> {
        self(error)
    }
}

/// Default handler: rethrow unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RethrowExceptionHandler;

impl ExceptionHandler for RethrowExceptionHandler {
    fn handle(&self, error: WrapperError) -> WrapperResult<Value> {
        Err(error)
    }
}

/// A state-changing call about to be executed
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    identifier: Identifier,
    intent: MemberIntent,
    target: Pojo,
    args: Vec<Value>,
}

impl Command {
    pub(crate) fn new(
        identifier: Identifier,
        intent: MemberIntent,
        target: Pojo,
        args: Vec<Value>,
    ) -> Self {
        Self {
            identifier,
            intent,
            target,
            args,
        }
    }

    /// Member the command targets
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Modify, clear or execute
    pub fn intent(&self) -> MemberIntent {
        self.intent
    }

    /// Domain object the command targets (the mixee for mixed-in members)
    pub fn target(&self) -> &Pojo {
        &self.target
    }

    /// Arguments, or the proposed value for property edits
    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

/// Told about each command before it executes
pub trait CommandListener: Send + Sync {
    /// Called once per command
    fn on_command(&self, command: &Command);
}

impl<F> CommandListener for F
where
    F: Fn(&Command) + Send + Sync,
{
    fn on_command(&self, command: &Command) {
        self(command)
    }
}

/// Per-call control
#[derive(Clone)]
pub struct SyncControl {
    mode: ExecutionMode,
    initiated_by: InteractionInitiatedBy,
    exception_handler: Arc<dyn ExceptionHandler>,
    command_listeners: Vec<Arc<dyn CommandListener>>,
}

impl SyncControl {
    /// Check rules, execute, rethrow failures, user initiated
    pub fn control() -> Self {
        Self {
            mode: ExecutionMode::execute(),
            initiated_by: InteractionInitiatedBy::User,
            exception_handler: Arc::new(RethrowExceptionHandler),
            command_listeners: Vec::new(),
        }
    }

    /// Do not check rules
    pub fn with_skip_rules(mut self) -> Self {
        self.mode.skip_rules = true;
        self
    }

    /// Check rules only; do not execute
    pub fn with_skip_execute(mut self) -> Self {
        self.mode.skip_execution = true;
        self
    }

    /// Who initiated the calls made under this control
    pub fn with_initiated_by(mut self, initiated_by: InteractionInitiatedBy) -> Self {
        self.initiated_by = initiated_by;
        self
    }

    /// Replace the exception handler
    pub fn with_exception_handler(mut self, handler: impl ExceptionHandler + 'static) -> Self {
        self.exception_handler = Arc::new(handler);
        self
    }

    /// Add a command listener
    pub fn with_command_listener(mut self, listener: impl CommandListener + 'static) -> Self {
        self.command_listeners.push(Arc::new(listener));
        self
    }

    /// Execution mode
    pub fn execution_mode(&self) -> ExecutionMode {
        self.mode
    }

    /// True if rules are not checked
    pub fn is_skip_rules(&self) -> bool {
        self.mode.is_skip_rules()
    }

    /// True if members are not executed
    pub fn is_skip_execution(&self) -> bool {
        self.mode.is_skip_execution()
    }

    /// Initiator
    pub fn initiated_by(&self) -> InteractionInitiatedBy {
        self.initiated_by
    }

    /// Exception handler
    pub fn exception_handler(&self) -> &dyn ExceptionHandler {
        self.exception_handler.as_ref()
    }

    /// Command listeners, in registration order
    pub fn command_listeners(&self) -> &[Arc<dyn CommandListener>] {
        &self.command_listeners
    }
}

impl Default for SyncControl {
    fn default() -> Self {
        Self::control()
    }
}

impl fmt::Debug for SyncControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncControl")
            .field("mode", &self.mode)
            .field("initiated_by", &self.initiated_by)
            .field("command_listeners", &self.command_listeners.len())
            .finish()
    }
}
