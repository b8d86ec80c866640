//! Sync control, command listeners, exception handlers and interaction
//! listeners

use crate::common::*;
use crate::{record_events, Fixture};
use causeway::wrapper::{Command, MemberIntent, ProxyGenerator, SyncControl, WrapperError, WrapperResult};
use causeway::{InteractionEventKind, InteractionInitiatedBy};
use parking_lot::Mutex;
use std::sync::Arc;

// ============================================================================
// Execution modes
// ============================================================================

#[test]
fn test_skip_rules_reads_hidden_property() {
    let fx = Fixture::new();
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), SyncControl::control().with_skip_rules())
        .unwrap();
    assert_eq!(customer.get_property("secret").unwrap(), Value::from("s3cret"));
    customer.set_property("secret", "changed".into()).unwrap();
    assert_eq!(customer.get_property("secret").unwrap(), Value::from("changed"));
}

#[test]
fn test_framework_initiated_calls_pass_rules() {
    let fx = Fixture::new();
    let control = SyncControl::control().with_initiated_by(InteractionInitiatedBy::Framework);
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), control)
        .unwrap();
    assert_eq!(customer.get_property("secret").unwrap(), Value::from("s3cret"));
}

#[test]
fn test_skip_execute_checks_without_running() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let dry_run = fx
        .factory
        .object_proxy(&pojo, SyncControl::control().with_skip_execute())
        .unwrap();

    // rules still apply
    assert!(dry_run.set_property("name", "".into()).unwrap_err().is_invalid());
    assert!(dry_run.get_property("secret").unwrap_err().is_hidden());

    // valid calls do nothing
    dry_run.set_property("name", "Bob".into()).unwrap();
    assert_eq!(Model::customer_name(&pojo), "Ann");
    assert_eq!(dry_run.get_property("name").unwrap(), Value::Null);
    assert_eq!(dry_run.invoke_action("archive", &[]).unwrap(), Value::Null);
    assert!(!pojo.read(|c: &Customer| c.archived).unwrap());
}

// ============================================================================
// Commands
// ============================================================================

fn recording_control() -> (SyncControl, Arc<Mutex<Vec<Command>>>) {
    let commands = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&commands);
    let control = SyncControl::control().with_command_listener(move |command: &Command| {
        sink.lock().push(command.clone());
    });
    (control, commands)
}

#[test]
fn test_commands_precede_execution() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let (control, commands) = recording_control();
    let customer = fx.factory.object_proxy(&pojo, control).unwrap();

    customer.set_property("name", "Bob".into()).unwrap();
    customer.clear_property("email").unwrap();
    customer.invoke_action("archive", &[]).unwrap();
    customer.get_property("name").unwrap();

    let commands = commands.lock();
    assert_eq!(commands.len(), 3);
    assert_eq!(commands[0].intent(), MemberIntent::Modify);
    assert_eq!(commands[0].identifier().member_name(), Some("name"));
    assert_eq!(commands[0].args(), &[Value::from("Bob")]);
    assert!(commands[0].target().same_instance(&pojo));
    assert_eq!(commands[1].intent(), MemberIntent::Clear);
    assert_eq!(commands[2].intent(), MemberIntent::Execute);
    assert_eq!(commands[2].identifier().member_name(), Some("archive"));
}

#[test]
fn test_vetoed_and_dry_run_calls_issue_no_command() {
    let fx = Fixture::new();
    let pojo = fx.model.new_customer("Ann");
    let (control, commands) = recording_control();

    let customer = fx.factory.object_proxy(&pojo, control.clone()).unwrap();
    assert!(customer.set_property("name", "".into()).is_err());
    assert!(customer.set_property("secret", "x".into()).is_err());

    let dry_run = fx
        .factory
        .object_proxy(&pojo, control.with_skip_execute())
        .unwrap();
    dry_run.set_property("name", "Bob".into()).unwrap();

    assert!(commands.lock().is_empty());
}

// ============================================================================
// Exception handling
// ============================================================================

#[test]
fn test_handler_can_suppress_failures() {
    let fx = Fixture::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let control = SyncControl::control().with_exception_handler(
        move |err: WrapperError| -> WrapperResult<Value> {
            sink.lock().push(err);
            Ok(Value::from("recovered"))
        },
    );
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), control)
        .unwrap();

    assert_eq!(
        customer.invoke_action("fail", &[]).unwrap(),
        Value::from("recovered")
    );
    assert_eq!(
        customer.get_property("secret").unwrap(),
        Value::from("recovered")
    );
    customer.set_property("name", "".into()).unwrap();

    let seen = seen.lock();
    assert_eq!(seen.len(), 3);
    assert!(matches!(seen[0], WrapperError::Recoverable(_)));
    assert!(seen[1].is_hidden());
    assert!(seen[2].is_invalid());
}

#[test]
fn test_handler_can_translate_failures() {
    let fx = Fixture::new();
    let control = SyncControl::control().with_exception_handler(
        |err: WrapperError| -> WrapperResult<Value> {
            Err(WrapperError::Recoverable(format!("translated: {}", err)))
        },
    );
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), control)
        .unwrap();
    let err = customer.invoke_action("archive", &[]).and_then(|_| {
        customer.invoke_action("archive", &[])
    });
    assert!(matches!(err, Err(WrapperError::Recoverable(msg)) if msg.starts_with("translated:")));
}

#[test]
fn test_programming_errors_skip_the_handler() {
    let fx = Fixture::new();
    let calls = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&calls);
    let control = SyncControl::control().with_exception_handler(
        move |_err: WrapperError| -> WrapperResult<Value> {
            *counter.lock() += 1;
            Ok(Value::Null)
        },
    );
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), control)
        .unwrap();

    assert!(matches!(
        customer.invoke("nope", &[]),
        Err(WrapperError::IllegalArgument(_))
    ));
    assert!(matches!(
        customer.invoke("disableArchive", &[]),
        Err(WrapperError::Unsupported(_))
    ));
    assert_eq!(*calls.lock(), 0);
}

// ============================================================================
// Interaction listeners
// ============================================================================

#[test]
fn test_listeners_see_checks_and_access() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    assert_eq!(fx.factory.listener_count(), 1);
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    customer.set_property("name", "Bob".into()).unwrap();
    customer.get_property("name").unwrap();

    let events = events.lock();
    let kinds: Vec<&InteractionEventKind> = events.iter().map(|(k, _)| k).collect();
    assert!(matches!(kinds[0], InteractionEventKind::PropertyVisibility));
    assert!(matches!(kinds[1], InteractionEventKind::PropertyUsability));
    assert!(matches!(
        kinds[2],
        InteractionEventKind::PropertyModify { proposed } if *proposed == Value::from("Bob")
    ));
    assert!(kinds.iter().any(|k| matches!(
        k,
        InteractionEventKind::PropertyAccess { value } if *value == Value::from("Bob")
    )));
    assert!(events.iter().all(|(_, vetoed)| !vetoed));
}

#[test]
fn test_listeners_hear_vetoes_before_they_are_raised() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();

    assert!(customer.set_property("name", "".into()).is_err());
    let events = events.lock();
    let (kind, vetoed) = events.last().unwrap();
    assert!(matches!(kind, InteractionEventKind::PropertyModify { .. }));
    assert!(*vetoed);
}

#[test]
fn test_skip_rules_publishes_no_checks() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    let customer = fx
        .factory
        .object_proxy(&fx.model.new_customer("Ann"), SyncControl::control().with_skip_rules())
        .unwrap();
    customer.get_property("name").unwrap();

    let events = events.lock();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].0, InteractionEventKind::PropertyAccess { .. }));
}

#[test]
fn test_cleared_listeners_hear_nothing() {
    let fx = Fixture::new();
    let events = record_events(&fx.factory);
    fx.factory.clear_listeners();
    assert_eq!(fx.factory.listener_count(), 0);

    let customer = fx.factory.wrap(&fx.model.new_customer("Ann")).unwrap();
    customer.get_property("name").unwrap();
    assert!(events.lock().is_empty());
}
