//! Interaction listeners
//!
//! Registered with the [`crate::WrapperFactory`]; told about every check a
//! wrapped call performs (vetoed or not) and every access it makes.

use causeway_metamodel::InteractionEvent;

/// Observer of interaction events
pub trait InteractionListener: Send + Sync {
    /// Called for each event, vetoed ones before the veto is raised
    fn on_event(&self, event: &InteractionEvent);
}

impl<F> InteractionListener for F
where
    F: Fn(&InteractionEvent) + Send + Sync,
{
    fn on_event(&self, event: &InteractionEvent) {
        self(event)
    }
}
