//! Wrapper integration tests: rule enforcement, plurals, mixins, sync
//! control, commands, exception handling and listeners.

#[path = "../common/mod.rs"]
mod common;

mod control;
mod mixin;
mod object;
mod plural;

use causeway::wrapper::WrapperFactory;
use causeway::InteractionEvent;
use causeway::InteractionEventKind;
use common::{Model, SpecificationLoaderDefault};
use parking_lot::Mutex;
use std::sync::Arc;

/// Fixture model, its loader and a factory over it
pub struct Fixture {
    pub model: Model,
    pub loader: Arc<SpecificationLoaderDefault>,
    pub factory: WrapperFactory,
}

impl Fixture {
    pub fn new() -> Self {
        let model = Model::new();
        let loader = model.build();
        let factory = WrapperFactory::new(loader.clone());
        Self {
            model,
            loader,
            factory,
        }
    }
}

/// Records the kind of every event the factory's listeners see
pub fn record_events(factory: &WrapperFactory) -> Arc<Mutex<Vec<(InteractionEventKind, bool)>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    factory.add_listener(move |event: &InteractionEvent| {
        sink.lock().push((event.kind().clone(), event.is_veto()));
    });
    events
}
