use std::sync::Arc;

use parking_lot::Mutex;
use scenario_core::{HandlerSet, Leaf};

use super::node_b::BEvent;

/// Records the last `BEvent` message emitted by a `B`.
#[derive(Debug, Default)]
pub struct D {
    event_value: Mutex<Option<String>>,
}

impl D {
    pub fn event_value(&self) -> Option<String> {
        self.event_value.lock().clone()
    }
}

impl Leaf for D {
    fn declare_handlers(self: Arc<Self>, handlers: &mut HandlerSet) {
        handlers.on::<BEvent, _>("B", move |event| {
            *self.event_value.lock() = Some(event.msg.clone());
        });
    }
}
