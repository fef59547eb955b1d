//! # Event Registry
//!
//! Explicit, caller-owned replacement for a process-wide event emitter.
//! One registry is passed by reference through a build and shared by every
//! leaf it creates; event names are global *within* that registry.
//!
//! Delivery is synchronous: `emit` calls every listener, in registration
//! order, before returning.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use scenario_types::ScenarioError;

use crate::events::{payload, EventPayload, GraphEvent, Listener};

/// Errors raised by the event registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The named event was never created.
    #[error("Event not found: '{0}'")]
    UnknownEvent(String),
}

impl From<BusError> for ScenarioError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::UnknownEvent(event) => ScenarioError::UnknownEvent { event },
        }
    }
}

/// Registry of named events.
#[derive(Default)]
pub struct EventRegistry {
    events: RwLock<HashMap<String, GraphEvent>>,
    /// Total emissions across all events.
    events_published: AtomicU64,
}

impl EventRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an event. Returns `false` if it already existed; an existing
    /// event keeps its listeners and last value.
    pub fn create(&self, name: &str) -> bool {
        let mut events = self.events.write();
        if events.contains_key(name) {
            debug!(event = name, "[Bus] Event already exists");
            return false;
        }
        events.insert(name.to_string(), GraphEvent::new(name));
        debug!(event = name, "[Bus] Event created");
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.events.read().contains_key(name)
    }

    /// Attach a listener to an existing event.
    pub fn add_listener(&self, name: &str, listener: Listener) -> Result<(), BusError> {
        let mut events = self.events.write();
        let event = events
            .get_mut(name)
            .ok_or_else(|| BusError::UnknownEvent(name.to_string()))?;
        event.connect(listener);
        debug!(
            event = name,
            listeners = event.listener_count(),
            "[Bus] Listener attached"
        );
        Ok(())
    }

    /// Emit a payload. Returns the number of listeners notified.
    pub fn emit(&self, name: &str, value: EventPayload) -> Result<usize, BusError> {
        let listeners = {
            let mut events = self.events.write();
            let event = events
                .get_mut(name)
                .ok_or_else(|| BusError::UnknownEvent(name.to_string()))?;
            event.record(Arc::clone(&value));
            event.listeners()
        };
        self.events_published.fetch_add(1, Ordering::Relaxed);

        for listener in &listeners {
            listener(&value);
        }

        debug!(event = name, receivers = listeners.len(), "[Bus] Event emitted");
        Ok(listeners.len())
    }

    /// Emit a concrete value.
    pub fn emit_value<T: Any + Send + Sync>(&self, name: &str, value: T) -> Result<usize, BusError> {
        self.emit(name, payload(value))
    }

    /// Most recently emitted payload, if any.
    pub fn last_value(&self, name: &str) -> Option<EventPayload> {
        self.events.read().get(name).and_then(GraphEvent::value)
    }

    /// Most recently emitted payload, downcast to `T`.
    pub fn last_value_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.last_value(name)?.downcast::<T>().ok()
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.events
            .read()
            .get(name)
            .map_or(0, GraphEvent::listener_count)
    }

    /// Names of all events, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.events.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Re-emit every later payload of `source` on `target`.
    ///
    /// Only values are relayed. Events have no completion state here, so
    /// there is none to carry over, and a value `source` emitted before the
    /// call is not replayed. The forwarding listener holds only a weak
    /// reference to the registry.
    pub fn forward(self: &Arc<Self>, source: &str, target: &str) -> Result<(), BusError> {
        if !self.contains(target) {
            return Err(BusError::UnknownEvent(target.to_string()));
        }

        let registry: Weak<Self> = Arc::downgrade(self);
        let target_name = target.to_string();
        self.add_listener(
            source,
            Arc::new(move |value: &EventPayload| {
                let Some(registry) = registry.upgrade() else {
                    return;
                };
                if let Err(e) = registry.emit(&target_name, Arc::clone(value)) {
                    warn!(error = %e, "[Bus] Forward target vanished");
                }
            }),
        )?;

        info!(source, target, "[Bus] Event forwarding installed");
        Ok(())
    }
}

impl std::fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRegistry")
            .field("events", &self.event_names())
            .field("events_published", &self.events_published())
            .finish()
    }
}
