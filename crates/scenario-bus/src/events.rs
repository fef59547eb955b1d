//! # Graph Events
//!
//! A named event with an ordered listener list and the most recently
//! emitted payload.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased event payload. Listeners downcast to the concrete type.
pub type EventPayload = Arc<dyn Any + Send + Sync>;

/// A listener attached to an event. Called synchronously on emission.
pub type Listener = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// Wrap a concrete value as an [`EventPayload`].
pub fn payload<T: Any + Send + Sync>(value: T) -> EventPayload {
    Arc::new(value)
}

/// A single named event.
pub struct GraphEvent {
    name: String,
    /// Listeners in registration order.
    listeners: Vec<Listener>,
    /// Most recently emitted payload.
    last_value: Option<EventPayload>,
    /// Total emissions.
    emit_count: u64,
}

impl GraphEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            listeners: Vec::new(),
            last_value: None,
            emit_count: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connect(&mut self, listener: Listener) {
        self.listeners.push(listener);
    }

    /// Snapshot of the listener list, taken before delivery so that a
    /// listener may itself emit without holding the registry lock.
    pub(crate) fn listeners(&self) -> Vec<Listener> {
        self.listeners.clone()
    }

    pub(crate) fn record(&mut self, payload: EventPayload) {
        self.last_value = Some(payload);
        self.emit_count += 1;
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn value(&self) -> Option<EventPayload> {
        self.last_value.clone()
    }

    pub fn emit_count(&self) -> u64 {
        self.emit_count
    }
}

impl fmt::Debug for GraphEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphEvent")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .field("emit_count", &self.emit_count)
            .finish()
    }
}
