//! # Capability Contracts
//!
//! Two separate roles a component can play on an edge. A [`Node`](crate::Node)
//! implements both for itself; a [`NodeSet`](crate::NodeSet) implements both
//! by delegating to the descendant leaf named in the call.
//!
//! Every operation is addressed by leaf name. A leaf rejects an operation
//! addressed to another name with `NodeNameMismatch`.

use scenario_bus::EventPayload;
use scenario_types::{CapabilityKey, ScenarioResult};

use crate::capability::{EventHandler, InterfaceRef};

/// A component that can emit events and implement interfaces.
pub trait Predecessor {
    /// Create an event. Returns `false` if it already existed.
    fn add_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool>;

    fn has_event(&self, node_name: &str, event: &str) -> ScenarioResult<bool>;

    /// Attach a successor's handler to an existing event.
    fn register_handler_to_event(
        &self,
        node_name: &str,
        event: &str,
        handler: EventHandler,
    ) -> ScenarioResult<()>;

    /// Emit `payload` on `event`. Returns the number of handlers notified.
    fn notify_handlers(
        &self,
        node_name: &str,
        event: &str,
        payload: EventPayload,
    ) -> ScenarioResult<usize>;

    /// Look up an implemented interface. Fails with `MissingCapability`.
    fn implemented_interface(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<InterfaceRef>;

    /// Rebuild the implemented-interface map(s) from the leaf declarations.
    fn consolidate_implemented_interfaces(&self);
}

/// A component that can receive event handlers and interface references.
pub trait Successor {
    /// Look up an implemented event handler. Fails with `MissingCapability`.
    fn implemented_event_handler(
        &self,
        node_name: &str,
        key: &CapabilityKey,
    ) -> ScenarioResult<EventHandler>;

    /// Store a predecessor's interface under `key`.
    fn register_interface_to_node(
        &self,
        node_name: &str,
        key: CapabilityKey,
        iface: InterfaceRef,
    ) -> ScenarioResult<()>;

    /// Rebuild the implemented-handler map(s) from the leaf declarations.
    fn consolidate_implemented_handlers(&self);
}
