//! # Scenario Bus - Event Registry for Leaf-to-Leaf Events
//!
//! Leaves never call each other to announce something. A predecessor emits
//! a named event, the registry calls every listener attached to it.
//!
//! ```text
//! ┌──────────────┐     emit()     ┌────────────────┐   listener()   ┌──────────────┐
//! │ Predecessor  │ ─────────────▶ │ EventRegistry  │ ─────────────▶ │  Successor   │
//! │   (A)        │  "B.BEvent"    │                │                │   (D)        │
//! └──────────────┘                └────────────────┘                └──────────────┘
//! ```
//!
//! ## Rules
//!
//! - Event names are `<leaf-type>.<contract>` and are global within one
//!   registry.
//! - Delivery is synchronous and in listener registration order.
//! - The registry is owned by the build that created it; there is no
//!   process-wide instance.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod registry;

pub use events::{payload, EventPayload, GraphEvent, Listener};
pub use registry::{BusError, EventRegistry};
