//! # Scenario Core - Components and Dependencies
//!
//! The composite component tree and the bindings between its leaves.
//!
//! ```text
//! NodeSet "root"
//! ├── NodeSet "child_nodeset"
//! │   ├── Node "a"  (A: implements InterfaceA)
//! │   └── Node "b"  (B: receives InterfaceA, emits BEvent)
//! └── Node "d"      (D: handles B.BEvent)
//! ```
//!
//! ## Roles
//!
//! | Trait | Leaf | Composite |
//! |-------|------|-----------|
//! | [`Predecessor`] | own event / interface maps | delegates to named descendant |
//! | [`Successor`] | own handler / registered maps | delegates to named descendant |
//!
//! A [`Dependency`] exists only once its binding has been performed.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod capability;
pub mod component;
pub mod dependency;
pub mod leaf;
pub mod node;
pub mod nodeset;
pub mod ports;

pub use capability::{EventHandler, HandlerSet, InterfaceRef, InterfaceSet};
pub use component::ScenarioComponent;
pub use dependency::{CallableDependency, Dependency, EventDependency};
pub use leaf::{AsAny, Composite, Leaf, PlainComposite};
pub use node::Node;
pub use nodeset::NodeSet;
pub use ports::{Predecessor, Successor};
