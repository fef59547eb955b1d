//! # Dependency Wiring
//!
//! - `edges` - collects declared edges per level and resolves tags on configs
//! - `engine` - binds resolved leaves into registered dependencies

pub mod edges;
pub mod engine;

pub use edges::{collect_edges, leaf_config_by_tag, resolve_edges, DeclaredEdge, ResolvedEdge};
pub use engine::WiringEngine;
