//! # Scenario Types Crate
//!
//! This crate contains the typed configuration tree, the compound capability
//! keys and the pipeline error type shared by every other crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Config and key types are defined only here.
//! - **Tags, not paths**: Edge endpoints are dotted paths whose last segment
//!   alone identifies the leaf (see [`keys::tag_of`]).
//! - **Fail fast**: Every [`ScenarioError`] aborts the pipeline.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod config;
pub mod errors;
pub mod keys;

pub use config::{
    fields, Config, ConfigRef, ConfigWalk, EdgeConfig, EdgeKind, NodeConfig, NodeSetConfig,
};
pub use errors::{CapabilityKind, ScenarioError, ScenarioResult, TypeKind};
pub use keys::{short_name, tag_of, CapabilityKey, Contract, ContractId};
