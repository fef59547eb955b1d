//! # Error Types
//!
//! Defines the single error type shared by every stage of the build
//! pipeline. Every variant aborts the whole pipeline; nothing is retried.

use std::fmt;

use thiserror::Error;

/// Which kind of identity a type resolver was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Leaf implementation (`nodeClass`).
    Node,
    /// Composite implementation (`nodesetClass`).
    NodeSet,
    /// Event payload or interface contract (`edgeClass`).
    Contract,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "node"),
            Self::NodeSet => write!(f, "nodeset"),
            Self::Contract => write!(f, "contract"),
        }
    }
}

/// Which capability map a lookup was performed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    /// `implemented_interfaces` of a predecessor.
    Interface,
    /// `implemented_event_handlers` of a successor.
    EventHandler,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interface => write!(f, "interface"),
            Self::EventHandler => write!(f, "event handler"),
        }
    }
}

/// Errors raised while assembling, building or wiring a scenario.
#[derive(Debug, Clone, Error)]
pub enum ScenarioError {
    /// A configuration block is malformed or an imported sub-tree failed
    /// re-validation after splicing.
    #[error("Config format error: {0}")]
    ConfigFormat(String),

    /// A component name is already registered somewhere in the tree.
    #[error("Naming conflict: name '{name}' is already used in {owner}")]
    NamingConflict { name: String, owner: String },

    /// No leaf anywhere in the tree carries this dependency tag.
    #[error("Unresolved tag: no node with dependency tag '{tag}' found")]
    UnresolvedTag { tag: String },

    /// The computed compound key is absent from the relevant capability map.
    #[error("Missing capability: node '{node}' has no implemented {capability} for '{key}'")]
    MissingCapability {
        node: String,
        key: String,
        capability: CapabilityKind,
    },

    /// The type resolver has no entry for this identity.
    #[error("Unresolved type: no {kind} registered for '{identity}'")]
    UnresolvedType { identity: String, kind: TypeKind },

    /// A lookup by component name found nothing.
    #[error("Component not found: '{name}'")]
    ComponentNotFound { name: String },

    /// An operation addressed to one leaf reached a different one.
    #[error("Node name mismatch: expected '{expected}', got '{actual}'")]
    NodeNameMismatch { expected: String, actual: String },

    /// More than one leaf carries the same dependency tag.
    #[error("Ambiguous tag: '{tag}' is carried by {nodes:?}")]
    AmbiguousTag { tag: String, nodes: Vec<String> },

    /// A component already has a parent and cannot be attached again.
    #[error("Component '{name}' is already attached to '{parent}'")]
    AlreadyAttached { name: String, parent: String },

    /// A capability map was read before consolidation populated it.
    #[error("Node '{node}': capabilities read before consolidation")]
    NotConsolidated { node: String },

    /// An event name is not present in the event registry.
    #[error("Unknown event: '{event}'")]
    UnknownEvent { event: String },

    /// A configuration source could not be read or parsed.
    #[error("Failed to load '{path}': {reason}")]
    Load { path: String, reason: String },
}

impl ScenarioError {
    /// Short, stable name of the error kind, used in logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigFormat(_) => "ConfigFormatError",
            Self::NamingConflict { .. } => "NamingConflictError",
            Self::UnresolvedTag { .. } => "UnresolvedTagError",
            Self::MissingCapability { .. } => "MissingCapabilityError",
            Self::UnresolvedType { .. } => "UnresolvedTypeError",
            Self::ComponentNotFound { .. } => "ComponentNotFound",
            Self::NodeNameMismatch { .. } => "NodeNameMismatch",
            Self::AmbiguousTag { .. } => "AmbiguousTagError",
            Self::AlreadyAttached { .. } => "AlreadyAttached",
            Self::NotConsolidated { .. } => "NotConsolidated",
            Self::UnknownEvent { .. } => "UnknownEvent",
            Self::Load { .. } => "LoadError",
        }
    }
}

/// Result type for scenario operations.
pub type ScenarioResult<T> = Result<T, ScenarioError>;
