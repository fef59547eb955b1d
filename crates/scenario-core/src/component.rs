//! Either kind of scenario component.

use std::fmt;
use std::sync::Arc;

use crate::node::Node;
use crate::nodeset::NodeSet;

/// A child of a [`NodeSet`]: a leaf or a nested composite.
#[derive(Clone)]
pub enum ScenarioComponent {
    Node(Arc<Node>),
    NodeSet(Arc<NodeSet>),
}

impl ScenarioComponent {
    pub fn name(&self) -> &str {
        match self {
            Self::Node(node) => node.name(),
            Self::NodeSet(nodeset) => nodeset.name(),
        }
    }

    pub fn is_nodeset(&self) -> bool {
        matches!(self, Self::NodeSet(_))
    }

    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Self::Node(node) => Some(node),
            Self::NodeSet(_) => None,
        }
    }

    pub fn as_nodeset(&self) -> Option<&Arc<NodeSet>> {
        match self {
            Self::NodeSet(nodeset) => Some(nodeset),
            Self::Node(_) => None,
        }
    }

    /// Owning node-set, if attached and still alive.
    pub fn parent(&self) -> Option<Arc<NodeSet>> {
        match self {
            Self::Node(node) => node.parent(),
            Self::NodeSet(nodeset) => nodeset.parent(),
        }
    }

    /// Consolidate both capability maps of this component and below.
    pub fn consolidate(&self) {
        match self {
            Self::Node(node) => node.consolidate(),
            Self::NodeSet(nodeset) => nodeset.consolidate(),
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Node(a), Self::Node(b)) => Arc::ptr_eq(a, b),
            (Self::NodeSet(a), Self::NodeSet(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Arc<Node>> for ScenarioComponent {
    fn from(node: Arc<Node>) -> Self {
        Self::Node(node)
    }
}

impl From<Arc<NodeSet>> for ScenarioComponent {
    fn from(nodeset: Arc<NodeSet>) -> Self {
        Self::NodeSet(nodeset)
    }
}

impl fmt::Debug for ScenarioComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => write!(f, "Node({})", node.name()),
            Self::NodeSet(nodeset) => write!(f, "NodeSet({})", nodeset.name()),
        }
    }
}
