//! # Capability Keys
//!
//! Capabilities are looked up by a compound key `<leaf-type>.<contract>`,
//! e.g. `A.InterfaceA` or `B.BEvent`. The leaf type is the final segment of
//! the leaf's `nodeClass` identity; the contract is the short name of an
//! event payload type or interface trait.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A type that can travel along an edge: an event payload or an interface.
///
/// Implemented for payload structs and for `dyn Trait` interface objects:
///
/// ```rust,ignore
/// impl Contract for dyn InterfaceA { const NAME: &'static str = "InterfaceA"; }
/// impl Contract for BEvent { const NAME: &'static str = "BEvent"; }
/// ```
pub trait Contract {
    /// Short contract name used in compound keys.
    const NAME: &'static str;
}

/// Resolved identity of an edge's payload class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContractId(String);

impl ContractId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Contract id for a Rust type implementing [`Contract`].
    #[must_use]
    pub fn of<C: Contract + ?Sized>() -> Self {
        Self(C::NAME.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compound key `<leaf-type>.<contract>` for capability maps and event names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CapabilityKey {
    leaf_type: String,
    contract: ContractId,
}

impl CapabilityKey {
    pub fn new(leaf_type: impl Into<String>, contract: ContractId) -> Self {
        Self {
            leaf_type: leaf_type.into(),
            contract,
        }
    }

    pub fn leaf_type(&self) -> &str {
        &self.leaf_type
    }

    pub fn contract(&self) -> &ContractId {
        &self.contract
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.leaf_type, self.contract)
    }
}

/// Final segment of a dotted path: the dependency tag of an edge endpoint.
///
/// `child_nodeset.b` and `b` both resolve to `b`.
#[must_use]
pub fn tag_of(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Short type name of a dotted implementation identity.
///
/// `fixtures.node_a.A` becomes `A`.
#[must_use]
pub fn short_name(identity: &str) -> &str {
    tag_of(identity)
}
