//! # Dependencies
//!
//! A dependency binds one predecessor leaf to one successor leaf. There is
//! no activation step: `register` performs the binding and only returns a
//! value once it succeeded.
//!
//! Nothing is rolled back on failure. An event created for an edge whose
//! successor has no matching handler stays in the registry.

use std::fmt;
use std::sync::Arc;

use scenario_types::{CapabilityKey, ContractId, EdgeKind, ScenarioResult};
use tracing::info;

use crate::node::Node;
use crate::ports::{Predecessor, Successor};

/// Event edge: the successor's handler listens to the predecessor's event.
#[derive(Clone)]
pub struct EventDependency {
    pred: Arc<Node>,
    succ: Arc<Node>,
    contract: ContractId,
    key: CapabilityKey,
}

impl EventDependency {
    pub fn register(pred: &Arc<Node>, succ: &Arc<Node>, contract: ContractId) -> ScenarioResult<Self> {
        let key = CapabilityKey::new(pred.leaf_type(), contract.clone());
        let event = key.to_string();

        if !pred.has_event(pred.name(), &event)? {
            info!(event = %event, "[Dependency] Event does not exist, creating it");
            pred.add_event(pred.name(), &event)?;
        }

        let handler = succ.implemented_event_handler(succ.name(), &key)?;
        pred.register_handler_to_event(pred.name(), &event, handler)?;

        info!(
            succ = %succ.name(),
            key = %key,
            pred = %pred.name(),
            "[Dependency] Handler registered to event"
        );

        Ok(Self {
            pred: Arc::clone(pred),
            succ: Arc::clone(succ),
            contract,
            key,
        })
    }
}

/// Callable edge: the successor receives the predecessor's interface.
#[derive(Clone)]
pub struct CallableDependency {
    pred: Arc<Node>,
    succ: Arc<Node>,
    contract: ContractId,
    key: CapabilityKey,
}

impl CallableDependency {
    pub fn register(pred: &Arc<Node>, succ: &Arc<Node>, contract: ContractId) -> ScenarioResult<Self> {
        let key = CapabilityKey::new(pred.leaf_type(), contract.clone());

        let iface = pred.implemented_interface(pred.name(), &key)?;
        succ.register_interface_to_node(succ.name(), key.clone(), iface)?;

        info!(
            succ = %succ.name(),
            key = %key,
            pred = %pred.name(),
            "[Dependency] Interface registered to node"
        );

        Ok(Self {
            pred: Arc::clone(pred),
            succ: Arc::clone(succ),
            contract,
            key,
        })
    }
}

/// A registered dependency of either kind.
#[derive(Clone)]
pub enum Dependency {
    Event(EventDependency),
    Callable(CallableDependency),
}

impl Dependency {
    /// Register an edge of the given kind.
    pub fn register(
        kind: EdgeKind,
        pred: &Arc<Node>,
        succ: &Arc<Node>,
        contract: ContractId,
    ) -> ScenarioResult<Self> {
        match kind {
            EdgeKind::Event => EventDependency::register(pred, succ, contract).map(Self::Event),
            EdgeKind::Callable => {
                CallableDependency::register(pred, succ, contract).map(Self::Callable)
            }
        }
    }

    pub fn kind(&self) -> EdgeKind {
        match self {
            Self::Event(_) => EdgeKind::Event,
            Self::Callable(_) => EdgeKind::Callable,
        }
    }

    pub fn pred(&self) -> &Arc<Node> {
        match self {
            Self::Event(dep) => &dep.pred,
            Self::Callable(dep) => &dep.pred,
        }
    }

    pub fn succ(&self) -> &Arc<Node> {
        match self {
            Self::Event(dep) => &dep.succ,
            Self::Callable(dep) => &dep.succ,
        }
    }

    pub fn contract(&self) -> &ContractId {
        match self {
            Self::Event(dep) => &dep.contract,
            Self::Callable(dep) => &dep.contract,
        }
    }

    /// Event name or interface key this dependency was bound under.
    pub fn key(&self) -> &CapabilityKey {
        match self {
            Self::Event(dep) => &dep.key,
            Self::Callable(dep) => &dep.key,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{} {}]-> {}",
            self.pred().name(),
            self.kind(),
            self.key(),
            self.succ().name()
        )
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency({})", self)
    }
}
