//! # Component Registry
//!
//! Explicit replacement for loading implementations by dotted class path.
//! Every identity a scenario file may name is registered up front:
//!
//! | Config field | Registered with | Produces |
//! |--------------|-----------------|----------|
//! | `nodeClass` | [`ComponentRegistry::register_node`] | `Arc<dyn Leaf>` |
//! | `nodesetClass` | [`ComponentRegistry::register_nodeset`] | `Arc<dyn Composite>` |
//! | `edgeClass` | [`ComponentRegistry::register_contract`] | [`ContractId`] |
//!
//! ```rust,ignore
//! let registry = ComponentRegistry::new();
//! registry.register_node("fixtures.node_a.A", |config| Ok(Arc::new(A::from_config(config)?) as _));
//! registry.register_contract::<dyn InterfaceA>("fixtures.node_a.InterfaceA");
//! ```
//!
//! Lookups of unregistered identities fail with `UnresolvedType`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use scenario_bus::EventRegistry;
use scenario_core::{Composite, Leaf, Node, NodeSet, PlainComposite};
use scenario_types::{
    Contract, ContractId, NodeConfig, NodeSetConfig, ScenarioError, ScenarioResult, TypeKind,
};
use tracing::{debug, info};

/// Identity of the behaviour-less composite, registered by default.
pub const DEFAULT_NODESET_CLASS: &str = "scenario.NodeSet";

/// Identity of the default node-set config variant.
pub const DEFAULT_NODESET_CONFIG_CLASS: &str = "scenario.NodeSetConfig";

/// Builds a leaf from its config.
pub type NodeFactory = Arc<dyn Fn(&NodeConfig) -> ScenarioResult<Arc<dyn Leaf>> + Send + Sync>;

/// Builds a composite's behaviour from its config.
pub type NodeSetFactory =
    Arc<dyn Fn(&NodeSetConfig) -> ScenarioResult<Arc<dyn Composite>> + Send + Sync>;

/// Maps configured identities to constructors and contracts.
pub struct ComponentRegistry {
    nodes: RwLock<HashMap<String, NodeFactory>>,
    nodesets: RwLock<HashMap<String, NodeSetFactory>>,
    contracts: RwLock<HashMap<String, ContractId>>,
}

impl ComponentRegistry {
    /// Registry with [`DEFAULT_NODESET_CLASS`] already registered.
    #[must_use]
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register_nodeset(DEFAULT_NODESET_CLASS, |_| {
            Ok(Arc::new(PlainComposite) as Arc<dyn Composite>)
        });
        registry
    }

    /// Registry with nothing registered.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
            nodesets: RwLock::new(HashMap::new()),
            contracts: RwLock::new(HashMap::new()),
        }
    }

    /// Register a leaf constructor. Re-registering an identity replaces it.
    pub fn register_node<F>(&self, identity: impl Into<String>, factory: F) -> &Self
    where
        F: Fn(&NodeConfig) -> ScenarioResult<Arc<dyn Leaf>> + Send + Sync + 'static,
    {
        let identity = identity.into();
        debug!(identity = %identity, "[Registry] Node registered");
        self.nodes.write().insert(identity, Arc::new(factory));
        self
    }

    /// Register a composite constructor.
    pub fn register_nodeset<F>(&self, identity: impl Into<String>, factory: F) -> &Self
    where
        F: Fn(&NodeSetConfig) -> ScenarioResult<Arc<dyn Composite>> + Send + Sync + 'static,
    {
        let identity = identity.into();
        debug!(identity = %identity, "[Registry] NodeSet registered");
        self.nodesets.write().insert(identity, Arc::new(factory));
        self
    }

    /// Register `C` under a configured `edgeClass` identity.
    pub fn register_contract<C: Contract + ?Sized>(&self, identity: impl Into<String>) -> ContractId {
        let identity = identity.into();
        let contract = ContractId::of::<C>();
        debug!(identity = %identity, contract = %contract, "[Registry] Contract registered");
        self.contracts.write().insert(identity, contract.clone());
        contract
    }

    pub fn resolve_node(&self, identity: &str) -> ScenarioResult<NodeFactory> {
        self.nodes
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| unresolved(identity, TypeKind::Node))
    }

    pub fn resolve_nodeset(&self, identity: &str) -> ScenarioResult<NodeSetFactory> {
        self.nodesets
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| unresolved(identity, TypeKind::NodeSet))
    }

    pub fn resolve_contract(&self, identity: &str) -> ScenarioResult<ContractId> {
        self.contracts
            .read()
            .get(identity)
            .cloned()
            .ok_or_else(|| unresolved(identity, TypeKind::Contract))
    }

    /// Construct the leaf named by `config.node_class` and wrap it in a node.
    pub fn instantiate_node(
        &self,
        config: &NodeConfig,
        events: &Arc<EventRegistry>,
    ) -> ScenarioResult<Arc<Node>> {
        let factory = self.resolve_node(&config.node_class)?;
        let leaf = factory(config)?;
        Ok(Node::new(config.clone(), leaf, Arc::clone(events)))
    }

    /// Construct an empty node-set of type `config.nodeset_class`.
    pub fn instantiate_nodeset(&self, config: &NodeSetConfig) -> ScenarioResult<Arc<NodeSet>> {
        let factory = self.resolve_nodeset(&config.nodeset_class)?;
        let composite = factory(config)?;
        Ok(NodeSet::new(config, composite))
    }

    /// Registered identities per kind, sorted.
    pub fn identities(&self, kind: TypeKind) -> Vec<String> {
        let mut names: Vec<String> = match kind {
            TypeKind::Node => self.nodes.read().keys().cloned().collect(),
            TypeKind::NodeSet => self.nodesets.read().keys().cloned().collect(),
            TypeKind::Contract => self.contracts.read().keys().cloned().collect(),
        };
        names.sort();
        names
    }

    /// Log a one-line summary of what is registered.
    pub fn log_summary(&self) {
        info!(
            nodes = self.nodes.read().len(),
            nodesets = self.nodesets.read().len(),
            contracts = self.contracts.read().len(),
            "[Registry] Component registry ready"
        );
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn unresolved(identity: &str, kind: TypeKind) -> ScenarioError {
    ScenarioError::UnresolvedType {
        identity: identity.to_string(),
        kind,
    }
}
