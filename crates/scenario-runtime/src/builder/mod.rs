//! # Composite Tree Builder
//!
//! Instantiates the component tree described by a [`NodeSetConfig`].
//!
//! The traversal is a worklist of `(owner, config)` pairs: popping a pair
//! constructs the component, checks its name against every name seen so
//! far and attaches it to `owner`. A node-set pushes its own children with
//! itself as owner. Children are pushed in reverse so that they are built
//! and attached in declaration order.
//!
//! The root is constructed first and is never attached to anything.

pub mod names;

use std::sync::Arc;

use scenario_bus::EventRegistry;
use scenario_core::{NodeSet, ScenarioComponent};
use scenario_types::{Config, NodeSetConfig, ScenarioResult};
use tracing::{debug, info};

use crate::registry::ComponentRegistry;

pub use names::NameRegistry;

/// Builds component trees from typed configs.
pub struct ScenarioBuilder<'a> {
    registry: &'a ComponentRegistry,
    events: Arc<EventRegistry>,
}

impl<'a> ScenarioBuilder<'a> {
    pub fn new(registry: &'a ComponentRegistry, events: Arc<EventRegistry>) -> Self {
        Self { registry, events }
    }

    pub fn events(&self) -> &Arc<EventRegistry> {
        &self.events
    }

    /// Instantiate the whole tree, then consolidate every leaf's capabilities.
    pub fn build_components(&self, config: &NodeSetConfig) -> ScenarioResult<Arc<NodeSet>> {
        let root = self.instantiate(config)?;
        root.consolidate();
        info!(scenario = %root.name(), "[Builder] Capabilities consolidated");
        Ok(root)
    }

    /// Instantiate the whole tree without consolidating it.
    pub fn instantiate(&self, config: &NodeSetConfig) -> ScenarioResult<Arc<NodeSet>> {
        let root = self.registry.instantiate_nodeset(config)?;
        let mut names = NameRegistry::new();
        names.register(root.name(), root.name())?;

        let mut worklist: Vec<(Arc<NodeSet>, &Config)> = config
            .components
            .iter()
            .rev()
            .map(|child| (Arc::clone(&root), child))
            .collect();

        while let Some((owner, config)) = worklist.pop() {
            let component = match config {
                Config::Node(node_config) => {
                    ScenarioComponent::Node(self.registry.instantiate_node(node_config, &self.events)?)
                }
                Config::NodeSet(nodeset_config) => {
                    let nodeset = self.registry.instantiate_nodeset(nodeset_config)?;
                    worklist.extend(
                        nodeset_config
                            .components
                            .iter()
                            .rev()
                            .map(|child| (Arc::clone(&nodeset), child)),
                    );
                    ScenarioComponent::NodeSet(nodeset)
                }
            };

            names.register(component.name(), owner.name())?;
            owner.add_child(component.clone())?;
            debug!(
                owner = %owner.name(),
                component = %component.name(),
                "[Builder] Component attached"
            );
        }

        info!(
            scenario = %root.name(),
            components = names.len(),
            "[Builder] Component tree instantiated"
        );
        Ok(root)
    }
}
