//! # Dependency Wiring Engine
//!
//! Turns declared edges into registered [`Dependency`] objects.
//!
//! Edges are wired in the reverse of their collection order. Endpoints are
//! resolved against the whole tree by tag, so the level an edge was
//! declared at only decides which node-set records the dependency.

use std::sync::Arc;

use scenario_core::{Dependency, NodeSet};
use scenario_types::{NodeSetConfig, ScenarioResult};
use tracing::{debug, info};

use crate::registry::ComponentRegistry;
use crate::wiring::edges::collect_edges;

pub struct WiringEngine<'a> {
    registry: &'a ComponentRegistry,
}

impl<'a> WiringEngine<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self { registry }
    }

    /// Wire every edge in `config` into the tree rooted at `root`.
    ///
    /// Stops at the first failure. Bindings made before it stay in place.
    pub fn wire(&self, root: &Arc<NodeSet>, config: &NodeSetConfig) -> ScenarioResult<Vec<Dependency>> {
        let edges = collect_edges(config);
        let mut wired = Vec::with_capacity(edges.len());

        for declared in edges.iter().rev() {
            let pred = root.get_child_node_by_tag(declared.pred_tag())?;
            let succ = root.get_child_node_by_tag(declared.succ_tag())?;
            let contract = self.registry.resolve_contract(&declared.edge.edge_payload_class)?;

            root.consolidate();
            let dependency = Dependency::register(declared.edge.edge_kind, &pred, &succ, contract)?;

            let level = root.get_nodeset(declared.level)?;
            level.add_edge(dependency.clone());
            debug!(level = %declared.level, dependency = %dependency, "[Wiring] Dependency recorded");
            wired.push(dependency);
        }

        info!(
            scenario = %root.name(),
            dependencies = wired.len(),
            "[Wiring] All edges wired"
        );
        Ok(wired)
    }
}
