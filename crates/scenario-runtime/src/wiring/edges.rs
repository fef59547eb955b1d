//! # Declared Edges
//!
//! Collects every edge of a config tree together with the node-set level
//! it was declared at, and resolves endpoint tags against the leaf configs.

use scenario_types::{tag_of, ConfigRef, EdgeConfig, NodeConfig, NodeSetConfig, ScenarioError, ScenarioResult};

/// An edge and the node-set it was declared in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeclaredEdge<'a> {
    pub level: &'a str,
    pub edge: &'a EdgeConfig,
}

impl<'a> DeclaredEdge<'a> {
    pub fn pred_tag(&self) -> &'a str {
        tag_of(&self.edge.pred)
    }

    pub fn succ_tag(&self) -> &'a str {
        tag_of(&self.edge.succ)
    }
}

/// Every edge in the tree, levels in pre-order, edges in declaration order.
pub fn collect_edges(config: &NodeSetConfig) -> Vec<DeclaredEdge<'_>> {
    config
        .walk()
        .filter_map(|component| match component {
            ConfigRef::NodeSet(nodeset) => Some(nodeset),
            ConfigRef::Node(_) => None,
        })
        .flat_map(|nodeset| {
            nodeset.edges.iter().map(move |edge| DeclaredEdge {
                level: nodeset.name.as_str(),
                edge,
            })
        })
        .collect()
}

/// The single leaf config whose dependency tag is `tag`.
pub fn leaf_config_by_tag<'a>(config: &'a NodeSetConfig, tag: &str) -> ScenarioResult<&'a NodeConfig> {
    let mut matches = config.walk().filter_map(|component| match component {
        ConfigRef::Node(node) if node.dependency_tag() == tag => Some(node),
        _ => None,
    });

    let first = matches.next().ok_or_else(|| ScenarioError::UnresolvedTag {
        tag: tag.to_string(),
    })?;
    let rest: Vec<&NodeConfig> = matches.collect();
    if rest.is_empty() {
        Ok(first)
    } else {
        Err(ScenarioError::AmbiguousTag {
            tag: tag.to_string(),
            nodes: std::iter::once(first)
                .chain(rest)
                .map(|node| node.name.clone())
                .collect(),
        })
    }
}

/// An edge whose endpoints resolved to leaf configs.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedEdge<'a> {
    pub declared: DeclaredEdge<'a>,
    pub pred: &'a NodeConfig,
    pub succ: &'a NodeConfig,
}

/// Resolve the endpoints of every edge without instantiating anything.
pub fn resolve_edges(config: &NodeSetConfig) -> ScenarioResult<Vec<ResolvedEdge<'_>>> {
    collect_edges(config)
        .into_iter()
        .map(|declared| {
            Ok(ResolvedEdge {
                declared,
                pred: leaf_config_by_tag(config, declared.pred_tag())?,
                succ: leaf_config_by_tag(config, declared.succ_tag())?,
            })
        })
        .collect()
}
