//! # Tree Properties
//!
//! Properties that hold for every config tree, checked over generated trees:
//!
//! - the built leaves are exactly the declared leaves, each name once
//! - an edge binds the same pair of leaves whatever level declares it
//! - consolidating twice yields the same capability maps

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use proptest::prelude::*;
    use scenario_core::NodeSet;
    use scenario_runtime::{ScenarioPipeline, DEFAULT_NODESET_CLASS, DEFAULT_NODESET_CONFIG_CLASS};
    use scenario_types::{Config, EdgeConfig, EdgeKind, NodeConfig, NodeSetConfig, ScenarioError};

    use crate::fixtures::{self, BEvent, D};

    // =============================================================================
    // GENERATED TREES
    // =============================================================================

    #[derive(Debug, Clone)]
    enum Shape {
        Leaf,
        Set(Vec<Shape>),
    }

    fn shape() -> impl Strategy<Value = Shape> {
        Just(Shape::Leaf).prop_recursive(4, 32, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(Shape::Set)
        })
    }

    fn forest() -> impl Strategy<Value = Vec<Shape>> {
        prop::collection::vec(shape(), 1..5)
    }

    const LEAF_CLASSES: [&str; 4] = [fixtures::NODE_A, fixtures::NODE_B, fixtures::NODE_C, fixtures::NODE_D];

    /// Turns shapes into a config tree with unique generated names.
    struct Namer {
        next: usize,
    }

    impl Namer {
        fn fill(&mut self, parent: &mut NodeSetConfig, shapes: &[Shape]) {
            for shape in shapes {
                self.next += 1;
                match shape {
                    Shape::Leaf => {
                        let class = LEAF_CLASSES[self.next % LEAF_CLASSES.len()];
                        let name = format!("leaf_{}", self.next);
                        parent.add_child_config(NodeConfig::new(name, "fixtures.LeafConfig", class).into());
                    }
                    Shape::Set(children) => {
                        let mut set = nodeset(&format!("set_{}", self.next));
                        self.fill(&mut set, children);
                        parent.add_child_config(Config::from(set));
                    }
                }
            }
        }
    }

    fn nodeset(name: &str) -> NodeSetConfig {
        NodeSetConfig::new(name, DEFAULT_NODESET_CONFIG_CLASS, DEFAULT_NODESET_CLASS)
    }

    fn tree(shapes: &[Shape]) -> NodeSetConfig {
        let mut root = nodeset("root");
        Namer { next: 0 }.fill(&mut root, shapes);
        root
    }

    fn build(config: NodeSetConfig) -> Result<Arc<NodeSet>, ScenarioError> {
        let registry = fixtures::registry();
        ScenarioPipeline::new(&registry)
            .build_config(config)
            .map(|scenario| Arc::clone(scenario.root()))
            .map_err(|e| e.source)
    }

    /// A chain `root > set_1 > ... > set_depth > b`, with `d` directly under root.
    fn chain(depth: usize, edge_level: usize) -> NodeSetConfig {
        let mut inner: Config = NodeConfig::new("b", "fixtures.node_b.BConfig", fixtures::NODE_B).into();
        let mut path = vec!["b".to_string()];

        for level in (1..=depth).rev() {
            let name = format!("set_{}", level);
            let mut set = nodeset(&name);
            set.add_child_config(inner);
            if level == edge_level {
                set.add_edge_config(event_edge(&path));
            }
            path.insert(0, name);
            inner = Config::from(set);
        }

        let mut root = nodeset("root");
        root.add_child_config(inner);
        root.add_child_config(NodeConfig::new("d", "fixtures.node_d.DConfig", fixtures::NODE_D).into());
        if edge_level == 0 {
            root.add_edge_config(event_edge(&path));
        }
        root
    }

    fn event_edge(path: &[String]) -> EdgeConfig {
        EdgeConfig::new(path.join("."), "d", fixtures::B_EVENT, EdgeKind::Event)
    }

    // =============================================================================
    // PROPERTIES
    // =============================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_built_leaves_match_declared(shapes in forest()) {
            let config = tree(&shapes);
            let declared: Vec<String> = config.leaf_names().into_iter().map(str::to_string).collect();

            let root = build(config).unwrap();
            let built: Vec<String> = root.leaves().iter().map(|n| n.name().to_string()).collect();

            prop_assert_eq!(&built, &declared);
            let unique: BTreeSet<&String> = built.iter().collect();
            prop_assert_eq!(unique.len(), built.len());
        }

        #[test]
        fn test_duplicate_leaf_name_always_rejected(shapes in forest(), extra in shape()) {
            let mut config = tree(&shapes);
            let mut first_leaf = None;
            for component in config.walk() {
                if let scenario_types::ConfigRef::Node(node) = component {
                    first_leaf = Some(node.name.clone());
                    break;
                }
            }
            prop_assume!(first_leaf.is_some());
            let duplicate = first_leaf.unwrap_or_default();

            let mut set = nodeset("extra_set");
            Namer { next: 1000 }.fill(&mut set, std::slice::from_ref(&extra));
            set.add_child_config(NodeConfig::new(duplicate.clone(), "fixtures.LeafConfig", fixtures::NODE_C).into());
            config.add_child_config(Config::from(set));

            let err = build(config).unwrap_err();
            prop_assert!(
                matches!(err, ScenarioError::NamingConflict { ref name, .. } if *name == duplicate),
                "unexpected error: {}",
                err
            );
        }

        #[test]
        fn test_edge_binding_independent_of_depth(depth in 0usize..6, level_seed in 0usize..6) {
            let edge_level = level_seed % (depth + 1);
            let root = build(chain(depth, edge_level)).unwrap();

            let b = root.get_child_node("b").unwrap();
            b.emit(BEvent::new(format!("depth {}", depth))).unwrap();

            let d = root.get_child_node("d").unwrap().leaf_as::<D>().unwrap();
            prop_assert_eq!(d.event_value(), Some(format!("depth {}", depth)));

            let level = if edge_level == 0 { "root".to_string() } else { format!("set_{}", edge_level) };
            let recorded = root.get_nodeset(&level).unwrap().dependencies();
            prop_assert_eq!(recorded.len(), 1);
            prop_assert_eq!(recorded[0].pred().name(), "b");
            prop_assert_eq!(recorded[0].succ().name(), "d");
        }

        #[test]
        fn test_consolidation_idempotent(shapes in forest()) {
            let root = build(tree(&shapes)).unwrap();

            let before: Vec<_> = root
                .leaves()
                .iter()
                .map(|n| (n.implemented_interfaces().unwrap(), n.implemented_handler_keys().unwrap()))
                .collect();
            root.consolidate();
            root.consolidate();
            let after: Vec<_> = root
                .leaves()
                .iter()
                .map(|n| (n.implemented_interfaces().unwrap(), n.implemented_handler_keys().unwrap()))
                .collect();

            prop_assert_eq!(before, after);
        }
    }
}
