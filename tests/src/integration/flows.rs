//! # Integration Test Flows
//!
//! End-to-end builds of the scenario files under `resources/` against the
//! fixture registry.
//!
//! ## Flows Tested:
//!
//! 1. **Callable edge**: `a` hands `InterfaceA` to `b`
//! 2. **Event edge across levels**: `b` inside an imported sub-scenario
//!    notifies `d` outside it
//! 3. **Naming conflict**: the same leaf name in two sub-scenarios
//! 4. **Missing interface**: wiring stops at the first bad edge
//! 5. **Missing handler**: the event created on the predecessor survives

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use scenario_bus::{payload, EventRegistry};
    use scenario_core::{Predecessor, ScenarioComponent, Successor};
    use scenario_runtime::{
        build_scenario, loader_for, BuildStage, ConfigAssembler, InMemoryLoader, ScenarioPipeline,
        YamlFileLoader,
    };
    use scenario_types::{CapabilityKind, EdgeKind, ScenarioError};

    use crate::fixtures::{self, node_a::INTERFACE_RETURN_VALUE, BEvent, InterfaceA, SetOne, D};

    // =============================================================================
    // SCENARIO 1: CALLABLE EDGE
    // =============================================================================

    #[test]
    fn test_callable_edge_round_trip() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab.yml")).unwrap();
        let root = scenario.root();

        let a = root.get_child_node("a").unwrap();
        let b = root.get_child_node("b").unwrap();
        let key = a.key_for::<dyn InterfaceA>();
        assert_eq!(key.to_string(), "A.InterfaceA");

        let iface = b.registered_interface::<dyn InterfaceA>(&key).unwrap();
        assert_eq!(iface.interface_method(), INTERFACE_RETURN_VALUE);

        let leaf = a.leaf_as::<fixtures::A>().unwrap();
        assert_eq!(leaf.config.attr, "attr_a");
        assert_eq!(iface.interface_method(), leaf.interface_method());
    }

    #[test]
    fn test_callable_edge_recorded_on_root() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab.yml")).unwrap();

        let recorded = scenario.dependencies_at("scenario_ab");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].kind(), EdgeKind::Callable);
        assert_eq!(recorded[0].pred().name(), "a");
        assert_eq!(recorded[0].succ().name(), "b");
        assert_eq!(recorded[0].to_string(), "a -[callable A.InterfaceA]-> b");
    }

    // =============================================================================
    // SCENARIO 2: EVENT EDGE ACROSS NESTING LEVELS
    // =============================================================================

    #[test]
    fn test_event_edge_across_levels() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab_d.yml")).unwrap();
        let root = scenario.root();

        let d = root.get_child_node("d").unwrap().leaf_as::<D>().unwrap();
        assert_eq!(d.event_value(), None);

        // The event name is global to the registry, so a sibling can emit on it.
        let notified = root
            .notify_handlers("a", "B.BEvent", payload(BEvent::new("emitted event")))
            .unwrap();
        assert_eq!(notified, 1);
        assert_eq!(d.event_value().as_deref(), Some("emitted event"));

        let b = root.get_child_node("b").unwrap();
        b.emit(BEvent::new("from b")).unwrap();
        assert_eq!(d.event_value().as_deref(), Some("from b"));

        let last = scenario.events().last_value_as::<BEvent>("B.BEvent").unwrap();
        assert_eq!(last.msg, "from b");
    }

    #[test]
    fn test_imported_subtree_shape() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab_d.yml")).unwrap();
        let root = scenario.root();

        let child = root.get_nodeset("child_nodeset").unwrap();
        assert_eq!(child.nodeset_class(), fixtures::SET_ONE);
        assert_eq!(child.parent().unwrap().name(), "scenario_ab_d");
        assert!(root.has_child_nodeset());
        assert!(!child.has_child_nodeset());

        let names: Vec<String> = child.children().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(child.composite_as::<SetOne>().unwrap().attached(), names);
        assert!(root.composite_as::<SetOne>().is_none());

        let leaves: Vec<String> = root.leaves().iter().map(|n| n.name().to_string()).collect();
        assert_eq!(leaves, vec!["a", "b", "d"]);

        // Inner callable edge on the child level, event edge on the root.
        assert_eq!(scenario.dependencies_at("child_nodeset").len(), 1);
        assert_eq!(scenario.dependencies_at("scenario_ab_d").len(), 1);
        assert!(matches!(
            root.get_child_component("child_nodeset").unwrap(),
            ScenarioComponent::NodeSet(_)
        ));
    }

    #[test]
    fn test_summary_lists_tree_and_edges() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab_d.yml")).unwrap();

        let summary = scenario.summary();
        assert!(summary.contains("+ scenario_ab_d (scenario.NodeSet)"));
        assert!(summary.contains("  + child_nodeset (fixtures.nodeset_ab.SetOne)"));
        assert!(summary.contains("    - a (fixtures.node_a.A)"));
        assert!(summary.contains("b -[event B.BEvent]-> d"));
    }

    // =============================================================================
    // SCENARIO 3: NAMING CONFLICT
    // =============================================================================

    #[test]
    fn test_duplicate_name_across_subtrees() {
        let registry = fixtures::registry();
        let err = build_scenario(&registry, fixtures::resource("duplicate_names.yml")).unwrap_err();

        assert_eq!(err.stage, BuildStage::Unassembled);
        assert!(matches!(
            err.source,
            ScenarioError::NamingConflict { ref name, ref owner } if name == "a" && owner == "first"
        ));
        assert!(err.to_string().contains("already used in first"));
    }

    // =============================================================================
    // SCENARIO 4: MISSING INTERFACE
    // =============================================================================

    #[test]
    fn test_missing_interface_stops_wiring() {
        let registry = fixtures::registry();
        let events = Arc::new(EventRegistry::new());
        let (loader, file) = loader_for(&fixtures::resource("missing_interface.yml"));

        let err = ScenarioPipeline::new(&registry)
            .with_event_registry(Arc::clone(&events))
            .build_file(&loader, &file)
            .unwrap_err();

        assert_eq!(err.stage, BuildStage::Consolidated);
        assert!(matches!(
            err.source,
            ScenarioError::MissingCapability { ref node, ref key, capability: CapabilityKind::Interface }
                if node == "c" && key == "C.InterfaceA"
        ));
        // The event edge was declared first and so never started.
        assert!(!events.contains("B.BEvent"));
        assert_eq!(events.events_published(), 0);
    }

    // =============================================================================
    // SCENARIO 5: ORPHANED EVENT
    // =============================================================================

    #[test]
    fn test_event_survives_missing_handler() {
        let registry = fixtures::registry();
        let events = Arc::new(EventRegistry::new());
        let (loader, file) = loader_for(&fixtures::resource("missing_handler.yml"));

        let err = ScenarioPipeline::new(&registry)
            .with_event_registry(Arc::clone(&events))
            .build_file(&loader, &file)
            .unwrap_err();

        assert_eq!(err.kind(), "MissingCapabilityError");
        assert!(matches!(
            err.source,
            ScenarioError::MissingCapability { capability: CapabilityKind::EventHandler, .. }
        ));
        assert!(events.contains("B.BEvent"));
        assert_eq!(events.listener_count("B.BEvent"), 0);
    }

    // =============================================================================
    // LOADING
    // =============================================================================

    #[test]
    fn test_base_dir_resolves_nested_imports() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("parts");
        fs::create_dir(&nested).unwrap();
        fs::copy(fixtures::resource("nodeset_ab.yml"), nested.join("nodeset_ab.yml")).unwrap();
        let scenario = fs::read_to_string(fixtures::resource("scenario_ab_d.yml"))
            .unwrap()
            .replace("nodesetPath: nodeset_ab.yml", "nodesetPath: parts/nodeset_ab.yml");
        fs::write(dir.path().join("main.yml"), scenario).unwrap();

        let loader = YamlFileLoader::with_base_dir(dir.path());
        let registry = fixtures::registry();
        let built = ScenarioPipeline::new(&registry)
            .build_file(&loader, "main.yml")
            .unwrap();
        assert_eq!(built.root().leaves().len(), 3);
    }

    #[test]
    fn test_self_import_is_rejected() {
        let mut loader = InMemoryLoader::new();
        loader
            .insert_yaml(
                "loop.yml",
                r#"
name: loop
nodesetClass: scenario.NodeSet
nodesetConfigClass: scenario.NodeSetConfig
components:
  - name: again
    nodesetClass: scenario.NodeSet
componentConfigs:
  - name: again
    configClass: scenario.NodeSetConfig
    nodesetPath: loop.yml
"#,
            )
            .unwrap();

        let err = ConfigAssembler::new(&loader).build("loop.yml").unwrap_err();
        assert_eq!(err.kind(), "ConfigFormatError");
        assert!(err.to_string().contains("already being imported"));
    }

    #[test]
    fn test_unregistered_leaf_identity() {
        let registry = scenario_runtime::ComponentRegistry::new();
        let err = build_scenario(&registry, fixtures::resource("scenario_ab.yml")).unwrap_err();

        assert_eq!(err.stage, BuildStage::Assembled);
        assert!(matches!(err.source, ScenarioError::UnresolvedType { ref identity, .. } if identity == fixtures::NODE_A));
    }

    // =============================================================================
    // CAPABILITY CONTRACTS ON COMPOSITES
    // =============================================================================

    #[test]
    fn test_composite_delegates_to_descendant() {
        let registry = fixtures::registry();
        let scenario = build_scenario(&registry, fixtures::resource("scenario_ab_d.yml")).unwrap();
        let root = scenario.root();

        let a = root.get_child_node("a").unwrap();
        let key = a.key_for::<dyn InterfaceA>();
        let via_root = root.implemented_interface("a", &key).unwrap();
        let via_leaf = a.implemented_interface("a", &key).unwrap();
        assert_eq!(via_root, via_leaf);

        let d_key = root.get_child_node("d").unwrap().implemented_handler_keys().unwrap();
        assert_eq!(d_key.len(), 1);
        assert!(root.implemented_event_handler("d", &d_key[0]).is_ok());

        let err = root.implemented_event_handler("nobody", &d_key[0]).err().expect("expected error");
        assert_eq!(err.kind(), "ComponentNotFound");
    }
}
