//! # Configuration Assembler
//!
//! Normalises a raw scenario mapping into one self-contained nested mapping
//! and parses it into the typed [`NodeSetConfig`] tree.
//!
//! ## Raw format
//!
//! ```yaml
//! name: scenario_ab_d
//! nodesetClass: scenario.NodeSet
//! nodesetConfigClass: scenario.NodeSetConfig
//! components:
//!   - name: child_nodeset
//!     nodesetClass: fixtures.nodeset_ab.SetOne
//!   - name: d
//!     nodeClass: fixtures.node_d.D
//! edges:
//!   - pred: child_nodeset.b
//!     succ: d
//!     edgeType: event
//!     edgeClass: fixtures.node_b.BEvent
//! componentConfigs:
//!   - name: child_nodeset
//!     nodesetPath: nodeset_ab.yml
//!   - name: d
//!     configClass: fixtures.node_d.DConfig
//!     attr: attr_d
//! ```
//!
//! ## Normalisation
//!
//! 1. `components` and `componentConfigs` must pair up one-to-one by `name`.
//! 2. A leaf declaration merges its `nodeClass` into its config block.
//! 3. A node-set declaration replaces its config block with the imported
//!    sub-tree, normalised recursively, keeping the call site's `name` and
//!    `nodesetClass`.
//! 4. The config blocks become the new `components` list.

pub mod loader;

use serde_json::{Map, Value};
use scenario_types::{fields, ConfigRef, NodeSetConfig, ScenarioError, ScenarioResult};
use tracing::{debug, info};

use crate::builder::names::NameRegistry;

pub use loader::{ConfigLoader, InMemoryLoader, YamlFileLoader};

/// Builds a typed config tree from a scenario file and its imports.
pub struct ConfigAssembler<'a> {
    loader: &'a dyn ConfigLoader,
}

impl<'a> ConfigAssembler<'a> {
    pub fn new(loader: &'a dyn ConfigLoader) -> Self {
        Self { loader }
    }

    /// Load, normalise and parse the scenario at `path`.
    pub fn build(&self, path: &str) -> ScenarioResult<NodeSetConfig> {
        let assembled = self.assemble_file(path)?;
        let config = parse_config(&assembled)?;
        info!(
            scenario = %config.name,
            leaves = config.leaf_names().len(),
            "[Assembler] Scenario config assembled"
        );
        Ok(config)
    }

    /// Load and normalise the scenario at `path`.
    pub fn assemble_file(&self, path: &str) -> ScenarioResult<Value> {
        let raw = self.loader.load(path)?;
        self.assemble_at(raw, path)
    }

    /// Normalise an already loaded mapping. Imports resolve through the loader.
    ///
    /// With no origin path a document that imports its own file is only
    /// caught once that file imports itself again; use [`Self::assemble_at`]
    /// when the origin is known.
    pub fn assemble(&self, raw: Value) -> ScenarioResult<Value> {
        self.normalise(raw, &mut Vec::new())
    }

    /// Normalise a mapping that was loaded from `origin`.
    pub fn assemble_at(&self, raw: Value, origin: &str) -> ScenarioResult<Value> {
        let mut imports = vec![self.loader.canonical(origin)];
        self.normalise(raw, &mut imports)
    }

    fn normalise(&self, raw: Value, imports: &mut Vec<String>) -> ScenarioResult<Value> {
        let Value::Object(mut root) = raw else {
            return Err(ScenarioError::ConfigFormat(
                "scenario must be a mapping".to_string(),
            ));
        };
        let scenario = root
            .get(fields::NAME)
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();

        let declarations = take_list(&mut root, fields::COMPONENTS, &scenario)?;
        let blocks = take_list(&mut root, fields::COMPONENT_CONFIGS, &scenario)?;
        check_pairing(&scenario, &declarations, &blocks)?;

        let mut components = Vec::with_capacity(blocks.len());
        for block in blocks {
            let Value::Object(mut block) = block else {
                return Err(ScenarioError::ConfigFormat(format!(
                    "config block in '{}' must be a mapping",
                    scenario
                )));
            };
            let name = block_name(&block, &scenario)?;
            let declaration = declarations
                .iter()
                .filter_map(Value::as_object)
                .find(|decl| decl.get(fields::NAME).and_then(Value::as_str) == Some(name.as_str()))
                .ok_or_else(|| {
                    ScenarioError::ConfigFormat(format!("component '{}' is not declared", name))
                })?;

            if let Some(node_class) = declaration.get(fields::NODE_CLASS) {
                block.insert(fields::NODE_CLASS.to_string(), node_class.clone());
                components.push(Value::Object(block));
            } else if let Some(nodeset_class) = declaration.get(fields::NODESET_CLASS) {
                let imported = self.import(&name, &block, imports)?;
                components.push(splice(imported, &name, nodeset_class.clone())?);
            } else {
                return Err(ScenarioError::ConfigFormat(format!(
                    "component '{}' declares neither '{}' nor '{}'",
                    name,
                    fields::NODE_CLASS,
                    fields::NODESET_CLASS
                )));
            }
        }

        root.insert(fields::COMPONENTS.to_string(), Value::Array(components));
        Ok(Value::Object(root))
    }

    /// Load and normalise the sub-tree referenced by a node-set block.
    fn import(
        &self,
        name: &str,
        block: &Map<String, Value>,
        imports: &mut Vec<String>,
    ) -> ScenarioResult<Value> {
        let path = block
            .get(fields::NODESET_PATH)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ScenarioError::ConfigFormat(format!(
                    "nodeset '{}' has no '{}'",
                    name,
                    fields::NODESET_PATH
                ))
            })?;

        let canonical = self.loader.canonical(path);
        if imports.contains(&canonical) {
            return Err(ScenarioError::ConfigFormat(format!(
                "nodeset '{}' imports '{}' which is already being imported",
                name, path
            )));
        }

        debug!(nodeset = %name, path, "[Assembler] Importing sub-tree");
        let raw = self.loader.load(path)?;
        imports.push(canonical);
        let result = self.normalise(raw, imports);
        imports.pop();

        result.map_err(|e| ScenarioError::ConfigFormat(format!(
            "nodeset {} has format issue: {}",
            name, e
        )))
    }
}

/// Parse a normalised mapping and check names are unique tree-wide.
pub fn parse_config(assembled: &Value) -> ScenarioResult<NodeSetConfig> {
    let config = NodeSetConfig::from_value(assembled)?;
    check_names(&config)?;
    Ok(config)
}

/// Global name check over a config tree, in pre-order.
pub fn check_names(config: &NodeSetConfig) -> ScenarioResult<NameRegistry> {
    let mut names = NameRegistry::new();
    for component in config.walk() {
        let owner = component.parent().unwrap_or(&config.name);
        names.register(component.name(), owner)?;
    }
    debug!(scenario = %config.name, names = names.len(), "[Assembler] Names unique");
    Ok(names)
}

/// Overwrite the imported tree's name and class with the call site's.
fn splice(imported: Value, name: &str, nodeset_class: Value) -> ScenarioResult<Value> {
    let Value::Object(mut imported) = imported else {
        return Err(ScenarioError::ConfigFormat(format!(
            "nodeset {} has format issue: not a mapping",
            name
        )));
    };
    imported.insert(fields::NAME.to_string(), Value::String(name.to_string()));
    imported.insert(fields::NODESET_CLASS.to_string(), nodeset_class);
    Ok(Value::Object(imported))
}

fn take_list(root: &mut Map<String, Value>, key: &str, scenario: &str) -> ScenarioResult<Vec<Value>> {
    match root.remove(key) {
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Null) | None => Ok(Vec::new()),
        Some(_) => Err(ScenarioError::ConfigFormat(format!(
            "'{}' of '{}' must be a list",
            key, scenario
        ))),
    }
}

fn block_name(block: &Map<String, Value>, scenario: &str) -> ScenarioResult<String> {
    block
        .get(fields::NAME)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ScenarioError::ConfigFormat(format!("unnamed component in '{}'", scenario))
        })
}

/// Every declaration has exactly one block and every block one declaration.
fn check_pairing(scenario: &str, declarations: &[Value], blocks: &[Value]) -> ScenarioResult<()> {
    let names_of = |items: &[Value]| -> ScenarioResult<Vec<String>> {
        items
            .iter()
            .map(|item| match item.as_object() {
                Some(map) => block_name(map, scenario),
                None => Err(ScenarioError::ConfigFormat(format!(
                    "component entry in '{}' must be a mapping",
                    scenario
                ))),
            })
            .collect()
    };
    let declared = names_of(declarations)?;
    let configured = names_of(blocks)?;

    for name in &declared {
        let count = configured.iter().filter(|other| *other == name).count();
        if count != 1 {
            return Err(ScenarioError::ConfigFormat(format!(
                "component '{}' in '{}' has {} config blocks, expected 1",
                name, scenario, count
            )));
        }
    }
    for name in &configured {
        let count = declared.iter().filter(|other| *other == name).count();
        if count != 1 {
            return Err(ScenarioError::ConfigFormat(format!(
                "config block '{}' in '{}' has {} component declarations, expected 1",
                name, scenario, count
            )));
        }
    }
    Ok(())
}

/// Find any config by name, reporting the owner it was found under.
pub fn locate<'c>(config: &'c NodeSetConfig, name: &str) -> ScenarioResult<(ConfigRef<'c>, &'c str)> {
    let found = config.get_child_component_config(name)?;
    Ok((found, found.parent().unwrap_or(&config.name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenario_types::{Config, EdgeKind};

    const ROOT: &str = r#"
name: scenario_ab_d
nodesetClass: scenario.NodeSet
nodesetConfigClass: scenario.NodeSetConfig
components:
  - name: child_nodeset
    nodesetClass: fixtures.nodeset_ab.SetOne
  - name: d
    nodeClass: fixtures.node_d.D
edges:
  - pred: child_nodeset.b
    succ: d
    edgeType: event
    edgeClass: fixtures.node_b.BEvent
componentConfigs:
  - name: child_nodeset
    nodesetPath: nodeset_ab.yml
  - name: d
    configClass: fixtures.node_d.DConfig
    attr: attr_d
"#;

    const SUB: &str = r#"
name: imported_name
nodesetClass: scenario.NodeSet
nodesetConfigClass: scenario.NodeSetConfig
components:
  - name: a
    nodeClass: fixtures.node_a.A
  - name: b
    nodeClass: fixtures.node_b.B
edges:
  - pred: a
    succ: b
    edgeType: callable
    edgeClass: fixtures.node_a.InterfaceA
componentConfigs:
  - name: a
    configClass: fixtures.node_a.AConfig
    attr: attr_a
  - name: b
    configClass: fixtures.node_b.BConfig
    attr: attr_b
"#;

    fn loader() -> InMemoryLoader {
        let mut loader = InMemoryLoader::new();
        loader.insert_yaml("scenario_ab_d.yml", ROOT).unwrap();
        loader.insert_yaml("nodeset_ab.yml", SUB).unwrap();
        loader
    }

    #[test]
    fn test_assemble_splices_sub_tree() {
        let loader = loader();
        let assembled = ConfigAssembler::new(&loader)
            .assemble_file("scenario_ab_d.yml")
            .unwrap();

        assert!(assembled.get(fields::COMPONENT_CONFIGS).is_none());
        let components = assembled[fields::COMPONENTS].as_array().unwrap();
        assert_eq!(components.len(), 2);

        // Call-site name and class win over the imported ones.
        let child = &components[0];
        assert_eq!(child[fields::NAME], "child_nodeset");
        assert_eq!(child[fields::NODESET_CLASS], "fixtures.nodeset_ab.SetOne");
        assert_eq!(child[fields::COMPONENTS][0][fields::NODE_CLASS], "fixtures.node_a.A");

        let d = &components[1];
        assert_eq!(d[fields::NODE_CLASS], "fixtures.node_d.D");
        assert_eq!(d["attr"], "attr_d");
    }

    #[test]
    fn test_build_typed_tree() {
        let loader = loader();
        let config = ConfigAssembler::new(&loader).build("scenario_ab_d.yml").unwrap();

        assert_eq!(config.leaf_names(), vec!["a", "b", "d"]);
        assert_eq!(config.edges[0].edge_kind, EdgeKind::Event);

        let child = config.get_nodeset_config("child_nodeset").unwrap();
        assert_eq!(child.nodeset_class, "fixtures.nodeset_ab.SetOne");
        assert_eq!(child.edges[0].edge_kind, EdgeKind::Callable);

        let (b, owner) = locate(&config, "b").unwrap();
        assert_eq!(b.name(), "b");
        assert_eq!(owner, "child_nodeset");
    }

    #[test]
    fn test_unpaired_block_is_format_error() {
        let mut raw: Value = serde_yaml::from_str(ROOT).unwrap();
        raw[fields::COMPONENT_CONFIGS]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"name": "ghost", "configClass": "x.Y"}));

        let loader = loader();
        let err = ConfigAssembler::new(&loader).assemble(raw).unwrap_err();
        assert!(matches!(err, ScenarioError::ConfigFormat(msg) if msg.contains("ghost")));
    }

    #[test]
    fn test_declaration_without_block_is_format_error() {
        let mut raw: Value = serde_yaml::from_str(ROOT).unwrap();
        raw[fields::COMPONENTS]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({"name": "lonely", "nodeClass": "x.Lonely"}));

        let loader = loader();
        let err = ConfigAssembler::new(&loader).assemble(raw).unwrap_err();
        assert!(matches!(err, ScenarioError::ConfigFormat(msg) if msg.contains("lonely")));
    }

    #[test]
    fn test_broken_import_names_sub_tree() {
        let mut loader = loader();
        loader
            .insert_yaml(
                "nodeset_ab.yml",
                "name: broken\ncomponents:\n  - name: a\n    nodeClass: x.A\n",
            )
            .unwrap();

        let err = ConfigAssembler::new(&loader)
            .assemble_file("scenario_ab_d.yml")
            .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::ConfigFormat(msg) if msg.starts_with("nodeset child_nodeset has format issue")
        ));
    }

    #[test]
    fn test_import_cycle_rejected() {
        let mut loader = InMemoryLoader::new();
        loader
            .insert_yaml(
                "loop.yml",
                r#"
name: loop
nodesetClass: scenario.NodeSet
nodesetConfigClass: scenario.NodeSetConfig
components:
  - name: inner
    nodesetClass: scenario.NodeSet
componentConfigs:
  - name: inner
    nodesetPath: loop.yml
"#,
            )
            .unwrap();

        let err = ConfigAssembler::new(&loader)
            .assemble_file("loop.yml")
            .unwrap_err();
        assert!(matches!(err, ScenarioError::ConfigFormat(msg) if msg.contains("already being imported")));
    }

    #[test]
    fn test_origin_catches_self_import_at_first_level() {
        let document = r#"
name: loop
nodesetClass: scenario.NodeSet
nodesetConfigClass: scenario.NodeSetConfig
components:
  - name: inner
    nodesetClass: scenario.NodeSet
componentConfigs:
  - name: inner
    nodesetPath: loop.yml
"#;
        let mut loader = InMemoryLoader::new();
        loader.insert_yaml("loop.yml", document).unwrap();
        let raw: Value = serde_yaml::from_str(document).unwrap();
        let assembler = ConfigAssembler::new(&loader);

        let err = assembler.assemble_at(raw.clone(), "loop.yml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Config format error: nodeset 'inner' imports 'loop.yml' which is already being imported"
        );

        // Without an origin the cycle surfaces one import deeper.
        let err = assembler.assemble(raw).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::ConfigFormat(msg) if msg.starts_with("nodeset inner has format issue")
        ));
    }

    #[test]
    fn test_duplicate_name_across_levels() {
        let mut loader = loader();
        loader
            .insert_yaml(
                "scenario_ab_d.yml",
                &ROOT.replace("  - name: d\n    nodeClass", "  - name: a\n    nodeClass")
                    .replace("  - name: d\n    configClass", "  - name: a\n    configClass"),
            )
            .unwrap();

        let err = ConfigAssembler::new(&loader)
            .build("scenario_ab_d.yml")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Naming conflict: name 'a' is already used in child_nodeset"
        );
    }

    #[test]
    fn test_check_names_registers_root() {
        let mut config = NodeSetConfig::new("root", "scenario.NodeSetConfig", "scenario.NodeSet");
        config.add_child_config(Config::from(NodeSetConfig::new(
            "root",
            "scenario.NodeSetConfig",
            "scenario.NodeSet",
        )));

        let err = check_names(&config).unwrap_err();
        assert!(matches!(err, ScenarioError::NamingConflict { ref owner, .. } if owner == "root"));
    }
}
