//! # Scenario Configuration
//!
//! Strongly-typed configuration tree parsed from the self-contained nested
//! mapping produced by the assembler.
//!
//! ```text
//! NodeSetConfig (root)
//!   ├── NodeConfig        a
//!   ├── NodeSetConfig     child_nodeset
//!   │     ├── NodeConfig  b
//!   │     └── edges: [a -> b]
//!   └── edges: [child_nodeset.b -> d]
//! ```
//!
//! The tree owns its children. `parent` is the *name* of the owning
//! node-set config, set once when a config is attached, and never an
//! ownership edge.

use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ScenarioError, ScenarioResult};

/// Keywords of the scenario configuration format.
pub mod fields {
    pub const NAME: &str = "name";
    pub const NODESET_CLASS: &str = "nodesetClass";
    pub const NODESET_CONFIG_CLASS: &str = "nodesetConfigClass";

    pub const COMPONENTS: &str = "components";
    pub const NODE_CLASS: &str = "nodeClass";

    pub const EDGES: &str = "edges";
    pub const EDGE_PRED: &str = "pred";
    pub const EDGE_SUCC: &str = "succ";
    pub const EDGE_TYPE: &str = "edgeType";
    pub const EDGE_CLASS: &str = "edgeClass";

    pub const COMPONENT_CONFIGS: &str = "componentConfigs";
    pub const CONFIG_CLASS: &str = "configClass";
    pub const NODESET_PATH: &str = "nodesetPath";
    pub const DEPENDENCY_TAG: &str = "dependencyTag";
}

/// Kind of a declared dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Successor handler listens on a predecessor event.
    Event,
    /// Successor receives a reference to a predecessor interface.
    Callable,
}

impl EdgeKind {
    const VARIANTS: &'static [&'static str] = &["event", "callable"];

    /// Parse an `edgeType` value, ignoring case.
    pub fn parse(raw: &str) -> ScenarioResult<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "event" => Ok(Self::Event),
            "callable" => Ok(Self::Callable),
            other => Err(ScenarioError::ConfigFormat(format!(
                "unknown edgeType '{}', expected 'event' or 'callable'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Callable => "callable",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|_| de::Error::unknown_variant(&raw, Self::VARIANTS))
    }
}

/// A declared dependency between two leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Dotted path to the predecessor; only the last segment is significant.
    pub pred: String,
    /// Dotted path to the successor; only the last segment is significant.
    pub succ: String,
    /// Identity of the shared contract type.
    #[serde(rename = "edgeClass")]
    pub edge_payload_class: String,
    #[serde(rename = "edgeType")]
    pub edge_kind: EdgeKind,
}

impl EdgeConfig {
    pub fn new(
        pred: impl Into<String>,
        succ: impl Into<String>,
        edge_payload_class: impl Into<String>,
        edge_kind: EdgeKind,
    ) -> Self {
        Self {
            pred: pred.into(),
            succ: succ.into(),
            edge_payload_class: edge_payload_class.into(),
            edge_kind,
        }
    }

    pub fn from_value(value: &Value) -> ScenarioResult<Self> {
        Self::deserialize(value).map_err(format_error)
    }
}

/// Configuration of a leaf node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub name: String,
    pub config_class: String,
    pub node_class: String,
    /// Explicit edge-resolution tag. See [`NodeConfig::dependency_tag`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_tag: Option<String>,
    /// Leaf-specific fields, deserialised by the leaf itself.
    #[serde(flatten)]
    pub settings: Map<String, Value>,
    #[serde(skip)]
    pub parent: Option<String>,
}

impl NodeConfig {
    pub fn new(
        name: impl Into<String>,
        config_class: impl Into<String>,
        node_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            config_class: config_class.into(),
            node_class: node_class.into(),
            dependency_tag: None,
            settings: Map::new(),
            parent: None,
        }
    }

    /// Add one leaf-specific setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_dependency_tag(mut self, tag: impl Into<String>) -> Self {
        self.dependency_tag = Some(tag.into());
        self
    }

    /// Tag used to resolve edge endpoints. Defaults to `name`.
    pub fn dependency_tag(&self) -> &str {
        self.dependency_tag.as_deref().unwrap_or(&self.name)
    }

    pub fn from_value(value: &Value) -> ScenarioResult<Self> {
        Self::deserialize(value).map_err(format_error)
    }

    /// Deserialise the leaf-specific settings into a typed struct.
    pub fn settings_as<T: serde::de::DeserializeOwned>(&self) -> ScenarioResult<T> {
        serde_json::from_value(Value::Object(self.settings.clone())).map_err(|e| {
            ScenarioError::ConfigFormat(format!("settings of node '{}': {}", self.name, e))
        })
    }
}

/// Configuration of a composite node-set.
///
/// `parent` links are not part of the format; [`NodeSetConfig::from_value`]
/// fills them in after deserialising.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSetConfig {
    pub name: String,
    #[serde(rename = "nodesetConfigClass")]
    pub config_class: String,
    pub nodeset_class: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub components: Vec<Config>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub edges: Vec<EdgeConfig>,
    #[serde(skip)]
    pub parent: Option<String>,
}

impl NodeSetConfig {
    pub fn new(
        name: impl Into<String>,
        config_class: impl Into<String>,
        nodeset_class: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            config_class: config_class.into(),
            nodeset_class: nodeset_class.into(),
            components: Vec::new(),
            edges: Vec::new(),
            parent: None,
        }
    }

    /// Parse an assembled nested mapping, recursively.
    pub fn from_value(value: &Value) -> ScenarioResult<Self> {
        let mut config = Self::deserialize(value).map_err(format_error)?;
        config.link_parents();
        Ok(config)
    }

    /// Attach a child config and point its `parent` at this node-set.
    pub fn add_child_config(&mut self, mut config: Config) {
        config.set_parent(self.name.clone());
        self.components.push(config);
    }

    pub fn add_edge_config(&mut self, edge: EdgeConfig) {
        self.edges.push(edge);
    }

    /// Find a node-set config by name anywhere below (and including) `self`.
    pub fn get_nodeset_config(&self, name: &str) -> ScenarioResult<&NodeSetConfig> {
        self.walk()
            .find_map(|config| match config {
                ConfigRef::NodeSet(nodeset) if nodeset.name == name => Some(nodeset),
                _ => None,
            })
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })
    }

    /// Find any component config by name anywhere below (and including) `self`.
    pub fn get_child_component_config(&self, name: &str) -> ScenarioResult<ConfigRef<'_>> {
        self.walk()
            .find(|config| config.name() == name)
            .ok_or_else(|| ScenarioError::ComponentNotFound {
                name: name.to_string(),
            })
    }

    /// Names of every leaf in the tree, in pre-order.
    pub fn leaf_names(&self) -> Vec<&str> {
        self.walk()
            .filter_map(|config| match config {
                ConfigRef::Node(node) => Some(node.name.as_str()),
                ConfigRef::NodeSet(_) => None,
            })
            .collect()
    }

    /// Pre-order iterator over this config and all descendants.
    pub fn walk(&self) -> ConfigWalk<'_> {
        ConfigWalk {
            stack: vec![ConfigRef::NodeSet(self)],
        }
    }

    fn link_parents(&mut self) {
        for child in &mut self.components {
            child.set_parent(self.name.clone());
            if let Config::NodeSet(nodeset) = child {
                nodeset.link_parents();
            }
        }
    }
}

/// Either kind of component config.
///
/// Deserialising picks the variant by marker key: `nodesetConfigClass` for a
/// node-set, `configClass` for a leaf.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Config {
    Node(NodeConfig),
    NodeSet(NodeSetConfig),
}

impl Config {
    /// Parse one component block.
    pub fn from_value(value: &Value) -> ScenarioResult<Self> {
        let mut config = Self::deserialize(value).map_err(format_error)?;
        if let Self::NodeSet(nodeset) = &mut config {
            nodeset.link_parents();
        }
        Ok(config)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Node(node) => &node.name,
            Self::NodeSet(nodeset) => &nodeset.name,
        }
    }

    pub fn config_class(&self) -> &str {
        match self {
            Self::Node(node) => &node.config_class,
            Self::NodeSet(nodeset) => &nodeset.config_class,
        }
    }

    pub fn parent(&self) -> Option<&str> {
        match self {
            Self::Node(node) => node.parent.as_deref(),
            Self::NodeSet(nodeset) => nodeset.parent.as_deref(),
        }
    }

    pub fn is_nodeset_config(&self) -> bool {
        matches!(self, Self::NodeSet(_))
    }

    pub fn as_config_ref(&self) -> ConfigRef<'_> {
        match self {
            Self::Node(node) => ConfigRef::Node(node),
            Self::NodeSet(nodeset) => ConfigRef::NodeSet(nodeset),
        }
    }

    fn set_parent(&mut self, parent: String) {
        match self {
            Self::Node(node) => node.parent = Some(parent),
            Self::NodeSet(nodeset) => nodeset.parent = Some(parent),
        }
    }
}

impl<'de> Deserialize<'de> for Config {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let name = value
            .get(fields::NAME)
            .and_then(Value::as_str)
            .unwrap_or("<unnamed>")
            .to_string();

        let parsed = if value.get(fields::NODESET_CONFIG_CLASS).is_some() {
            NodeSetConfig::deserialize(value).map(Self::NodeSet)
        } else if value.get(fields::CONFIG_CLASS).is_some() {
            NodeConfig::deserialize(value).map(Self::Node)
        } else {
            return Err(de::Error::custom(format!(
                "component '{}' has neither '{}' nor '{}'",
                name,
                fields::NODESET_CONFIG_CLASS,
                fields::CONFIG_CLASS
            )));
        };
        parsed.map_err(|e| de::Error::custom(format!("component '{}': {}", name, e)))
    }
}

impl From<NodeConfig> for Config {
    fn from(config: NodeConfig) -> Self {
        Self::Node(config)
    }
}

impl From<NodeSetConfig> for Config {
    fn from(config: NodeSetConfig) -> Self {
        Self::NodeSet(config)
    }
}

/// Borrowed view of a component config.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigRef<'a> {
    Node(&'a NodeConfig),
    NodeSet(&'a NodeSetConfig),
}

impl<'a> ConfigRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Self::Node(node) => &node.name,
            Self::NodeSet(nodeset) => &nodeset.name,
        }
    }

    pub fn parent(&self) -> Option<&'a str> {
        match self {
            Self::Node(node) => node.parent.as_deref(),
            Self::NodeSet(nodeset) => nodeset.parent.as_deref(),
        }
    }
}

/// Pre-order walk over a config tree.
pub struct ConfigWalk<'a> {
    stack: Vec<ConfigRef<'a>>,
}

impl<'a> Iterator for ConfigWalk<'a> {
    type Item = ConfigRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let ConfigRef::NodeSet(nodeset) = current {
            // Reverse so that children come out in declaration order.
            self.stack
                .extend(nodeset.components.iter().rev().map(Config::as_config_ref));
        }
        Some(current)
    }
}

/// An explicit `null` list reads as empty.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn format_error(err: serde_json::Error) -> ScenarioError {
    ScenarioError::ConfigFormat(err.to_string())
}
