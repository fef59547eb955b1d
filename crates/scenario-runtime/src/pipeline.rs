//! # Build Pipeline
//!
//! Orchestrates the four build stages:
//!
//! ```text
//! Unassembled -> Assembled -> Instantiated -> Consolidated -> Wired
//! ```
//!
//! Every stage runs to completion before the next begins. The first error
//! aborts the build and is reported with the last stage the build reached:
//! a file that fails to assemble aborts in `Unassembled`, a wiring failure
//! aborts in `Consolidated`.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use scenario_bus::EventRegistry;
use scenario_core::{Dependency, NodeSet, ScenarioComponent};
use scenario_types::{NodeSetConfig, ScenarioError};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::assembler::{parse_config, ConfigAssembler, ConfigLoader, YamlFileLoader};
use crate::builder::ScenarioBuilder;
use crate::registry::ComponentRegistry;
use crate::wiring::WiringEngine;

/// Lifecycle of a single build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildStage {
    Unassembled,
    Assembled,
    Instantiated,
    Consolidated,
    Wired,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            Self::Unassembled => "unassembled",
            Self::Assembled => "assembled",
            Self::Instantiated => "instantiated",
            Self::Consolidated => "consolidated",
            Self::Wired => "wired",
        };
        f.write_str(stage)
    }
}

/// A build failure and the stage the build had reached.
#[derive(Debug, Error)]
#[error("scenario build aborted in stage '{stage}': {source}")]
pub struct PipelineError {
    pub stage: BuildStage,
    #[source]
    pub source: ScenarioError,
}

impl PipelineError {
    pub fn kind(&self) -> &'static str {
        self.source.kind()
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

fn at(stage: BuildStage) -> impl FnOnce(ScenarioError) -> PipelineError {
    move |source| PipelineError { stage, source }
}

/// A fully wired scenario.
pub struct Scenario {
    build_id: Uuid,
    config: NodeSetConfig,
    root: Arc<NodeSet>,
    events: Arc<EventRegistry>,
    dependencies: Vec<Dependency>,
}

impl Scenario {
    pub fn build_id(&self) -> Uuid {
        self.build_id
    }

    pub fn config(&self) -> &NodeSetConfig {
        &self.config
    }

    pub fn root(&self) -> &Arc<NodeSet> {
        &self.root
    }

    pub fn events(&self) -> &Arc<EventRegistry> {
        &self.events
    }

    /// Dependencies in the order they were wired.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Dependencies recorded on the node-set named `level`.
    pub fn dependencies_at(&self, level: &str) -> Vec<Dependency> {
        self.root
            .get_nodeset(level)
            .map(|nodeset| nodeset.dependencies())
            .unwrap_or_default()
    }

    /// Indented component tree followed by each level's dependencies.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_tree(f, &ScenarioComponent::NodeSet(Arc::clone(&self.root)), 0)
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("build_id", &self.build_id)
            .field("root", &self.root.name())
            .field("dependencies", &self.dependencies.len())
            .finish()
    }
}

fn write_tree(out: &mut fmt::Formatter<'_>, component: &ScenarioComponent, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    match component {
        ScenarioComponent::Node(node) => {
            writeln!(out, "{}- {} ({})", indent, node.name(), node.config().node_class)
        }
        ScenarioComponent::NodeSet(nodeset) => {
            writeln!(out, "{}+ {} ({})", indent, nodeset.name(), nodeset.nodeset_class())?;
            for child in nodeset.children() {
                write_tree(out, &child, depth + 1)?;
            }
            for dependency in nodeset.dependencies() {
                writeln!(out, "{}  ~ {}", indent, dependency)?;
            }
            Ok(())
        }
    }
}

/// Runs builds against one component registry.
///
/// Each build gets a fresh [`EventRegistry`] unless the caller supplies its
/// own with [`ScenarioPipeline::with_event_registry`]. A caller-owned
/// registry outlives failed builds and keeps whatever events they created.
pub struct ScenarioPipeline<'a> {
    registry: &'a ComponentRegistry,
    events: Option<Arc<EventRegistry>>,
}

impl<'a> ScenarioPipeline<'a> {
    pub fn new(registry: &'a ComponentRegistry) -> Self {
        Self {
            registry,
            events: None,
        }
    }

    #[must_use]
    pub fn with_event_registry(mut self, events: Arc<EventRegistry>) -> Self {
        self.events = Some(events);
        self
    }

    /// Assemble the scenario at `path` through `loader`, then build it.
    pub fn build_file(&self, loader: &dyn ConfigLoader, path: &str) -> PipelineResult<Scenario> {
        info!(path = %path, stage = %BuildStage::Unassembled, "[Pipeline] Loading scenario");
        let config = ConfigAssembler::new(loader)
            .build(path)
            .map_err(at(BuildStage::Unassembled))?;
        self.build_config(config)
    }

    /// Build from an already normalised mapping.
    pub fn build_value(&self, assembled: &Value) -> PipelineResult<Scenario> {
        let config = parse_config(assembled).map_err(at(BuildStage::Unassembled))?;
        self.build_config(config)
    }

    /// Build from a typed config tree.
    pub fn build_config(&self, config: NodeSetConfig) -> PipelineResult<Scenario> {
        let build_id = Uuid::new_v4();
        debug!(%build_id, scenario = %config.name, stage = %BuildStage::Assembled, "[Pipeline] Stage reached");

        let events = self
            .events
            .clone()
            .unwrap_or_else(|| Arc::new(EventRegistry::new()));
        let builder = ScenarioBuilder::new(self.registry, Arc::clone(&events));

        let root = builder
            .instantiate(&config)
            .map_err(at(BuildStage::Assembled))?;
        debug!(%build_id, stage = %BuildStage::Instantiated, "[Pipeline] Stage reached");

        root.consolidate();
        debug!(%build_id, stage = %BuildStage::Consolidated, "[Pipeline] Stage reached");

        let dependencies = WiringEngine::new(self.registry)
            .wire(&root, &config)
            .map_err(|e| {
                warn!(%build_id, error = %e, "[Pipeline] Wiring aborted");
                at(BuildStage::Consolidated)(e)
            })?;

        info!(
            %build_id,
            stage = %BuildStage::Wired,
            scenario = %config.name,
            leaves = root.leaves().len(),
            dependencies = dependencies.len(),
            events = events.event_names().len(),
            "[Pipeline] Scenario wired"
        );

        Ok(Scenario {
            build_id,
            config,
            root,
            events,
            dependencies,
        })
    }
}

/// Build the scenario file at `path`. Imports resolve against its directory.
pub fn build_scenario(registry: &ComponentRegistry, path: impl AsRef<Path>) -> PipelineResult<Scenario> {
    let (loader, file) = loader_for(path.as_ref());
    ScenarioPipeline::new(registry).build_file(&loader, &file)
}

/// A YAML loader rooted at the directory of `path`, and the file name to load.
pub fn loader_for(path: &Path) -> (YamlFileLoader, String) {
    match (path.parent(), path.file_name()) {
        (Some(dir), Some(file)) if !dir.as_os_str().is_empty() => (
            YamlFileLoader::with_base_dir(dir),
            file.to_string_lossy().into_owned(),
        ),
        _ => (YamlFileLoader::new(), path.to_string_lossy().into_owned()),
    }
}
