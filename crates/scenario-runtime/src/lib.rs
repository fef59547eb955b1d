//! # Scenario Runtime
//!
//! Turns a declarative scenario file into a wired component tree.
//!
//! ## Modular Structure
//!
//! - `registry/` - explicit identity → factory / contract registry
//! - `assembler/` - loads YAML, splices imported sub-trees, parses configs
//! - `builder/` - instantiates the composite tree and checks names
//! - `wiring/` - resolves edge endpoints and registers dependencies
//! - `pipeline` - runs the stages in order and reports where a build stopped
//! - `settings` - environment-driven process settings
//!
//! ## Build Flow
//!
//! ```text
//! scenario.yml ──load──→ raw mapping ──normalise──→ nested mapping
//!                                                        │
//!                                                      parse
//!                                                        ↓
//!                 ComponentRegistry ──factories──→ NodeSetConfig
//!                                                        │
//!                                                   instantiate
//!                                                        ↓
//!                                              Arc<NodeSet> (root)
//!                                                        │
//!                                           consolidate → wire edges
//!                                                        ↓
//!                                                    Scenario
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ComponentRegistry::new();
//! registry.register_node("sim.Sensor", |config| Ok(Arc::new(Sensor::new(config)?) as Arc<dyn Leaf>));
//! registry.register_contract::<Reading>("sim.Reading");
//!
//! let scenario = build_scenario(&registry, "scenarios/plant.yml")?;
//! println!("{}", scenario.summary());
//! ```

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod assembler;
pub mod builder;
pub mod pipeline;
pub mod registry;
pub mod settings;
pub mod wiring;

pub use assembler::{
    check_names, locate, parse_config, ConfigAssembler, ConfigLoader, InMemoryLoader, YamlFileLoader,
};
pub use builder::{NameRegistry, ScenarioBuilder};
pub use pipeline::{
    build_scenario, loader_for, BuildStage, PipelineError, PipelineResult, Scenario, ScenarioPipeline,
};
pub use registry::{
    ComponentRegistry, NodeFactory, NodeSetFactory, DEFAULT_NODESET_CLASS, DEFAULT_NODESET_CONFIG_CLASS,
};
pub use settings::RuntimeSettings;
pub use wiring::{collect_edges, resolve_edges, DeclaredEdge, ResolvedEdge, WiringEngine};
