//! # Scenario Inspector
//!
//! Assembles a scenario file and reports what would be built:
//!
//! 1. Load configuration (CLI flags, then `SCENARIO_*` environment)
//! 2. Load the scenario and splice every imported sub-tree
//! 3. Parse the config tree and check names are unique
//! 4. Resolve every edge endpoint tag against the leaf configs
//! 5. Print the config tree and the resolved edges
//!
//! Leaves are user types registered by the embedding program, so nothing is
//! instantiated here.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenario_runtime::{
    loader_for, parse_config, resolve_edges, ConfigAssembler, RuntimeSettings, YamlFileLoader,
};
use scenario_types::{ConfigRef, NodeSetConfig};

#[derive(Debug, Parser)]
#[command(name = "scenario-runtime", version, about = "Inspect a scenario graph file")]
struct Args {
    /// Scenario file to assemble.
    scenario: PathBuf,

    /// Directory relative paths resolve against. Defaults to the scenario's directory.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Print the assembled nested mapping as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = RuntimeSettings::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&settings.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let (loader, path) = match args.base_dir.or(settings.base_dir) {
        Some(dir) => (
            YamlFileLoader::with_base_dir(dir),
            args.scenario.to_string_lossy().into_owned(),
        ),
        None => loader_for(&args.scenario),
    };

    let assembled = ConfigAssembler::new(&loader)
        .assemble_file(&path)
        .with_context(|| format!("failed to assemble {}", args.scenario.display()))?;

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&assembled)?);
        return Ok(());
    }

    let config = parse_config(&assembled).context("invalid scenario config")?;
    let edges = resolve_edges(&config).context("unresolvable edge endpoint")?;
    info!(
        scenario = %config.name,
        leaves = config.leaf_names().len(),
        edges = edges.len(),
        "[Inspector] Scenario checked"
    );

    print_tree(&config);
    println!();
    println!("edges:");
    for resolved in edges {
        let edge = resolved.declared.edge;
        println!(
            "  [{}] {} -[{} {}]-> {}",
            resolved.declared.level,
            resolved.pred.name,
            edge.edge_kind,
            edge.edge_payload_class,
            resolved.succ.name,
        );
    }

    Ok(())
}

fn print_tree(config: &NodeSetConfig) {
    for component in config.walk() {
        let depth = depth_of(config, component);
        let indent = "  ".repeat(depth);
        match component {
            ConfigRef::NodeSet(nodeset) => {
                println!("{}+ {} ({})", indent, nodeset.name, nodeset.nodeset_class);
            }
            ConfigRef::Node(node) => {
                println!(
                    "{}- {} ({}, tag '{}')",
                    indent, node.name, node.node_class, node.dependency_tag()
                );
            }
        }
    }
}

fn depth_of(config: &NodeSetConfig, component: ConfigRef<'_>) -> usize {
    let mut depth = 0;
    let mut parent = component.parent();
    while let Some(name) = parent {
        depth += 1;
        parent = config
            .get_child_component_config(name)
            .ok()
            .and_then(|found| found.parent());
    }
    depth
}
