use std::sync::Arc;

use serde::Deserialize;
use scenario_core::{InterfaceSet, Leaf};
use scenario_types::{Contract, NodeConfig, ScenarioResult};

pub const INTERFACE_RETURN_VALUE: &str = "interface_return_value";

pub trait InterfaceA: Send + Sync {
    fn interface_method(&self) -> String;
}

impl Contract for dyn InterfaceA {
    const NAME: &'static str = "InterfaceA";
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AConfig {
    #[serde(default)]
    pub attr: String,
}

/// Leaf implementing [`InterfaceA`].
#[derive(Debug)]
pub struct A {
    pub config: AConfig,
}

impl A {
    pub fn from_config(config: &NodeConfig) -> ScenarioResult<Self> {
        Ok(Self {
            config: config.settings_as()?,
        })
    }
}

impl InterfaceA for A {
    fn interface_method(&self) -> String {
        INTERFACE_RETURN_VALUE.to_string()
    }
}

impl Leaf for A {
    fn declare_interfaces(self: Arc<Self>, interfaces: &mut InterfaceSet) {
        interfaces.provide::<dyn InterfaceA>(self);
    }
}
