//! # Test Fixtures
//!
//! Small leaves and one composite used across the integration flows.
//!
//! | Identity                     | Kind      | Capability                         |
//! |------------------------------|-----------|------------------------------------|
//! | `fixtures.node_a.A`          | leaf      | implements `InterfaceA`            |
//! | `fixtures.node_b.B`          | leaf      | none (emits `BEvent`)              |
//! | `fixtures.node_c.C`          | leaf      | none                               |
//! | `fixtures.node_d.D`          | leaf      | handles `BEvent` from `B`          |
//! | `fixtures.nodeset_ab.SetOne` | composite | records attached children          |

pub mod node_a;
pub mod node_b;
pub mod node_c;
pub mod node_d;
pub mod set_one;

use std::path::PathBuf;
use std::sync::Arc;

use scenario_core::{Composite, Leaf};
use scenario_runtime::ComponentRegistry;

pub use node_a::{AConfig, InterfaceA, A};
pub use node_b::{BEvent, B};
pub use node_c::C;
pub use node_d::D;
pub use set_one::SetOne;

pub const NODE_A: &str = "fixtures.node_a.A";
pub const NODE_B: &str = "fixtures.node_b.B";
pub const NODE_C: &str = "fixtures.node_c.C";
pub const NODE_D: &str = "fixtures.node_d.D";
pub const SET_ONE: &str = "fixtures.nodeset_ab.SetOne";
pub const INTERFACE_A: &str = "fixtures.node_a.InterfaceA";
pub const B_EVENT: &str = "fixtures.node_b.BEvent";

/// Registry with every fixture identity registered.
pub fn registry() -> ComponentRegistry {
    let registry = ComponentRegistry::new();
    registry
        .register_node(NODE_A, |config| Ok(Arc::new(A::from_config(config)?) as Arc<dyn Leaf>))
        .register_node(NODE_B, |_| Ok(Arc::new(B) as Arc<dyn Leaf>))
        .register_node(NODE_C, |_| Ok(Arc::new(C) as Arc<dyn Leaf>))
        .register_node(NODE_D, |_| Ok(Arc::new(D::default()) as Arc<dyn Leaf>))
        .register_nodeset(SET_ONE, |_| Ok(Arc::new(SetOne::default()) as Arc<dyn Composite>));
    registry.register_contract::<dyn InterfaceA>(INTERFACE_A);
    registry.register_contract::<BEvent>(B_EVENT);
    registry
}

/// Directory holding the scenario YAML files.
pub fn resources_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources")
}

/// Absolute path of a scenario file under [`resources_dir`].
pub fn resource(name: &str) -> PathBuf {
    resources_dir().join(name)
}
