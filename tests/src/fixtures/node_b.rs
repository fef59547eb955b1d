use scenario_core::Leaf;
use scenario_types::Contract;

/// Payload of the `BEvent` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BEvent {
    pub msg: String,
}

impl BEvent {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

impl Contract for BEvent {
    const NAME: &'static str = "BEvent";
}

/// Event source. Declares no capabilities.
#[derive(Debug)]
pub struct B;

impl Leaf for B {}
