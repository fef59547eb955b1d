use scenario_core::Leaf;

#[derive(Debug)]
pub struct C;

impl Leaf for C {}
