use parking_lot::Mutex;
use scenario_core::{Composite, ScenarioComponent};
use tracing::debug;

/// Composite that remembers the names of its children in attach order.
#[derive(Debug, Default)]
pub struct SetOne {
    attached: Mutex<Vec<String>>,
}

impl SetOne {
    pub fn attached(&self) -> Vec<String> {
        self.attached.lock().clone()
    }
}

impl Composite for SetOne {
    fn child_attached(&self, owner: &str, child: &ScenarioComponent) {
        debug!(owner = %owner, child = %child.name(), "[SetOne] Child attached");
        self.attached.lock().push(child.name().to_string());
    }
}
