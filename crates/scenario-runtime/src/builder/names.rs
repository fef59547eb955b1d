//! Global component-name bookkeeping.

use std::collections::HashMap;

use scenario_types::{ScenarioError, ScenarioResult};

/// Names seen so far in one tree, each with the name of the node-set that
/// owns it. The root owns itself.
#[derive(Debug, Default, Clone)]
pub struct NameRegistry {
    owners: HashMap<String, String>,
}

impl NameRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` as owned by `owner`. A name seen before fails with
    /// `NamingConflict` naming the *first* owner.
    pub fn register(&mut self, name: &str, owner: &str) -> ScenarioResult<()> {
        if let Some(first_owner) = self.owners.get(name) {
            return Err(ScenarioError::NamingConflict {
                name: name.to_string(),
                owner: first_owner.clone(),
            });
        }
        self.owners.insert(name.to_string(), owner.to_string());
        Ok(())
    }

    pub fn owner_of(&self, name: &str) -> Option<&str> {
        self.owners.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.owners.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
