//! # Runtime Settings
//!
//! Process-level settings read from the environment:
//!
//! | Variable            | Default | Meaning                                  |
//! |---------------------|---------|------------------------------------------|
//! | `SCENARIO_LOG`      | `info`  | `tracing` filter directive               |
//! | `SCENARIO_BASE_DIR` | unset   | Directory relative scenario paths use    |

use std::path::PathBuf;

pub const ENV_LOG: &str = "SCENARIO_LOG";
pub const ENV_BASE_DIR: &str = "SCENARIO_BASE_DIR";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub log_filter: String,
    pub base_dir: Option<PathBuf>,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            base_dir: None,
        }
    }
}

impl RuntimeSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(filter) = lookup(ENV_LOG).filter(|v| !v.trim().is_empty()) {
            settings.log_filter = filter;
        }
        if let Some(dir) = lookup(ENV_BASE_DIR).filter(|v| !v.trim().is_empty()) {
            settings.base_dir = Some(PathBuf::from(dir));
        }

        settings
    }
}
