//! # Integration Tests
//!
//! - `flows` - the concrete scenarios, built from the YAML files in `resources/`
//! - `properties` - properties that must hold for every config tree

pub mod flows;
pub mod properties;
