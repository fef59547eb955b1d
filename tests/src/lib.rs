//! # Scenario-Graph Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── resources/        # Scenario YAML files used by the flows
//! └── src/
//!     ├── fixtures/     # Leaves A, B, C, D and composite SetOne
//!     └── integration/  # End-to-end builds against the fixtures
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p scenario-tests
//!
//! # By category
//! cargo test -p scenario-tests integration::flows
//! cargo test -p scenario-tests integration::properties
//! ```

#![allow(dead_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod fixtures;
pub mod integration;
