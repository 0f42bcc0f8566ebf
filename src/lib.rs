//! depaudit - Dependency compatibility audit library
//!
//! Checks whether a hypothetical release of one package still satisfies the
//! dependency ranges declared by a list of managed packages:
//! - Semantic-version range parsing and matching
//! - Registry lookups (Ansible Galaxy, in-memory)
//! - Concurrent per-package evaluation with ordered aggregation
//! - Report delivery to console, log file, and webhook

pub mod cli;
pub mod domain;
pub mod error;
pub mod evaluate;
pub mod loader;
pub mod output;
pub mod progress;
pub mod registry;
pub mod runner;
pub mod sink;
