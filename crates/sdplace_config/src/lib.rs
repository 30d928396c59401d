//! Parsing and validation of `sdplace.toml` placer configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed,
//! validated [`PlacerConfig`]: the site grid geometry, attribute names, the
//! placement priority rules, and the search preference offsets.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;
pub mod validate;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
pub use validate::{dependency_graph, validate_config};
