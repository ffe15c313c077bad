// Configuration module for storage-factory
//
// Provides:
// - The key/value configuration that selects and shapes a backend
// - URI normalization into a configuration
// - YAML configuration file loading with environment variable substitution

pub mod types;
pub mod uri;
mod loader;

pub use loader::ConfigLoader;
pub use types::*;
pub use uri::parse_uri;

use anyhow::{Context, Result};
use std::path::Path;

/// Load a backend configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    ConfigLoader::load(path).context("Failed to load configuration")
}
