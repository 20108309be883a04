//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{CommissionConfig, EngineConfig, ServerConfig, TaxBracketsConfig};

/// Loads and provides access to engine configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── server.yaml        # Bind address
/// ├── tax_brackets.yaml  # Seed tax brackets
/// └── commission.yaml    # KPIs and their seed commission tiers
/// ```
///
/// # Example
///
/// ```no_run
/// use tier_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Listening on {}", loader.config().server().bind_address);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g., "./config/default")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any required field is missing from the configuration
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let server = Self::load_yaml::<ServerConfig>(&path.join("server.yaml"))?;
        let tax_brackets = Self::load_yaml::<TaxBracketsConfig>(&path.join("tax_brackets.yaml"))?;
        let commission = Self::load_yaml::<CommissionConfig>(&path.join("commission.yaml"))?;

        Ok(Self {
            config: EngineConfig::new(server, tax_brackets, commission),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
