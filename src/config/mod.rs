//! Configuration module for the tiered-range engine.
//!
//! This module provides functionality for loading server settings, seed
//! tax brackets, and KPI commission tiers from YAML configuration files.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CommissionConfig, EngineConfig, KpiConfig, ServerConfig, TaxBracketsConfig,
};
