//! Configuration types for the tiered-range engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use serde::Deserialize;

use crate::service::{CommissionTierInput, KpiDirectory, TaxBracketInput};

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

/// Server settings from server.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

/// Seed tax brackets from tax_brackets.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct TaxBracketsConfig {
    /// Brackets loaded into the global scope at startup.
    #[serde(default)]
    pub brackets: Vec<TaxBracketInput>,
}

/// A KPI and its seed commission tiers.
#[derive(Debug, Clone, Deserialize)]
pub struct KpiConfig {
    /// Stable KPI identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Tiers loaded for the KPI at startup.
    #[serde(default)]
    pub tiers: Vec<CommissionTierInput>,
}

/// KPI definitions from commission.yaml.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionConfig {
    /// Every KPI commission tiers may be attached to.
    pub kpis: Vec<KpiConfig>,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    server: ServerConfig,
    tax_brackets: TaxBracketsConfig,
    commission: CommissionConfig,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(
        server: ServerConfig,
        tax_brackets: TaxBracketsConfig,
        commission: CommissionConfig,
    ) -> Self {
        Self {
            server,
            tax_brackets,
            commission,
        }
    }

    /// Returns the server settings.
    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    /// Returns the seed tax brackets.
    pub fn tax_brackets(&self) -> &[TaxBracketInput] {
        &self.tax_brackets.brackets
    }

    /// Returns the configured KPIs.
    pub fn kpis(&self) -> &[KpiConfig] {
        &self.commission.kpis
    }

    /// Builds the KPI directory from the configured KPIs.
    pub fn kpi_directory(&self) -> KpiDirectory {
        self.commission
            .kpis
            .iter()
            .fold(KpiDirectory::new(), |directory, kpi| {
                directory.with_kpi(&kpi.id, &kpi.name)
            })
    }
}
