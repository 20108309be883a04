//! Request types for the tiered-range engine API.
//!
//! This module defines the JSON and query structures accepted by the tax
//! bracket and commission tier endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::service::{BulkReplaceOptions, CommissionTierInput, TaxBracketInput};

fn default_active() -> bool {
    true
}

/// Query string for `GET /tax-brackets/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaxCalculationQuery {
    /// The income to calculate tax on.
    pub income: Decimal,
}

/// Body for creating or updating a tax bracket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracketRequest {
    /// Inclusive lower bound.
    pub min_income: Decimal,
    /// Inclusive upper bound; omit for the open-ended bracket.
    #[serde(default)]
    pub max_income: Option<Decimal>,
    /// Rate as a fraction between 0 and 1.
    pub tax_rate: Decimal,
    /// Optional label.
    #[serde(default)]
    pub description: Option<String>,
    /// Version read before an update; the update is rejected if it changed.
    #[serde(default)]
    pub expected_version: Option<u32>,
}

impl From<TaxBracketRequest> for TaxBracketInput {
    fn from(req: TaxBracketRequest) -> Self {
        TaxBracketInput {
            min_income: req.min_income,
            max_income: req.max_income,
            tax_rate: req.tax_rate,
            description: req.description,
        }
    }
}

/// Body for creating or updating a commission tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTierRequest {
    /// Tier level, unique within the KPI.
    pub tier_level: u32,
    /// Inclusive lower bound.
    pub min_revenue: Decimal,
    /// Inclusive upper bound; omit for the open-ended tier.
    #[serde(default)]
    pub max_revenue: Option<Decimal>,
    /// Rate as a percentage.
    pub commission_rate: Decimal,
    /// Whether the tier takes part in calculations.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Optional label.
    #[serde(default)]
    pub notes: Option<String>,
    /// Version read before an update; the update is rejected if it changed.
    #[serde(default)]
    pub expected_version: Option<u32>,
}

impl From<CommissionTierRequest> for CommissionTierInput {
    fn from(req: CommissionTierRequest) -> Self {
        CommissionTierInput {
            tier_level: req.tier_level,
            min_revenue: req.min_revenue,
            max_revenue: req.max_revenue,
            commission_rate: req.commission_rate,
            active: req.is_active,
            notes: req.notes,
        }
    }
}

/// Body for `PUT /kpis/:kpi_id/commission-tiers/bulk`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReplaceRequest {
    /// The tiers to insert.
    pub tiers: Vec<CommissionTierRequest>,
    /// Delete the KPI's existing tiers first.
    #[serde(default)]
    pub replace_existing: bool,
    /// Run the overlap validator across the batch.
    #[serde(default)]
    pub validate_overlaps: bool,
}

impl BulkReplaceRequest {
    /// Splits the request into service inputs and options.
    pub fn into_parts(self) -> (Vec<CommissionTierInput>, BulkReplaceOptions) {
        let options = BulkReplaceOptions {
            replace_existing: self.replace_existing,
            validate_overlaps: self.validate_overlaps,
        };
        (self.tiers.into_iter().map(Into::into).collect(), options)
    }
}

/// Body for `POST /commission/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionCalculationRequest {
    /// The KPI whose tiers apply.
    pub kpi_id: String,
    /// The revenue to calculate commission on.
    pub revenue: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_open_ended_tax_bracket() {
        let json = r#"{"minIncome": "101", "taxRate": "0.2"}"#;
        let request: TaxBracketRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.max_income, None);
        assert_eq!(request.expected_version, None);
        let input: TaxBracketInput = request.into();
        assert_eq!(input.tax_rate, dec!(0.2));
    }

    #[test]
    fn test_deserialize_numeric_decimals() {
        let json = r#"{"minIncome": 0, "maxIncome": 100, "taxRate": 0.1}"#;
        let request: TaxBracketRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.max_income, Some(dec!(100)));
    }

    #[test]
    fn test_commission_tier_defaults_to_active() {
        let json = r#"{"tierLevel": 1, "minRevenue": "0", "commissionRate": "5"}"#;
        let request: CommissionTierRequest = serde_json::from_str(json).unwrap();
        assert!(request.is_active);

        let input: CommissionTierInput = request.into();
        assert!(input.active);
    }

    #[test]
    fn test_bulk_replace_into_parts() {
        let json = r#"{
            "replaceExisting": true,
            "tiers": [{"tierLevel": 1, "minRevenue": "0", "commissionRate": "5"}]
        }"#;
        let request: BulkReplaceRequest = serde_json::from_str(json).unwrap();
        let (inputs, options) = request.into_parts();

        assert_eq!(inputs.len(), 1);
        assert!(options.replace_existing);
        assert!(!options.validate_overlaps);
    }

    #[test]
    fn test_missing_kpi_id_is_rejected() {
        let json = r#"{"revenue": "100"}"#;
        let result: Result<CommissionCalculationRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
