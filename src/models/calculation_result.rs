//! Calculation result models.
//!
//! This module contains the generic [`ProgressiveBreakdown`] produced by the
//! progressive calculator and the two facade-shaped results built from it:
//! [`TaxCalculationResult`] and [`CommissionResult`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::format_percent;

/// How a stored rate is expressed.
///
/// Tax brackets store a fraction (`0.10` for 10%); commission tiers store a
/// percentage value (`5` for 5%).
///
/// # Example
///
/// ```
/// use tier_engine::models::RateBasis;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(RateBasis::Fraction.multiplier(dec!(0.10)), dec!(0.10));
/// assert_eq!(RateBasis::Percent.multiplier(dec!(5)), dec!(0.05));
/// assert_eq!(RateBasis::Fraction.display(dec!(0.125)), "12.5%");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateBasis {
    /// The rate is a fraction of one.
    Fraction,
    /// The rate is a percentage.
    Percent,
}

impl RateBasis {
    /// Converts a stored rate into the factor applied to an amount.
    pub fn multiplier(self, rate: Decimal) -> Decimal {
        match self {
            RateBasis::Fraction => rate,
            RateBasis::Percent => rate / Decimal::ONE_HUNDRED,
        }
    }

    /// Formats a stored rate as a percentage string.
    pub fn display(self, rate: Decimal) -> String {
        match self {
            RateBasis::Fraction => format_percent(rate * Decimal::ONE_HUNDRED),
            RateBasis::Percent => format_percent(rate),
        }
    }
}

/// The contribution of one range to a progressive calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeContribution {
    /// The id of the range.
    pub range_id: Uuid,
    /// Display label of the range.
    pub label: String,
    /// Inclusive lower bound.
    pub min_value: Decimal,
    /// Inclusive upper bound, `None` when open-ended.
    pub max_value: Option<Decimal>,
    /// The rate as a percentage string.
    pub rate: String,
    /// The portion of the input attributed to the range.
    pub portion: Decimal,
    /// `portion * rate`, rounded to two decimal places.
    pub contribution: Decimal,
}

/// The generic output of the progressive calculator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressiveBreakdown {
    /// The calculated input.
    pub input: Decimal,
    /// One entry per range that received a positive portion, in ascending order.
    pub lines: Vec<RangeContribution>,
    /// Sum of the line contributions.
    pub total: Decimal,
    /// `input - total`.
    pub residual: Decimal,
    /// `total / input` as a percentage string; `"0%"` for zero input.
    pub effective_rate: String,
}

/// One line of the tax breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDetail {
    /// Bracket label.
    pub bracket: String,
    /// Inclusive lower bound of the bracket.
    pub min_income: Decimal,
    /// Inclusive upper bound, `null` for the open-ended bracket.
    pub max_income: Option<Decimal>,
    /// Rate as a percentage string.
    pub tax_rate: String,
    /// Income attributed to the bracket.
    pub taxable_income: Decimal,
    /// Tax owed for the bracket.
    pub tax_amount: Decimal,
}

impl From<RangeContribution> for TaxDetail {
    fn from(line: RangeContribution) -> Self {
        TaxDetail {
            bracket: line.label,
            min_income: line.min_value,
            max_income: line.max_value,
            tax_rate: line.rate,
            taxable_income: line.portion,
            tax_amount: line.contribution,
        }
    }
}

/// The response of the tax calculation facade.
///
/// # Example
///
/// ```
/// use tier_engine::models::TaxCalculationResult;
///
/// let json = r#"{
///     "calculationId": "00000000-0000-0000-0000-000000000000",
///     "calculatedAt": "2026-01-15T00:00:00Z",
///     "income": "0",
///     "totalTax": "0",
///     "netIncome": "0",
///     "effectiveTaxRate": "0%",
///     "taxDetails": []
/// }"#;
/// let result: TaxCalculationResult = serde_json::from_str(json).unwrap();
/// assert_eq!(result.effective_tax_rate, "0%");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxCalculationResult {
    /// Unique identifier of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The income that was taxed.
    pub income: Decimal,
    /// Total tax across all brackets.
    pub total_tax: Decimal,
    /// `income - total_tax`.
    pub net_income: Decimal,
    /// Effective tax rate as a percentage string.
    pub effective_tax_rate: String,
    /// Per-bracket breakdown.
    pub tax_details: Vec<TaxDetail>,
}

impl From<ProgressiveBreakdown> for TaxCalculationResult {
    fn from(breakdown: ProgressiveBreakdown) -> Self {
        TaxCalculationResult {
            calculation_id: Uuid::new_v4(),
            calculated_at: Utc::now(),
            income: breakdown.input,
            total_tax: breakdown.total,
            net_income: breakdown.residual,
            effective_tax_rate: breakdown.effective_rate,
            tax_details: breakdown.lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// One line of the commission breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTierDetail {
    /// Tier label.
    pub tier: String,
    /// Inclusive lower bound of the tier.
    pub min_revenue: Decimal,
    /// Inclusive upper bound, `null` for the open-ended tier.
    pub max_revenue: Option<Decimal>,
    /// Commission rate as a percentage string.
    pub commission_rate: String,
    /// Revenue attributed to the tier.
    pub commissionable_revenue: Decimal,
    /// Commission earned in the tier.
    pub commission_amount: Decimal,
}

impl From<RangeContribution> for CommissionTierDetail {
    fn from(line: RangeContribution) -> Self {
        CommissionTierDetail {
            tier: line.label,
            min_revenue: line.min_value,
            max_revenue: line.max_value,
            commission_rate: line.rate,
            commissionable_revenue: line.portion,
            commission_amount: line.contribution,
        }
    }
}

/// The response of the commission calculation facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionResult {
    /// Unique identifier of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
    /// The KPI whose tiers were applied.
    pub kpi_id: String,
    /// Display name of the KPI.
    pub kpi_name: String,
    /// The revenue the commission was calculated on.
    pub revenue: Decimal,
    /// Total commission across all tiers.
    pub total_commission: Decimal,
    /// `revenue - total_commission`.
    pub net_revenue: Decimal,
    /// Effective commission rate as a percentage string.
    pub effective_commission_rate: String,
    /// Per-tier breakdown.
    pub tier_details: Vec<CommissionTierDetail>,
}

impl CommissionResult {
    /// Shapes a breakdown into the commission response for a KPI.
    pub fn from_breakdown(
        kpi_id: impl Into<String>,
        kpi_name: impl Into<String>,
        breakdown: ProgressiveBreakdown,
    ) -> Self {
        CommissionResult {
            calculation_id: Uuid::new_v4(),
            calculated_at: Utc::now(),
            kpi_id: kpi_id.into(),
            kpi_name: kpi_name.into(),
            revenue: breakdown.input,
            total_commission: breakdown.total,
            net_revenue: breakdown.residual,
            effective_commission_rate: breakdown.effective_rate,
            tier_details: breakdown.lines.into_iter().map(Into::into).collect(),
        }
    }
}
