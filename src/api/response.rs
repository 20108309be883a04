//! Response types for the tiered-range engine API.
//!
//! This module defines the range views returned by the write endpoints, the
//! error response structure, and the mapping from engine errors to HTTP
//! status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::RateRange;

/// A stored tax bracket as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracketView {
    /// Bracket id.
    pub id: Uuid,
    /// Inclusive lower bound.
    pub min_income: Decimal,
    /// Inclusive upper bound, `null` for the open-ended bracket.
    pub max_income: Option<Decimal>,
    /// Rate as a fraction.
    pub tax_rate: Decimal,
    /// Optional label.
    pub description: Option<String>,
    /// When the bracket was created.
    pub created_at: DateTime<Utc>,
    /// When the bracket was last written.
    pub updated_at: DateTime<Utc>,
    /// Version to send back as `expectedVersion` on update.
    pub version: u32,
}

impl From<RateRange> for TaxBracketView {
    fn from(range: RateRange) -> Self {
        TaxBracketView {
            id: range.id,
            min_income: range.bounds.min(),
            max_income: range.bounds.max(),
            tax_rate: range.rate,
            description: range.notes,
            created_at: range.created_at,
            updated_at: range.updated_at,
            version: range.version,
        }
    }
}

/// A stored commission tier as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionTierView {
    /// Tier id.
    pub id: Uuid,
    /// The KPI the tier belongs to.
    pub kpi_id: String,
    /// Tier level, unique within the KPI.
    pub tier_level: Option<u32>,
    /// Inclusive lower bound.
    pub min_revenue: Decimal,
    /// Inclusive upper bound, `null` for the open-ended tier.
    pub max_revenue: Option<Decimal>,
    /// Rate as a percentage.
    pub commission_rate: Decimal,
    /// Whether the tier takes part in calculations.
    pub is_active: bool,
    /// Optional label.
    pub notes: Option<String>,
    /// When the tier was created.
    pub created_at: DateTime<Utc>,
    /// When the tier was last written.
    pub updated_at: DateTime<Utc>,
    /// Version to send back as `expectedVersion` on update.
    pub version: u32,
}

impl From<RateRange> for CommissionTierView {
    fn from(range: RateRange) -> Self {
        CommissionTierView {
            id: range.id,
            kpi_id: range.scope.kpi_id().unwrap_or_default().to_string(),
            tier_level: range.tier_level,
            min_revenue: range.bounds.min(),
            max_revenue: range.bounds.max(),
            commission_rate: range.rate,
            is_active: range.active,
            notes: range.notes,
            created_at: range.created_at,
            updated_at: range.updated_at,
            version: range.version,
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates a `400 Bad Request` response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::Validation { field, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("The value of '{}' was rejected", field),
                ),
            },
            EngineError::Overlap { existing_id, .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "RANGE_OVERLAP",
                    message,
                    format!("Conflicts with range {}", existing_id),
                ),
            },
            EngineError::DuplicateTierLevel { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new("DUPLICATE_TIER_LEVEL", message),
            },
            EngineError::StaleVersion { .. } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "CONCURRENCY_CONFLICT",
                    message,
                    "Reload the range and retry with its current version",
                ),
            },
            EngineError::NoRangesConfigured { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "NO_RANGES_CONFIGURED",
                    message,
                    "Configure at least one range before calculating",
                ),
            },
            EngineError::CalculationOverflow { .. } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "CALCULATION_OVERFLOW",
                    message,
                    "Reduce the input amount or the configured rates",
                ),
            },
            EngineError::RangeNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("RANGE_NOT_FOUND", message),
            },
            EngineError::KpiNotFound { .. } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new("KPI_NOT_FOUND", message),
            },
        }
    }
}
