//! HTTP API module for the tiered-range engine.
//!
//! This module provides the REST endpoints for managing tax brackets and
//! commission tiers and for calculating tax and commission.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    BulkReplaceRequest, CommissionCalculationRequest, CommissionTierRequest, TaxBracketRequest,
    TaxCalculationQuery,
};
pub use response::{ApiError, ApiErrorResponse, CommissionTierView, TaxBracketView};
pub use state::AppState;
