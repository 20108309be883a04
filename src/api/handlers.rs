//! HTTP request handlers for the tiered-range engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::service::Kpi;

use super::request::{
    BulkReplaceRequest, CommissionCalculationRequest, CommissionTierRequest, TaxBracketRequest,
    TaxCalculationQuery,
};
use super::response::{ApiError, ApiErrorResponse, CommissionTierView, TaxBracketView};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/tax-brackets",
            get(list_tax_brackets_handler).post(create_tax_bracket_handler),
        )
        .route("/tax-brackets/calculate", get(calculate_tax_handler))
        .route(
            "/tax-brackets/:id",
            get(get_tax_bracket_handler)
                .put(update_tax_bracket_handler)
                .delete(delete_tax_bracket_handler),
        )
        .route("/kpis", get(list_kpis_handler))
        .route(
            "/kpis/:kpi_id/commission-tiers",
            get(list_commission_tiers_handler).post(create_commission_tier_handler),
        )
        .route(
            "/kpis/:kpi_id/commission-tiers/bulk",
            put(bulk_replace_commission_tiers_handler),
        )
        .route(
            "/commission-tiers/:id",
            get(get_commission_tier_handler)
                .put(update_commission_tier_handler)
                .delete(delete_commission_tier_handler),
        )
        .route("/commission/calculate", post(calculate_commission_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn engine_error_response(correlation_id: Uuid, err: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    let response = ApiErrorResponse::bad_request(error);
    json_response(response.status, response.error)
}

fn path_rejection_response(correlation_id: Uuid, rejection: PathRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid path parameter"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::with_details("INVALID_ID", "Path parameter is not a valid id", body_text),
    )
}

fn query_rejection_response(correlation_id: Uuid, rejection: QueryRejection) -> Response {
    let body_text = rejection.body_text();
    warn!(
        correlation_id = %correlation_id,
        error = %body_text,
        "Invalid query string"
    );
    json_response(
        StatusCode::BAD_REQUEST,
        ApiError::with_details("INVALID_QUERY", "Query string could not be parsed", body_text),
    )
}

/// Handler for GET /health.
async fn health_handler() -> impl IntoResponse {
    json_response(StatusCode::OK, json!({ "status": "ok" }))
}

/// Handler for GET /tax-brackets.
async fn list_tax_brackets_handler(State(state): State<AppState>) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.tax().list().await {
        Ok(ranges) => {
            info!(
                correlation_id = %correlation_id,
                count = ranges.len(),
                "Listed tax brackets"
            );
            let views: Vec<TaxBracketView> = ranges.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /tax-brackets/:id.
async fn get_tax_bracket_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.tax().get(id).await {
        Ok(range) => json_response(StatusCode::OK, TaxBracketView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /tax-brackets.
///
/// Rejects the bracket if it overlaps any stored bracket.
async fn create_tax_bracket_handler(
    State(state): State<AppState>,
    payload: Result<Json<TaxBracketRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing tax bracket create");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.tax().create(request.into()).await {
        Ok(range) => json_response(StatusCode::CREATED, TaxBracketView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for PUT /tax-brackets/:id.
async fn update_tax_bracket_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TaxBracketRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    info!(correlation_id = %correlation_id, range_id = %id, "Processing tax bracket update");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let expected_version = request.expected_version;
    match state.tax().update(id, request.into(), expected_version).await {
        Ok(range) => json_response(StatusCode::OK, TaxBracketView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for DELETE /tax-brackets/:id.
async fn delete_tax_bracket_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.tax().delete(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /tax-brackets/calculate?income=.
async fn calculate_tax_handler(
    State(state): State<AppState>,
    query: Result<Query<TaxCalculationQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return query_rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        income = %query.income,
        "Processing tax calculation"
    );

    let start_time = Instant::now();
    match state.tax().calculate(query.income).await {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                total_tax = %result.total_tax,
                duration_us = start_time.elapsed().as_micros(),
                "Tax calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /kpis.
async fn list_kpis_handler(State(state): State<AppState>) -> Response {
    let kpis: Vec<Kpi> = state.commission().kpis().all().cloned().collect();
    json_response(StatusCode::OK, kpis)
}

/// Handler for GET /kpis/:kpi_id/commission-tiers.
async fn list_commission_tiers_handler(
    State(state): State<AppState>,
    Path(kpi_id): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    match state.commission().list(&kpi_id).await {
        Ok(ranges) => {
            let views: Vec<CommissionTierView> = ranges.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /kpis/:kpi_id/commission-tiers.
async fn create_commission_tier_handler(
    State(state): State<AppState>,
    Path(kpi_id): Path<String>,
    payload: Result<Json<CommissionTierRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(
        correlation_id = %correlation_id,
        kpi_id = %kpi_id,
        "Processing commission tier create"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match state.commission().create(&kpi_id, request.into()).await {
        Ok(range) => json_response(StatusCode::CREATED, CommissionTierView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for PUT /kpis/:kpi_id/commission-tiers/bulk.
///
/// Overlaps within the batch are only rejected when `validateOverlaps` is set.
async fn bulk_replace_commission_tiers_handler(
    State(state): State<AppState>,
    Path(kpi_id): Path<String>,
    payload: Result<Json<BulkReplaceRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        kpi_id = %kpi_id,
        tiers = request.tiers.len(),
        replace_existing = request.replace_existing,
        validate_overlaps = request.validate_overlaps,
        "Processing commission tier bulk replace"
    );

    let (inputs, options) = request.into_parts();
    match state.commission().bulk_replace(&kpi_id, inputs, options).await {
        Ok(ranges) => {
            let views: Vec<CommissionTierView> = ranges.into_iter().map(Into::into).collect();
            json_response(StatusCode::OK, views)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for GET /commission-tiers/:id.
async fn get_commission_tier_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.commission().get(id).await {
        Ok(range) => json_response(StatusCode::OK, CommissionTierView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for PUT /commission-tiers/:id.
async fn update_commission_tier_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CommissionTierRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        range_id = %id,
        "Processing commission tier update"
    );

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let expected_version = request.expected_version;
    match state
        .commission()
        .update(id, request.into(), expected_version)
        .await
    {
        Ok(range) => json_response(StatusCode::OK, CommissionTierView::from(range)),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for DELETE /commission-tiers/:id.
async fn delete_commission_tier_handler(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => return path_rejection_response(correlation_id, rejection),
    };

    match state.commission().delete(id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => engine_error_response(correlation_id, err),
    }
}

/// Handler for POST /commission/calculate.
async fn calculate_commission_handler(
    State(state): State<AppState>,
    payload: Result<Json<CommissionCalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };
    info!(
        correlation_id = %correlation_id,
        kpi_id = %request.kpi_id,
        revenue = %request.revenue,
        "Processing commission calculation"
    );

    let start_time = Instant::now();
    match state
        .commission()
        .calculate(&request.kpi_id, request.revenue)
        .await
    {
        Ok(result) => {
            info!(
                correlation_id = %correlation_id,
                calculation_id = %result.calculation_id,
                total_commission = %result.total_commission,
                duration_us = start_time.elapsed().as_micros(),
                "Commission calculation completed successfully"
            );
            json_response(StatusCode::OK, result)
        }
        Err(err) => engine_error_response(correlation_id, err),
    }
}
