//! Handlers for expression submission and lookup.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use calc_core::Expression;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// Request body for POST /calculate.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

/// Response for POST /calculate.
#[derive(Debug, Serialize)]
pub struct CalculateResponse {
    pub id: String,
}

/// Response for GET /expressions.
#[derive(Debug, Serialize)]
pub struct ExpressionListResponse {
    pub expressions: Vec<Expression>,
}

/// Response for GET /expressions/{id}.
#[derive(Debug, Serialize)]
pub struct ExpressionResponse {
    pub expression: Expression,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/calculate
///
/// Compile and register an expression. Its leaf operations are queued for
/// workers immediately.
pub async fn calculate(
    State(state): State<AppState>,
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = payload?;
    let id = state.orchestrator.submit(&input.expression).await?;

    Ok((StatusCode::CREATED, Json(CalculateResponse { id })))
}

/// GET /api/v1/expressions
pub async fn list_expressions(State(state): State<AppState>) -> Json<ExpressionListResponse> {
    let expressions = state.orchestrator.list_expressions().await;
    Json(ExpressionListResponse { expressions })
}

/// GET /api/v1/expressions/{id}
pub async fn get_expression(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ExpressionResponse>> {
    let expression = state.orchestrator.get_expression(&id).await?;
    Ok(Json(ExpressionResponse { expression }))
}
