pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{expressions, tasks};
use crate::state::AppState;

/// Build the public `/api/v1` route tree.
///
/// ```text
/// POST /calculate          -> calculate
/// GET  /expressions        -> list_expressions
/// GET  /expressions/{id}   -> get_expression
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/calculate", post(expressions::calculate))
        .route("/expressions", get(expressions::list_expressions))
        .route("/expressions/{id}", get(expressions::get_expression))
}

/// Worker-facing routes mounted at `/internal`.
///
/// ```text
/// GET  /task          -> next_task
/// POST /task/result   -> submit_result
/// ```
pub fn internal_routes() -> Router<AppState> {
    Router::new()
        .route("/task", get(tasks::next_task))
        .route("/task/result", post(tasks::submit_result))
}
