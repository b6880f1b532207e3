//! API route handlers

pub mod checkout;
pub mod events;
pub mod health;

use axum::{http::StatusCode, routing::get, Json, Router};

use crate::dto::ApiError;
use crate::AppState;

/// Error half of every handler's result
pub type RouteError = (StatusCode, Json<ApiError>);

/// Map a domain error carrying an HTTP status and code
pub(crate) fn route_error(status: u16, code: &str, message: impl ToString) -> RouteError {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiError::new(code, message.to_string())))
}

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/checkout", checkout::router())
        .nest("/events", events::router())
        .with_state(state)
}
