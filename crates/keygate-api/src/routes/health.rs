//! Health check endpoint

use axum::{extract::State, Json};

use crate::dto::HealthResponse;
use crate::AppState;

/// GET /health - API health and the network checkouts are served for
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let network = state.config().await.network.network;
    Json(HealthResponse::for_network(network.as_str()))
}
