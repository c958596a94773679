//! Health check endpoint
//!
//! Reports the manager's tracked status without touching the network;
//! any connection establishment on this path happened in the gate,
//! exactly as for every other route.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub mongodb: &'static str,
    pub database: String,
    pub environment: &'static str,
    pub timestamp: String,
}

/// GET /api/health - service and connection status
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "ChipsStore API is running",
        mongodb: state.connections().status().as_str(),
        database: state.connections().database_name().to_owned(),
        environment: state.config().environment.as_str(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Health routes
pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}
