//! Service banner and catch-all 404

use axum::extract::OriginalUri;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Top-level API prefixes, echoed by the banner and the 404 body.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "/api/health",
    "/api/products",
    "/api/orders",
    "/api/auth",
    "/api/admin",
    "/api/reviews",
];

/// Service banner
#[derive(Serialize)]
pub struct BannerResponse {
    pub message: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub endpoints: &'static [&'static str],
    pub timestamp: String,
}

/// GET / - service banner
async fn root() -> Json<BannerResponse> {
    Json(BannerResponse {
        message: "ChipsStore API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        endpoints: AVAILABLE_ENDPOINTS,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// 404 body for unmatched routes
#[derive(Serialize)]
pub struct NotFoundResponse {
    pub error: &'static str,
    pub path: String,
    pub message: &'static str,
    pub available_endpoints: &'static [&'static str],
}

/// Fallback handler - any path the router does not know.
pub async fn not_found(OriginalUri(uri): OriginalUri) -> (StatusCode, Json<NotFoundResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundResponse {
            error: "not_found",
            path: uri.path().to_owned(),
            message: "route not found",
            available_endpoints: AVAILABLE_ENDPOINTS,
        }),
    )
}

/// Banner route; the fallback is registered on the top-level router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(root))
}
