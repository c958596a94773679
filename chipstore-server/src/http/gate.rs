//! Connection gate middleware
//!
//! Every route passes through here, the health endpoint and the 404
//! fallback included. The gate asks the manager for a live connection
//! before the handler runs; on failure the request is answered with a
//! 500 JSON body and the manager stays disconnected for the next try.
//! Handlers then fetch the same memoized handle without re-dialing.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::error::ApiError;
use crate::state::AppState;

pub async fn require_connection(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Err(err) = state.connections().ensure_connected().await {
        return ApiError::from(err).into_response();
    }

    next.run(request).await
}
