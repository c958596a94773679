//! Axum server setup
//!
//! One router builder serves two entry points: `build_router` for
//! embedding the API into an existing application, and `run_server`
//! for the standalone binary with its own listener and shutdown
//! handling. In development the standalone entry connects eagerly and
//! dies on failure; in production the gate connects lazily per request.

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::{gate, routes};
use crate::config::{CorsPolicy, ServerConfig};
use crate::db::ConnectionError;
use crate::state::AppState;

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
}

/// Build the full API router for the given state.
///
/// The connection gate wraps every route, the health endpoint and the
/// 404 fallback included. CORS sits outermost so preflights and error
/// responses both carry the right headers.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors);

    Router::new()
        .merge(routes::meta::router())
        .merge(routes::health::router())
        .merge(routes::products::router())
        .merge(routes::orders::router())
        .merge(routes::auth::router())
        .merge(routes::admin::router())
        .merge(routes::reviews::router())
        .fallback(routes::meta::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::require_connection,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::from_env();
/// run_server(config).await?;
/// ```
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = AppState::from_config(config);

    if state.config().environment.connects_eagerly() {
        state.connections().ensure_connected().await?;
    }

    let addr = state.config().bind_addr();
    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        environment = state.config().environment.as_str(),
        database = state.connections().database_name(),
        "Server listening on {}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Drained; release the client before exiting.
    state.connections().close().await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Credentialed CORS: allowed origins are echoed back, never `*`.
fn cors_layer(policy: &CorsPolicy) -> CorsLayer {
    let policy = policy.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|origin| policy.is_allowed(origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}
