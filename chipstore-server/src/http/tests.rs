//! HTTP API integration tests.
//!
//! These run the full router through `tower::ServiceExt::oneshot` with
//! connectors that never touch the network, so the gate, routing, CORS
//! and validation behavior are all exercised without a deployment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mongodb::options::ClientOptions;
use mongodb::Client;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::server::build_router;
use crate::config::ServerConfig;
use crate::db::{ConnectionError, ConnectionManager, Connector};
use crate::state::AppState;

/// Client that parses but never dials.
async fn stub_client() -> Client {
    let options = ClientOptions::parse("mongodb://stub.invalid:27017")
        .await
        .expect("stub options parse");
    Client::with_options(options).expect("stub client")
}

struct StubConnector {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Connector for StubConnector {
    async fn establish(&self, _uri: &str, _database: &str) -> Result<Client, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(stub_client().await)
    }
}

struct FlakyConnector {
    calls: Arc<AtomicUsize>,
    failures: usize,
}

#[async_trait]
impl Connector for FlakyConnector {
    async fn establish(&self, _uri: &str, _database: &str) -> Result<Client, ConnectionError> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(mongodb::error::Error::custom("simulated dial failure").into());
        }
        Ok(stub_client().await)
    }
}

fn state_with(uri: Option<&str>, connector: Box<dyn Connector>) -> AppState {
    let manager = ConnectionManager::with_connector(uri.map(String::from), None, connector);
    AppState::new(ServerConfig::default(), manager)
}

/// App whose connector always succeeds without dialing.
fn test_app() -> Router {
    let connector = Box::new(StubConnector {
        calls: Arc::new(AtomicUsize::new(0)),
    });
    build_router(state_with(Some("mongodb://stub.invalid:27017/chips"), connector))
}

/// App with no connection string configured at all.
fn unconfigured_app() -> Router {
    let connector = Box::new(StubConnector {
        calls: Arc::new(AtomicUsize::new(0)),
    });
    build_router(state_with(None, connector))
}

async fn body_json(response: Response<Body>) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn banner_lists_endpoints() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "ChipsStore API");
    assert_eq!(json["status"], "running");
    assert!(json["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e == "/api/health"));
}

#[tokio::test]
async fn unknown_path_echoes_path() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::get("/definitely/not/here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
    assert_eq!(json["path"], "/definitely/not/here");
    assert!(json["available_endpoints"].is_array());
}

#[tokio::test]
async fn every_route_fails_while_uri_is_unset() {
    let app = unconfigured_app();

    for path in ["/", "/api/health", "/api/products", "/no/such/route"] {
        let response = app
            .clone()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "expected 500 for {path}"
        );

        let json = body_json(response).await;
        assert_eq!(json["error"], "database_connection_failed");
    }
}

#[tokio::test]
async fn health_reports_connected_and_establishes_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let connector = Box::new(StubConnector {
        calls: Arc::clone(&calls),
    });
    let app = build_router(state_with(
        Some("mongodb://stub.invalid:27017/chips"),
        connector,
    ));

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["mongodb"], "Connected");
        assert_eq!(json["database"], "chips");
        assert_eq!(json["environment"], "development");
    }

    // One establishment for both requests: the gate memoizes and the
    // health handler never dials on its own.
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_gate_recovers_on_the_next_request() {
    let calls = Arc::new(AtomicUsize::new(0));
    let connector = Box::new(FlakyConnector {
        calls: Arc::clone(&calls),
        failures: 1,
    });
    let app = build_router(state_with(
        Some("mongodb://stub.invalid:27017/chips"),
        connector,
    ));

    let response = app
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = app
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["mongodb"], "Connected");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_object_id_is_rejected() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::get("/api/products/not-an-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn missing_bearer_token_is_unauthorized() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
}

#[tokio::test]
async fn orders_listing_requires_an_email() {
    let app = test_app();
    let response = app
        .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_with_no_items_is_rejected() {
    let app = test_app();
    let body = json!({ "email": "sam@example.com", "items": [] });
    let response = app
        .oneshot(json_request(Method::POST, "/api/orders", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "validation_error");
}

#[tokio::test]
async fn out_of_range_rating_is_rejected() {
    let app = test_app();
    let body = json!({
        "product_id": "bbbbbbbbbbbbbbbbbbbbbbbb",
        "author": "Sam",
        "rating": 6,
        "comment": "too crunchy"
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/reviews", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_password_is_rejected() {
    let app = test_app();
    let body = json!({
        "name": "Sam",
        "email": "sam@example.com",
        "password": "short"
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/auth/register", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let app = test_app();
    let body = json!({
        "name": "Chips",
        "price": -2.49,
        "category": "snacks"
    });
    let response = app
        .oneshot(json_request(Method::POST, "/api/products", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_order_status_filter_is_rejected() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::get("/api/admin/orders?status=refunded")
                .header(header::AUTHORIZATION, "Bearer some-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn preflight_is_answered_even_while_db_is_down() {
    let app = unconfigured_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/products")
                .header(header::ORIGIN, "http://localhost:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn preflight_ignores_unknown_origin() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/products")
                .header(header::ORIGIN, "http://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "GET")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}

#[tokio::test]
async fn hosted_frontend_suffix_is_allowed() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/orders")
                .header(header::ORIGIN, "https://chipstore.vercel.app")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://chipstore.vercel.app")
    );
}
