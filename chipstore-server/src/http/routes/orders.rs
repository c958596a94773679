//! Order endpoints
//!
//! Totals are computed from the submitted line items on the server;
//! a `total` field in the request body would be ignored.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::repos::{OrderItemRecord, OrderRecord, OrderRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidObjectId;
use crate::models::{EmailAddress, OrderDraft, OrderItemDraft, ValidationError};
use crate::state::AppState;

/// One line item in a create-order request
#[derive(Deserialize)]
pub struct OrderItemPayload {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Create order request
#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub email: String,
    pub items: Vec<OrderItemPayload>,
}

/// Order line item response
#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl From<OrderItemRecord> for OrderItemResponse {
    fn from(item: OrderItemRecord) -> Self {
        Self {
            product_id: item.product_id.to_hex(),
            name: item.name,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// Order response
#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub email: String,
    pub items: Vec<OrderItemResponse>,
    pub total: f64,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<OrderRecord> for OrderResponse {
    fn from(o: OrderRecord) -> Self {
        Self {
            id: o.id.to_hex(),
            email: o.email,
            items: o.items.into_iter().map(OrderItemResponse::from).collect(),
            total: o.total,
            status: o.status.as_str().to_owned(),
            created_at: o.created_at.to_chrono().to_rfc3339(),
            updated_at: o.updated_at.to_chrono().to_rfc3339(),
        }
    }
}

fn parse_items(items: Vec<OrderItemPayload>) -> Result<Vec<OrderItemDraft>, ApiError> {
    items
        .into_iter()
        .map(|item| {
            let product_id = ObjectId::parse_str(&item.product_id).map_err(|_| {
                ApiError::Validation(ValidationError::InvalidFormat {
                    field: "product_id",
                    reason: "invalid ObjectId format",
                })
            })?;
            let draft =
                OrderItemDraft::new(product_id, &item.name, item.quantity, item.unit_price)?;
            Ok(draft)
        })
        .collect()
}

/// POST /api/orders - place an order
async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let email = EmailAddress::new(&req.email)?;
    let items = parse_items(req.items)?;
    let draft = OrderDraft::new(email, items)?;

    let db = state.connections().ensure_connected().await?;
    let order = OrderRepo::new(&db).create(draft).await?;

    Ok((StatusCode::CREATED, Json(OrderResponse::from(order))))
}

/// GET /api/orders/{id} - fetch one order
async fn get_order(
    State(state): State<AppState>,
    ValidObjectId(id): ValidObjectId,
) -> Result<Json<OrderResponse>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let order = OrderRepo::new(&db).get(id).await?;

    Ok(Json(OrderResponse::from(order)))
}

/// Orders list query
#[derive(Deserialize)]
pub struct ListOrdersParams {
    pub email: Option<String>,
}

/// GET /api/orders?email= - a customer's orders, newest first
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let email = params
        .email
        .ok_or(ApiError::Validation(ValidationError::Empty {
            field: "email",
        }))?;
    let email = EmailAddress::new(&email)?;

    let db = state.connections().ensure_connected().await?;
    let orders = OrderRepo::new(&db).list_by_email(email.as_str()).await?;

    Ok(Json(orders.into_iter().map(OrderResponse::from).collect()))
}

/// Order routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order).get(list_orders))
        .route("/api/orders/{id}", get(get_order))
}
