//! Admin endpoints
//!
//! Every handler resolves the bearer session and requires the `admin`
//! role before touching any collection.

use axum::extract::{Query, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{OrderRepo, ProductRepo, UserRecord, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{BearerToken, ValidObjectId};
use crate::http::routes::auth::UserProfile;
use crate::http::routes::orders::OrderResponse;
use crate::models::{OrderStatus, Paginated, Pagination, PaginationParams, Role};
use crate::state::AppState;

async fn require_admin(repo: &UserRepo<'_>, token: &str) -> Result<UserRecord, ApiError> {
    let user = repo
        .resolve_session(token)
        .await?
        .ok_or(ApiError::Unauthorized {
            reason: "invalid or expired session",
        })?;

    if user.role != Role::Admin {
        return Err(ApiError::Forbidden {
            reason: "admin role required",
        });
    }

    Ok(user)
}

/// Store-wide counters
#[derive(Serialize)]
pub struct StatsResponse {
    pub products: u64,
    pub orders: u64,
    pub users: u64,
    pub revenue: f64,
}

/// GET /api/admin/stats - collection counts and total revenue
async fn stats(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<StatsResponse>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    require_admin(&UserRepo::new(&db), &token).await?;

    let orders_repo = OrderRepo::new(&db);
    Ok(Json(StatsResponse {
        products: ProductRepo::new(&db).count().await?,
        orders: orders_repo.count().await?,
        users: UserRepo::new(&db).count().await?,
        revenue: orders_repo.total_revenue().await?,
    }))
}

/// Admin orders list query
#[derive(Deserialize)]
pub struct AdminOrdersParams {
    pub status: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /api/admin/orders - all orders, optionally filtered by status
async fn list_orders(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(params): Query<AdminOrdersParams>,
) -> Result<Json<Paginated<OrderResponse>>, ApiError> {
    let status = params
        .status
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let db = state.connections().ensure_connected().await?;
    require_admin(&UserRepo::new(&db), &token).await?;

    let page = Pagination::from(PaginationParams {
        page: params.page,
        per_page: params.per_page,
    });
    let orders = OrderRepo::new(&db).list(page, status).await?;

    Ok(Json(orders.map(OrderResponse::from)))
}

/// Status change request
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// PUT /api/admin/orders/{id}/status - move an order to a new status
async fn update_order_status(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    ValidObjectId(id): ValidObjectId,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let status: OrderStatus = req.status.parse()?;

    let db = state.connections().ensure_connected().await?;
    require_admin(&UserRepo::new(&db), &token).await?;

    let order = OrderRepo::new(&db).update_status(id, status).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// GET /api/admin/users - registered users, without password hashes
async fn list_users(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Paginated<UserProfile>>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let repo = UserRepo::new(&db);
    require_admin(&repo, &token).await?;

    let users = repo.list(Pagination::from(params)).await?;
    Ok(Json(users.map(UserProfile::from)))
}

/// Admin routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stats", get(stats))
        .route("/api/admin/orders", get(list_orders))
        .route("/api/admin/orders/{id}/status", put(update_order_status))
        .route("/api/admin/users", get(list_users))
}
