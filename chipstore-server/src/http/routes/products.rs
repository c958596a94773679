//! Product endpoints

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::db::repos::{ProductRecord, ProductRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidObjectId;
use crate::models::{Paginated, Pagination, PaginationParams, ProductDraft};
use crate::state::AppState;

/// Create/update product request
#[derive(Deserialize)]
pub struct ProductPayload {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub stock: i64,
}

impl ProductPayload {
    fn into_draft(self) -> Result<ProductDraft, ApiError> {
        let draft = ProductDraft::new(
            &self.name,
            &self.description,
            self.price,
            &self.category,
            self.image_url,
            self.stock,
        )?;
        Ok(draft)
    }
}

/// Product response
#[derive(Serialize)]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub stock: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ProductRecord> for ProductResponse {
    fn from(p: ProductRecord) -> Self {
        Self {
            id: p.id.to_hex(),
            name: p.name,
            description: p.description,
            price: p.price,
            category: p.category,
            image_url: p.image_url,
            stock: p.stock,
            created_at: p.created_at.to_chrono().to_rfc3339(),
            updated_at: p.updated_at.to_chrono().to_rfc3339(),
        }
    }
}

/// List query: pagination plus an optional category filter
#[derive(Deserialize)]
pub struct ListProductsParams {
    pub category: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GET /api/products - list products, optionally by category
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<Paginated<ProductResponse>>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let page = Pagination::from(PaginationParams {
        page: params.page,
        per_page: params.per_page,
    });
    let products = ProductRepo::new(&db)
        .list(page, params.category.as_deref())
        .await?;

    Ok(Json(products.map(ProductResponse::from)))
}

/// GET /api/products/{id} - fetch one product
async fn get_product(
    State(state): State<AppState>,
    ValidObjectId(id): ValidObjectId,
) -> Result<Json<ProductResponse>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let product = ProductRepo::new(&db).get(id).await?;

    Ok(Json(ProductResponse::from(product)))
}

/// POST /api/products - create a product
async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let draft = payload.into_draft()?;
    let db = state.connections().ensure_connected().await?;
    let product = ProductRepo::new(&db).create(draft).await?;

    Ok((StatusCode::CREATED, Json(ProductResponse::from(product))))
}

/// PUT /api/products/{id} - replace a product's fields
async fn update_product(
    State(state): State<AppState>,
    ValidObjectId(id): ValidObjectId,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<ProductResponse>, ApiError> {
    let draft = payload.into_draft()?;
    let db = state.connections().ensure_connected().await?;
    let product = ProductRepo::new(&db).update(id, draft).await?;

    Ok(Json(ProductResponse::from(product)))
}

/// DELETE /api/products/{id} - delete a product
async fn delete_product(
    State(state): State<AppState>,
    ValidObjectId(id): ValidObjectId,
) -> Result<StatusCode, ApiError> {
    let db = state.connections().ensure_connected().await?;
    ProductRepo::new(&db).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Product routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list_products).post(create_product))
        .route(
            "/api/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
}
