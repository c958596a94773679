//! Review endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::db::repos::{ProductRepo, ReviewRecord, ReviewRepo};
use crate::http::error::ApiError;
use crate::http::extractors::ValidObjectId;
use crate::models::{ReviewDraft, ValidationError};
use crate::state::AppState;

/// Create review request
#[derive(Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: String,
    pub author: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Review response
#[derive(Serialize)]
pub struct ReviewResponse {
    pub id: String,
    pub product_id: String,
    pub author: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: String,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(r: ReviewRecord) -> Self {
        Self {
            id: r.id.to_hex(),
            product_id: r.product_id.to_hex(),
            author: r.author,
            rating: r.rating,
            comment: r.comment,
            created_at: r.created_at.to_chrono().to_rfc3339(),
        }
    }
}

/// GET /api/reviews/product/{product_id} - reviews for a product, newest first
async fn list_reviews(
    State(state): State<AppState>,
    ValidObjectId(product_id): ValidObjectId,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let db = state.connections().ensure_connected().await?;
    let reviews = ReviewRepo::new(&db).list_for_product(product_id).await?;

    Ok(Json(reviews.into_iter().map(ReviewResponse::from).collect()))
}

/// POST /api/reviews - review an existing product
async fn create_review(
    State(state): State<AppState>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let product_id = ObjectId::parse_str(&req.product_id).map_err(|_| {
        ApiError::Validation(ValidationError::InvalidFormat {
            field: "product_id",
            reason: "invalid ObjectId format",
        })
    })?;
    let draft = ReviewDraft::new(product_id, &req.author, req.rating, &req.comment)?;

    let db = state.connections().ensure_connected().await?;
    if !ProductRepo::new(&db).exists(product_id).await? {
        return Err(ApiError::NotFound {
            resource: "product",
            id: product_id.to_hex(),
        });
    }

    let review = ReviewRepo::new(&db).create(draft).await?;
    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

/// DELETE /api/reviews/{id} - delete a review
async fn delete_review(
    State(state): State<AppState>,
    ValidObjectId(id): ValidObjectId,
) -> Result<StatusCode, ApiError> {
    let db = state.connections().ensure_connected().await?;
    ReviewRepo::new(&db).delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Review routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reviews", post(create_review))
        .route("/api/reviews/product/{product_id}", get(list_reviews))
        .route("/api/reviews/{id}", delete(delete_review))
}
