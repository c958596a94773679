//! Review repository

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::DbError;
use crate::models::ReviewDraft;

/// Review document as stored. Ratings are 1..=5, enforced at the
/// validation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub product_id: ObjectId,
    pub author: String,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime,
}

/// Review repository
pub struct ReviewRepo<'a> {
    db: &'a Database,
}

impl<'a> ReviewRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<ReviewRecord> {
        self.db.collection("reviews")
    }

    /// Insert a new review and return the stored record.
    pub async fn create(&self, draft: ReviewDraft) -> Result<ReviewRecord, DbError> {
        let record = ReviewRecord {
            id: ObjectId::new(),
            product_id: draft.product_id,
            author: draft.author,
            rating: draft.rating.value() as i32,
            comment: draft.comment,
            created_at: DateTime::now(),
        };

        self.collection().insert_one(&record).await?;
        Ok(record)
    }

    /// All reviews for a product, newest first.
    pub async fn list_for_product(
        &self,
        product_id: ObjectId,
    ) -> Result<Vec<ReviewRecord>, DbError> {
        let reviews = self
            .collection()
            .find(doc! { "product_id": product_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(reviews)
    }

    /// Delete a review by id.
    pub async fn delete(&self, id: ObjectId) -> Result<(), DbError> {
        let result = self.collection().delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(DbError::NotFound {
                resource: "review",
                id: id.to_hex(),
            });
        }
        Ok(())
    }
}
