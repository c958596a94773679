//! Product repository
//!
//! Products live in the `products` collection. Timestamps are set here
//! so records carry server time, never client time.

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::DbError;
use crate::models::{Paginated, Pagination, ProductDraft};

/// Product document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub stock: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Product repository
pub struct ProductRepo<'a> {
    db: &'a Database,
}

impl<'a> ProductRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<ProductRecord> {
        self.db.collection("products")
    }

    /// Insert a new product and return the stored record.
    pub async fn create(&self, draft: ProductDraft) -> Result<ProductRecord, DbError> {
        let now = DateTime::now();
        let record = ProductRecord {
            id: ObjectId::new(),
            name: draft.name.into_string(),
            description: draft.description,
            price: draft.price,
            category: draft.category,
            image_url: draft.image_url,
            stock: draft.stock,
            created_at: now,
            updated_at: now,
        };

        self.collection().insert_one(&record).await?;
        Ok(record)
    }

    /// List products, newest first, optionally restricted to a category.
    pub async fn list(
        &self,
        page: Pagination,
        category: Option<&str>,
    ) -> Result<Paginated<ProductRecord>, DbError> {
        let filter = match category {
            Some(category) => doc! { "category": category },
            None => doc! {},
        };

        let total = self.collection().count_documents(filter.clone()).await?;
        let items = self
            .collection()
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .skip(page.skip())
            .limit(page.limit())
            .await?
            .try_collect()
            .await?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    /// Fetch a single product by id.
    pub async fn get(&self, id: ObjectId) -> Result<ProductRecord, DbError> {
        self.collection()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "product",
                id: id.to_hex(),
            })
    }

    /// Whether a product with this id exists.
    pub async fn exists(&self, id: ObjectId) -> Result<bool, DbError> {
        let found = self.collection().find_one(doc! { "_id": id }).await?;
        Ok(found.is_some())
    }

    /// Replace all mutable fields and return the updated record.
    pub async fn update(&self, id: ObjectId, draft: ProductDraft) -> Result<ProductRecord, DbError> {
        let update = doc! {
            "$set": {
                "name": draft.name.as_str(),
                "description": &draft.description,
                "price": draft.price,
                "category": &draft.category,
                "image_url": draft.image_url.as_deref(),
                "stock": draft.stock,
                "updated_at": DateTime::now(),
            }
        };

        self.collection()
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "product",
                id: id.to_hex(),
            })
    }

    /// Delete a product by id.
    pub async fn delete(&self, id: ObjectId) -> Result<(), DbError> {
        let result = self.collection().delete_one(doc! { "_id": id }).await?;
        if result.deleted_count == 0 {
            return Err(DbError::NotFound {
                resource: "product",
                id: id.to_hex(),
            });
        }
        Ok(())
    }

    /// Number of products in the collection.
    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(self.collection().count_documents(doc! {}).await?)
    }
}
