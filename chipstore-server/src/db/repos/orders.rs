//! Order repository
//!
//! Orders are created in `pending` state with a server-computed total.
//! Status changes go through `update_status` so `updated_at` always
//! moves with them.

use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};
use serde::{Deserialize, Serialize};

use super::DbError;
use crate::models::{OrderDraft, OrderStatus, Paginated, Pagination};

/// One line item inside an order document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemRecord {
    pub product_id: ObjectId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

/// Order document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub items: Vec<OrderItemRecord>,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Order repository
pub struct OrderRepo<'a> {
    db: &'a Database,
}

impl<'a> OrderRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn collection(&self) -> Collection<OrderRecord> {
        self.db.collection("orders")
    }

    /// Insert a new pending order and return the stored record.
    pub async fn create(&self, draft: OrderDraft) -> Result<OrderRecord, DbError> {
        let now = DateTime::now();
        let record = OrderRecord {
            id: ObjectId::new(),
            email: draft.email.into_string(),
            items: draft
                .items
                .into_iter()
                .map(|item| OrderItemRecord {
                    product_id: item.product_id,
                    name: item.name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
            total: draft.total,
            status: OrderStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        self.collection().insert_one(&record).await?;
        Ok(record)
    }

    /// Fetch a single order by id.
    pub async fn get(&self, id: ObjectId) -> Result<OrderRecord, DbError> {
        self.collection()
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "order",
                id: id.to_hex(),
            })
    }

    /// All orders placed under an email address, newest first.
    pub async fn list_by_email(&self, email: &str) -> Result<Vec<OrderRecord>, DbError> {
        let orders = self
            .collection()
            .find(doc! { "email": email })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(orders)
    }

    /// List orders for the admin view, optionally filtered by status.
    pub async fn list(
        &self,
        page: Pagination,
        status: Option<OrderStatus>,
    ) -> Result<Paginated<OrderRecord>, DbError> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
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

    /// Set an order's status and return the updated record.
    pub async fn update_status(
        &self,
        id: ObjectId,
        status: OrderStatus,
    ) -> Result<OrderRecord, DbError> {
        let update = doc! {
            "$set": {
                "status": status.as_str(),
                "updated_at": DateTime::now(),
            }
        };

        self.collection()
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| DbError::NotFound {
                resource: "order",
                id: id.to_hex(),
            })
    }

    /// Number of orders in the collection.
    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(self.collection().count_documents(doc! {}).await?)
    }

    /// Sum of all order totals.
    pub async fn total_revenue(&self) -> Result<f64, DbError> {
        let pipeline = vec![doc! {
            "$group": { "_id": null, "total": { "$sum": "$total" } }
        }];

        let mut cursor = self.collection().aggregate(pipeline).await?;
        let revenue = match cursor.try_next().await? {
            Some(group) => group.get_f64("total").unwrap_or(0.0),
            None => 0.0,
        };
        Ok(revenue)
    }
}
