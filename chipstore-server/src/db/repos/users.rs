//! User and session repository
//!
//! Sessions are bearer tokens stored in their own collection with a
//! fixed expiry. Queries filter on `expires_at`; the TTL index created
//! by [`ensure_session_ttl_index`] at connection bootstrap removes
//! expired documents for good.

use chrono::{Duration, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};
use serde::{Deserialize, Serialize};

use super::DbError;
use crate::models::{EmailAddress, Paginated, Pagination, Role};

/// How long a session token stays valid.
const SESSION_TTL_DAYS: i64 = 30;

/// User document as stored. The password hash never leaves the
/// repository layer in responses; response types omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime,
}

/// Session document as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub token: String,
    pub user_id: ObjectId,
    pub created_at: DateTime,
    pub expires_at: DateTime,
}

/// User repository
pub struct UserRepo<'a> {
    db: &'a Database,
}

impl<'a> UserRepo<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<UserRecord> {
        self.db.collection("users")
    }

    fn sessions(&self) -> Collection<SessionRecord> {
        self.db.collection("sessions")
    }

    /// Insert a new user and return the stored record.
    ///
    /// Callers check for an existing email first; this does not enforce
    /// uniqueness itself.
    pub async fn create(
        &self,
        name: String,
        email: EmailAddress,
        password_hash: String,
        role: Role,
    ) -> Result<UserRecord, DbError> {
        let record = UserRecord {
            id: ObjectId::new(),
            name,
            email: email.into_string(),
            password_hash,
            role,
            created_at: DateTime::now(),
        };

        self.users().insert_one(&record).await?;
        Ok(record)
    }

    /// Look up a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, DbError> {
        Ok(self.users().find_one(doc! { "email": email }).await?)
    }

    /// Look up a user by id.
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<UserRecord>, DbError> {
        Ok(self.users().find_one(doc! { "_id": id }).await?)
    }

    /// List users for the admin view, newest first.
    pub async fn list(&self, page: Pagination) -> Result<Paginated<UserRecord>, DbError> {
        let total = self.users().count_documents(doc! {}).await?;
        let items = self
            .users()
            .find(doc! {})
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

    /// Number of users in the collection.
    pub async fn count(&self) -> Result<u64, DbError> {
        Ok(self.users().count_documents(doc! {}).await?)
    }

    /// Store a new session for a user.
    pub async fn create_session(
        &self,
        user_id: ObjectId,
        token: String,
    ) -> Result<SessionRecord, DbError> {
        let now = Utc::now();
        let record = SessionRecord {
            id: ObjectId::new(),
            token,
            user_id,
            created_at: DateTime::from_chrono(now),
            expires_at: DateTime::from_chrono(now + Duration::days(SESSION_TTL_DAYS)),
        };

        self.sessions().insert_one(&record).await?;
        Ok(record)
    }

    /// Find a session that has not expired yet.
    pub async fn find_valid_session(&self, token: &str) -> Result<Option<SessionRecord>, DbError> {
        let session = self
            .sessions()
            .find_one(doc! {
                "token": token,
                "expires_at": { "$gt": DateTime::now() },
            })
            .await?;
        Ok(session)
    }

    /// Resolve a session token to its user, if the session is valid.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<UserRecord>, DbError> {
        let Some(session) = self.find_valid_session(token).await? else {
            return Ok(None);
        };
        self.find_by_id(session.user_id).await
    }

    /// Delete a session by token. Deleting an unknown token is fine.
    pub async fn delete_session(&self, token: &str) -> Result<(), DbError> {
        self.sessions().delete_one(doc! { "token": token }).await?;
        Ok(())
    }
}

/// Create the TTL index that removes sessions once `expires_at` passes.
///
/// Runs at connection bootstrap. Creating an index that already exists
/// is a server-side no-op, so reconnects are safe.
pub async fn ensure_session_ttl_index(db: &Database) -> Result<(), mongodb::error::Error> {
    let index = IndexModel::builder()
        .keys(doc! { "expires_at": 1 })
        .options(
            IndexOptions::builder()
                .expire_after(std::time::Duration::from_secs(0))
                .build(),
        )
        .build();

    db.collection::<SessionRecord>("sessions")
        .create_index(index)
        .await?;
    Ok(())
}
