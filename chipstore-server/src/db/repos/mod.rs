//! Collection repositories
//!
//! One repository per collection, each borrowing the `Database` handle
//! the connection manager produced for the current request.

pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

pub use orders::{OrderItemRecord, OrderRecord, OrderRepo};
pub use products::{ProductRecord, ProductRepo};
pub use reviews::{ReviewRecord, ReviewRepo};
pub use users::{ensure_session_ttl_index, SessionRecord, UserRecord, UserRepo};

/// Database error type shared by the repositories.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}
