//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod email;
pub mod order;
pub mod pagination;
pub mod product;
pub mod review;
pub mod user;
pub mod validation;

pub use email::EmailAddress;
pub use order::{OrderDraft, OrderItemDraft, OrderStatus};
pub use pagination::{Paginated, Pagination, PaginationParams};
pub use product::{ProductDraft, ProductName};
pub use review::{Rating, ReviewDraft};
pub use user::{Registration, Role};
pub use validation::ValidationError;
