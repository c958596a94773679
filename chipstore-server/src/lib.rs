//! chipstore-server: storefront REST API over MongoDB
//!
//! Products, orders, reviews, accounts and an admin surface, served by
//! axum with a lazily-established single MongoDB connection. The router
//! can be embedded into another application via [`build_router`] or run
//! standalone via [`run_server`].

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use config::{Environment, ServerConfig};
pub use db::{ConnectionManager, ConnectionStatus};
pub use http::{build_router, run_server, ApiError, ServerError};
pub use state::AppState;
