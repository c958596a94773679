//! HTTP server: routes, middleware, extractors and error mapping.

pub mod error;
pub mod extractors;
pub mod gate;
pub mod routes;
pub mod server;

#[cfg(test)]
mod tests;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerError};
