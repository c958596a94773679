//! HTTP route handlers

pub mod admin;
pub mod auth;
pub mod health;
pub mod meta;
pub mod orders;
pub mod products;
pub mod reviews;
