//! # Kelsa Shared Library
//!
//! Domain logic for the Kelsa task board, shared by the API server and its
//! tests.
//!
//! ## Module Organization
//!
//! - `models`: database rows and their sqlx queries
//! - `store`: storage traits with PostgreSQL and in-memory backends
//! - `db`: connection pool and migrations
//! - `auth`: passwords, JWTs and the Axum auth layer
//! - `reorder`: drag-and-drop reordering of lists and cards
//! - `board`: board, list and card operations
//! - `entitlement`: premium flag and the list quota
//! - `payment`: order creation and payment verification

pub mod auth;
pub mod board;
pub mod db;
pub mod entitlement;
pub mod models;
pub mod payment;
pub mod reorder;
pub mod store;

/// Current version of the Kelsa shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
