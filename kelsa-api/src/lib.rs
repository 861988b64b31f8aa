//! # Kelsa API Server Library
//!
//! HTTP surface of the Kelsa task board: authentication, the board with its
//! lists and cards, drag-and-drop reordering, and the premium checkout.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
