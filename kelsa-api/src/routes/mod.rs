/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login, refresh)
/// - `boards`: Board loading, list creation and column order
/// - `lists`: List rename and delete, card creation
/// - `cards`: Card moves and deletion
/// - `payment`: Premium checkout (order creation and verification)

pub mod auth;
pub mod boards;
pub mod cards;
pub mod health;
pub mod lists;
pub mod payment;
