/// Database models for Kelsa
///
/// Each model carries its row type, its input types and its CRUD operations
/// against a `PgPool`. Code outside the storage layer reaches them through
/// the traits in [`crate::store`].
///
/// # Models
///
/// - `user`: accounts and the premium entitlement
/// - `board`: boards owned by a user
/// - `list`: ordered columns of a board
/// - `card`: ordered task items of a list
/// - `transaction`: payment attempts

pub mod board;
pub mod card;
pub mod list;
pub mod transaction;
pub mod user;
