/// Storage traits
///
/// The reorder engine, the payment handshake and the board operations talk
/// to persistence only through these traits. Two backends exist:
///
/// - [`postgres::PgStore`]: the production backend, delegating to the sqlx
///   models in [`crate::models`]
/// - [`memory::MemoryStore`]: an in-process backend with failure injection,
///   used by tests and local runs without a database
///
/// The contract is plain row CRUD with equality and ordering filters. The
/// only multi-row guarantee is that `apply_list_positions` and
/// `apply_card_placements` are all-or-nothing.
///
/// # Example
///
/// ```
/// use kelsa_shared::store::{memory::MemoryStore, BoardStore};
/// use kelsa_shared::models::board::CreateBoard;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), kelsa_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let board = store.create_board(CreateBoard {
///     user_id: Uuid::new_v4(),
///     name: "Roadmap".to_string(),
/// }).await?;
/// assert!(store.lists_for_board(board.id).await?.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use crate::models::{
    board::{Board, CreateBoard},
    card::{Card, CardPlacement, CreateCard},
    list::{CreateList, List, ListPosition},
    transaction::{CreateTransaction, Transaction},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A row expected by a write does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

    /// The store rejected the operation (used by the in-memory backend)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Accounts and the premium entitlement
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Returns false if the user does not exist
    async fn set_premium(&self, id: Uuid, premium: bool) -> StoreResult<bool>;
}

/// Boards, lists and cards
#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn create_board(&self, data: CreateBoard) -> StoreResult<Board>;

    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>>;

    /// Oldest board owned by the user
    async fn find_first_board(&self, user_id: Uuid) -> StoreResult<Option<Board>>;

    /// Lists of a board ordered by position
    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>>;

    /// Cards of a board ordered by list position, then card position
    async fn cards_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Card>>;

    async fn create_list(&self, data: CreateList) -> StoreResult<List>;

    async fn find_list(&self, id: Uuid) -> StoreResult<Option<List>>;

    async fn rename_list(&self, id: Uuid, name: &str) -> StoreResult<bool>;

    /// Deletes the list and all of its cards
    async fn delete_list(&self, id: Uuid) -> StoreResult<bool>;

    async fn create_card(&self, data: CreateCard) -> StoreResult<Card>;

    async fn find_card(&self, id: Uuid) -> StoreResult<Option<Card>>;

    async fn count_cards(&self, list_id: Uuid) -> StoreResult<i64>;

    async fn delete_card(&self, id: Uuid) -> StoreResult<bool>;

    /// Rewrites list positions, all or nothing
    async fn apply_list_positions(&self, positions: &[ListPosition]) -> StoreResult<()>;

    /// Rewrites card membership and positions, all or nothing
    async fn apply_card_placements(&self, placements: &[CardPlacement]) -> StoreResult<()>;
}

/// Payment transactions
#[async_trait]
pub trait BillingStore: Send + Sync {
    async fn create_transaction(&self, data: CreateTransaction) -> StoreResult<Transaction>;

    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>>;

    /// Conditional `pending → success`; false if nothing was transitioned
    async fn mark_transaction_success(&self, order_id: &str, payment_id: &str)
        -> StoreResult<bool>;
}

/// Everything the API server needs from persistence
#[async_trait]
pub trait Store: UserStore + BoardStore + BillingStore {
    /// Connectivity check used by the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug, Clone, Copy)]
    enum Violation {
        Unique,
        Check,
        ForeignKey,
    }

    #[derive(Debug)]
    struct FakeDbError {
        violation: Violation,
        constraint: &'static str,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "violates {}", self.constraint)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "constraint violation"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            None
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.constraint)
        }

        fn kind(&self) -> ErrorKind {
            match self.violation {
                Violation::Unique => ErrorKind::UniqueViolation,
                Violation::Check => ErrorKind::CheckViolation,
                Violation::ForeignKey => ErrorKind::ForeignKeyViolation,
            }
        }
    }

    fn db_error(violation: Violation, constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError {
            violation,
            constraint,
        }))
    }

    #[test]
    fn test_unique_violation_is_conflict() {
        let err = StoreError::from(db_error(Violation::Unique, "users_email_key"));
        assert!(matches!(err, StoreError::Conflict(ref c) if c == "users_email_key"));
    }

    #[test]
    fn test_other_constraint_violations_are_database_errors() {
        let check = StoreError::from(db_error(Violation::Check, "transactions_amount_check"));
        assert!(matches!(check, StoreError::Database(_)));

        let fk = StoreError::from(db_error(
            Violation::ForeignKey,
            "transactions_user_id_fkey",
        ));
        assert!(matches!(fk, StoreError::Database(_)));
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::NotFound(_)
        ));
    }
}
