/// PostgreSQL storage backend
///
/// Thin adapter from the storage traits to the sqlx models.

use super::{BillingStore, BoardStore, Store, StoreResult, UserStore};
use crate::db::pool::health_check;
use crate::models::{
    board::{Board, CreateBoard},
    card::{Card, CardPlacement, CreateCard},
    list::{CreateList, List, ListPosition},
    transaction::{CreateTransaction, Transaction},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Store backed by a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn set_premium(&self, id: Uuid, premium: bool) -> StoreResult<bool> {
        Ok(User::set_premium(&self.pool, id, premium).await?)
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn create_board(&self, data: CreateBoard) -> StoreResult<Board> {
        Ok(Board::create(&self.pool, data).await?)
    }

    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        Ok(Board::find_by_id(&self.pool, id).await?)
    }

    async fn find_first_board(&self, user_id: Uuid) -> StoreResult<Option<Board>> {
        Ok(Board::find_first_by_user(&self.pool, user_id).await?)
    }

    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>> {
        Ok(List::list_by_board(&self.pool, board_id).await?)
    }

    async fn cards_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Card>> {
        Ok(Card::list_by_board(&self.pool, board_id).await?)
    }

    async fn create_list(&self, data: CreateList) -> StoreResult<List> {
        Ok(List::create(&self.pool, data).await?)
    }

    async fn find_list(&self, id: Uuid) -> StoreResult<Option<List>> {
        Ok(List::find_by_id(&self.pool, id).await?)
    }

    async fn rename_list(&self, id: Uuid, name: &str) -> StoreResult<bool> {
        Ok(List::rename(&self.pool, id, name).await?)
    }

    async fn delete_list(&self, id: Uuid) -> StoreResult<bool> {
        Ok(List::delete(&self.pool, id).await?)
    }

    async fn create_card(&self, data: CreateCard) -> StoreResult<Card> {
        Ok(Card::create(&self.pool, data).await?)
    }

    async fn find_card(&self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(Card::find_by_id(&self.pool, id).await?)
    }

    async fn count_cards(&self, list_id: Uuid) -> StoreResult<i64> {
        Ok(Card::count_by_list(&self.pool, list_id).await?)
    }

    async fn delete_card(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Card::delete(&self.pool, id).await?)
    }

    async fn apply_list_positions(&self, positions: &[ListPosition]) -> StoreResult<()> {
        Ok(List::apply_positions(&self.pool, positions).await?)
    }

    async fn apply_card_placements(&self, placements: &[CardPlacement]) -> StoreResult<()> {
        Ok(Card::apply_placements(&self.pool, placements).await?)
    }
}

#[async_trait]
impl BillingStore for PgStore {
    async fn create_transaction(&self, data: CreateTransaction) -> StoreResult<Transaction> {
        Ok(Transaction::create(&self.pool, data).await?)
    }

    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>> {
        Ok(Transaction::find_by_order_id(&self.pool, order_id).await?)
    }

    async fn mark_transaction_success(
        &self,
        order_id: &str,
        payment_id: &str,
    ) -> StoreResult<bool> {
        Ok(Transaction::mark_success(&self.pool, order_id, payment_id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}
