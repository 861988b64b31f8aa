/// In-memory storage backend
///
/// Keeps every table in a single mutex-guarded struct. Row order inside each
/// table is insertion order, which breaks ties the same way `created_at`
/// does in PostgreSQL.
///
/// Failures can be injected per operation with [`MemoryStore::fail_on`], and
/// [`MemoryStore::write_count`] reports how many mutating calls reached the
/// store. Both exist so that rollback and "no write on cancel" behavior can be
/// asserted.
///
/// # Example
///
/// ```
/// use kelsa_shared::store::memory::{FailurePoint, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.fail_on(FailurePoint::CardPlacements);
/// assert_eq!(store.write_count(), 0);
/// ```

use super::{BillingStore, BoardStore, Store, StoreError, StoreResult, UserStore};
use crate::models::{
    board::{Board, CreateBoard},
    card::{Card, CardPlacement, CreateCard},
    list::{CreateList, List, ListPosition},
    transaction::{CreateTransaction, Transaction, TransactionStatus},
    user::{CreateUser, User},
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Operation that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    /// `apply_list_positions`
    ListPositions,

    /// `apply_card_placements`
    CardPlacements,

    /// Board/list/card reads
    BoardReads,

    /// `create_transaction`
    CreateTransaction,

    /// `mark_transaction_success`
    MarkTransaction,

    /// `set_premium`
    SetPremium,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    boards: Vec<Board>,
    lists: Vec<List>,
    cards: Vec<Card>,
    transactions: Vec<Transaction>,
    failures: HashSet<FailurePoint>,
}

impl Tables {
    fn check(&self, point: FailurePoint) -> StoreResult<()> {
        if self.failures.contains(&point) {
            return Err(StoreError::Unavailable(format!("injected failure: {:?}", point)));
        }
        Ok(())
    }

    fn list_position(&self, list_id: Uuid) -> Option<i32> {
        self.lists.iter().find(|l| l.id == list_id).map(|l| l.position)
    }
}

/// Store that lives in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the given operation fail
    pub fn fail_on(&self, point: FailurePoint) {
        self.lock().failures.insert(point);
    }

    /// Clears an injected failure
    pub fn recover(&self, point: FailurePoint) {
        self.lock().failures.remove(&point);
    }

    /// Number of mutating calls that reached the store, including failed ones
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means a test panicked mid-write; the data is still usable
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        self.record_write();
        let mut tables = self.lock();

        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&data.email))
        {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            password_hash: data.password_hash,
            name: data.name,
            is_premium: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn set_premium(&self, id: Uuid, premium: bool) -> StoreResult<bool> {
        self.record_write();
        let mut tables = self.lock();
        tables.check(FailurePoint::SetPremium)?;

        match tables.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_premium = premium;
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn create_board(&self, data: CreateBoard) -> StoreResult<Board> {
        self.record_write();
        let board = Board {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            name: data.name,
            created_at: Utc::now(),
        };
        self.lock().boards.push(board.clone());

        Ok(board)
    }

    async fn find_board(&self, id: Uuid) -> StoreResult<Option<Board>> {
        let tables = self.lock();
        tables.check(FailurePoint::BoardReads)?;
        Ok(tables.boards.iter().find(|b| b.id == id).cloned())
    }

    async fn find_first_board(&self, user_id: Uuid) -> StoreResult<Option<Board>> {
        let tables = self.lock();
        tables.check(FailurePoint::BoardReads)?;
        Ok(tables.boards.iter().find(|b| b.user_id == user_id).cloned())
    }

    async fn lists_for_board(&self, board_id: Uuid) -> StoreResult<Vec<List>> {
        let tables = self.lock();
        tables.check(FailurePoint::BoardReads)?;

        let mut lists: Vec<List> = tables
            .lists
            .iter()
            .filter(|l| l.board_id == board_id)
            .cloned()
            .collect();
        lists.sort_by_key(|l| l.position);

        Ok(lists)
    }

    async fn cards_for_board(&self, board_id: Uuid) -> StoreResult<Vec<Card>> {
        let tables = self.lock();
        tables.check(FailurePoint::BoardReads)?;

        let list_ranks: HashMap<Uuid, i32> = tables
            .lists
            .iter()
            .filter(|l| l.board_id == board_id)
            .map(|l| (l.id, l.position))
            .collect();

        let mut cards: Vec<Card> = tables
            .cards
            .iter()
            .filter(|c| list_ranks.contains_key(&c.list_id))
            .cloned()
            .collect();
        cards.sort_by_key(|c| (list_ranks[&c.list_id], c.position));

        Ok(cards)
    }

    async fn create_list(&self, data: CreateList) -> StoreResult<List> {
        self.record_write();
        let mut tables = self.lock();

        if !tables.boards.iter().any(|b| b.id == data.board_id) {
            return Err(StoreError::NotFound(format!("board {}", data.board_id)));
        }

        let list = List {
            id: Uuid::new_v4(),
            board_id: data.board_id,
            name: data.name,
            position: data.position,
            created_at: Utc::now(),
        };
        tables.lists.push(list.clone());

        Ok(list)
    }

    async fn find_list(&self, id: Uuid) -> StoreResult<Option<List>> {
        Ok(self.lock().lists.iter().find(|l| l.id == id).cloned())
    }

    async fn rename_list(&self, id: Uuid, name: &str) -> StoreResult<bool> {
        self.record_write();
        match self.lock().lists.iter_mut().find(|l| l.id == id) {
            Some(list) => {
                list.name = name.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_list(&self, id: Uuid) -> StoreResult<bool> {
        self.record_write();
        let mut tables = self.lock();

        let before = tables.lists.len();
        tables.lists.retain(|l| l.id != id);
        tables.cards.retain(|c| c.list_id != id);

        Ok(tables.lists.len() < before)
    }

    async fn create_card(&self, data: CreateCard) -> StoreResult<Card> {
        self.record_write();
        let mut tables = self.lock();

        if tables.list_position(data.list_id).is_none() {
            return Err(StoreError::NotFound(format!("list {}", data.list_id)));
        }

        let card = Card {
            id: Uuid::new_v4(),
            list_id: data.list_id,
            content: data.content,
            position: data.position,
            created_at: Utc::now(),
        };
        tables.cards.push(card.clone());

        Ok(card)
    }

    async fn find_card(&self, id: Uuid) -> StoreResult<Option<Card>> {
        Ok(self.lock().cards.iter().find(|c| c.id == id).cloned())
    }

    async fn count_cards(&self, list_id: Uuid) -> StoreResult<i64> {
        Ok(self
            .lock()
            .cards
            .iter()
            .filter(|c| c.list_id == list_id)
            .count() as i64)
    }

    async fn delete_card(&self, id: Uuid) -> StoreResult<bool> {
        self.record_write();
        let mut tables = self.lock();

        let before = tables.cards.len();
        tables.cards.retain(|c| c.id != id);

        Ok(tables.cards.len() < before)
    }

    async fn apply_list_positions(&self, positions: &[ListPosition]) -> StoreResult<()> {
        self.record_write();
        let mut tables = self.lock();
        tables.check(FailurePoint::ListPositions)?;

        // Validate everything first so a missing row leaves the table untouched
        for entry in positions {
            if !tables.lists.iter().any(|l| l.id == entry.id) {
                return Err(StoreError::NotFound(format!("list {}", entry.id)));
            }
        }

        for entry in positions {
            if let Some(list) = tables.lists.iter_mut().find(|l| l.id == entry.id) {
                list.position = entry.position;
            }
        }

        Ok(())
    }

    async fn apply_card_placements(&self, placements: &[CardPlacement]) -> StoreResult<()> {
        self.record_write();
        let mut tables = self.lock();
        tables.check(FailurePoint::CardPlacements)?;

        for placement in placements {
            if !tables.cards.iter().any(|c| c.id == placement.id) {
                return Err(StoreError::NotFound(format!("card {}", placement.id)));
            }
            if tables.list_position(placement.list_id).is_none() {
                return Err(StoreError::NotFound(format!("list {}", placement.list_id)));
            }
        }

        for placement in placements {
            if let Some(card) = tables.cards.iter_mut().find(|c| c.id == placement.id) {
                card.list_id = placement.list_id;
                card.position = placement.position;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl BillingStore for MemoryStore {
    async fn create_transaction(&self, data: CreateTransaction) -> StoreResult<Transaction> {
        self.record_write();
        let mut tables = self.lock();
        tables.check(FailurePoint::CreateTransaction)?;

        if tables.transactions.iter().any(|t| t.order_id == data.order_id) {
            return Err(StoreError::Conflict("transactions_order_id_key".to_string()));
        }

        let now = Utc::now();
        let transaction = Transaction {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            order_id: data.order_id,
            payment_id: None,
            amount: data.amount,
            currency: data.currency,
            status: TransactionStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        tables.transactions.push(transaction.clone());

        Ok(transaction)
    }

    async fn find_transaction_by_order(&self, order_id: &str) -> StoreResult<Option<Transaction>> {
        Ok(self
            .lock()
            .transactions
            .iter()
            .find(|t| t.order_id == order_id)
            .cloned())
    }

    async fn mark_transaction_success(
        &self,
        order_id: &str,
        payment_id: &str,
    ) -> StoreResult<bool> {
        self.record_write();
        let mut tables = self.lock();
        tables.check(FailurePoint::MarkTransaction)?;

        match tables
            .transactions
            .iter_mut()
            .find(|t| t.order_id == order_id && t.status == TransactionStatus::Pending)
        {
            Some(transaction) => {
                transaction.status = TransactionStatus::Success;
                transaction.payment_id = Some(payment_id.to_string());
                transaction.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, Board) {
        let store = MemoryStore::new();
        let board = store
            .create_board(CreateBoard {
                user_id: Uuid::new_v4(),
                name: "Board".to_string(),
            })
            .await
            .unwrap();
        (store, board)
    }

    #[tokio::test]
    async fn test_lists_are_returned_by_position() {
        let (store, board) = seeded().await;
        for (name, position) in [("b", 1), ("a", 0), ("c", 2)] {
            store
                .create_list(CreateList {
                    board_id: board.id,
                    name: name.to_string(),
                    position,
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .lists_for_board(board.id)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_placements_are_all_or_nothing() {
        let (store, board) = seeded().await;
        let list = store
            .create_list(CreateList {
                board_id: board.id,
                name: "To Do".to_string(),
                position: 0,
            })
            .await
            .unwrap();
        let card = store
            .create_card(CreateCard {
                list_id: list.id,
                content: "write tests".to_string(),
                position: 0,
            })
            .await
            .unwrap();

        let result = store
            .apply_card_placements(&[
                CardPlacement {
                    id: card.id,
                    list_id: list.id,
                    position: 5,
                },
                CardPlacement {
                    id: Uuid::new_v4(),
                    list_id: list.id,
                    position: 0,
                },
            ])
            .await;

        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.find_card(card.id).await.unwrap().unwrap().position, 0);
    }

    #[tokio::test]
    async fn test_injected_failure_and_recovery() {
        let (store, _board) = seeded().await;
        store.fail_on(FailurePoint::ListPositions);
        assert!(store.apply_list_positions(&[]).await.is_err());

        store.recover(FailurePoint::ListPositions);
        assert!(store.apply_list_positions(&[]).await.is_ok());
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn test_delete_list_cascades_to_cards() {
        let (store, board) = seeded().await;
        let list = store
            .create_list(CreateList {
                board_id: board.id,
                name: "Done".to_string(),
                position: 0,
            })
            .await
            .unwrap();
        store
            .create_card(CreateCard {
                list_id: list.id,
                content: "ship".to_string(),
                position: 0,
            })
            .await
            .unwrap();

        assert!(store.delete_list(list.id).await.unwrap());
        assert_eq!(store.count_cards(list.id).await.unwrap(), 0);
        assert!(store.cards_for_board(board.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_success_only_once() {
        let store = MemoryStore::new();
        store
            .create_transaction(CreateTransaction {
                user_id: Uuid::new_v4(),
                order_id: "order_1".to_string(),
                amount: 1.0,
                currency: "INR".to_string(),
            })
            .await
            .unwrap();

        assert!(store.mark_transaction_success("order_1", "pay_1").await.unwrap());
        assert!(!store.mark_transaction_success("order_1", "pay_2").await.unwrap());

        let transaction = store.find_transaction_by_order("order_1").await.unwrap().unwrap();
        assert_eq!(transaction.payment_id.as_deref(), Some("pay_1"));
        assert_eq!(transaction.status, TransactionStatus::Success);
    }
}
