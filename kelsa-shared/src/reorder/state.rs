/// Board state value
///
/// An explicit snapshot of one board: its lists in position order and its
/// cards grouped by list, each group in position order. Planning takes one of
/// these and returns a new one; nothing is mutated in place behind the
/// caller's back.

use super::{ReorderError, ReorderResult};
use crate::models::{board::Board, card::Card, list::List};
use crate::store::BoardStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardState {
    pub board: Board,

    /// Ordered by position
    pub lists: Vec<List>,

    /// Ordered by list position, then card position
    pub cards: Vec<Card>,
}

impl BoardState {
    /// Builds a state and brings both sequences into display order
    pub fn new(board: Board, lists: Vec<List>, cards: Vec<Card>) -> Self {
        let mut state = Self { board, lists, cards };
        state.sort();
        state
    }

    /// Reads the authoritative state of a board from the store
    pub async fn load<S>(store: &S, board_id: Uuid) -> ReorderResult<Self>
    where
        S: BoardStore + ?Sized,
    {
        let board = store
            .find_board(board_id)
            .await?
            .ok_or(ReorderError::BoardNotFound(board_id))?;
        let lists = store.lists_for_board(board_id).await?;
        let cards = store.cards_for_board(board_id).await?;

        Ok(Self::new(board, lists, cards))
    }

    pub fn list(&self, list_id: Uuid) -> Option<&List> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    pub fn card(&self, card_id: Uuid) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == card_id)
    }

    /// Cards of one list in display order
    pub fn cards_in(&self, list_id: Uuid) -> impl Iterator<Item = &Card> + '_ {
        self.cards.iter().filter(move |c| c.list_id == list_id)
    }

    /// True if list positions and every list's card positions are `0..n`
    pub fn is_dense(&self) -> bool {
        let lists_dense = self
            .lists
            .iter()
            .enumerate()
            .all(|(i, l)| l.position == i as i32);

        lists_dense
            && self.lists.iter().all(|list| {
                self.cards_in(list.id)
                    .enumerate()
                    .all(|(i, c)| c.position == i as i32)
            })
    }

    pub(crate) fn sort(&mut self) {
        self.lists.sort_by_key(|l| l.position);

        let ranks: HashMap<Uuid, usize> = self
            .lists
            .iter()
            .enumerate()
            .map(|(rank, l)| (l.id, rank))
            .collect();
        self.cards.sort_by_key(|c| {
            (
                ranks.get(&c.list_id).copied().unwrap_or(usize::MAX),
                c.position,
            )
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn list(board_id: Uuid, position: i32) -> List {
        List {
            id: Uuid::new_v4(),
            board_id,
            name: format!("list {}", position),
            position,
            created_at: Utc::now(),
        }
    }

    fn card(list_id: Uuid, position: i32) -> Card {
        Card {
            id: Uuid::new_v4(),
            list_id,
            content: format!("card {}", position),
            position,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_sorts_by_display_order() {
        let board = Board {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Board".to_string(),
            created_at: Utc::now(),
        };
        let second = list(board.id, 1);
        let first = list(board.id, 0);
        let cards = vec![card(second.id, 0), card(first.id, 1), card(first.id, 0)];

        let state = BoardState::new(board, vec![second.clone(), first.clone()], cards);

        assert_eq!(state.lists[0].id, first.id);
        let order: Vec<(Uuid, i32)> = state.cards.iter().map(|c| (c.list_id, c.position)).collect();
        assert_eq!(order, vec![(first.id, 0), (first.id, 1), (second.id, 0)]);
        assert!(state.is_dense());
    }

    #[test]
    fn test_is_dense_detects_gaps() {
        let board = Board {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Board".to_string(),
            created_at: Utc::now(),
        };
        let only = list(board.id, 0);
        let state = BoardState::new(board, vec![only.clone()], vec![card(only.id, 0), card(only.id, 2)]);

        assert!(!state.is_dense());
    }
}
