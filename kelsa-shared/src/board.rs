/// Board, list and card operations
///
/// Every operation takes the acting user and checks that the board involved
/// belongs to them; anything else is reported as not found so that foreign
/// IDs cannot be probed. Positions stay dense: creations append, deletions
/// re-number the remaining siblings.
///
/// # Example
///
/// ```
/// use kelsa_shared::board::{add_card, load_or_create_board};
/// use kelsa_shared::store::memory::MemoryStore;
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), kelsa_shared::board::BoardError> {
/// let store = MemoryStore::new();
/// let user_id = Uuid::new_v4();
///
/// let state = load_or_create_board(&store, user_id).await?;
/// assert_eq!(state.board.name, "My First Board");
/// assert_eq!(state.lists.len(), 3);
///
/// let card = add_card(&store, user_id, state.lists[0].id, "Write the README").await?;
/// assert_eq!(card.position, 0);
/// # Ok(())
/// # }
/// ```

use crate::entitlement::{check_list_quota, is_premium, EntitlementError};
use crate::models::{
    board::{Board, CreateBoard},
    card::{Card, CardPlacement, CreateCard},
    list::{CreateList, List, ListPosition},
};
use crate::reorder::BoardState;
use crate::store::{BoardStore, StoreError, UserStore};
use tracing::{debug, info};
use uuid::Uuid;

/// Name of the board created on first load
pub const DEFAULT_BOARD_NAME: &str = "My First Board";

/// Lists created on an empty board
pub const DEFAULT_LISTS: [&str; 3] = ["To Do", "In Progress", "Done"];

/// Longest accepted list name
pub const MAX_LIST_NAME_LENGTH: usize = 100;

/// Longest accepted card content
pub const MAX_CARD_CONTENT_LENGTH: usize = 2000;

/// Board operation error
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Board result type alias
pub type BoardResult<T> = Result<T, BoardError>;

/// Returns the user's board, creating the default board and lists if needed
pub async fn load_or_create_board<S>(store: &S, user_id: Uuid) -> BoardResult<BoardState>
where
    S: BoardStore + ?Sized,
{
    let board = match store.find_first_board(user_id).await? {
        Some(board) => board,
        None => {
            let board = store
                .create_board(CreateBoard {
                    user_id,
                    name: DEFAULT_BOARD_NAME.to_string(),
                })
                .await?;
            info!(user_id = %user_id, board_id = %board.id, "Created default board");
            board
        }
    };

    let mut lists = store.lists_for_board(board.id).await?;
    if lists.is_empty() {
        for (position, name) in DEFAULT_LISTS.iter().enumerate() {
            lists.push(
                store
                    .create_list(CreateList {
                        board_id: board.id,
                        name: name.to_string(),
                        position: position as i32,
                    })
                    .await?,
            );
        }
        debug!(board_id = %board.id, "Created default lists");
    }

    let cards = store.cards_for_board(board.id).await?;
    Ok(BoardState::new(board, lists, cards))
}

/// Board owned by `user_id`
pub async fn owned_board<S>(store: &S, user_id: Uuid, board_id: Uuid) -> BoardResult<Board>
where
    S: BoardStore + ?Sized,
{
    store
        .find_board(board_id)
        .await?
        .filter(|board| board.user_id == user_id)
        .ok_or(BoardError::NotFound("Board"))
}

/// List on a board owned by `user_id`
pub async fn owned_list<S>(store: &S, user_id: Uuid, list_id: Uuid) -> BoardResult<List>
where
    S: BoardStore + ?Sized,
{
    let list = store
        .find_list(list_id)
        .await?
        .ok_or(BoardError::NotFound("List"))?;

    owned_board(store, user_id, list.board_id)
        .await
        .map_err(|e| rename_not_found(e, "List"))?;

    Ok(list)
}

/// Card on a board owned by `user_id`, with its list
pub async fn owned_card<S>(store: &S, user_id: Uuid, card_id: Uuid) -> BoardResult<(Card, List)>
where
    S: BoardStore + ?Sized,
{
    let card = store
        .find_card(card_id)
        .await?
        .ok_or(BoardError::NotFound("Card"))?;

    let list = owned_list(store, user_id, card.list_id)
        .await
        .map_err(|e| rename_not_found(e, "Card"))?;

    Ok((card, list))
}

/// Appends a list, subject to the list quota
pub async fn add_list<S>(store: &S, user_id: Uuid, board_id: Uuid, name: &str) -> BoardResult<List>
where
    S: BoardStore + UserStore + ?Sized,
{
    let name = validate_text("List name", name, MAX_LIST_NAME_LENGTH)?;
    let board = owned_board(store, user_id, board_id).await?;

    let premium = is_premium(store, user_id).await?;
    let current = store.lists_for_board(board.id).await?.len();
    check_list_quota(premium, current)?;

    let list = store
        .create_list(CreateList {
            board_id: board.id,
            name,
            position: current as i32,
        })
        .await?;

    info!(user_id = %user_id, board_id = %board.id, list_id = %list.id, "List added");
    Ok(list)
}

/// Renames a list; a blank or unchanged name leaves it untouched
pub async fn rename_list<S>(store: &S, user_id: Uuid, list_id: Uuid, name: &str) -> BoardResult<List>
where
    S: BoardStore + ?Sized,
{
    let mut list = owned_list(store, user_id, list_id).await?;

    let name = name.trim();
    if name.is_empty() || name == list.name {
        return Ok(list);
    }
    if name.chars().count() > MAX_LIST_NAME_LENGTH {
        return Err(BoardError::Invalid(format!(
            "List name must be at most {} characters",
            MAX_LIST_NAME_LENGTH
        )));
    }

    if !store.rename_list(list.id, name).await? {
        return Err(BoardError::NotFound("List"));
    }
    list.name = name.to_string();

    Ok(list)
}

/// Deletes a list with all of its cards and re-numbers the remaining lists
pub async fn delete_list<S>(store: &S, user_id: Uuid, list_id: Uuid) -> BoardResult<()>
where
    S: BoardStore + ?Sized,
{
    let list = owned_list(store, user_id, list_id).await?;

    if !store.delete_list(list.id).await? {
        return Err(BoardError::NotFound("List"));
    }

    let positions: Vec<ListPosition> = store
        .lists_for_board(list.board_id)
        .await?
        .iter()
        .enumerate()
        .filter(|(index, l)| l.position != *index as i32)
        .map(|(index, l)| ListPosition {
            id: l.id,
            position: index as i32,
        })
        .collect();
    if !positions.is_empty() {
        store.apply_list_positions(&positions).await?;
    }

    info!(user_id = %user_id, list_id = %list.id, "List deleted");
    Ok(())
}

/// Appends a card to a list
pub async fn add_card<S>(store: &S, user_id: Uuid, list_id: Uuid, content: &str) -> BoardResult<Card>
where
    S: BoardStore + ?Sized,
{
    let content = validate_text("Card content", content, MAX_CARD_CONTENT_LENGTH)?;
    let list = owned_list(store, user_id, list_id).await?;

    let position = store.count_cards(list.id).await?;
    let card = store
        .create_card(CreateCard {
            list_id: list.id,
            content,
            position: position as i32,
        })
        .await?;

    debug!(list_id = %list.id, card_id = %card.id, "Card added");
    Ok(card)
}

/// Deletes a card and re-numbers the rest of its list
pub async fn delete_card<S>(store: &S, user_id: Uuid, card_id: Uuid) -> BoardResult<()>
where
    S: BoardStore + ?Sized,
{
    let (card, list) = owned_card(store, user_id, card_id).await?;

    if !store.delete_card(card.id).await? {
        return Err(BoardError::NotFound("Card"));
    }

    let placements: Vec<CardPlacement> = store
        .cards_for_board(list.board_id)
        .await?
        .iter()
        .filter(|c| c.list_id == list.id)
        .enumerate()
        .filter(|(index, c)| c.position != *index as i32)
        .map(|(index, c)| CardPlacement {
            id: c.id,
            list_id: list.id,
            position: index as i32,
        })
        .collect();
    if !placements.is_empty() {
        store.apply_card_placements(&placements).await?;
    }

    debug!(list_id = %list.id, card_id = %card.id, "Card deleted");
    Ok(())
}

fn rename_not_found(err: BoardError, entity: &'static str) -> BoardError {
    match err {
        BoardError::NotFound(_) => BoardError::NotFound(entity),
        other => other,
    }
}

fn validate_text(label: &str, value: &str, max: usize) -> BoardResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(BoardError::Invalid(format!("{} must not be blank", label)));
    }
    if value.chars().count() > max {
        return Err(BoardError::Invalid(format!(
            "{} must be at most {} characters",
            label, max
        )));
    }
    Ok(value.to_string())
}
