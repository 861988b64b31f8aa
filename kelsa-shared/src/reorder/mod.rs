/// Drag-and-drop reordering of lists and cards
///
/// A drag gesture ends with a [`DragEnd`]: what was dragged, where it came
/// from and where it was dropped. The engine turns that into a new
/// [`BoardState`], publishes it optimistically, writes the changed positions
/// in one batch, and reconciles from a fresh read. If the write fails the
/// pre-drag snapshot is restored and published instead.
///
/// Planning is pure and lives in [`plan`]; the side effects live in
/// [`engine`]. The server-side `reorder_columns` and `move_card` operations
/// share the same planning code.
///
/// # Example
///
/// ```
/// use kelsa_shared::reorder::{DragEnd, DragKind, DragLocation};
/// use uuid::Uuid;
///
/// let board_id = Uuid::new_v4();
/// let drag = DragEnd {
///     kind: DragKind::Column,
///     draggable_id: Uuid::new_v4(),
///     source: DragLocation { droppable_id: board_id, index: 0 },
///     destination: Some(DragLocation { droppable_id: board_id, index: 2 }),
/// };
/// assert!(!drag.is_cancelled());
/// ```

pub mod engine;
pub mod plan;
pub mod state;

pub use engine::{DragOutcome, ReorderEngine};
pub use plan::{Plan, Writes};
pub use state::BoardState;

use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of entity was dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    /// A list, dragged within the board
    Column,

    /// A card, dragged within or across lists
    Card,
}

/// A slot in a droppable container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragLocation {
    /// Board ID for columns, list ID for cards
    pub droppable_id: Uuid,

    /// Zero-based index inside the container
    pub index: usize,
}

/// Outcome of a finished drag gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragEnd {
    pub kind: DragKind,

    /// ID of the dragged list or card
    pub draggable_id: Uuid,

    pub source: DragLocation,

    /// `None` when the gesture was cancelled
    pub destination: Option<DragLocation>,
}

impl DragEnd {
    pub fn is_cancelled(&self) -> bool {
        self.destination.is_none()
    }
}

/// Reorder error
#[derive(Debug, thiserror::Error)]
pub enum ReorderError {
    #[error("Board not found: {0}")]
    BoardNotFound(Uuid),

    #[error("List not found: {0}")]
    ListNotFound(Uuid),

    #[error("Card not found: {0}")]
    CardNotFound(Uuid),

    /// The source slot no longer holds the dragged entity
    #[error("Stale drag source: {draggable_id} is not at index {index}")]
    StaleSource { draggable_id: Uuid, index: usize },

    /// The drop target is not a container of the dragged kind
    #[error("Invalid drop target: {0}")]
    InvalidDestination(Uuid),

    /// The requested order is not a permutation of the board's lists
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reorder result type alias
pub type ReorderResult<T> = Result<T, ReorderError>;
