/// Reorder engine
///
/// Applies plans from [`super::plan`] against a [`BoardStore`]:
///
/// 1. publish the planned state to the observer (optimistic update)
/// 2. write all changed rows in one atomic batch
/// 3. re-read the board and publish the authoritative state
///
/// If step 2 fails the pre-drag snapshot is published again and returned in
/// [`DragOutcome::RolledBack`]. Cancelled gestures and drops onto the
/// original slot return [`DragOutcome::Unchanged`] without touching the
/// store.
///
/// # Example
///
/// ```no_run
/// use kelsa_shared::reorder::{BoardState, DragEnd, ReorderEngine};
/// use kelsa_shared::store::memory::MemoryStore;
/// use tokio::sync::watch;
///
/// # async fn example(drag: DragEnd, board_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let state = BoardState::load(&store, board_id).await?;
/// let (tx, rx) = watch::channel(state.clone());
///
/// let outcome = ReorderEngine::new(&store)
///     .with_observer(&tx)
///     .handle_drag_end(state, &drag)
///     .await?;
/// assert_eq!(&*rx.borrow(), outcome.state());
/// # Ok(())
/// # }
/// ```

use super::plan::{arrange_columns, plan_card_drag, plan_drag, Plan, Writes};
use super::{BoardState, DragEnd, DragLocation, ReorderError, ReorderResult};
use crate::store::{BoardStore, StoreError};
use tokio::sync::watch;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Result of handling one drag gesture
#[derive(Debug)]
pub enum DragOutcome {
    /// Nothing to do; the state is returned as given
    Unchanged(BoardState),

    /// Writes succeeded; `state` is the reconciled state
    Committed { state: BoardState, writes: usize },

    /// Writes failed; `state` is the restored pre-drag snapshot
    RolledBack { state: BoardState, error: StoreError },
}

impl DragOutcome {
    /// The state the observer saw last
    pub fn state(&self) -> &BoardState {
        match self {
            DragOutcome::Unchanged(state) => state,
            DragOutcome::Committed { state, .. } => state,
            DragOutcome::RolledBack { state, .. } => state,
        }
    }

    pub fn into_state(self) -> BoardState {
        match self {
            DragOutcome::Unchanged(state) => state,
            DragOutcome::Committed { state, .. } => state,
            DragOutcome::RolledBack { state, .. } => state,
        }
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, DragOutcome::RolledBack { .. })
    }
}

/// Runs reorder plans against a store
pub struct ReorderEngine<'a, S: BoardStore + ?Sized> {
    store: &'a S,
    observer: Option<&'a watch::Sender<BoardState>>,
}

impl<'a, S: BoardStore + ?Sized> ReorderEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            observer: None,
        }
    }

    /// Publishes every optimistic, reconciled and restored state to `observer`
    pub fn with_observer(mut self, observer: &'a watch::Sender<BoardState>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Handles a finished drag gesture against the given state
    ///
    /// # Errors
    ///
    /// Returns an error only if the gesture cannot be planned (stale source,
    /// unknown destination). Store failures are reported as
    /// [`DragOutcome::RolledBack`].
    pub async fn handle_drag_end(
        &self,
        state: BoardState,
        drag: &DragEnd,
    ) -> ReorderResult<DragOutcome> {
        let Some(plan) = plan_drag(&state, drag)? else {
            debug!(draggable_id = %drag.draggable_id, "Drag ended without a change");
            return Ok(DragOutcome::Unchanged(state));
        };

        debug!(
            draggable_id = %drag.draggable_id,
            kind = ?drag.kind,
            writes = plan.writes.len(),
            "Applying drag"
        );

        Ok(self.commit(state, plan).await)
    }

    /// Puts a board's lists in the given order
    ///
    /// # Errors
    ///
    /// `InvalidOrder` if `ordered_ids` is not a permutation of the board's
    /// lists, `Store` if the write fails.
    pub async fn reorder_columns(
        &self,
        board_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ReorderResult<BoardState> {
        let state = BoardState::load(self.store, board_id).await?;
        let plan = arrange_columns(&state, ordered_ids)?;
        if plan.writes.is_empty() {
            return Ok(state);
        }

        self.commit_or_fail(state, plan).await
    }

    /// Moves a card to `dest_index` of `dest_list_id`
    ///
    /// The destination list must be on the same board as the card.
    pub async fn move_card(
        &self,
        card_id: Uuid,
        dest_list_id: Uuid,
        dest_index: usize,
    ) -> ReorderResult<BoardState> {
        let card = self
            .store
            .find_card(card_id)
            .await?
            .ok_or(ReorderError::CardNotFound(card_id))?;
        let list = self
            .store
            .find_list(card.list_id)
            .await?
            .ok_or(ReorderError::ListNotFound(card.list_id))?;

        let state = BoardState::load(self.store, list.board_id).await?;
        let destination = DragLocation {
            droppable_id: dest_list_id,
            index: dest_index,
        };

        match plan_card_drag(&state, card_id, destination)? {
            Some(plan) => self.commit_or_fail(state, plan).await,
            None => Ok(state),
        }
    }

    async fn commit_or_fail(&self, snapshot: BoardState, plan: Plan) -> ReorderResult<BoardState> {
        match self.commit(snapshot, plan).await {
            DragOutcome::RolledBack { error, .. } => Err(ReorderError::Store(error)),
            outcome => Ok(outcome.into_state()),
        }
    }

    async fn commit(&self, snapshot: BoardState, plan: Plan) -> DragOutcome {
        let board_id = snapshot.board.id;
        let writes = plan.writes.len();
        self.publish(&plan.state);

        if let Err(error) = self.persist(&plan.writes).await {
            error!(board_id = %board_id, error = %error, "Reorder write failed, restoring snapshot");
            self.publish(&snapshot);
            return DragOutcome::RolledBack {
                state: snapshot,
                error,
            };
        }

        let state = match BoardState::load(self.store, board_id).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(board_id = %board_id, error = %e, "Reconciliation read failed, keeping planned state");
                plan.state
            }
        };
        self.publish(&state);

        DragOutcome::Committed { state, writes }
    }

    async fn persist(&self, writes: &Writes) -> Result<(), StoreError> {
        if !writes.lists.is_empty() {
            self.store.apply_list_positions(&writes.lists).await?;
        }
        if !writes.cards.is_empty() {
            self.store.apply_card_placements(&writes.cards).await?;
        }
        Ok(())
    }

    fn publish(&self, state: &BoardState) {
        if let Some(observer) = self.observer {
            observer.send_replace(state.clone());
        }
    }
}
