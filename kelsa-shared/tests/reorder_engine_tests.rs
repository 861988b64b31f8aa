/// Integration tests for the reorder engine
///
/// These run the engine against the in-memory store, including injected
/// write failures, and check what the observer channel saw.

use kelsa_shared::board::{add_card, add_list, load_or_create_board};
use kelsa_shared::reorder::{
    BoardState, DragEnd, DragKind, DragLocation, DragOutcome, ReorderEngine, ReorderError,
};
use kelsa_shared::store::memory::{FailurePoint, MemoryStore};
use kelsa_shared::store::{StoreError, UserStore};
use kelsa_shared::models::user::CreateUser;
use tokio::sync::watch;
use uuid::Uuid;

/// Premium user with a board of four lists holding 3, 2, 0 and 1 cards
async fn seeded_board() -> (MemoryStore, Uuid, BoardState) {
    let store = MemoryStore::new();
    let user = store
        .create_user(CreateUser {
            email: "grace@example.com".to_string(),
            password_hash: "hash".to_string(),
            name: Some("Grace".to_string()),
        })
        .await
        .unwrap();
    store.set_premium(user.id, true).await.unwrap();

    let state = load_or_create_board(&store, user.id).await.unwrap();
    add_list(&store, user.id, state.board.id, "Archive").await.unwrap();

    let state = BoardState::load(&store, state.board.id).await.unwrap();
    for (list, count) in state.lists.iter().zip([3, 2, 0, 1]) {
        for n in 0..count {
            add_card(&store, user.id, list.id, &format!("{} #{}", list.name, n))
                .await
                .unwrap();
        }
    }

    let state = BoardState::load(&store, state.board.id).await.unwrap();
    (store, user.id, state)
}

fn column_drag(state: &BoardState, from: usize, to: usize) -> DragEnd {
    DragEnd {
        kind: DragKind::Column,
        draggable_id: state.lists[from].id,
        source: DragLocation {
            droppable_id: state.board.id,
            index: from,
        },
        destination: Some(DragLocation {
            droppable_id: state.board.id,
            index: to,
        }),
    }
}

fn card_drag(state: &BoardState, list: usize, index: usize, to_list: usize, to_index: usize) -> DragEnd {
    let source_list = state.lists[list].id;
    DragEnd {
        kind: DragKind::Card,
        draggable_id: state.cards_in(source_list).nth(index).unwrap().id,
        source: DragLocation {
            droppable_id: source_list,
            index,
        },
        destination: Some(DragLocation {
            droppable_id: state.lists[to_list].id,
            index: to_index,
        }),
    }
}

#[tokio::test]
async fn test_column_drag_persists_dense_positions() {
    let (store, _, state) = seeded_board().await;
    let expected = vec![
        state.lists[1].id,
        state.lists[2].id,
        state.lists[0].id,
        state.lists[3].id,
    ];
    let drag = column_drag(&state, 0, 2);

    let outcome = ReorderEngine::new(&store)
        .handle_drag_end(state.clone(), &drag)
        .await
        .unwrap();

    assert!(matches!(outcome, DragOutcome::Committed { writes: 3, .. }));

    let stored = BoardState::load(&store, state.board.id).await.unwrap();
    let order: Vec<Uuid> = stored.lists.iter().map(|l| l.id).collect();
    assert_eq!(order, expected);
    assert!(stored.is_dense());
    assert_eq!(outcome.state(), &stored);
}

#[tokio::test]
async fn test_chained_column_drags_stay_dense() {
    let (store, _, mut state) = seeded_board().await;
    let mut expected: Vec<Uuid> = state.lists.iter().map(|l| l.id).collect();
    let engine = ReorderEngine::new(&store);

    for (from, to) in [(0, 3), (2, 0), (1, 10), (3, 1), (0, 2)] {
        let moved = expected.remove(from);
        expected.insert(to.min(expected.len()), moved);

        let drag = column_drag(&state, from, to);
        state = engine
            .handle_drag_end(state, &drag)
            .await
            .unwrap()
            .into_state();

        let stored = BoardState::load(&store, state.board.id).await.unwrap();
        let order: Vec<Uuid> = stored.lists.iter().map(|l| l.id).collect();
        assert_eq!(order, expected, "after drag {} -> {}", from, to);
        assert!(stored.is_dense(), "after drag {} -> {}", from, to);
        assert_eq!(state, stored);
    }
}

#[tokio::test]
async fn test_card_drag_across_lists() {
    let (store, _, state) = seeded_board().await;
    let (list_a, list_b) = (state.lists[0].id, state.lists[1].id);
    let drag = card_drag(&state, 0, 2, 1, 0);

    let outcome = ReorderEngine::new(&store)
        .handle_drag_end(state.clone(), &drag)
        .await
        .unwrap();
    let reconciled = outcome.into_state();

    let moved = reconciled.card(drag.draggable_id).unwrap();
    assert_eq!(moved.list_id, list_b);
    assert_eq!(moved.position, 0);
    assert_eq!(reconciled.cards_in(list_a).count(), 2);
    assert_eq!(reconciled.cards_in(list_b).count(), 3);
    assert!(reconciled.is_dense());

    let stored = BoardState::load(&store, state.board.id).await.unwrap();
    assert_eq!(stored, reconciled);
}

#[tokio::test]
async fn test_card_drag_within_list_lands_on_destination_index() {
    let (store, _, state) = seeded_board().await;
    let list_id = state.lists[0].id;

    for (from, to) in [(0, 2), (2, 0), (1, 2)] {
        let current = BoardState::load(&store, state.board.id).await.unwrap();
        let drag = card_drag(&current, 0, from, 0, to);

        let reconciled = ReorderEngine::new(&store)
            .handle_drag_end(current, &drag)
            .await
            .unwrap()
            .into_state();

        assert_eq!(reconciled.card(drag.draggable_id).unwrap().position, to as i32);
        assert_eq!(reconciled.cards_in(list_id).count(), 3);
        assert!(reconciled.is_dense());
    }
}

#[tokio::test]
async fn test_cancelled_drag_does_not_write() {
    let (store, _, state) = seeded_board().await;
    let (tx, rx) = watch::channel(state.clone());
    let writes = store.write_count();

    let mut drag = card_drag(&state, 0, 0, 1, 0);
    drag.destination = None;

    let outcome = ReorderEngine::new(&store)
        .with_observer(&tx)
        .handle_drag_end(state.clone(), &drag)
        .await
        .unwrap();

    assert!(matches!(outcome, DragOutcome::Unchanged(_)));
    assert_eq!(store.write_count(), writes);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(BoardState::load(&store, state.board.id).await.unwrap(), state);
}

#[tokio::test]
async fn test_drop_on_same_slot_does_not_write() {
    let (store, _, state) = seeded_board().await;
    let writes = store.write_count();

    let column = column_drag(&state, 1, 1);
    let card = card_drag(&state, 0, 1, 0, 1);
    let engine = ReorderEngine::new(&store);

    assert!(matches!(
        engine.handle_drag_end(state.clone(), &column).await.unwrap(),
        DragOutcome::Unchanged(_)
    ));
    assert!(matches!(
        engine.handle_drag_end(state.clone(), &card).await.unwrap(),
        DragOutcome::Unchanged(_)
    ));
    assert_eq!(store.write_count(), writes);
}

#[tokio::test]
async fn test_failed_card_write_rolls_back() {
    let (store, _, state) = seeded_board().await;
    store.fail_on(FailurePoint::CardPlacements);
    let (tx, rx) = watch::channel(state.clone());
    let drag = card_drag(&state, 0, 0, 1, 1);

    let outcome = ReorderEngine::new(&store)
        .with_observer(&tx)
        .handle_drag_end(state.clone(), &drag)
        .await
        .unwrap();

    match outcome {
        DragOutcome::RolledBack { state: restored, error } => {
            assert_eq!(restored, state);
            assert!(matches!(error, StoreError::Unavailable(_)));
        }
        other => panic!("expected rollback, got {:?}", other),
    }
    assert_eq!(*rx.borrow(), state);
    assert_eq!(BoardState::load(&store, state.board.id).await.unwrap(), state);
}

#[tokio::test]
async fn test_failed_column_write_rolls_back() {
    let (store, _, state) = seeded_board().await;
    store.fail_on(FailurePoint::ListPositions);
    let (tx, rx) = watch::channel(state.clone());

    let outcome = ReorderEngine::new(&store)
        .with_observer(&tx)
        .handle_drag_end(state.clone(), &column_drag(&state, 3, 0))
        .await
        .unwrap();

    assert!(outcome.is_rolled_back());
    assert_eq!(outcome.state(), &state);
    assert_eq!(*rx.borrow(), state);
}

#[tokio::test]
async fn test_failed_reconciliation_keeps_planned_state() {
    let (store, _, state) = seeded_board().await;
    let drag = column_drag(&state, 0, 1);

    // Writes succeed, the re-read fails
    store.fail_on(FailurePoint::BoardReads);
    let outcome = ReorderEngine::new(&store)
        .handle_drag_end(state.clone(), &drag)
        .await
        .unwrap();
    store.recover(FailurePoint::BoardReads);

    assert!(matches!(outcome, DragOutcome::Committed { .. }));
    assert_eq!(outcome.state().lists[1].id, state.lists[0].id);
    assert_eq!(BoardState::load(&store, state.board.id).await.unwrap(), *outcome.state());
}

#[tokio::test]
async fn test_reorder_columns_validates_permutation() {
    let (store, _, state) = seeded_board().await;
    let engine = ReorderEngine::new(&store);
    let mut ids: Vec<Uuid> = state.lists.iter().map(|l| l.id).collect();

    ids.reverse();
    let reordered = engine.reorder_columns(state.board.id, &ids).await.unwrap();
    assert_eq!(reordered.lists.iter().map(|l| l.id).collect::<Vec<_>>(), ids);
    assert!(reordered.is_dense());

    ids.pop();
    assert!(matches!(
        engine.reorder_columns(state.board.id, &ids).await,
        Err(ReorderError::InvalidOrder(_))
    ));
}

#[tokio::test]
async fn test_reorder_columns_surfaces_store_failure() {
    let (store, _, state) = seeded_board().await;
    store.fail_on(FailurePoint::ListPositions);
    let ids: Vec<Uuid> = state.lists.iter().rev().map(|l| l.id).collect();

    let result = ReorderEngine::new(&store)
        .reorder_columns(state.board.id, &ids)
        .await;

    assert!(matches!(result, Err(ReorderError::Store(_))));
    assert_eq!(BoardState::load(&store, state.board.id).await.unwrap(), state);
}

#[tokio::test]
async fn test_move_card_to_other_board_is_rejected() {
    let (store, _, state) = seeded_board().await;
    let (_, _, other) = seeded_board().await;
    let card_id = state.cards[0].id;

    // The other board lives in a different store, so its list is unknown here
    let result = ReorderEngine::new(&store)
        .move_card(card_id, other.lists[0].id, 0)
        .await;

    assert!(matches!(result, Err(ReorderError::ListNotFound(_))));
}

#[tokio::test]
async fn test_move_card_appends_when_index_is_past_the_end() {
    let (store, _, state) = seeded_board().await;
    let card_id = state.cards_in(state.lists[0].id).next().unwrap().id;
    let target = state.lists[2].id;

    let moved = ReorderEngine::new(&store)
        .move_card(card_id, target, 42)
        .await
        .unwrap();

    let card = moved.card(card_id).unwrap();
    assert_eq!(card.list_id, target);
    assert_eq!(card.position, 0);
    assert!(moved.is_dense());
}
