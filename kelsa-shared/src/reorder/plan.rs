/// Pure reorder planning
///
/// Every function here takes a [`BoardState`] and returns the state after the
/// move together with the rows whose stored position (or list membership)
/// changed. Positions are always rewritten as the entity's index in its new
/// sequence, so a plan applied to a dense board leaves it dense.

use super::{BoardState, DragEnd, DragKind, DragLocation, ReorderError, ReorderResult};
use crate::models::{
    card::{Card, CardPlacement},
    list::{List, ListPosition},
};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Rows to persist for a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Writes {
    pub lists: Vec<ListPosition>,
    pub cards: Vec<CardPlacement>,
}

impl Writes {
    pub fn is_empty(&self) -> bool {
        self.lists.is_empty() && self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lists.len() + self.cards.len()
    }
}

/// New state plus the writes that produce it
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub state: BoardState,
    pub writes: Writes,
}

/// Plans a finished drag gesture
///
/// Returns `Ok(None)` when the gesture changes nothing: it was cancelled, or
/// it dropped the entity back on its own slot.
pub fn plan_drag(state: &BoardState, drag: &DragEnd) -> ReorderResult<Option<Plan>> {
    let Some(destination) = drag.destination else {
        return Ok(None);
    };

    match drag.kind {
        DragKind::Column => plan_column_drag(state, drag.draggable_id, drag.source, destination),
        DragKind::Card => plan_card_drag(state, drag.draggable_id, destination),
    }
}

/// Splices a list out of the board sequence and reinserts it
///
/// The list is located by `source.index`, which must still hold
/// `list_id`. The destination index is clamped to the sequence length.
pub fn plan_column_drag(
    state: &BoardState,
    list_id: Uuid,
    source: DragLocation,
    destination: DragLocation,
) -> ReorderResult<Option<Plan>> {
    if destination.droppable_id != state.board.id {
        return Err(ReorderError::InvalidDestination(destination.droppable_id));
    }

    match state.lists.get(source.index) {
        Some(list) if list.id == list_id => {}
        _ => {
            return Err(ReorderError::StaleSource {
                draggable_id: list_id,
                index: source.index,
            })
        }
    }

    if source.index == destination.index {
        return Ok(None);
    }

    let mut order: Vec<Uuid> = state.lists.iter().map(|l| l.id).collect();
    let moved = order.remove(source.index);
    order.insert(destination.index.min(order.len()), moved);

    let plan = arrange(state, &order);
    Ok((!plan.writes.is_empty()).then_some(plan))
}

/// Puts the board's lists in exactly the given order
///
/// `ordered_ids` must be a permutation of the board's list IDs.
pub fn arrange_columns(state: &BoardState, ordered_ids: &[Uuid]) -> ReorderResult<Plan> {
    if ordered_ids.len() != state.lists.len() {
        return Err(ReorderError::InvalidOrder(format!(
            "expected {} list ids, got {}",
            state.lists.len(),
            ordered_ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        if !seen.insert(*id) {
            return Err(ReorderError::InvalidOrder(format!("duplicate list id {}", id)));
        }
        if state.list(*id).is_none() {
            return Err(ReorderError::InvalidOrder(format!(
                "list {} is not on this board",
                id
            )));
        }
    }

    Ok(arrange(state, ordered_ids))
}

fn arrange(state: &BoardState, order: &[Uuid]) -> Plan {
    let mut writes = Writes::default();

    let lists: Vec<List> = order
        .iter()
        .enumerate()
        .filter_map(|(index, id)| state.list(*id).map(|list| (index as i32, list)))
        .map(|(position, list)| {
            if list.position != position {
                writes.lists.push(ListPosition { id: list.id, position });
            }
            let mut list = list.clone();
            list.position = position;
            list
        })
        .collect();

    Plan {
        state: BoardState::new(state.board.clone(), lists, state.cards.clone()),
        writes,
    }
}

/// Moves a card within its list or into another list
///
/// The card is located by ID. Every card of the source and destination lists
/// whose membership or position changes is written, not only the moved one.
pub fn plan_card_drag(
    state: &BoardState,
    card_id: Uuid,
    destination: DragLocation,
) -> ReorderResult<Option<Plan>> {
    let card = state.card(card_id).ok_or(ReorderError::CardNotFound(card_id))?;
    let dest_list = destination.droppable_id;
    if state.list(dest_list).is_none() {
        return Err(ReorderError::ListNotFound(dest_list));
    }

    let source_list = card.list_id;
    let mut source_seq: Vec<Uuid> = state.cards_in(source_list).map(|c| c.id).collect();
    let current = source_seq
        .iter()
        .position(|id| *id == card_id)
        .ok_or(ReorderError::CardNotFound(card_id))?;
    source_seq.remove(current);

    let sequences = if dest_list == source_list {
        let target = destination.index.min(source_seq.len());
        if target == current {
            return Ok(None);
        }
        source_seq.insert(target, card_id);
        vec![(source_list, source_seq)]
    } else {
        let mut dest_seq: Vec<Uuid> = state.cards_in(dest_list).map(|c| c.id).collect();
        dest_seq.insert(destination.index.min(dest_seq.len()), card_id);
        vec![(source_list, source_seq), (dest_list, dest_seq)]
    };

    let placements: HashMap<Uuid, (Uuid, i32)> = sequences
        .iter()
        .flat_map(|(list_id, seq)| {
            seq.iter()
                .enumerate()
                .map(move |(index, id)| (*id, (*list_id, index as i32)))
        })
        .collect();

    let mut writes = Writes::default();
    let cards: Vec<Card> = state
        .cards
        .iter()
        .map(|card| {
            let mut card = card.clone();
            if let Some(&(list_id, position)) = placements.get(&card.id) {
                if card.list_id != list_id || card.position != position {
                    writes.cards.push(CardPlacement {
                        id: card.id,
                        list_id,
                        position,
                    });
                    card.list_id = list_id;
                    card.position = position;
                }
            }
            card
        })
        .collect();

    let plan = Plan {
        state: BoardState::new(state.board.clone(), state.lists.clone(), cards),
        writes,
    };
    Ok((!plan.writes.is_empty()).then_some(plan))
}
