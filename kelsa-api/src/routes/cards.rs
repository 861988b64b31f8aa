/// Card endpoints
///
/// # Endpoints
///
/// - `POST /v1/cards/:card_id/move` - Move a card within or across lists
/// - `DELETE /v1/cards/:card_id` - Delete a card

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kelsa_shared::{
    auth::middleware::AuthContext,
    board,
    reorder::{BoardState, ReorderEngine},
};
use serde::Deserialize;
use uuid::Uuid;

/// Move card request
#[derive(Debug, Deserialize)]
pub struct MoveCardRequest {
    /// Destination list; may equal the current list
    pub list_id: Uuid,

    /// Zero-based index in the destination list; clamped to its length
    pub index: usize,
}

/// Moves a card and returns the reconciled board
///
/// # Errors
///
/// - `404 Not Found`: card or destination list is not on the caller's board
/// - `500 Internal Server Error`: the write failed; nothing was changed
pub async fn move_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<Uuid>,
    Json(req): Json<MoveCardRequest>,
) -> ApiResult<Json<BoardState>> {
    let store = state.store.as_ref();

    board::owned_card(store, auth.user_id, card_id).await?;
    board::owned_list(store, auth.user_id, req.list_id).await?;

    let board = ReorderEngine::new(store)
        .move_card(card_id, req.list_id, req.index)
        .await?;

    Ok(Json(board))
}

/// Deletes the card; the rest of its list is re-numbered
pub async fn delete_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(card_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    board::delete_card(state.store.as_ref(), auth.user_id, card_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
