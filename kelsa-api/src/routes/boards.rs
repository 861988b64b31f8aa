/// Board endpoints
///
/// # Endpoints
///
/// - `GET /v1/board` - Load (or create) the caller's board
/// - `POST /v1/boards/:board_id/lists` - Add a list
/// - `PUT /v1/boards/:board_id/lists/order` - Reorder the columns

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kelsa_shared::{
    auth::middleware::AuthContext,
    board,
    entitlement::{is_premium, list_quota, ListQuota},
    models::list::List,
    reorder::{BoardState, ReorderEngine},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Board with its lists, cards and the caller's entitlement
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    #[serde(flatten)]
    pub state: BoardState,

    pub is_premium: bool,

    pub list_quota: ListQuota,
}

/// Add list request
#[derive(Debug, Deserialize, Validate)]
pub struct AddListRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

/// Reorder columns request
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderListsRequest {
    /// Every list of the board, in the new order
    #[validate(length(min = 1, message = "At least one list is required"))]
    pub list_ids: Vec<Uuid>,
}

async fn board_response(state: &AppState, user_id: Uuid, board: BoardState) -> ApiResult<BoardResponse> {
    let premium = is_premium(state.store.as_ref(), user_id).await?;
    let quota = list_quota(premium, board.lists.len());

    Ok(BoardResponse {
        state: board,
        is_premium: premium,
        list_quota: quota,
    })
}

/// Returns the caller's board, creating the default board on first use
///
/// # Response
///
/// ```json
/// {
///   "board": { "id": "uuid", "name": "My First Board", ... },
///   "lists": [ { "id": "uuid", "name": "To Do", "position": 0, ... } ],
///   "cards": [ { "id": "uuid", "list_id": "uuid", "content": "...", "position": 0, ... } ],
///   "is_premium": false,
///   "list_quota": { "current": 3, "limit": 3 }
/// }
/// ```
pub async fn get_board(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<BoardResponse>> {
    let board = board::load_or_create_board(state.store.as_ref(), auth.user_id).await?;
    Ok(Json(board_response(&state, auth.user_id, board).await?))
}

/// Appends a list to the board
///
/// # Errors
///
/// - `402 Payment Required` (`upgrade_required`): free account at its list limit
/// - `404 Not Found`: board does not exist or belongs to someone else
pub async fn add_list(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
    Json(req): Json<AddListRequest>,
) -> ApiResult<(StatusCode, Json<List>)> {
    req.validate()?;

    let list = board::add_list(state.store.as_ref(), auth.user_id, board_id, &req.name).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// Rewrites column positions to match `list_ids`
///
/// # Errors
///
/// - `400 Bad Request`: `list_ids` is not a permutation of the board's lists
/// - `500 Internal Server Error`: the write failed; nothing was changed
pub async fn reorder_lists(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(board_id): Path<Uuid>,
    Json(req): Json<ReorderListsRequest>,
) -> ApiResult<Json<BoardResponse>> {
    req.validate()?;

    board::owned_board(state.store.as_ref(), auth.user_id, board_id).await?;

    let board = ReorderEngine::new(state.store.as_ref())
        .reorder_columns(board_id, &req.list_ids)
        .await?;

    Ok(Json(board_response(&state, auth.user_id, board).await?))
}
