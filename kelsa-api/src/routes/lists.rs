/// List endpoints
///
/// # Endpoints
///
/// - `PATCH /v1/lists/:list_id` - Rename a list
/// - `DELETE /v1/lists/:list_id` - Delete a list and its cards
/// - `POST /v1/lists/:list_id/cards` - Add a card

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use kelsa_shared::{
    auth::middleware::AuthContext,
    board,
    models::{card::Card, list::List},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Rename list request
///
/// A blank name leaves the list unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct RenameListRequest {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
}

/// Add card request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCardRequest {
    #[validate(length(min = 1, max = 2000, message = "Content must be 1 to 2000 characters"))]
    pub content: String,
}

pub async fn rename_list(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(list_id): Path<Uuid>,
    Json(req): Json<RenameListRequest>,
) -> ApiResult<Json<List>> {
    req.validate()?;

    let list = board::rename_list(state.store.as_ref(), auth.user_id, list_id, &req.name).await?;
    Ok(Json(list))
}

/// Deletes the list with its cards; remaining lists are re-numbered
pub async fn delete_list(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(list_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    board::delete_list(state.store.as_ref(), auth.user_id, list_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Appends a card to the list
pub async fn add_card(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(list_id): Path<Uuid>,
    Json(req): Json<AddCardRequest>,
) -> ApiResult<(StatusCode, Json<Card>)> {
    req.validate()?;

    let card = board::add_card(state.store.as_ref(), auth.user_id, list_id, &req.content).await?;
    Ok((StatusCode::CREATED, Json(card)))
}
