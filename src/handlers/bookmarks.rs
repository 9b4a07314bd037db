//! Bookmark and sharing-directory handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{AppState, DataResponse};
use crate::core::{AdminUser, BookmarkError, BookmarkInput, MarkResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PinRequest {
    pub is_pinned: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub bookmark_ids: Vec<Uuid>,
}

/// List the bookmarks visible to the current user
///
/// GET /bookmarks
pub async fn list_bookmarks(
    State(state): State<AppState>,
    user: AdminUser,
) -> MarkResult<Response> {
    let bookmarks = state
        .store
        .find_accessible(&user.id, &user.role_ids)
        .await?;
    let count = bookmarks.len();

    Ok(DataResponse::with_meta(bookmarks, json!({ "count": count })).into_response())
}

/// POST /bookmarks
pub async fn create_bookmark(
    State(state): State<AppState>,
    user: AdminUser,
    Json(input): Json<BookmarkInput>,
) -> MarkResult<Response> {
    input.validate(&state.config.bookmarks)?;

    let bookmark = state.store.create(input, &user.id).await?;
    tracing::info!(bookmark_id = %bookmark.id, user_id = %user.id, "bookmark created");

    Ok((StatusCode::CREATED, DataResponse::json(bookmark)).into_response())
}

/// PUT /bookmarks/{id}
pub async fn update_bookmark(
    State(state): State<AppState>,
    user: AdminUser,
    Path(id): Path<Uuid>,
    Json(input): Json<BookmarkInput>,
) -> MarkResult<Response> {
    input.validate(&state.config.bookmarks)?;

    let bookmark = state.store.update(&id, input, &user.id).await?;

    Ok(DataResponse::json(bookmark).into_response())
}

/// Only the creator may delete
///
/// DELETE /bookmarks/{id}
pub async fn delete_bookmark(
    State(state): State<AppState>,
    user: AdminUser,
    Path(id): Path<Uuid>,
) -> MarkResult<Response> {
    let bookmark = state
        .store
        .get(&id)
        .await?
        .ok_or(BookmarkError::NotFound { id })?;
    if !bookmark.is_owned_by(&user.id) {
        return Err(BookmarkError::NotOwner {
            id,
            user_id: user.id,
        }
        .into());
    }

    state.store.delete(&id).await?;
    tracing::info!(bookmark_id = %id, user_id = %user.id, "bookmark deleted");

    Ok(DataResponse::json(json!({ "success": true })).into_response())
}

/// Pinning is limited to bookmarks the caller can see
///
/// POST /bookmarks/{id}/pin
pub async fn pin_bookmark(
    State(state): State<AppState>,
    user: AdminUser,
    Path(id): Path<Uuid>,
    Json(request): Json<PinRequest>,
) -> MarkResult<Response> {
    state
        .store
        .get(&id)
        .await?
        .filter(|b| b.is_accessible_by(&user.id, &user.role_ids))
        .ok_or(BookmarkError::NotFound { id })?;

    let bookmark = state.store.pin(&id, request.is_pinned, &user.id).await?;

    Ok(DataResponse::json(bookmark).into_response())
}

/// POST /bookmarks/reorder
pub async fn reorder_bookmarks(
    State(state): State<AppState>,
    user: AdminUser,
    Json(request): Json<ReorderRequest>,
) -> MarkResult<Response> {
    let bookmarks = state.store.reorder(&request.bookmark_ids, &user.id).await?;

    Ok(DataResponse::json(bookmarks).into_response())
}

/// Readable breakdown of the bookmark's stored query
///
/// GET /bookmarks/{id}/preview
pub async fn preview_bookmark(
    State(state): State<AppState>,
    user: AdminUser,
    Path(id): Path<Uuid>,
) -> MarkResult<Response> {
    let bookmark = state
        .store
        .get(&id)
        .await?
        .filter(|b| b.is_accessible_by(&user.id, &user.role_ids))
        .ok_or(BookmarkError::NotFound { id })?;

    Ok(DataResponse::json(bookmark.preview()).into_response())
}

/// GET /roles
pub async fn list_roles(State(state): State<AppState>, _user: AdminUser) -> MarkResult<Response> {
    let mut roles = state.directory.roles().await?;
    roles.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(DataResponse::json(roles).into_response())
}

/// Admin users to share with, the caller excluded
///
/// GET /users
pub async fn list_users(State(state): State<AppState>, user: AdminUser) -> MarkResult<Response> {
    let users: Vec<_> = state
        .directory
        .users()
        .await?
        .into_iter()
        .filter(|u| u.id != user.id)
        .collect();

    Ok(DataResponse::json(users).into_response())
}
