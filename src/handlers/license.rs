//! License management handlers
//!
//! These routes stay reachable without a license so an admin can activate one.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use super::{AppState, DataResponse};
use crate::core::{AdminUser, MarkError, MarkResult};
use crate::license::LicenseRequest;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreKeyRequest {
    #[serde(default)]
    pub license_key: String,
    #[serde(default)]
    pub email: String,
}

/// GET /license/status
pub async fn get_status(State(state): State<AppState>, _user: AdminUser) -> MarkResult<Response> {
    Ok(DataResponse::json(state.license.status().await).into_response())
}

/// POST /license/create
pub async fn create_and_activate(
    State(state): State<AppState>,
    _user: AdminUser,
    Json(request): Json<LicenseRequest>,
) -> MarkResult<Response> {
    let license = state.license.create_and_activate(&request).await?;

    Ok(DataResponse::with_meta(
        license,
        json!({ "message": "License created and activated successfully" }),
    )
    .into_response())
}

/// Issue a license from the logged-in admin's identity
///
/// POST /license/auto-create
pub async fn auto_create(State(state): State<AppState>, user: AdminUser) -> MarkResult<Response> {
    let email = user
        .email
        .clone()
        .ok_or_else(|| MarkError::field("email", "The logged-in admin has no email address"))?;
    let request = LicenseRequest::new(
        email,
        user.firstname.clone().unwrap_or_else(|| "Admin".to_string()),
        user.lastname.clone().unwrap_or_else(|| "User".to_string()),
    );

    let license = state.license.create_and_activate(&request).await?;

    Ok(DataResponse::with_meta(
        license,
        json!({ "message": "License automatically created and activated" }),
    )
    .into_response())
}

/// POST /license/ping
pub async fn ping(State(state): State<AppState>, _user: AdminUser) -> MarkResult<Response> {
    let result = state.license.ping().await?;

    Ok(DataResponse::json(result).into_response())
}

/// GET /license/stats
pub async fn online_stats(State(state): State<AppState>, _user: AdminUser) -> MarkResult<Response> {
    let stats = state.license.online_stats().await?;

    Ok(DataResponse::json(stats).into_response())
}

/// POST /license/deactivate
pub async fn deactivate(State(state): State<AppState>, _user: AdminUser) -> MarkResult<Response> {
    state.license.deactivate()?;

    Ok(DataResponse::json(json!({ "success": true })).into_response())
}

/// Activate an existing key after matching its email
///
/// POST /license/store-key
pub async fn store_key(
    State(state): State<AppState>,
    _user: AdminUser,
    Json(request): Json<StoreKeyRequest>,
) -> MarkResult<Response> {
    let license = state
        .license
        .store_key(&request.license_key, &request.email)
        .await?;

    Ok(DataResponse::with_meta(
        license,
        json!({ "message": "License key validated and activated successfully" }),
    )
    .into_response())
}
