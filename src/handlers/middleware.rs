//! License layer in front of the bookmark and query routes

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::AppState;
use crate::core::{LicenseError, MarkError};

/// Refuse licensed routes without a valid license when enforcement is on
///
/// With enforcement off the request always goes through and a missing key
/// is only logged.
pub async fn require_license(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.license.enforce {
        if !state.license.has_key() {
            tracing::warn!(path = %request.uri().path(), "no license key found");
        }
        return next.run(request).await;
    }

    if state.license.check_access().await {
        next.run(request).await
    } else {
        tracing::warn!(path = %request.uri().path(), "request refused without a valid license");
        MarkError::from(LicenseError::Required).into_response()
    }
}
