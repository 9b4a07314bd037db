//! Admin identity of a request
//!
//! The host admin panel authenticates the user and forwards who they are in
//! `x-admin-*` headers. Only the user id is mandatory.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::Serialize;

use crate::core::error::{MarkError, MarkResult, RequestError};

pub const USER_ID_HEADER: &str = "x-admin-user-id";
pub const ROLE_IDS_HEADER: &str = "x-admin-role-ids";
pub const EMAIL_HEADER: &str = "x-admin-email";
pub const FIRSTNAME_HEADER: &str = "x-admin-firstname";
pub const LASTNAME_HEADER: &str = "x-admin-lastname";

/// The logged-in admin user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub role_ids: Vec<String>,
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
}

impl AdminUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role_ids: Vec::new(),
            email: None,
            firstname: None,
            lastname: None,
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> MarkResult<Self> {
        let id = header(headers, USER_ID_HEADER).ok_or_else(|| {
            MarkError::from(RequestError::Unauthorized {
                message: "No admin user logged in".to_string(),
            })
        })?;

        let role_ids = header(headers, ROLE_IDS_HEADER)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|role| !role.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            id,
            role_ids,
            email: header(headers, EMAIL_HEADER),
            firstname: header(headers, FIRSTNAME_HEADER),
            lastname: header(headers, LASTNAME_HEADER),
        })
    }
}

/// Trimmed, non-empty header value
fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = MarkError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        AdminUser::from_headers(&parts.headers)
    }
}
