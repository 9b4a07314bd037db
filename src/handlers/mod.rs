//! HTTP handlers of the admin API
//!
//! Every handler answers `{ "data": ..., "meta"?: ... }` on success and an
//! [`ErrorResponse`](crate::core::ErrorResponse) on failure.

pub mod bookmarks;
pub mod license;
pub mod middleware;
pub mod query;

use axum::Json;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::config::PluginConfig;
use crate::core::{AdminDirectory, BookmarkStore};
use crate::license::LicenseGuard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BookmarkStore>,
    pub directory: Arc<dyn AdminDirectory>,
    pub license: Arc<LicenseGuard>,
    pub config: Arc<PluginConfig>,
}

/// Success envelope
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn json(data: T) -> Json<Self> {
        Json(Self { data, meta: None })
    }

    pub fn with_meta(data: T, meta: Value) -> Json<Self> {
        Json(Self {
            data,
            meta: Some(meta),
        })
    }
}
