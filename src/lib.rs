//! # magic-mark
//!
//! Saved filter views ("bookmarks") for content-manager list pages.
//!
//! ## Features
//!
//! - **Query builder engine**: nested AND/OR condition trees translated to and
//!   from `filters[$and][0][field][$op]=value` query strings, with sort and
//!   relation populate directives
//! - **Readable previews**: chips and a one-line summary of any query string
//! - **Bookmark API**: per-user saved views shared by user, role or publicly,
//!   pinned and ordered
//! - **License guard**: activation against a license server, periodic pings and
//!   an offline grace period
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use magic_mark::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> MarkResult<()> {
//!     PluginBuilder::new()
//!         .with_config(PluginConfig::from_yaml_file("magic-mark.yaml")?)
//!         .with_bookmark_store(InMemoryBookmarkStore::new())
//!         .serve("127.0.0.1:3000")
//!         .await
//! }
//! ```
//!
//! The engine can be used on its own:
//!
//! ```rust
//! use magic_mark::query::{describe, parse_query};
//!
//! let parsed = parse_query("filters[status][$eq]=published&sort=createdAt:DESC");
//! assert_eq!(parsed.tree.logical_leaves().len(), 1);
//! assert_eq!(
//!     describe("filters[status][$eq]=published").summary,
//!     "Filters: Status = published"
//! );
//! ```

pub mod config;
pub mod core;
pub mod handlers;
pub mod license;
pub mod query;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        AdminDirectory, AdminRole, AdminUser, AdminUserSummary, Bookmark, BookmarkError,
        BookmarkInput, BookmarkStore, LicenseError, MarkError, MarkResult,
    };

    // === Query engine ===
    pub use crate::query::{
        Condition, ConditionGroup, ConditionKey, ConditionTree, FilterNode, Logic, Operator,
        ParsedQuery, PopulateField, QueryPreview, SortDirection, SortSpec, describe, parse_query,
        to_query_string,
    };

    // === License ===
    pub use crate::license::{
        HttpLicenseVerifier, LicenseData, LicenseGuard, LicenseRequest, LicenseStatus,
        LicenseVerifier, VerificationResult,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryAdminDirectory, InMemoryBookmarkStore};

    // === Config ===
    pub use crate::config::{BookmarkSettings, LicenseSettings, PluginConfig};

    // === Server ===
    pub use crate::handlers::AppState;
    pub use crate::server::PluginBuilder;

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
