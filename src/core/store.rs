//! Storage traits for bookmarks and the admin directory

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::bookmark::{Bookmark, BookmarkInput};
use crate::core::error::MarkResult;

/// Persistence of bookmarks
///
/// Implementations are agnostic to the storage mechanism. Ownership checks
/// live here so every backend enforces them the same way.
#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Bookmarks the user may see, pinned first, then by `order`
    async fn find_accessible(&self, user_id: &str, role_ids: &[String])
    -> MarkResult<Vec<Bookmark>>;

    async fn get(&self, id: &Uuid) -> MarkResult<Option<Bookmark>>;

    /// Create a bookmark placed after every existing one
    async fn create(&self, input: BookmarkInput, creator_id: &str) -> MarkResult<Bookmark>;

    /// Replace the editable fields; only the creator may do this
    async fn update(&self, id: &Uuid, input: BookmarkInput, editor_id: &str)
    -> MarkResult<Bookmark>;

    async fn pin(&self, id: &Uuid, pinned: bool, editor_id: &str) -> MarkResult<Bookmark>;

    async fn delete(&self, id: &Uuid) -> MarkResult<()>;

    /// Assign `order` from the position of each id in `ids`
    async fn reorder(&self, ids: &[Uuid], editor_id: &str) -> MarkResult<Vec<Bookmark>>;
}

/// An admin role bookmarks can be shared with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRole {
    pub id: String,
    pub name: String,
    pub code: String,
}

/// An admin user bookmarks can be shared with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserSummary {
    pub id: String,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub email: String,
}

/// Read access to the roles and users of the admin panel
#[async_trait]
pub trait AdminDirectory: Send + Sync {
    async fn roles(&self) -> MarkResult<Vec<AdminRole>>;

    async fn users(&self) -> MarkResult<Vec<AdminUserSummary>>;
}
