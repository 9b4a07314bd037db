//! In-memory bookmark store and admin directory for testing and development

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::bookmark::{Bookmark, BookmarkInput};
use crate::core::error::{BookmarkError, MarkResult, StorageError};
use crate::core::store::{AdminDirectory, AdminRole, AdminUserSummary, BookmarkStore};

fn poisoned(e: impl std::fmt::Display) -> StorageError {
    StorageError::LockPoisoned {
        message: e.to_string(),
    }
}

/// Pinned first, then ascending `order`, then creation time
fn sort_for_display(bookmarks: &mut [Bookmark]) {
    bookmarks.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(a.order.cmp(&b.order))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// In-memory bookmark store
///
/// Uses RwLock for thread-safe access. Clones share the same map.
#[derive(Clone)]
pub struct InMemoryBookmarkStore {
    bookmarks: Arc<RwLock<HashMap<Uuid, Bookmark>>>,
    default_emoji: String,
}

impl InMemoryBookmarkStore {
    pub fn new() -> Self {
        Self::with_default_emoji("bookmark")
    }

    pub fn with_default_emoji(emoji: impl Into<String>) -> Self {
        Self {
            bookmarks: Arc::new(RwLock::new(HashMap::new())),
            default_emoji: emoji.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bookmarks.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryBookmarkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookmarkStore for InMemoryBookmarkStore {
    async fn find_accessible(
        &self,
        user_id: &str,
        role_ids: &[String],
    ) -> MarkResult<Vec<Bookmark>> {
        let bookmarks = self.bookmarks.read().map_err(poisoned)?;

        let mut visible: Vec<Bookmark> = bookmarks
            .values()
            .filter(|b| b.is_accessible_by(user_id, role_ids))
            .cloned()
            .collect();
        sort_for_display(&mut visible);

        Ok(visible)
    }

    async fn get(&self, id: &Uuid) -> MarkResult<Option<Bookmark>> {
        let bookmarks = self.bookmarks.read().map_err(poisoned)?;

        Ok(bookmarks.get(id).cloned())
    }

    async fn create(&self, input: BookmarkInput, creator_id: &str) -> MarkResult<Bookmark> {
        let mut bookmarks = self.bookmarks.write().map_err(poisoned)?;

        let max_order = bookmarks.values().map(|b| b.order).max().unwrap_or(0);
        let now = Utc::now();
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            emoji: input.emoji_or(&self.default_emoji).to_string(),
            name: input.name.trim().to_string(),
            path: input.path,
            query: input.query,
            description: input.description,
            is_pinned: false,
            order: max_order + 1,
            is_public: input.is_public,
            shared_with_roles: input.shared_with_roles,
            shared_with_users: input.shared_with_users,
            creator_id: creator_id.to_string(),
            updater_id: creator_id.to_string(),
            created_at: now,
            updated_at: now,
        };

        bookmarks.insert(bookmark.id, bookmark.clone());
        tracing::debug!(bookmark_id = %bookmark.id, creator_id, "bookmark created");

        Ok(bookmark)
    }

    async fn update(
        &self,
        id: &Uuid,
        input: BookmarkInput,
        editor_id: &str,
    ) -> MarkResult<Bookmark> {
        let mut bookmarks = self.bookmarks.write().map_err(poisoned)?;

        let bookmark = bookmarks
            .get_mut(id)
            .ok_or(BookmarkError::NotFound { id: *id })?;
        if !bookmark.is_owned_by(editor_id) {
            return Err(BookmarkError::NotOwner {
                id: *id,
                user_id: editor_id.to_string(),
            }
            .into());
        }

        bookmark.emoji = input.emoji_or(&self.default_emoji).to_string();
        bookmark.name = input.name.trim().to_string();
        bookmark.path = input.path;
        bookmark.query = input.query;
        bookmark.description = input.description;
        bookmark.is_public = input.is_public;
        bookmark.shared_with_roles = input.shared_with_roles;
        bookmark.shared_with_users = input.shared_with_users;
        bookmark.updater_id = editor_id.to_string();
        bookmark.updated_at = Utc::now();

        Ok(bookmark.clone())
    }

    async fn pin(&self, id: &Uuid, pinned: bool, editor_id: &str) -> MarkResult<Bookmark> {
        let mut bookmarks = self.bookmarks.write().map_err(poisoned)?;

        let bookmark = bookmarks
            .get_mut(id)
            .ok_or(BookmarkError::NotFound { id: *id })?;
        bookmark.is_pinned = pinned;
        bookmark.updater_id = editor_id.to_string();
        bookmark.updated_at = Utc::now();

        Ok(bookmark.clone())
    }

    async fn delete(&self, id: &Uuid) -> MarkResult<()> {
        let mut bookmarks = self.bookmarks.write().map_err(poisoned)?;

        bookmarks
            .remove(id)
            .ok_or(BookmarkError::NotFound { id: *id })?;

        Ok(())
    }

    async fn reorder(&self, ids: &[Uuid], editor_id: &str) -> MarkResult<Vec<Bookmark>> {
        let mut bookmarks = self.bookmarks.write().map_err(poisoned)?;

        // all-or-nothing: check every id before touching any
        if let Some(missing) = ids.iter().find(|id| !bookmarks.contains_key(id)) {
            return Err(BookmarkError::UnknownInReorder { id: *missing }.into());
        }

        let now = Utc::now();
        let mut updated = Vec::with_capacity(ids.len());
        for (position, id) in ids.iter().enumerate() {
            if let Some(bookmark) = bookmarks.get_mut(id) {
                bookmark.order = position as i64;
                bookmark.updater_id = editor_id.to_string();
                bookmark.updated_at = now;
                updated.push(bookmark.clone());
            }
        }

        Ok(updated)
    }
}

/// Fixed list of roles and users, for tests and the demo server
#[derive(Clone, Default)]
pub struct InMemoryAdminDirectory {
    roles: Arc<RwLock<Vec<AdminRole>>>,
    users: Arc<RwLock<Vec<AdminUserSummary>>>,
}

impl InMemoryAdminDirectory {
    pub fn new(roles: Vec<AdminRole>, users: Vec<AdminUserSummary>) -> Self {
        Self {
            roles: Arc::new(RwLock::new(roles)),
            users: Arc::new(RwLock::new(users)),
        }
    }

    pub fn add_role(&self, role: AdminRole) -> MarkResult<()> {
        self.roles.write().map_err(poisoned)?.push(role);
        Ok(())
    }

    pub fn add_user(&self, user: AdminUserSummary) -> MarkResult<()> {
        self.users.write().map_err(poisoned)?.push(user);
        Ok(())
    }
}

#[async_trait]
impl AdminDirectory for InMemoryAdminDirectory {
    async fn roles(&self) -> MarkResult<Vec<AdminRole>> {
        Ok(self.roles.read().map_err(poisoned)?.clone())
    }

    async fn users(&self) -> MarkResult<Vec<AdminUserSummary>> {
        Ok(self.users.read().map_err(poisoned)?.clone())
    }
}
