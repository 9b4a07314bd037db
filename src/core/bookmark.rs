//! Saved list views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::BookmarkSettings;
use crate::core::error::{FieldValidationError, MarkError, MarkResult, ValidationError};
use crate::query::{QueryPreview, describe};

/// A saved content-manager view: path plus query string, with sharing rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub name: String,
    /// Content-manager path, e.g. `/content-manager/collection-types/api::article.article`
    pub path: String,
    /// Bracket-encoded query string, possibly empty
    pub query: String,
    pub emoji: String,
    pub description: Option<String>,
    pub is_pinned: bool,
    pub order: i64,
    pub is_public: bool,
    pub shared_with_roles: Vec<String>,
    pub shared_with_users: Vec<String>,
    pub creator_id: String,
    pub updater_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bookmark {
    /// Owner, public, shared with the user, or shared with one of their roles
    pub fn is_accessible_by(&self, user_id: &str, role_ids: &[String]) -> bool {
        self.creator_id == user_id
            || self.is_public
            || self.shared_with_users.iter().any(|u| u == user_id)
            || self
                .shared_with_roles
                .iter()
                .any(|role| role_ids.contains(role))
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Link the admin panel navigates to
    pub fn url(&self) -> String {
        if self.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, self.query)
        }
    }

    pub fn preview(&self) -> QueryPreview {
        describe(&self.query)
    }
}

/// Client-supplied fields for create and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookmarkInput {
    pub name: String,
    pub path: String,
    pub query: String,
    pub emoji: Option<String>,
    pub description: Option<String>,
    pub is_public: bool,
    pub shared_with_roles: Vec<String>,
    pub shared_with_users: Vec<String>,
}

impl BookmarkInput {
    pub fn new(name: impl Into<String>, path: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            query: query.into(),
            ..Default::default()
        }
    }

    /// Check required fields and length limits
    ///
    /// Every failing field is reported, not only the first.
    pub fn validate(&self, settings: &BookmarkSettings) -> MarkResult<()> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| {
            errors.push(FieldValidationError {
                field: field.to_string(),
                message,
            })
        };

        let name = self.name.trim();
        if name.is_empty() {
            fail("name", "is required".to_string());
        } else if name.chars().count() > settings.max_name_length {
            fail(
                "name",
                format!("must be at most {} characters", settings.max_name_length),
            );
        }
        if self.path.trim().is_empty() {
            fail("path", "is required".to_string());
        }
        if let Some(emoji) = &self.emoji
            && emoji.chars().count() > settings.max_emoji_length
        {
            fail(
                "emoji",
                format!("must be at most {} characters", settings.max_emoji_length),
            );
        }

        match errors.len() {
            0 => Ok(()),
            1 => {
                let e = errors.remove(0);
                Err(MarkError::field(e.field, e.message))
            }
            _ => Err(ValidationError::FieldErrors(errors).into()),
        }
    }

    /// Emoji to store: the given one, or the configured default when blank
    pub fn emoji_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.emoji.as_deref().map(str::trim) {
            Some(emoji) if !emoji.is_empty() => emoji,
            _ => default,
        }
    }
}
