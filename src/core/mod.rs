//! Core types and traits: bookmarks, identity, errors and storage seams

pub mod auth;
pub mod bookmark;
pub mod error;
pub mod store;

pub use auth::AdminUser;
pub use bookmark::{Bookmark, BookmarkInput};
pub use error::{
    BookmarkError, ConfigError, ErrorResponse, LicenseError, MarkError, MarkResult,
    RequestError, StorageError, ValidationError,
};
pub use store::{AdminDirectory, AdminRole, AdminUserSummary, BookmarkStore};
