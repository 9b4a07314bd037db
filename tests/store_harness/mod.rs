//! Shared test harness for bookmark store testing
//!
//! Provides builders for bookmark inputs and the `bookmark_store_tests!`
//! contract suite every [`BookmarkStore`] implementation must pass.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod bookmark_store_tests;

use magic_mark::core::{Bookmark, BookmarkInput, BookmarkStore};

pub const ARTICLES: &str = "/content-manager/collection-types/api::article.article";

/// Private bookmark on the article list
pub fn private_input(name: &str) -> BookmarkInput {
    BookmarkInput::new(name, ARTICLES, "filters[status][$eq]=draft")
}

pub fn public_input(name: &str) -> BookmarkInput {
    let mut input = private_input(name);
    input.is_public = true;
    input
}

pub fn shared_with_role(name: &str, role_id: &str) -> BookmarkInput {
    let mut input = private_input(name);
    input.shared_with_roles = vec![role_id.to_string()];
    input
}

pub fn shared_with_user(name: &str, user_id: &str) -> BookmarkInput {
    let mut input = private_input(name);
    input.shared_with_users = vec![user_id.to_string()];
    input
}

pub fn roles(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

pub fn names(bookmarks: &[Bookmark]) -> Vec<&str> {
    bookmarks.iter().map(|b| b.name.as_str()).collect()
}

/// Create one private bookmark per name, in order, owned by `creator`
pub async fn seed(store: &impl BookmarkStore, creator: &str, names: &[&str]) -> Vec<Bookmark> {
    let mut created = Vec::with_capacity(names.len());
    for name in names {
        created.push(store.create(private_input(name), creator).await.unwrap());
    }
    created
}
