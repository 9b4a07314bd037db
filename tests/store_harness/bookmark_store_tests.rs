//! Macro-generated test suite for `BookmarkStore` contract validation.
//!
//! The `bookmark_store_tests!` macro generates a test module that validates
//! any `BookmarkStore` implementation: visibility, ordering, ownership,
//! pinning, deletion and reordering.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use magic_mark::storage::InMemoryBookmarkStore;
//!
//! bookmark_store_tests!(InMemoryBookmarkStore::new());
//! ```
//!
//! # Generated Tests
//!
//! ## Create & Get
//! - `test_create_and_get`: create then retrieve, verify all fields
//! - `test_get_nonexistent`: get random UUID → None
//! - `test_create_appends_order`: each new bookmark goes last
//!
//! ## Visibility
//! - `test_private_visible_to_creator_only`
//! - `test_public_visible_to_everyone`
//! - `test_shared_with_role` / `test_shared_with_user`
//! - `test_pinned_listed_first`
//!
//! ## Update, Pin & Delete
//! - `test_update_by_owner` / `test_update_by_other_user_rejected`
//! - `test_update_nonexistent`
//! - `test_pin_and_unpin` / `test_pin_nonexistent`
//! - `test_delete` / `test_delete_nonexistent`
//!
//! ## Reorder
//! - `test_reorder_assigns_positions`
//! - `test_reorder_unknown_id_changes_nothing`

/// Generate a `BookmarkStore` conformance test suite.
///
/// `$factory` must be an expression that evaluates to an empty store. It is
/// re-evaluated for each test to ensure isolation.
#[macro_export]
macro_rules! bookmark_store_tests {
    ($factory:expr) => {
        mod bookmark_store_contract_tests {
            use super::*;
            use magic_mark::core::{BookmarkError, BookmarkStore, MarkError};
            use uuid::Uuid;

            // ==================================================================
            // Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;

                let mut input = public_input("  Published  ");
                input.emoji = Some("star".to_string());
                input.description = Some("Articles live on the site".to_string());
                let created = store.create(input, "1").await.unwrap();

                assert_eq!(created.name, "Published");
                assert_eq!(created.path, ARTICLES);
                assert_eq!(created.query, "filters[status][$eq]=draft");
                assert_eq!(created.emoji, "star");
                assert_eq!(
                    created.description.as_deref(),
                    Some("Articles live on the site")
                );
                assert!(created.is_public);
                assert!(!created.is_pinned);
                assert_eq!(created.creator_id, "1");
                assert_eq!(created.updater_id, "1");

                let retrieved = store.get(&created.id).await.unwrap();
                assert_eq!(retrieved, Some(created));
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_create_appends_order() {
                let store = $factory;
                let created = seed(&store, "1", &["a", "b", "c"]).await;

                assert!(created[0].order < created[1].order);
                assert!(created[1].order < created[2].order);

                let listed = store.find_accessible("1", &[]).await.unwrap();
                assert_eq!(names(&listed), vec!["a", "b", "c"]);
            }

            #[tokio::test]
            async fn test_create_uses_default_emoji() {
                let store = $factory;
                let created = store.create(private_input("plain"), "1").await.unwrap();
                assert!(!created.emoji.is_empty());
            }

            // ==================================================================
            // Visibility
            // ==================================================================

            #[tokio::test]
            async fn test_private_visible_to_creator_only() {
                let store = $factory;
                seed(&store, "1", &["mine"]).await;

                assert_eq!(store.find_accessible("1", &[]).await.unwrap().len(), 1);
                assert!(store.find_accessible("2", &[]).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_public_visible_to_everyone() {
                let store = $factory;
                store.create(public_input("open"), "1").await.unwrap();

                let listed = store.find_accessible("42", &roles(&["9"])).await.unwrap();
                assert_eq!(names(&listed), vec!["open"]);
            }

            #[tokio::test]
            async fn test_shared_with_role() {
                let store = $factory;
                store
                    .create(shared_with_role("editors", "2"), "1")
                    .await
                    .unwrap();

                assert_eq!(
                    store.find_accessible("5", &roles(&["3", "2"])).await.unwrap().len(),
                    1
                );
                assert!(
                    store
                        .find_accessible("5", &roles(&["3"]))
                        .await
                        .unwrap()
                        .is_empty()
                );
            }

            #[tokio::test]
            async fn test_shared_with_user() {
                let store = $factory;
                store
                    .create(shared_with_user("for eddie", "2"), "1")
                    .await
                    .unwrap();

                assert_eq!(store.find_accessible("2", &[]).await.unwrap().len(), 1);
                assert!(store.find_accessible("3", &[]).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_pinned_listed_first() {
                let store = $factory;
                let created = seed(&store, "1", &["a", "b", "c"]).await;

                store.pin(&created[2].id, true, "1").await.unwrap();

                let listed = store.find_accessible("1", &[]).await.unwrap();
                assert_eq!(names(&listed), vec!["c", "a", "b"]);
            }

            // ==================================================================
            // Update
            // ==================================================================

            #[tokio::test]
            async fn test_update_by_owner() {
                let store = $factory;
                let created = store.create(private_input("old"), "1").await.unwrap();

                let mut input = public_input("new");
                input.query = "filters[status][$eq]=published".to_string();
                let updated = store.update(&created.id, input, "1").await.unwrap();

                assert_eq!(updated.id, created.id);
                assert_eq!(updated.name, "new");
                assert_eq!(updated.query, "filters[status][$eq]=published");
                assert!(updated.is_public);
                assert_eq!(updated.order, created.order);
                assert_eq!(updated.created_at, created.created_at);
                assert!(updated.updated_at >= created.updated_at);

                let retrieved = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(retrieved.name, "new");
            }

            #[tokio::test]
            async fn test_update_by_other_user_rejected() {
                let store = $factory;
                let created = store.create(public_input("shared"), "1").await.unwrap();

                let result = store.update(&created.id, private_input("hijacked"), "2").await;
                assert!(matches!(
                    result,
                    Err(MarkError::Bookmark(BookmarkError::NotOwner { .. }))
                ));

                let retrieved = store.get(&created.id).await.unwrap().unwrap();
                assert_eq!(retrieved.name, "shared");
            }

            #[tokio::test]
            async fn test_update_nonexistent() {
                let store = $factory;
                let result = store
                    .update(&Uuid::new_v4(), private_input("ghost"), "1")
                    .await;
                assert!(matches!(
                    result,
                    Err(MarkError::Bookmark(BookmarkError::NotFound { .. }))
                ));
            }

            // ==================================================================
            // Pin & Delete
            // ==================================================================

            #[tokio::test]
            async fn test_pin_and_unpin() {
                let store = $factory;
                let created = store.create(public_input("pin me"), "1").await.unwrap();

                let pinned = store.pin(&created.id, true, "2").await.unwrap();
                assert!(pinned.is_pinned);
                assert_eq!(pinned.updater_id, "2");

                let unpinned = store.pin(&created.id, false, "1").await.unwrap();
                assert!(!unpinned.is_pinned);
            }

            #[tokio::test]
            async fn test_pin_nonexistent() {
                let store = $factory;
                assert!(store.pin(&Uuid::new_v4(), true, "1").await.is_err());
            }

            #[tokio::test]
            async fn test_delete() {
                let store = $factory;
                let created = seed(&store, "1", &["gone", "kept"]).await;

                store.delete(&created[0].id).await.unwrap();

                assert!(store.get(&created[0].id).await.unwrap().is_none());
                let listed = store.find_accessible("1", &[]).await.unwrap();
                assert_eq!(names(&listed), vec!["kept"]);
            }

            #[tokio::test]
            async fn test_delete_nonexistent() {
                let store = $factory;
                let result = store.delete(&Uuid::new_v4()).await;
                assert!(matches!(
                    result,
                    Err(MarkError::Bookmark(BookmarkError::NotFound { .. }))
                ));
            }

            // ==================================================================
            // Reorder
            // ==================================================================

            #[tokio::test]
            async fn test_reorder_assigns_positions() {
                let store = $factory;
                let created = seed(&store, "1", &["a", "b", "c"]).await;

                let ids = vec![created[2].id, created[0].id, created[1].id];
                let reordered = store.reorder(&ids, "1").await.unwrap();
                assert_eq!(reordered.len(), 3);
                assert_eq!(reordered[0].order, 0);
                assert_eq!(reordered[1].order, 1);
                assert_eq!(reordered[2].order, 2);

                let listed = store.find_accessible("1", &[]).await.unwrap();
                assert_eq!(names(&listed), vec!["c", "a", "b"]);
            }

            #[tokio::test]
            async fn test_reorder_unknown_id_changes_nothing() {
                let store = $factory;
                let created = seed(&store, "1", &["a", "b"]).await;

                let ids = vec![created[1].id, Uuid::new_v4(), created[0].id];
                let result = store.reorder(&ids, "1").await;
                assert!(matches!(
                    result,
                    Err(MarkError::Bookmark(BookmarkError::UnknownInReorder { .. }))
                ));

                let listed = store.find_accessible("1", &[]).await.unwrap();
                assert_eq!(names(&listed), vec!["a", "b"]);
            }
        }
    };
}
