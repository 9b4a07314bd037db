//! Standalone admin API with seeded data
//!
//! Run with `RUST_LOG=magic_mark=debug,tower_http=info`. Pass a YAML config
//! path as the first argument to override the defaults. Requests identify the
//! admin with headers:
//!
//! ```text
//! curl -H 'x-admin-user-id: 1' -H 'x-admin-role-ids: 1' http://127.0.0.1:3000/bookmarks
//! ```

use magic_mark::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> MarkResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => PluginConfig::from_yaml_file(path)?,
        None => PluginConfig::default(),
    };

    let directory = InMemoryAdminDirectory::new(
        vec![
            AdminRole {
                id: "1".to_string(),
                name: "Super Admin".to_string(),
                code: "strapi-super-admin".to_string(),
            },
            AdminRole {
                id: "2".to_string(),
                name: "Editor".to_string(),
                code: "strapi-editor".to_string(),
            },
        ],
        vec![
            AdminUserSummary {
                id: "1".to_string(),
                firstname: Some("Ada".to_string()),
                lastname: Some("Admin".to_string()),
                email: "ada@example.com".to_string(),
            },
            AdminUserSummary {
                id: "2".to_string(),
                firstname: Some("Eddie".to_string()),
                lastname: Some("Editor".to_string()),
                email: "eddie@example.com".to_string(),
            },
        ],
    );

    let store = InMemoryBookmarkStore::with_default_emoji(config.bookmarks.default_emoji.clone());
    seed(&store).await?;

    println!("Admin API on http://127.0.0.1:3000");
    println!("  GET  /bookmarks                 list visible bookmarks");
    println!("  POST /query/preview             describe a query string");
    println!("  GET  /license/status            license state");

    PluginBuilder::new()
        .with_config(config)
        .with_bookmark_store(store)
        .with_directory(directory)
        .with_permissive_cors()
        .serve("127.0.0.1:3000")
        .await
}

async fn seed(store: &InMemoryBookmarkStore) -> MarkResult<()> {
    let articles = "/content-manager/collection-types/api::article.article";

    let tree = ConditionTree::new()
        .update_condition("condition_1", ConditionKey::Field, "status")
        .update_condition("condition_1", ConditionKey::Value, "published");
    let sort = SortSpec::new("publishedAt", SortDirection::Desc);
    let query = to_query_string(&tree, Some(&sort), &[PopulateField::shallow("author")]);

    let mut published = BookmarkInput::new("Published articles", articles, query);
    published.is_public = true;
    store.create(published, "1").await?;

    let mut drafts = BookmarkInput::new(
        "Drafts by Eddie",
        articles,
        "filters[$and][0][status][$eq]=draft&filters[$and][1][author][email][$eq]=eddie%40example.com",
    );
    drafts.shared_with_roles = vec!["2".to_string()];
    store.create(drafts, "1").await?;

    Ok(())
}
