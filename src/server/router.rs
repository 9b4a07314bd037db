//! Route table of the admin API

use axum::{
    Json, Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::handlers::{AppState, bookmarks, license, middleware::require_license, query};

/// Build all routes
///
/// Bookmark, directory and query routes sit behind the license layer:
/// - GET|POST /bookmarks
/// - POST /bookmarks/reorder
/// - PUT|DELETE /bookmarks/{id}
/// - POST /bookmarks/{id}/pin
/// - GET /bookmarks/{id}/preview
/// - GET /roles, GET /users
/// - POST /query/build, /query/parse, /query/preview
///
/// `/license/*` and `/health` never are.
pub fn build_routes(state: AppState) -> Router {
    let licensed = Router::new()
        .route(
            "/bookmarks",
            get(bookmarks::list_bookmarks).post(bookmarks::create_bookmark),
        )
        .route("/bookmarks/reorder", post(bookmarks::reorder_bookmarks))
        .route(
            "/bookmarks/{id}",
            put(bookmarks::update_bookmark).delete(bookmarks::delete_bookmark),
        )
        .route("/bookmarks/{id}/pin", post(bookmarks::pin_bookmark))
        .route("/bookmarks/{id}/preview", get(bookmarks::preview_bookmark))
        .route("/roles", get(bookmarks::list_roles))
        .route("/users", get(bookmarks::list_users))
        .route("/query/build", post(query::build_query))
        .route("/query/parse", post(query::parse))
        .route("/query/preview", post(query::preview))
        .route_layer(from_fn_with_state(state.clone(), require_license));

    let license_routes = Router::new()
        .route("/license/status", get(license::get_status))
        .route("/license/create", post(license::create_and_activate))
        .route("/license/auto-create", post(license::auto_create))
        .route("/license/ping", post(license::ping))
        .route("/license/stats", get(license::online_stats))
        .route("/license/deactivate", post(license::deactivate))
        .route("/license/store-key", post(license::store_key));

    Router::new()
        .route("/health", get(health_check))
        .merge(licensed)
        .merge(license_routes)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
