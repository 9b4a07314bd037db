//! PluginBuilder for fluent API to build the admin HTTP server

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::router::build_routes;
use crate::config::PluginConfig;
use crate::core::{AdminDirectory, BookmarkStore, MarkResult};
use crate::handlers::AppState;
use crate::license::{HttpLicenseVerifier, LicenseGuard, LicenseVerifier};
use crate::storage::{InMemoryAdminDirectory, InMemoryBookmarkStore};

/// Builder for the admin API
///
/// Every collaborator has a default: in-memory bookmark store and
/// directory, and an HTTP license verifier pointed at the configured
/// server.
///
/// # Example
///
/// ```ignore
/// let app = PluginBuilder::new()
///     .with_config(PluginConfig::from_yaml_file("magic-mark.yaml")?)
///     .with_bookmark_store(InMemoryBookmarkStore::new())
///     .build()?;
/// ```
pub struct PluginBuilder {
    config: PluginConfig,
    store: Option<Arc<dyn BookmarkStore>>,
    directory: Option<Arc<dyn AdminDirectory>>,
    verifier: Option<Arc<dyn LicenseVerifier>>,
    stored_license: Option<(String, Option<DateTime<Utc>>)>,
    base_path: Option<String>,
    permissive_cors: bool,
    custom_routes: Vec<Router>,
}

impl PluginBuilder {
    pub fn new() -> Self {
        Self {
            config: PluginConfig::default(),
            store: None,
            directory: None,
            verifier: None,
            stored_license: None,
            base_path: None,
            permissive_cors: false,
            custom_routes: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: PluginConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_bookmark_store(mut self, store: impl BookmarkStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn with_directory(mut self, directory: impl AdminDirectory + 'static) -> Self {
        self.directory = Some(Arc::new(directory));
        self
    }

    pub fn with_license_verifier(mut self, verifier: impl LicenseVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Key persisted by a previous run, verified on [`serve`](Self::serve)
    pub fn with_stored_license(
        mut self,
        key: impl Into<String>,
        last_validated: Option<DateTime<Utc>>,
    ) -> Self {
        self.stored_license = Some((key.into(), last_validated));
        self
    }

    /// Mount every route under a prefix such as `/magic-mark`
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Allow any origin; for admin panels served from another host
    pub fn with_permissive_cors(mut self) -> Self {
        self.permissive_cors = true;
        self
    }

    /// Add routes that share the server but not the admin API state
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(&mut self) -> MarkResult<AppState> {
        self.config.validate()?;

        let store = match self.store.take() {
            Some(store) => store,
            None => Arc::new(InMemoryBookmarkStore::with_default_emoji(
                self.config.bookmarks.default_emoji.clone(),
            )),
        };
        let directory = self
            .directory
            .take()
            .unwrap_or_else(|| Arc::new(InMemoryAdminDirectory::default()));
        let verifier = match self.verifier.take() {
            Some(verifier) => verifier,
            None => Arc::new(HttpLicenseVerifier::new(&self.config)?),
        };

        let mut guard = LicenseGuard::new(verifier, self.config.license.clone());
        if let Some((key, last_validated)) = self.stored_license.take() {
            guard = guard.with_stored_key(key, last_validated);
        }

        Ok(AppState {
            store,
            directory,
            license: Arc::new(guard),
            config: Arc::new(self.config.clone()),
        })
    }

    /// Build the router together with the state behind it
    pub fn build_with_state(mut self) -> MarkResult<(Router, AppState)> {
        let state = self.build_state()?;

        let mut app = build_routes(state.clone());
        for custom in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom);
        }
        if let Some(base) = &self.base_path {
            app = Router::new().nest(base, app);
        }

        let app = if self.permissive_cors {
            app.layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive()),
            )
        } else {
            app.layer(TraceLayer::new_for_http())
        };

        Ok((app, state))
    }

    pub fn build(self) -> MarkResult<Router> {
        self.build_with_state().map(|(app, _)| app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Verify the stored license key and start pinging it
    /// - Bind to the provided address
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    /// - Stop the license ping task once the server is down
    pub async fn serve(self, addr: &str) -> MarkResult<()> {
        let (app, state) = self.build_with_state()?;

        let status = state.license.initialize().await;
        tracing::info!(valid = status.valid, demo = status.demo, "license checked");

        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        state.license.shutdown();
        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for PluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
