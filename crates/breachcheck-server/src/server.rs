//! Server assembly and lifecycle

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::{Result, ServerError};
use crate::metrics::{init_prometheus_recorder, set_catalog_size};
use crate::routes::{create_admin_router, create_public_router, create_router_with_metrics};
use crate::state::{create_shared_state, SharedState};
use crate::store::{BreachStore, FileStore, MemoryStore};

/// Builds a [`BreachServer`] from a [`ServerConfig`].
pub struct ServerBuilder {
    config: ServerConfig,
    store: Option<Arc<dyn BreachStore>>,
}

impl ServerBuilder {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Use `store` instead of the one selected by `data_file`.
    pub fn store(mut self, store: Arc<dyn BreachStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<BreachServer> {
        let config = self.config;
        if config.max_concurrent_requests == 0 {
            return Err(ServerError::Config(
                "max_concurrent_requests must be at least 1".into(),
            ));
        }

        let store: Arc<dyn BreachStore> = match (self.store, &config.data_file) {
            (Some(store), _) => store,
            (None, Some(path)) => Arc::new(FileStore::open(path)?),
            (None, None) => {
                tracing::info!("Using in-memory store");
                Arc::new(MemoryStore::new())
            }
        };

        let state = create_shared_state(store);

        if !config.no_seed {
            state.service.initialize_demo_data()?;
        }

        let stats = state.service.stats()?;
        tracing::info!(
            breaches = stats.breaches,
            email_hashes = stats.email_hashes,
            phone_hashes = stats.phone_hashes,
            prefixes = stats.prefixes,
            "Breach data ready"
        );

        let mut router = create_public_router(state.clone());
        if config.no_admin {
            tracing::info!("Admin routes disabled");
        } else {
            router = router.merge(create_admin_router(state.clone()));
        }

        if !config.no_metrics {
            let handle = init_prometheus_recorder()?;
            set_catalog_size(stats.breaches);
            router = create_router_with_metrics(router, handle);
        }

        let router = router
            .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http());

        Ok(BreachServer {
            config,
            state,
            router,
        })
    }
}

/// Ready-to-serve router plus the state behind it.
pub struct BreachServer {
    config: ServerConfig,
    state: SharedState,
    router: Router,
}

impl BreachServer {
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(addr = %listener.local_addr()?, "Breach server listening");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Bind the configured address and serve until Ctrl-C.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.config.listen).await?;
        self.serve(listener, shutdown_signal()).await
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
