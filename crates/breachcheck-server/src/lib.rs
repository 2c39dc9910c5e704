//! breachcheck-server: HTTP lookup service for the breach corpus
//!
//! Answers full-digest lookups for email and phone hashes and k-anonymity
//! prefix-range lookups for passwords. Storage sits behind [`BreachStore`];
//! the server runs on [`MemoryStore`] or, with `--data-file`, [`FileStore`].

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{ErrorResponse, ServerError};
pub use metrics::init_prometheus_recorder;
pub use routes::{
    create_admin_router, create_public_router, create_router, create_router_with_metrics,
    HealthResponse, InitializeResponse,
};
pub use server::{BreachServer, ServerBuilder};
pub use service::QueryService;
pub use state::{create_shared_state, ServerState, SharedState};
pub use store::{BreachStore, FileStore, MemoryStore, StoreError, StoreResult};
