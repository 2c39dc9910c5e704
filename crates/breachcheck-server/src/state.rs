//! Shared handler state

use std::sync::Arc;

use crate::service::QueryService;
use crate::store::BreachStore;

pub struct ServerState {
    pub service: QueryService,
}

pub type SharedState = Arc<ServerState>;

/// Wrap `store` in a query service seeded from the demo data.
pub fn create_shared_state(store: Arc<dyn BreachStore>) -> SharedState {
    Arc::new(ServerState {
        service: QueryService::new(store),
    })
}
