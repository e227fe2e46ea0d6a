//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use assignment_config_core::catalog::CatalogService;
use assignment_config_core::dedup::WarningLog;
use assignment_config_core::ports::CatalogStore;
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: CatalogService,
}

impl AppState {
    /// Wires the catalog service over `store` with a fresh warning log.
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            catalog: CatalogService::new(store, Arc::new(WarningLog::new())),
        }
    }
}
