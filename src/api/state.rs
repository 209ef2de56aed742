//! Application state for the API server

use crate::Config;
use crate::orchestrator::Orchestrator;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the extraction pipeline and configuration.
#[derive(Clone)]
pub struct AppState {
    /// Extraction pipeline shared by all requests
    pub orchestrator: Arc<Orchestrator>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(orchestrator: Arc<Orchestrator>, config: Arc<Config>) -> Self {
        Self {
            orchestrator,
            config,
        }
    }
}
