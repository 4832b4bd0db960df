//! Application state for the API server

use crate::{Config, Relay};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The download relay
    pub relay: Arc<Relay>,

    /// Configuration, built once at startup
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(relay: Arc<Relay>, config: Arc<Config>) -> Self {
        Self { relay, config }
    }
}
