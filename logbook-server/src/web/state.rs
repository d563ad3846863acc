//! Application state for the web layer.

use std::sync::Arc;

use crate::logbook::Logbook;

/// Shared application state.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The logbook every handler reads and writes
    pub logbook: Arc<Logbook>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(logbook: Logbook) -> Self {
        Self {
            logbook: Arc::new(logbook),
        }
    }
}
