//! Shared application state.

use std::sync::Arc;

use pwd_registry_core::clock::Clock;
use pwd_registry_core::repository::EventRepository;
use pwd_registry_id_wizard::capture::StillExporter;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock used to timestamp events.
    pub clock: Arc<dyn Clock>,
    /// Draft event streams.
    pub event_repository: Arc<dyn EventRepository>,
    /// Normalizes uploaded photos.
    pub exporter: StillExporter,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        event_repository: Arc<dyn EventRepository>,
        exporter: StillExporter,
    ) -> Self {
        Self {
            clock,
            event_repository,
            exporter,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("exporter", &self.exporter)
            .finish_non_exhaustive()
    }
}
