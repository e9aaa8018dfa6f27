//! Background eviction of drafts the browser abandoned without a `DELETE`.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use pwd_registry_core::clock::Clock;
use pwd_registry_event_store::in_memory_event_repository::InMemoryEventRepository;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// How often the draft store is scanned for idle drafts.
pub const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Spawns a task that drops drafts with no event newer than `max_idle`,
/// checking every `period`. The task runs until aborted.
pub fn spawn_idle_draft_sweeper(
    repository: Arc<InMemoryEventRepository>,
    clock: Arc<dyn Clock>,
    max_idle: TimeDelta,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;

            match repository.evict_idle(clock.as_ref(), max_idle) {
                Ok(evicted) => debug!(evicted, "idle draft sweep finished"),
                Err(e) => error!(error = %e, "idle draft sweep failed"),
            }
        }
    })
}
