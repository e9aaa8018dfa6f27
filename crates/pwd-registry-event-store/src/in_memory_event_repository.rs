//! In-memory implementation of the `EventRepository` trait.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::TimeDelta;
use tracing::{debug, info};
use uuid::Uuid;

use pwd_registry_core::clock::Clock;
use pwd_registry_core::error::DomainError;
use pwd_registry_core::repository::{EventRepository, StoredEvent};

type Streams = HashMap<Uuid, Vec<StoredEvent>>;

/// Process-local event repository keyed by aggregate ID.
///
/// Each append is checked against the stream's last sequence number under
/// a single lock, so concurrent writers to one draft see a
/// `ConcurrencyConflict` rather than interleaving.
#[derive(Debug, Default)]
pub struct InMemoryEventRepository {
    streams: Mutex<Streams>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of aggregates with at least one stored event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn stream_count(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.len())
    }

    /// Drops every stream whose last event is older than `max_idle`
    /// according to `clock`, and returns how many were dropped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store lock is poisoned.
    pub fn evict_idle(
        &self,
        clock: &dyn Clock,
        max_idle: TimeDelta,
    ) -> Result<usize, DomainError> {
        let cutoff = clock.now() - max_idle;
        let mut streams = self.lock()?;
        let before = streams.len();
        streams.retain(|_, stream| stream.last().is_some_and(|event| event.occurred_at > cutoff));
        let evicted = before - streams.len();
        if evicted > 0 {
            info!(evicted, remaining = streams.len(), "idle drafts evicted");
        }
        Ok(evicted)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Streams>, DomainError> {
        self.streams
            .lock()
            .map_err(|_| DomainError::Infrastructure("event store lock poisoned".to_owned()))
    }
}

/// Checks that `events` continue the stream at `current` without gaps and
/// all belong to `aggregate_id`.
fn validate_batch(
    aggregate_id: Uuid,
    current: i64,
    events: &[StoredEvent],
) -> Result<(), DomainError> {
    for (expected_sequence, event) in (current + 1..).zip(events) {
        if event.aggregate_id != aggregate_id {
            return Err(DomainError::Validation(format!(
                "event {} belongs to aggregate {}, not {aggregate_id}",
                event.event_id, event.aggregate_id
            )));
        }
        if event.sequence_number != expected_sequence {
            return Err(DomainError::Validation(format!(
                "event {} has sequence number {}, expected {expected_sequence}",
                event.event_id, event.sequence_number
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<StoredEvent>, DomainError> {
        let streams = self.lock()?;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: &[StoredEvent],
    ) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut streams = self.lock()?;
        let actual = streams
            .get(&aggregate_id)
            .and_then(|stream| stream.last())
            .map_or(0, |event| event.sequence_number);

        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual,
            });
        }
        validate_batch(aggregate_id, actual, events)?;

        streams
            .entry(aggregate_id)
            .or_default()
            .extend_from_slice(events);
        debug!(
            aggregate_id = %aggregate_id,
            appended = events.len(),
            version = actual + i64::try_from(events.len()).unwrap_or(i64::MAX),
            "events appended"
        );
        Ok(())
    }

    async fn delete_stream(&self, aggregate_id: Uuid) -> Result<(), DomainError> {
        let removed = self.lock()?.remove(&aggregate_id);
        if let Some(stream) = removed {
            debug!(aggregate_id = %aggregate_id, events = stream.len(), "stream deleted");
        }
        Ok(())
    }
}
