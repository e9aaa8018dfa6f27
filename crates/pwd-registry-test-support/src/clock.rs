//! Frozen clock for draft tests.

use chrono::{DateTime, Utc};
use pwd_registry_core::clock::Clock;

/// Stamps every draft event with the same instant, so tests can assert
/// `occurred_at` and place drafts relative to an idle cutoff.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
