//! Time source for draft events and idle-draft expiry.

use chrono::{DateTime, Utc};

/// Supplies the `occurred_at` stamp on every draft event. The event store
/// also compares it against a stream's last event to find idle drafts.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time for the running registry service.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
