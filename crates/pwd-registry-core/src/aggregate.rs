//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// An event-sourced aggregate such as an ID draft.
///
/// State only changes through [`AggregateRoot::apply`]. Domain methods record
/// uncommitted events; the caller decides whether to persist them or to
/// apply them in place via [`AggregateRoot::commit_in_place`].
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent + Clone;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns uncommitted events produced by command handling.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);

    /// Applies every uncommitted event to the aggregate's own state and
    /// returns them, leaving the uncommitted list empty.
    ///
    /// Used by in-process hosts that keep the aggregate in memory instead of
    /// round-tripping through a repository.
    fn commit_in_place(&mut self) -> Vec<Self::Event> {
        let pending = self.uncommitted_events().to_vec();
        for event in &pending {
            self.apply(event);
        }
        self.clear_uncommitted_events();
        pending
    }
}
