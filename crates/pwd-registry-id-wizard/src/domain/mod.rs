//! Domain model for the ID wizard: steps, draft fields, photo, events,
//! commands, and the `IdDraft` aggregate.

pub mod aggregates;
pub mod commands;
pub mod draft;
pub mod events;
pub mod photo;
pub mod step;
