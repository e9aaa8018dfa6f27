//! Event storage for PWD registry aggregates.
//!
//! Drafts are working state: streams live for the lifetime of the process
//! and are never written to disk.

pub mod in_memory_event_repository;
