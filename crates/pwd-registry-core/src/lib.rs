//! Shared domain abstractions for the PWD registry.
//!
//! Defines the traits and types every registry workflow builds on: event
//! sourced aggregates, commands, the event repository and capture-device
//! seams, and the clock. It contains no infrastructure code.

pub mod aggregate;
pub mod capture;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod repository;
