//! HTTP host for the PWD registry ID wizard.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod sweeper;
