//! Application services: command handlers that persist draft events through
//! an `EventRepository`, and query handlers that project read-only views.

pub mod command_handlers;
pub mod query_handlers;
