//! Route modules organized by bounded context.

pub mod health;
pub mod id_drafts;
