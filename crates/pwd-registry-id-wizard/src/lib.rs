//! ID card issuance wizard for the PWD registry.
//!
//! Walks a resident through photo capture, personal and disability details,
//! emergency contact, and a printable preview. The draft is an event-sourced
//! aggregate; the camera is held behind a guard that releases it on every
//! exit path.

pub mod application;
pub mod capture;
pub mod controller;
pub mod domain;
