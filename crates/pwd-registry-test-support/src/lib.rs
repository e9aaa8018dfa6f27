//! Shared test fakes for the PWD registry.

mod capture;
mod clock;
mod repository;

pub use capture::ScriptedCaptureDevice;
pub use clock::FixedClock;
pub use repository::{EmptyEventRepository, FailingEventRepository, RecordingEventRepository};
