//! Camera lifecycle and still-image export for the photo step.

pub mod session;
pub mod still;

pub use session::CaptureSession;
pub use still::{DEFAULT_MAX_EDGE, DEFAULT_MAX_UPLOAD_EDGE, ExportError, StillExporter};
