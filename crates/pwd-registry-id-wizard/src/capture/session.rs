//! Scoped ownership of a live camera stream.

use pwd_registry_core::capture::{CaptureError, Frame, VideoStream};
use tracing::debug;

/// Owns an open [`VideoStream`] and stops it exactly once: on
/// [`CaptureSession::release`] or when the guard is dropped.
pub struct CaptureSession {
    stream: Box<dyn VideoStream>,
    released: bool,
}

impl CaptureSession {
    /// Takes ownership of a freshly opened stream.
    #[must_use]
    pub fn new(stream: Box<dyn VideoStream>) -> Self {
        Self {
            stream,
            released: false,
        }
    }

    /// Grabs the frame currently shown by the stream.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the stream cannot produce a frame.
    pub fn snapshot(&mut self) -> Result<Frame, CaptureError> {
        self.stream.current_frame()
    }

    /// Stops all tracks now.
    pub fn release(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if !self.released {
            self.stream.stop();
            self.released = true;
            debug!("capture stream released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("released", &self.released)
            .finish_non_exhaustive()
    }
}
