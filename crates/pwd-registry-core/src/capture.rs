//! Capture-device port.
//!
//! The host platform supplies a [`CaptureDevice`]; opening it may block on a
//! permission prompt. A granted device yields a [`VideoStream`] that stays
//! live until [`VideoStream::stop`] is called.

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a capture device or its stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The user or platform refused camera access.
    #[error("camera access denied: {0}")]
    DeviceDenied(String),

    /// No usable camera, or it is held by another application.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),

    /// The stream could not produce a usable frame.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

/// One RGBA8 video frame.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Frame {
    /// Wraps a tightly packed RGBA8 buffer.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::InvalidFrame` if either dimension is zero or
    /// the buffer length is not `width * height * 4`.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidFrame(format!(
                "frame has empty dimensions {width}x{height}"
            )));
        }
        let expected = u64::from(width) * u64::from(height) * 4;
        if rgba.len() as u64 != expected {
            return Err(CaptureError::InvalidFrame(format!(
                "expected {expected} bytes for {width}x{height} RGBA, got {}",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel data, row-major RGBA8.
    #[must_use]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    /// Consumes the frame, returning its pixel buffer.
    #[must_use]
    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("byte_len", &self.rgba.len())
            .finish()
    }
}

/// A live video stream holding the camera.
pub trait VideoStream: Send {
    /// Returns the frame currently on screen.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError` if the stream cannot produce a frame.
    fn current_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Stops every track of the stream, releasing the camera.
    fn stop(&mut self);
}

/// Exclusive access to a video capture device.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Requests the camera, waiting as long as the platform prompt takes.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::DeviceDenied` if permission is refused and
    /// `CaptureError::DeviceUnavailable` if no camera can be opened.
    async fn open(&self) -> Result<Box<dyn VideoStream>, CaptureError>;
}
