//! Still-image export: rasterizes a camera frame or an uploaded file into the
//! PNG stored on the draft.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Limits, RgbaImage};
use pwd_registry_core::capture::Frame;
use thiserror::Error;

use crate::domain::photo::Photo;

/// Longest edge, in pixels, of a stored photo unless configured otherwise.
pub const DEFAULT_MAX_EDGE: u32 = 1024;

/// Largest width or height, in pixels, an upload may declare before it is
/// decoded.
pub const DEFAULT_MAX_UPLOAD_EDGE: u32 = 8192;

/// Failures turning pixels or files into a stored photo.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The frame's pixel buffer does not match its dimensions.
    #[error("frame buffer does not match {width}x{height}")]
    FrameMismatch {
        /// Frame width.
        width: u32,
        /// Frame height.
        height: u32,
    },

    /// The uploaded bytes are not a supported image.
    #[error("unreadable image: {0}")]
    Decode(String),

    /// PNG encoding failed.
    #[error("png encoding failed: {0}")]
    Encode(String),
}

/// Converts frames and uploads to PNG photos no larger than `max_edge`.
/// Uploads wider or taller than `max_upload_edge` are refused before their
/// pixels are allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StillExporter {
    max_edge: u32,
    max_upload_edge: u32,
}

impl Default for StillExporter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EDGE)
    }
}

impl StillExporter {
    /// Creates an exporter that downsizes to `max_edge` (at least 1).
    #[must_use]
    pub fn new(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
            max_upload_edge: DEFAULT_MAX_UPLOAD_EDGE,
        }
    }

    /// Sets the largest upload width or height accepted for decoding
    /// (at least 1).
    #[must_use]
    pub fn with_max_upload_edge(mut self, max_upload_edge: u32) -> Self {
        self.max_upload_edge = max_upload_edge.max(1);
        self
    }

    /// Longest edge of exported photos.
    #[must_use]
    pub fn max_edge(&self) -> u32 {
        self.max_edge
    }

    /// Largest upload width or height accepted for decoding.
    #[must_use]
    pub fn max_upload_edge(&self) -> u32 {
        self.max_upload_edge
    }

    /// Rasterizes one video frame.
    ///
    /// # Errors
    ///
    /// Returns `ExportError` if the frame is malformed or encoding fails.
    pub fn export_frame(&self, frame: &Frame) -> Result<Photo, ExportError> {
        let (width, height) = (frame.width(), frame.height());
        let image = RgbaImage::from_raw(width, height, frame.rgba().to_vec())
            .ok_or(ExportError::FrameMismatch { width, height })?;
        self.encode(DynamicImage::ImageRgba8(image))
    }

    /// Decodes an uploaded PNG, JPEG or WebP file and re-encodes it.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::Decode` if the bytes are not a supported image or
    /// declare dimensions beyond `max_upload_edge`.
    pub fn import_upload(&self, bytes: &[u8]) -> Result<Photo, ExportError> {
        let mut reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ExportError::Decode(e.to_string()))?;
        let mut limits = Limits::default();
        limits.max_image_width = Some(self.max_upload_edge);
        limits.max_image_height = Some(self.max_upload_edge);
        reader.limits(limits);

        let decoded = reader
            .decode()
            .map_err(|e| ExportError::Decode(e.to_string()))?;
        self.encode(decoded)
    }

    fn encode(&self, image: DynamicImage) -> Result<Photo, ExportError> {
        let (width, height) = (image.width(), image.height());
        let (target_width, target_height) = target_size(width, height, self.max_edge);
        let image = if (target_width, target_height) == (width, height) {
            image
        } else {
            image.resize_exact(target_width, target_height, FilterType::Triangle)
        };

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .map_err(|e| ExportError::Encode(e.to_string()))?;

        Ok(Photo::png(png, image.width(), image.height()))
    }
}

/// Scales `width`x`height` so the longer edge is at most `max_edge`,
/// keeping the aspect ratio.
fn target_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }
    let scale = |short: u32, long: u32| {
        let scaled = (u64::from(short) * u64::from(max_edge) + u64::from(long) / 2) / u64::from(long);
        u32::try_from(scaled).unwrap_or(max_edge).max(1)
    };
    if width >= height {
        (max_edge, scale(height, width))
    } else {
        (scale(width, height), max_edge)
    }
}
