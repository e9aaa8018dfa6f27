//! The still image attached to a draft.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// MIME type of every stored photo; captures and uploads are normalized to PNG.
pub const PNG_MIME_TYPE: &str = "image/png";

/// An encoded ID photo.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    mime_type: String,
    width: u32,
    height: u32,
    sha256: String,
    #[serde(with = "base64_bytes")]
    bytes: Vec<u8>,
}

impl Photo {
    /// Wraps PNG-encoded bytes and records their SHA-256 digest.
    #[must_use]
    pub fn png(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self {
            mime_type: PNG_MIME_TYPE.to_owned(),
            width,
            height,
            sha256,
            bytes,
        }
    }

    /// Encoded image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type of [`Photo::bytes`].
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
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

    /// Lowercase hex SHA-256 of the encoded bytes.
    #[must_use]
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    /// The photo as an embeddable `data:` URL.
    #[must_use]
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    /// Metadata without the image bytes.
    #[must_use]
    pub fn summary(&self) -> PhotoSummary {
        PhotoSummary {
            mime_type: self.mime_type.clone(),
            width: self.width,
            height: self.height,
            byte_len: self.bytes.len(),
            sha256: self.sha256.clone(),
        }
    }
}

impl fmt::Debug for Photo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Photo")
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("byte_len", &self.bytes.len())
            .field("sha256", &self.sha256)
            .finish()
    }
}

/// Photo metadata exposed in draft views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhotoSummary {
    /// MIME type of the encoded image.
    pub mime_type: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Size of the encoded image.
    pub byte_len: usize,
    /// Lowercase hex SHA-256 of the encoded image.
    pub sha256: String,
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
