//! Image attachments for photographed mistakes.
//!
//! An uploaded picture travels inside the JSON request as a data URI:
//! `data:image/<subtype>;base64,<payload>`. The subtype is always a
//! registered MIME subtype, so a `.jpg` file is sent as `image/jpeg`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use mathdesk_core::error::{Error, Result};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
}

impl ImageFormat {
    /// MIME type, e.g. `image/jpeg`.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Webp => "image/webp",
            ImageFormat::Bmp => "image/bmp",
        }
    }

    /// Guess from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" | "jpe" => Some(ImageFormat::Jpeg),
            "gif" => Some(ImageFormat::Gif),
            "webp" => Some(ImageFormat::Webp),
            "bmp" => Some(ImageFormat::Bmp),
            _ => None,
        }
    }

    /// Detect from the file signature.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', ..] => Some(ImageFormat::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),
            [b'G', b'I', b'F', b'8', ..] => Some(ImageFormat::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::Webp)
            }
            [b'B', b'M', ..] => Some(ImageFormat::Bmp),
            _ => None,
        }
    }
}

/// An image ready to be attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageAttachment {
    /// Wrap raw bytes. The signature decides the format; `extension` is
    /// only consulted when the signature is not recognized.
    pub fn from_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(Error::validation("image is empty"));
        }
        let format = ImageFormat::sniff(&bytes)
            .or_else(|| extension.and_then(ImageFormat::from_extension))
            .ok_or_else(|| {
                Error::validation("unsupported image format (expected png, jpeg, gif, webp or bmp)")
            })?;
        Ok(Self { format, bytes })
    }

    /// Read an image file from disk.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            Error::validation(format!("cannot read image {}: {e}", path.display()))
        })?;
        let extension = path.extension().and_then(|e| e.to_str());
        Self::from_bytes(bytes, extension)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Inline `data:` URI for the request body.
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}
