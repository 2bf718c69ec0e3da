use crate::{Error, Result};
use image::ImageFormat;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Raster formats accepted as an attachment to a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageMime {
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/webp")]
    Webp,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Png => "image/png",
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Webp => "image/webp",
        }
    }

    /// Sniff the format from magic bytes. Returns `None` for anything outside
    /// the accepted set.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes) {
            Ok(ImageFormat::Png) => Some(ImageMime::Png),
            Ok(ImageFormat::Jpeg) => Some(ImageMime::Jpeg),
            Ok(ImageFormat::WebP) => Some(ImageMime::Webp),
            Ok(other) => {
                tracing::warn!("Unsupported image format for upload: {:?}", other);
                None
            }
            Err(_) => {
                tracing::warn!(
                    "Unrecognized image format (first 4 bytes: {:02X?})",
                    &bytes[..bytes.len().min(4)]
                );
                None
            }
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImageMime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(ImageMime::Png),
            "image/jpeg" | "image/jpg" => Ok(ImageMime::Jpeg),
            "image/webp" => Ok(ImageMime::Webp),
            other => Err(Error::Validation(format!(
                "Unsupported image type '{}'. Use PNG, JPEG or WebP.",
                other
            ))),
        }
    }
}
