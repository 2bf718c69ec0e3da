//! Data models and structures
//!
//! Defines the request and result records exchanged with the model service,
//! plus runtime configuration.

use crate::ai::mime::ImageMime;
use crate::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// An image attached to a generation request, carried as base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    data: String,
    mime_type: ImageMime,
}

impl UploadedImage {
    /// Build from raw file bytes, sniffing the format.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mime_type = ImageMime::detect(bytes).ok_or_else(|| {
            Error::Validation("Unsupported image. Use PNG, JPEG or WebP.".to_string())
        })?;

        Ok(Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        })
    }

    /// Build from an already-encoded payload and its declared MIME type.
    pub fn from_base64(data: impl Into<String>, mime_type: &str) -> Result<Self> {
        let data = data.into();
        let mime_type: ImageMime = mime_type.parse()?;

        base64::engine::general_purpose::STANDARD
            .decode(&data)
            .map_err(|e| Error::Validation(format!("Image is not valid base64: {}", e)))?;

        Ok(Self { data, mime_type })
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> ImageMime {
        self.mime_type
    }
}

/// A validated request for one website generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    image: Option<UploadedImage>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, image: Option<UploadedImage>) -> Result<Self> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(Error::Validation(
                "Please enter a description for the website.".to_string(),
            ));
        }
        Ok(Self { prompt, image })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }
}

/// The three source fragments returned by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedSite {
    pub html: String,
    pub css: String,
    pub javascript: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteIdea {
    pub title: String,
    pub description: String,
}

pub const DEFAULT_SITE_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_IDEA_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub site_model: String,
    pub idea_model: String,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. `from_env` passes the process
    /// environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = non_empty("GEMINI_API_KEY")
            .or_else(|| non_empty("API_KEY"))
            .ok_or_else(|| {
                Error::Config("GEMINI_API_KEY (or API_KEY) environment variable not set".to_string())
            })?;

        let timeout = match non_empty("GEMINI_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    Error::Config(format!(
                        "GEMINI_TIMEOUT_SECS must be a positive integer (got '{}')",
                        raw
                    ))
                })?;
                if secs == 0 {
                    return Err(Error::Config(
                        "GEMINI_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            api_key,
            site_model: non_empty("SITE_MODEL").unwrap_or_else(|| DEFAULT_SITE_MODEL.to_string()),
            idea_model: non_empty("IDEA_MODEL").unwrap_or_else(|| DEFAULT_IDEA_MODEL.to_string()),
            base_url: non_empty("GEMINI_API_BASE")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            timeout,
            output_dir: PathBuf::from(
                non_empty("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_generation_request_rejects_blank_prompt() {
        let err = GenerationRequest::new("   \n", None).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_generation_request_keeps_prompt_verbatim() {
        let request = GenerationRequest::new("  a bakery site ", None).unwrap();
        assert_eq!(request.prompt(), "  a bakery site ");
        assert!(request.image().is_none());
    }

    #[test]
    fn test_uploaded_image_from_png_bytes() {
        let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let image = UploadedImage::from_bytes(&bytes).unwrap();
        assert_eq!(image.mime_type(), ImageMime::Png);
        assert_eq!(image.data(), "iVBORw0KGgo=");
    }

    #[test]
    fn test_uploaded_image_rejects_unknown_bytes() {
        let err = UploadedImage::from_bytes(b"plain text").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_uploaded_image_from_base64_validates_payload() {
        assert!(UploadedImage::from_base64("iVBORw0KGgo=", "image/png").is_ok());
        assert!(matches!(
            UploadedImage::from_base64("!!!", "image/png"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            UploadedImage::from_base64("iVBORw0KGgo=", "image/gif"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_generated_site_requires_all_fields() {
        let missing: serde_json::Result<GeneratedSite> =
            serde_json::from_str(r#"{"html": "<h1>Hi</h1>", "css": ""}"#);
        assert!(missing.is_err());

        let wrong_type: serde_json::Result<GeneratedSite> =
            serde_json::from_str(r#"{"html": "", "css": "", "javascript": 42}"#);
        assert!(wrong_type.is_err());
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_falls_back_to_legacy_api_key() {
        let config = Config::from_lookup(lookup(&[("API_KEY", "legacy")])).unwrap();
        assert_eq!(config.api_key, "legacy");
        assert_eq!(config.site_model, DEFAULT_SITE_MODEL);
        assert_eq!(config.idea_model, DEFAULT_IDEA_MODEL);
        assert_eq!(config.base_url, DEFAULT_GEMINI_BASE_URL);
        assert!(config.timeout.is_none());
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("API_KEY", "ignored"),
            ("SITE_MODEL", "models/gemini-custom"),
            ("GEMINI_API_BASE", "http://localhost:9000/"),
            ("GEMINI_TIMEOUT_SECS", "45"),
            ("OUTPUT_DIR", "/tmp/sites"),
        ]))
        .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.site_model, "models/gemini-custom");
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
        assert_eq!(config.output_dir, PathBuf::from("/tmp/sites"));
    }

    #[test]
    fn test_config_rejects_bad_timeout() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_TIMEOUT_SECS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
