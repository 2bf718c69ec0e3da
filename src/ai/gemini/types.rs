//! Shared Gemini payload types used by the site and idea clients.

use crate::models::UploadedImage;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `generateContent` request body.
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

/// Gemini content container used in both requests and responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
///
/// Variant order matters for `#[serde(untagged)]` decoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

/// Base64 inline payload used for image attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

impl From<&UploadedImage> for Part {
    fn from(image: &UploadedImage) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: image.mime_type().as_str().to_string(),
                data: image.data().to_string(),
            },
        }
    }
}

/// Structured-output settings: JSON mime type plus a response schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Schema,
}

impl GenerationConfig {
    pub fn json(schema: Schema) -> Self {
        Self {
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
}

/// Subset of the OpenAPI schema object Gemini accepts as `responseSchema`.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    pub fn string() -> Self {
        Self {
            schema_type: SchemaType::String,
            properties: None,
            items: None,
            required: None,
        }
    }

    pub fn array_of(items: Schema) -> Self {
        Self {
            schema_type: SchemaType::Array,
            properties: None,
            items: Some(Box::new(items)),
            required: None,
        }
    }

    /// Object whose listed properties are all required.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required = properties.iter().map(|(name, _)| name.to_string()).collect();
        Self {
            schema_type: SchemaType::Object,
            properties: Some(
                properties
                    .into_iter()
                    .map(|(name, schema)| (name.to_string(), schema))
                    .collect(),
            ),
            items: None,
            required: Some(required),
        }
    }
}

/// Top-level `generateContent` response envelope.
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// Candidate completion item returned by Gemini. Blocked candidates carry
/// only a `finishReason` and no content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, concatenating its text parts.
    pub fn first_text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| match p {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Decode the model's JSON text into `T`. Anything that does not match
    /// the requested shape is an `InvalidResponseShape` error.
    pub fn parse_json<T: DeserializeOwned>(&self, what: &str) -> Result<T> {
        let text = self.first_text().ok_or_else(|| {
            let reason = self
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            tracing::error!("Gemini returned no text for {} (finish reason: {})", what, reason);
            Error::InvalidResponseShape(format!(
                "No text in Gemini {} response (finish reason: {})",
                what, reason
            ))
        })?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!("Invalid {} JSON from Gemini: {}\nText: {}", what, e, text);
            Error::InvalidResponseShape(format!("Invalid {} response format: {}", what, e))
        })
    }
}
