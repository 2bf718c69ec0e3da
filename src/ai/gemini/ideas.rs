use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, Schema,
};
use crate::ai::IdeaService;
use crate::models::WebsiteIdea;
use crate::{prompts, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct IdeasEnvelope {
    ideas: Vec<WebsiteIdea>,
}

/// Gemini implementation of [`IdeaService`].
pub struct GeminiIdeaClient {
    http: GeminiHttpClient,
}

impl GeminiIdeaClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    fn response_schema() -> Schema {
        let idea = Schema::object(vec![
            ("title", Schema::string()),
            ("description", Schema::string()),
        ]);
        Schema::object(vec![("ideas", Schema::array_of(idea))])
    }
}

#[async_trait]
impl IdeaService for GeminiIdeaClient {
    async fn generate_ideas(&self, topic: &str) -> Result<Vec<WebsiteIdea>> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part::Text {
                    text: prompts::ideas_instruction(topic),
                }],
            }],
            generation_config: GenerationConfig::json(Self::response_schema()),
        };

        tracing::info!("Requesting website ideas from {}", self.http.model());

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;
        let envelope: IdeasEnvelope = response.parse_json("ideas")?;

        tracing::debug!("Gemini returned {} ideas", envelope.ideas.len());

        Ok(envelope.ideas)
    }
}
