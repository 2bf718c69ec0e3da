use super::client::GeminiHttpClient;
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part, Schema,
};
use crate::ai::SiteGenerationService;
use crate::models::{GeneratedSite, GenerationRequest};
use crate::{prompts, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Gemini implementation of [`SiteGenerationService`].
pub struct GeminiSiteClient {
    http: GeminiHttpClient,
}

impl GeminiSiteClient {
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
        Schema::object(vec![
            ("html", Schema::string()),
            ("css", Schema::string()),
            ("javascript", Schema::string()),
        ])
    }

    fn build_request(request: &GenerationRequest) -> GenerateContentRequest {
        let instruction = prompts::site_instruction(request.prompt(), request.image().is_some());

        let mut parts = vec![Part::Text { text: instruction }];
        if let Some(image) = request.image() {
            parts.push(Part::from(image));
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig::json(Self::response_schema()),
        }
    }
}

#[async_trait]
impl SiteGenerationService for GeminiSiteClient {
    async fn generate_site(&self, request: &GenerationRequest) -> Result<GeneratedSite> {
        let body = Self::build_request(request);

        tracing::info!(
            "Requesting website from {} (image attached: {})",
            self.http.model(),
            request.image().is_some()
        );

        let response: GenerateContentResponse = self.http.generate_content(&body).await?;
        let site: GeneratedSite = response.parse_json("website")?;

        tracing::debug!(
            "Gemini returned website: html {} bytes, css {} bytes, js {} bytes",
            site.html.len(),
            site.css.len(),
            site.javascript.len()
        );

        Ok(site)
    }
}
