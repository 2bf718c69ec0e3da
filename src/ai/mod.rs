//! AI service integration for website and idea generation
//!
//! Provides the service traits the session drives, a Gemini implementation of
//! each, and in-memory mocks for tests and offline harnesses.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiIdeaClient, GeminiSiteClient};
pub use mock::{MockFailure, MockIdeaClient, MockSiteClient};

use crate::models::{GeneratedSite, GenerationRequest, WebsiteIdea};
use crate::Result;
use async_trait::async_trait;

/// Turns a validated request into the three source fragments of a site.
#[async_trait]
pub trait SiteGenerationService: Send + Sync {
    async fn generate_site(&self, request: &GenerationRequest) -> Result<GeneratedSite>;
}

/// Produces short website idea records for a topic.
#[async_trait]
pub trait IdeaService: Send + Sync {
    async fn generate_ideas(&self, topic: &str) -> Result<Vec<WebsiteIdea>>;
}
