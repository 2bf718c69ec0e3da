use super::{IdeaService, SiteGenerationService};
use crate::models::{GeneratedSite, GenerationRequest, WebsiteIdea};
use crate::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Failure a mock service should report instead of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Upstream,
    InvalidResponseShape,
}

impl MockFailure {
    fn to_error(self) -> Error {
        match self {
            MockFailure::Upstream => Error::Upstream("mock upstream failure".to_string()),
            MockFailure::InvalidResponseShape => {
                Error::InvalidResponseShape("mock response missing fields".to_string())
            }
        }
    }
}

type Scripted<T> = std::result::Result<T, MockFailure>;

/// Replays scripted outcomes in a cycle, or a canned default when empty.
#[derive(Clone)]
struct Script<T> {
    outcomes: Arc<Mutex<Vec<Scripted<T>>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl<T: Clone> Script<T> {
    fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    fn push(&self, outcome: Scripted<T>) {
        self.outcomes.lock().push(outcome);
    }

    fn calls(&self) -> usize {
        *self.call_count.lock()
    }

    async fn next(&self, default: impl FnOnce() -> T) -> Result<T> {
        let outcome = {
            let mut count = self.call_count.lock();
            *count += 1;

            let outcomes = self.outcomes.lock();
            if outcomes.is_empty() {
                None
            } else {
                Some(outcomes[(*count - 1) % outcomes.len()].clone())
            }
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match outcome {
            None => Ok(default()),
            Some(Ok(value)) => Ok(value),
            Some(Err(failure)) => Err(failure.to_error()),
        }
    }
}

#[derive(Clone)]
pub struct MockSiteClient {
    script: Script<GeneratedSite>,
    last_request: Arc<Mutex<Option<GenerationRequest>>>,
}

impl MockSiteClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_site_response(self, site: GeneratedSite) -> Self {
        self.script.push(Ok(site));
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.script.push(Err(failure));
        self
    }

    /// Hold every call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.script.calls()
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().clone()
    }
}

impl Default for MockSiteClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SiteGenerationService for MockSiteClient {
    async fn generate_site(&self, request: &GenerationRequest) -> Result<GeneratedSite> {
        *self.last_request.lock() = Some(request.clone());

        let prompt = request.prompt().trim().to_string();
        self.script
            .next(move || GeneratedSite {
                html: format!("<main><h1>{}</h1></main>", prompt),
                css: "main { font-family: sans-serif; }".to_string(),
                javascript: String::new(),
            })
            .await
    }
}

#[derive(Clone)]
pub struct MockIdeaClient {
    script: Script<Vec<WebsiteIdea>>,
}

impl MockIdeaClient {
    pub fn new() -> Self {
        Self {
            script: Script::new(),
        }
    }

    pub fn with_ideas_response(self, ideas: Vec<WebsiteIdea>) -> Self {
        self.script.push(Ok(ideas));
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.script.push(Err(failure));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.script.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.script.calls()
    }
}

impl Default for MockIdeaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdeaService for MockIdeaClient {
    async fn generate_ideas(&self, topic: &str) -> Result<Vec<WebsiteIdea>> {
        let topic = topic.trim().to_string();
        self.script
            .next(move || {
                (1..=5)
                    .map(|n| WebsiteIdea {
                        title: format!("{} idea {}", topic, n),
                        description: format!("A website concept about {}.", topic),
                    })
                    .collect()
            })
            .await
    }
}
