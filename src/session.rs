//! Per-session generation state
//!
//! A [`Session`] gates each generation on the matching credit counter, keeps
//! one explicit [`RequestState`] per action kind, and holds the latest results.
//! State lives behind a lock that is released before any model call is
//! awaited, so a second request of the same kind observes `InFlight` and is
//! turned away instead of racing the first.

use crate::ai::{IdeaService, SiteGenerationService};
use crate::credits::{CreditKind, CreditState, Plan};
use crate::error::Recovery;
use crate::models::{GeneratedSite, GenerationRequest, UploadedImage, WebsiteIdea};
use crate::{Error, Result};
use parking_lot::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    InFlight,
    Succeeded,
    Failed { message: String, recovery: Recovery },
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }
}

/// Injectable service bundle used to construct a [`Session`].
pub struct SessionServices {
    pub site: Box<dyn SiteGenerationService>,
    pub ideas: Box<dyn IdeaService>,
}

#[derive(Debug)]
struct SessionState {
    credits: CreditState,
    page: RequestState,
    idea: RequestState,
    latest_site: Option<GeneratedSite>,
    latest_ideas: Vec<WebsiteIdea>,
}

impl SessionState {
    fn request_state(&mut self, kind: CreditKind) -> &mut RequestState {
        match kind {
            CreditKind::Page => &mut self.page,
            CreditKind::Idea => &mut self.idea,
        }
    }

    /// Claim the action slot: in-flight check, credit gate, then input
    /// validation. A refusal other than in-flight is recorded as a failure.
    fn begin(&mut self, kind: CreditKind, validate: impl FnOnce() -> Result<()>) -> Result<()> {
        if self.request_state(kind).is_in_flight() {
            warn!("Rejected {} request: one is already in flight", kind);
            return Err(Error::RequestInFlight(kind));
        }

        let gate = if self.credits.can_spend(kind) {
            validate()
        } else {
            Err(Error::CreditsExhausted(kind))
        };

        match gate {
            Ok(()) => {
                *self.request_state(kind) = RequestState::InFlight;
                Ok(())
            }
            Err(e) => {
                info!("Refused {} request: {}", kind, e);
                *self.request_state(kind) = RequestState::Failed {
                    message: failure_message(kind, &e),
                    recovery: e.recovery(),
                };
                Err(e)
            }
        }
    }

    fn finish<T>(&mut self, kind: CreditKind, outcome: &Result<T>) {
        match outcome {
            Ok(_) => {
                // A plan switch mid-flight may have left nothing to spend.
                if let Err(e) = self.credits.consume(kind) {
                    warn!("{} succeeded but could not be charged: {}", kind, e);
                }
                *self.request_state(kind) = RequestState::Succeeded;
                info!(
                    "{} succeeded; {} credits left",
                    kind,
                    self.credits.remaining(kind)
                );
            }
            Err(e) => {
                error!("{} failed: {}", kind, e);
                *self.request_state(kind) = RequestState::Failed {
                    message: failure_message(kind, e),
                    recovery: e.recovery(),
                };
            }
        }
    }
}

/// Flatten a typed error into the single line shown to the user.
pub fn failure_message(kind: CreditKind, err: &Error) -> String {
    match err {
        Error::Validation(message) => message.clone(),
        Error::CreditsExhausted(_) => format!(
            "You have run out of {} credits. Please upgrade your plan.",
            kind
        ),
        Error::RequestInFlight(_) => format!("A {} request is already running.", kind),
        // Only raised after a successful generation, so the credit was spent.
        Error::Io(e) if kind == CreditKind::Page => format!(
            "Website generated but could not be saved: {}. The page credit was spent on the generation.",
            e
        ),
        _ => match kind {
            CreditKind::Page => {
                "Failed to generate website code. Please check your prompt or API key.".to_string()
            }
            CreditKind::Idea => "Failed to generate website ideas. Please try again.".to_string(),
        },
    }
}

pub struct Session {
    site: Box<dyn SiteGenerationService>,
    ideas: Box<dyn IdeaService>,
    state: Mutex<SessionState>,
}

impl Session {
    /// New session on the free plan.
    pub fn new(services: SessionServices) -> Self {
        Self::with_plan(services, Plan::Free)
    }

    pub fn with_plan(services: SessionServices, plan: Plan) -> Self {
        Self {
            site: services.site,
            ideas: services.ideas,
            state: Mutex::new(SessionState {
                credits: CreditState::for_plan(plan),
                page: RequestState::Idle,
                idea: RequestState::Idle,
                latest_site: None,
                latest_ideas: Vec::new(),
            }),
        }
    }

    pub fn credits(&self) -> CreditState {
        self.state.lock().credits
    }

    pub fn state(&self, kind: CreditKind) -> RequestState {
        self.state.lock().request_state(kind).clone()
    }

    pub fn latest_site(&self) -> Option<GeneratedSite> {
        self.state.lock().latest_site.clone()
    }

    pub fn latest_ideas(&self) -> Vec<WebsiteIdea> {
        self.state.lock().latest_ideas.clone()
    }

    /// Switch plans, resetting both counters to the plan's allotment.
    /// Outstanding failures are cleared; in-flight requests are left alone.
    pub fn select_plan(&self, plan: Plan) {
        let mut state = self.state.lock();
        state.credits.select_plan(plan);
        for kind in [CreditKind::Page, CreditKind::Idea] {
            let slot = state.request_state(kind);
            if matches!(slot, RequestState::Failed { .. }) {
                *slot = RequestState::Idle;
            }
        }
        info!(
            "Selected {} plan: {} page credits, {} idea credits",
            plan,
            state.credits.page_credits(),
            state.credits.idea_credits()
        );
    }

    /// Clear a failure and report what the user can do about it.
    ///
    /// Only the failure is cleared; previously generated content stays.
    pub fn dismiss_failure(&self, kind: CreditKind) -> Option<Recovery> {
        let mut state = self.state.lock();
        let can_spend = state.credits.can_spend(kind);
        let slot = state.request_state(kind);
        if !matches!(slot, RequestState::Failed { .. }) {
            return None;
        }
        *slot = RequestState::Idle;

        Some(if can_spend {
            Recovery::Retry
        } else {
            Recovery::UpgradePlan
        })
    }

    /// Generate a website from `prompt` and an optional image. Spends one
    /// page credit on success only.
    pub async fn generate_site(
        &self,
        prompt: &str,
        image: Option<UploadedImage>,
    ) -> Result<GeneratedSite> {
        let mut request = None;
        self.state.lock().begin(CreditKind::Page, || {
            request = Some(GenerationRequest::new(prompt, image)?);
            Ok(())
        })?;
        let request = request.ok_or_else(|| {
            Error::Validation("Please enter a description for the website.".to_string())
        })?;

        let outcome = self.site.generate_site(&request).await;

        let mut state = self.state.lock();
        state.finish(CreditKind::Page, &outcome);
        if let Ok(site) = &outcome {
            state.latest_site = Some(site.clone());
        }
        outcome
    }

    /// Generate idea records for `topic`. Spends one idea credit on success
    /// only.
    pub async fn generate_ideas(&self, topic: &str) -> Result<Vec<WebsiteIdea>> {
        self.state.lock().begin(CreditKind::Idea, || {
            if topic.trim().is_empty() {
                return Err(Error::Validation("Please enter a topic.".to_string()));
            }
            Ok(())
        })?;

        let outcome = self.ideas.generate_ideas(topic).await;

        let mut state = self.state.lock();
        state.finish(CreditKind::Idea, &outcome);
        if let Ok(ideas) = &outcome {
            state.latest_ideas = ideas.clone();
        }
        outcome
    }
}
