//! The text-generation capability the runtime consumes
//!
//! Three calls, one per narrative register: a whispered rumor, a journalist
//! article, a historian consolidation. All asynchronous; the runtime never
//! assumes a call succeeds.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::{ProviderError, SharedBackend};

/// Rumor/news/history generation, pluggable and swappable
#[async_trait]
pub trait TextGenProvider: Send + Sync {
    /// One node's whispered take on an event
    async fn generate_rumor(&self, event_text: &str) -> Result<String, ProviderError>;

    /// One article aggregating the turn's rumors
    async fn generate_news(
        &self,
        event_text: &str,
        aggregated_rumors: &str,
        as_journalist: bool,
    ) -> Result<String, ProviderError>;

    /// One consolidated history from a country's full feed
    async fn generate_history(&self, full_feed: &str) -> Result<String, ProviderError>;
}

/// Thread-safe handle to a provider
pub type SharedProvider = Arc<dyn TextGenProvider>;

const RUMOR_SYSTEM_PROMPT: &str = "\
You are a townsperson in a low-fantasy world. You just heard about an event. \
Retell it as a one-sentence rumor: partial, embellished, maybe wrong, never \
neutral. Respond with the rumor only.";

const JOURNALIST_SYSTEM_PROMPT: &str = "\
You are a broadsheet journalist in a low-fantasy world. From the event and \
the street rumors provided, write a short news article (2-4 sentences) with \
a terse headline. Separate fact from hearsay the way a careful paper would.";

const HISTORIAN_SYSTEM_PROMPT: &str = "\
You are a court historian in a low-fantasy world. From the article feed \
provided, write one consolidated chronicle entry (one paragraph) recording \
what this period will be remembered for.";

/// Prompt-assembling provider on top of any [`crate::LlmBackend`]
pub struct LlmProvider {
    backend: SharedBackend,
}

impl LlmProvider {
    pub fn new(backend: SharedBackend) -> Self {
        Self { backend }
    }

    pub fn shared(backend: SharedBackend) -> SharedProvider {
        Arc::new(Self::new(backend))
    }
}

#[async_trait]
impl TextGenProvider for LlmProvider {
    async fn generate_rumor(&self, event_text: &str) -> Result<String, ProviderError> {
        debug!(model = self.backend.model_name(), "rumor call");
        self.backend.generate(RUMOR_SYSTEM_PROMPT, event_text).await
    }

    async fn generate_news(
        &self,
        event_text: &str,
        aggregated_rumors: &str,
        as_journalist: bool,
    ) -> Result<String, ProviderError> {
        let system = if as_journalist {
            JOURNALIST_SYSTEM_PROMPT
        } else {
            HISTORIAN_SYSTEM_PROMPT
        };
        let user = format!("Event: {event_text}\n\nStreet rumors: {aggregated_rumors}");
        self.backend.generate(system, &user).await
    }

    async fn generate_history(&self, full_feed: &str) -> Result<String, ProviderError> {
        self.backend.generate(HISTORIAN_SYSTEM_PROMPT, full_feed).await
    }
}

/// Deterministic offline provider; the default for local runs and tests
#[derive(Debug, Clone, Default)]
pub struct TemplateProvider;

impl TemplateProvider {
    pub fn shared() -> SharedProvider {
        Arc::new(Self)
    }
}

#[async_trait]
impl TextGenProvider for TemplateProvider {
    async fn generate_rumor(&self, event_text: &str) -> Result<String, ProviderError> {
        Ok(format!("[rumor] a whisper about: {event_text}"))
    }

    async fn generate_news(
        &self,
        event_text: &str,
        aggregated_rumors: &str,
        as_journalist: bool,
    ) -> Result<String, ProviderError> {
        let role = if as_journalist { "journalist" } else { "historian" };
        Ok(format!(
            "[{role} report] event: {event_text} | digest: {aggregated_rumors}"
        ))
    }

    async fn generate_history(&self, full_feed: &str) -> Result<String, ProviderError> {
        Ok(format!("[chronicle] compiled from:\n{full_feed}"))
    }
}
