//! Domain events for the application.
//!
//! Check lifecycle events are broadcast on the event bus; the
//! analytics listener persists them. Sends are fire-and-forget: a
//! full or closed bus never affects the request that emitted the
//! event.

use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    SearchStarted {
        idea: String,
        user_id: Option<String>,
    },
    CacheHit {
        idea: String,
        user_id: Option<String>,
    },
    SearchCompleted {
        idea: String,
        score: u8,
        verdict: String,
        cached: bool,
        user_id: Option<String>,
    },
    SearchChallenged {
        idea: String,
        challenge_length: usize,
        user_id: Option<String>,
    },
    SearchFailed {
        message: String,
    },
}

impl NotificationEvent {
    /// Event name recorded in the analytics sink.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SearchStarted { .. } => "idea_search_started",
            Self::CacheHit { .. } => "idea_search_cache_hit",
            Self::SearchCompleted { .. } => "idea_search_completed",
            Self::SearchChallenged { .. } => "idea_search_challenged",
            Self::SearchFailed { .. } => "idea_search_error",
        }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::SearchStarted { user_id, .. }
            | Self::CacheHit { user_id, .. }
            | Self::SearchCompleted { user_id, .. }
            | Self::SearchChallenged { user_id, .. } => user_id.as_deref(),
            Self::SearchFailed { .. } => None,
        }
    }
}
