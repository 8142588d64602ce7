use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::{NewCheck, Store};
use crate::domain::events::NotificationEvent;
use crate::models::analysis::Analysis;
use crate::models::idea::IdeaQuery;
use crate::models::sources::AggregateSources;
use crate::services::aggregator::SourceAggregator;
use crate::services::governor::{GateDecision, QuotaDecision, RateGovernor};
use crate::services::synthesis::SynthesisService;

/// Gate rejections surfaced to the caller. Everything below the gates
/// is contained: adapters and synthesis fall back to defaults, and
/// persistence failures are logged without failing the request.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Rate limit exceeded. Please try again in a minute.")]
    RateLimited { retry_after_seconds: u64 },

    #[error("{reason}")]
    QuotaExceeded { reason: String },
}

/// The user-visible result of one idea check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCheckResult {
    pub id: String,
    pub idea: String,
    pub timestamp: String,
    pub cached: bool,
    pub sources: AggregateSources,
    pub analysis: Analysis,
}

#[derive(Debug)]
pub struct CheckOutcome {
    pub result: IdeaCheckResult,
    /// Requests left in the caller's anonymous window.
    pub rate_remaining: u32,
}

/// Orchestrates one idea check: governor gates, cache lookup,
/// fan-out, synthesis, assembly, persistence, history and events.
pub struct CheckService {
    store: Store,
    aggregator: Arc<SourceAggregator>,
    synthesis: Arc<SynthesisService>,
    governor: Arc<RateGovernor>,
    event_bus: broadcast::Sender<NotificationEvent>,
}

impl CheckService {
    #[must_use]
    pub const fn new(
        store: Store,
        aggregator: Arc<SourceAggregator>,
        synthesis: Arc<SynthesisService>,
        governor: Arc<RateGovernor>,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> Self {
        Self {
            store,
            aggregator,
            synthesis,
            governor,
            event_bus,
        }
    }

    /// Runs the full pipeline for an already-validated idea text.
    ///
    /// The network gate runs first (no backend lookup), the user-tier
    /// gate second; the first rejection short-circuits.
    pub async fn run(
        &self,
        idea: &str,
        user_id: Option<&str>,
        network_identity: &str,
    ) -> Result<CheckOutcome, CheckError> {
        let rate_remaining = match self.governor.check_network(network_identity) {
            GateDecision::Allowed { remaining } => remaining,
            GateDecision::Rejected {
                retry_after_seconds,
            } => {
                return Err(CheckError::RateLimited {
                    retry_after_seconds,
                });
            }
        };

        if let Some(user_id) = user_id
            && let QuotaDecision::Rejected { reason } =
                self.governor.check_user_quota(&self.store, user_id).await
        {
            return Err(CheckError::QuotaExceeded { reason });
        }

        let query = IdeaQuery::new(idea);

        self.emit(NotificationEvent::SearchStarted {
            idea: query.raw.clone(),
            user_id: user_id.map(String::from),
        });

        // A failed lookup is treated as a miss: a flaky cache must not
        // take the whole endpoint down with it.
        let cached = match self.store.find_check(&query.fingerprint).await {
            Ok(row) => row,
            Err(e) => {
                warn!("Cache lookup failed, treating as miss: {e}");
                None
            }
        };

        if let Some(hit) = cached {
            if let Err(e) = self.store.record_check_hit(&query.fingerprint).await {
                warn!("Failed to bump cache hit counter: {e}");
            }

            self.record_history(user_id, &hit.id, &hit.idea, &hit.analysis)
                .await;
            self.emit(NotificationEvent::CacheHit {
                idea: query.raw.clone(),
                user_id: user_id.map(String::from),
            });

            info!("Cache hit for \"{}\"", query.canonical);

            return Ok(CheckOutcome {
                result: IdeaCheckResult {
                    id: hit.id,
                    idea: hit.idea,
                    timestamp: hit.created_at,
                    cached: true,
                    sources: hit.sources,
                    analysis: hit.analysis,
                },
                rate_remaining,
            });
        }

        info!("Cache miss, fetching fresh data for \"{}\"", query.canonical);

        let (sources, _defaulted) = self.aggregator.aggregate(&query.raw).await;
        let analysis = self.synthesis.synthesize(&query.raw, &sources).await;

        let id = format!("check_{}", Uuid::new_v4());
        let timestamp = chrono::Utc::now().to_rfc3339();

        // The computed result is returned even when persistence fails;
        // operators see the error, the user sees their analysis.
        if let Err(e) = self
            .store
            .insert_check(NewCheck {
                id: &id,
                fingerprint: &query.fingerprint,
                idea: &query.raw,
                sources: &sources,
                analysis: &analysis,
                user_id,
            })
            .await
        {
            error!("Failed to persist check result: {e}");
            self.emit(NotificationEvent::SearchFailed {
                message: format!("cache store failed: {e}"),
            });
        }

        self.record_history(user_id, &id, &query.raw, &analysis).await;
        self.emit(NotificationEvent::SearchCompleted {
            idea: query.raw.clone(),
            score: analysis.overall_score,
            verdict: analysis.verdict.to_string(),
            cached: false,
            user_id: user_id.map(String::from),
        });

        info!(
            "Analysis complete for \"{}\": score {} ({})",
            query.canonical, analysis.overall_score, analysis.verdict
        );

        Ok(CheckOutcome {
            result: IdeaCheckResult {
                id,
                idea: query.raw,
                timestamp,
                cached: false,
                sources,
                analysis,
            },
            rate_remaining,
        })
    }

    async fn record_history(
        &self,
        user_id: Option<&str>,
        check_id: &str,
        idea: &str,
        analysis: &Analysis,
    ) {
        let Some(user_id) = user_id else {
            return;
        };

        if let Err(e) = self
            .store
            .record_user_search(
                user_id,
                check_id,
                idea,
                i32::from(analysis.overall_score),
                analysis.verdict.as_str(),
            )
            .await
        {
            warn!("Failed to record search history for {user_id}: {e}");
        }

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        if let Err(e) = self.store.bump_profile_search_stats(user_id, &today).await {
            warn!("Failed to bump search stats for {user_id}: {e}");
        }
    }

    fn emit(&self, event: NotificationEvent) {
        let _ = self.event_bus.send(event);
    }
}
