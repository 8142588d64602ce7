use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::clients::appstore::AppStoreClient;
use crate::clients::domains::DnsClient;
use crate::clients::github::GitHubClient;
use crate::clients::hackernews::HackerNewsClient;
use crate::clients::producthunt::ProductHuntClient;
use crate::clients::reddit::RedditClient;
use crate::clients::serp::SerpClient;
use crate::clients::trademark::TrademarkClient;
use crate::config::SourcesConfig;
use crate::models::sources::{
    AggregateSources, DomainCheck, SourceKind, TrademarkScan, TrendSnapshot,
};
use crate::services::names::NameService;

/// Product Hunt and Hacker News return few useful results past the
/// first handful.
const LAUNCH_POSTS_LIMIT: i32 = 5;
const NEWS_STORIES_LIMIT: usize = 5;

/// Whether an adapter produced a live value or its kind-appropriate
/// default after a failure.
#[derive(Debug)]
pub enum SourceOutcome<T> {
    Fresh(T),
    Fallback(T),
}

impl<T> SourceOutcome<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Fresh(value) | Self::Fallback(value) => value,
        }
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Awaits an adapter call and converts any error into the given
/// fallback value. This is the fail-soft boundary: nothing an
/// upstream does can propagate past it.
async fn settle<T>(
    kind: SourceKind,
    fallback: T,
    call: impl Future<Output = anyhow::Result<T>>,
) -> SourceOutcome<T> {
    match call.await {
        Ok(value) => SourceOutcome::Fresh(value),
        Err(e) => {
            debug!("{kind} adapter failed: {e}");
            SourceOutcome::Fallback(fallback)
        }
    }
}

/// Fans out to every source adapter concurrently and assembles the
/// fixed-shape aggregate. All adapters are awaited to completion
/// regardless of individual outcome, so total latency tracks the
/// slowest adapter rather than the sum.
pub struct SourceAggregator {
    dns: Arc<DnsClient>,
    appstore: Arc<AppStoreClient>,
    product_hunt: Arc<ProductHuntClient>,
    reddit: Arc<RedditClient>,
    github: Arc<GitHubClient>,
    serp: Arc<SerpClient>,
    hackernews: Arc<HackerNewsClient>,
    trademark: Arc<TrademarkClient>,
    names: Arc<NameService>,
    config: SourcesConfig,
}

impl SourceAggregator {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub const fn new(
        dns: Arc<DnsClient>,
        appstore: Arc<AppStoreClient>,
        product_hunt: Arc<ProductHuntClient>,
        reddit: Arc<RedditClient>,
        github: Arc<GitHubClient>,
        serp: Arc<SerpClient>,
        hackernews: Arc<HackerNewsClient>,
        trademark: Arc<TrademarkClient>,
        names: Arc<NameService>,
        config: SourcesConfig,
    ) -> Self {
        Self {
            dns,
            appstore,
            product_hunt,
            reddit,
            github,
            serp,
            hackernews,
            trademark,
            names,
            config,
        }
    }

    pub async fn aggregate(&self, idea: &str) -> (AggregateSources, Vec<SourceKind>) {
        let limit = self.config.results_per_source;
        let trend_keyword: String = idea
            .chars()
            .take(crate::clients::serp::TREND_KEYWORD_MAX_CHARS)
            .collect();

        let (domains, app_store, product_hunt, reddit, github, web, hacker_news, trends, trademark) =
            tokio::join!(
                self.fetch_domains(idea),
                settle(
                    SourceKind::AppStore,
                    Vec::new(),
                    self.appstore.search(idea, limit)
                ),
                settle(
                    SourceKind::ProductHunt,
                    Vec::new(),
                    self.product_hunt.search(idea, LAUNCH_POSTS_LIMIT)
                ),
                settle(SourceKind::Reddit, Vec::new(), self.reddit.search(idea, limit)),
                settle(
                    SourceKind::GitHub,
                    Vec::new(),
                    self.github.search_repositories(idea, limit)
                ),
                settle(SourceKind::Web, Vec::new(), self.serp.search_web(idea, limit)),
                settle(
                    SourceKind::HackerNews,
                    Vec::new(),
                    self.hackernews.search_stories(idea, NEWS_STORIES_LIMIT)
                ),
                settle(
                    SourceKind::Trends,
                    TrendSnapshot::neutral(&trend_keyword),
                    self.serp.fetch_trends(idea)
                ),
                settle(
                    SourceKind::Trademark,
                    TrademarkScan::default(),
                    self.trademark.search(idea)
                ),
            );

        let mut failed = Vec::new();
        for (kind, fell_back) in [
            (SourceKind::AppStore, app_store.is_fallback()),
            (SourceKind::ProductHunt, product_hunt.is_fallback()),
            (SourceKind::Reddit, reddit.is_fallback()),
            (SourceKind::GitHub, github.is_fallback()),
            (SourceKind::Web, web.is_fallback()),
            (SourceKind::HackerNews, hacker_news.is_fallback()),
            (SourceKind::Trends, trends.is_fallback()),
            (SourceKind::Trademark, trademark.is_fallback()),
        ] {
            if fell_back {
                failed.push(kind);
            }
        }

        if !failed.is_empty() {
            let names: Vec<&str> = failed.iter().map(|k| k.as_str()).collect();
            warn!("Source adapters fell back to defaults: {}", names.join(", "));
        }

        let sources = AggregateSources {
            domains,
            app_store: app_store.into_inner(),
            product_hunt: product_hunt.into_inner(),
            reddit: reddit.into_inner(),
            github: github.into_inner(),
            web: web.into_inner(),
            hacker_news: hacker_news.into_inner(),
            trends: trends.into_inner(),
            trademark: trademark.into_inner(),
        };

        (sources, failed)
    }

    /// The domain adapter is internally fail-soft: name generation
    /// falls back to keyword extraction and per-domain probe errors
    /// report the domain as unavailable.
    async fn fetch_domains(&self, idea: &str) -> Vec<DomainCheck> {
        let names = self.names.candidate_names(idea).await;
        self.dns
            .check_candidates(&names, &self.config.domain_extension)
            .await
    }
}
