use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

use crate::clients::appstore::AppStoreClient;
use crate::clients::claude::ClaudeClient;
use crate::clients::domains::DnsClient;
use crate::clients::github::GitHubClient;
use crate::clients::hackernews::HackerNewsClient;
use crate::clients::producthunt::ProductHuntClient;
use crate::clients::reddit::RedditClient;
use crate::clients::serp::SerpClient;
use crate::clients::trademark::TrademarkClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::events::NotificationEvent;
use crate::services::{
    AnalyticsService, CheckService, NameService, RateGovernor, SourceAggregator, SynthesisService,
};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based clients to
/// enable connection pooling and avoid socket exhaustion. Its timeout
/// is the effective per-adapter deadline.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Vettr/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub event_bus: broadcast::Sender<NotificationEvent>,

    pub governor: Arc<RateGovernor>,

    pub aggregator: Arc<SourceAggregator>,

    pub synthesis: Arc<SynthesisService>,

    pub check_service: Arc<CheckService>,

    pub analytics: Arc<AnalyticsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let (event_bus, _) = broadcast::channel(config.general.event_bus_buffer_size);
        Self::with_event_bus(config, event_bus).await
    }

    pub async fn with_event_bus(
        config: Config,
        event_bus: broadcast::Sender<NotificationEvent>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.sources.request_timeout_seconds)?;

        let claude = config.ai.enabled.then(|| {
            Arc::new(ClaudeClient::with_shared_client(
                http_client.clone(),
                config.ai.api_key(),
                &config.ai.model,
            ))
        });

        let names = Arc::new(NameService::new(
            claude.clone(),
            config.sources.max_candidate_names,
            config.ai.name_max_tokens,
        ));

        let aggregator = Arc::new(SourceAggregator::new(
            Arc::new(DnsClient::with_shared_client(http_client.clone())),
            Arc::new(AppStoreClient::with_shared_client(http_client.clone())),
            Arc::new(ProductHuntClient::with_shared_client(
                http_client.clone(),
                config.sources.product_hunt_token(),
            )),
            Arc::new(RedditClient::with_shared_client(http_client.clone())),
            Arc::new(GitHubClient::with_shared_client(
                http_client.clone(),
                config.sources.github_token(),
            )),
            Arc::new(SerpClient::with_shared_client(
                http_client.clone(),
                config.sources.serp_api_key(),
            )),
            Arc::new(HackerNewsClient::with_shared_client(http_client.clone())),
            Arc::new(TrademarkClient::with_shared_client(
                http_client,
                config.sources.rapid_api_key(),
            )),
            names,
            config.sources.clone(),
        ));

        let synthesis = Arc::new(SynthesisService::new(claude, config.ai.max_tokens));

        let governor = Arc::new(RateGovernor::new(&config.limits));

        let check_service = Arc::new(CheckService::new(
            store.clone(),
            aggregator.clone(),
            synthesis.clone(),
            governor.clone(),
            event_bus.clone(),
        ));

        let analytics = Arc::new(AnalyticsService::new(store.clone(), event_bus.clone()));
        analytics.clone().start_listener();

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            event_bus,
            governor,
            aggregator,
            synthesis,
            check_service,
            analytics,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
