use std::sync::Arc;
use std::time::{Duration, Instant};

use vettr::clients::appstore::AppStoreClient;
use vettr::clients::domains::DnsClient;
use vettr::clients::github::GitHubClient;
use vettr::clients::hackernews::HackerNewsClient;
use vettr::clients::producthunt::ProductHuntClient;
use vettr::clients::reddit::RedditClient;
use vettr::clients::serp::SerpClient;
use vettr::clients::trademark::TrademarkClient;
use vettr::config::{LimitsConfig, SourcesConfig};
use vettr::db::{NewCheck, Store};
use vettr::models::analysis::Verdict;
use vettr::models::idea::{IdeaQuery, fingerprint};
use vettr::models::sources::{AggregateSources, TrendDirection};
use vettr::services::synthesis::heuristic_analysis;
use vettr::services::{NameService, QuotaDecision, RateGovernor, SourceAggregator, SynthesisService};

/// Nothing listens here; every request fails immediately.
const DEAD_ENDPOINT: &str = "http://127.0.0.1:1";

async fn memory_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("in-memory store")
}

/// An aggregator whose every client points at an unroutable address,
/// so each adapter exercises its fail-soft path without touching the
/// network.
fn dead_aggregator() -> SourceAggregator {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("http client");

    SourceAggregator::new(
        Arc::new(DnsClient::with_base_url(client.clone(), DEAD_ENDPOINT)),
        Arc::new(AppStoreClient::with_base_url(client.clone(), DEAD_ENDPOINT)),
        Arc::new(ProductHuntClient::with_base_url(
            client.clone(),
            DEAD_ENDPOINT,
            Some("dummy-token".to_string()),
        )),
        Arc::new(RedditClient::with_base_url(client.clone(), DEAD_ENDPOINT)),
        Arc::new(GitHubClient::with_base_url(client.clone(), DEAD_ENDPOINT, None)),
        Arc::new(SerpClient::with_base_url(
            client.clone(),
            DEAD_ENDPOINT,
            Some("dummy-key".to_string()),
        )),
        Arc::new(HackerNewsClient::with_base_url(client.clone(), DEAD_ENDPOINT)),
        Arc::new(TrademarkClient::with_base_url(
            client,
            DEAD_ENDPOINT,
            Some("dummy-key".to_string()),
        )),
        Arc::new(NameService::new(None, 8, 512)),
        SourcesConfig::default(),
    )
}

#[test]
fn test_fingerprint_case_and_whitespace_insensitive() {
    assert_eq!(
        IdeaQuery::new("Pet Insurance ").fingerprint,
        IdeaQuery::new("pet insurance").fingerprint
    );
    assert_eq!(fingerprint("pet insurance"), fingerprint("pet insurance"));
}

#[tokio::test]
async fn test_cache_round_trip_preserves_payload_and_counts_hits() {
    let store = memory_store().await;

    let query = IdeaQuery::new("habit tracker app");
    let sources = AggregateSources::default();
    let analysis = heuristic_analysis(&sources);

    let stored = store
        .insert_check(NewCheck {
            id: "check_roundtrip",
            fingerprint: &query.fingerprint,
            idea: &query.raw,
            sources: &sources,
            analysis: &analysis,
            user_id: None,
        })
        .await
        .unwrap();
    assert_eq!(stored.times_requested, 1);

    let loaded = store
        .find_check(&query.fingerprint)
        .await
        .unwrap()
        .expect("stored check present");

    // Payloads survive the round trip byte-for-byte.
    assert_eq!(
        serde_json::to_string(&loaded.sources).unwrap(),
        serde_json::to_string(&sources).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&loaded.analysis).unwrap(),
        serde_json::to_string(&analysis).unwrap()
    );

    // Exactly one increment per recorded hit.
    store.record_check_hit(&query.fingerprint).await.unwrap();
    let after_one = store.find_check(&query.fingerprint).await.unwrap().unwrap();
    assert_eq!(after_one.times_requested, 2);

    store.record_check_hit(&query.fingerprint).await.unwrap();
    let after_two = store.find_check(&query.fingerprint).await.unwrap().unwrap();
    assert_eq!(after_two.times_requested, 3);
}

#[tokio::test]
async fn test_lookup_is_exact_fingerprint_only() {
    let store = memory_store().await;

    let query = IdeaQuery::new("dog walking marketplace");
    let sources = AggregateSources::default();
    let analysis = heuristic_analysis(&sources);
    store
        .insert_check(NewCheck {
            id: "check_exact",
            fingerprint: &query.fingerprint,
            idea: &query.raw,
            sources: &sources,
            analysis: &analysis,
            user_id: None,
        })
        .await
        .unwrap();

    // Equivalent wording is still a distinct fingerprint.
    let reworded = IdeaQuery::new("marketplace for dog walking");
    assert!(store.find_check(&reworded.fingerprint).await.unwrap().is_none());
}

#[tokio::test]
async fn test_aggregation_full_shape_when_every_adapter_fails() {
    let aggregator = dead_aggregator();

    let started = Instant::now();
    let (sources, defaulted) = aggregator.aggregate("AI meal planner").await;

    // Settle-all over failing adapters, not a sum of timeouts.
    assert!(started.elapsed() < Duration::from_secs(15));

    // Every list-shaped source defaulted to empty, the singletons to
    // their neutral values; no key is missing from the shape.
    assert!(sources.app_store.is_empty());
    assert!(sources.product_hunt.is_empty());
    assert!(sources.reddit.is_empty());
    assert!(sources.github.is_empty());
    assert!(sources.web.is_empty());
    assert!(sources.hacker_news.is_empty());
    assert_eq!(sources.trends.interest, 50);
    assert_eq!(sources.trends.direction, TrendDirection::Stable);
    assert!(!sources.trademark.found);
    assert!(sources.trademark.matches.is_empty());

    // The domain adapter still produced candidates (via the keyword
    // fallback), each conservatively reported unavailable.
    assert!(!sources.domains.is_empty());
    assert!(sources.domains.iter().all(|d| !d.available));
    assert!(sources.domains.iter().all(|d| d.domain.ends_with(".com")));

    assert_eq!(defaulted.len(), 8);
}

#[tokio::test]
async fn test_scenario_all_sources_empty_scores_wide_open() {
    let aggregator = dead_aggregator();
    let synthesis = SynthesisService::new(None, 2000);

    let (sources, _) = aggregator.aggregate("AI meal planner").await;
    let analysis = synthesis.synthesize("AI meal planner", &sources).await;

    assert_eq!(analysis.overall_score, 100);
    assert_eq!(analysis.verdict, Verdict::WideOpen);
    assert_eq!(analysis.verdict, Verdict::from_score(analysis.overall_score));
}

#[tokio::test]
async fn test_free_tier_quota_enforced_per_day() {
    let store = memory_store().await;
    let governor = RateGovernor::new(&LimitsConfig::default());

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    store
        .insert_profile(vettr::entities::user_profiles::Model {
            id: "user-free".to_string(),
            email: None,
            plan: "free".to_string(),
            quota_day: today.clone(),
            searches_today: 3,
            searches_this_month: 3,
            total_searches: 3,
            last_search_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();

    match governor.check_user_quota(&store, "user-free").await {
        QuotaDecision::Rejected { reason } => assert!(reason.contains("Upgrade")),
        QuotaDecision::Allowed { .. } => panic!("exhausted free tier should be rejected"),
    }

    // A counter from a previous day no longer counts.
    store
        .insert_profile(vettr::entities::user_profiles::Model {
            id: "user-stale".to_string(),
            email: None,
            plan: "free".to_string(),
            quota_day: "2000-01-01".to_string(),
            searches_today: 3,
            searches_this_month: 3,
            total_searches: 3,
            last_search_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();
    assert_eq!(
        governor.check_user_quota(&store, "user-stale").await,
        QuotaDecision::Allowed { remaining: Some(3) }
    );

    // Paid tier is unlimited.
    store
        .insert_profile(vettr::entities::user_profiles::Model {
            id: "user-pro".to_string(),
            email: None,
            plan: "pro".to_string(),
            quota_day: today,
            searches_today: 500,
            searches_this_month: 500,
            total_searches: 500,
            last_search_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();
    assert_eq!(
        governor.check_user_quota(&store, "user-pro").await,
        QuotaDecision::Allowed { remaining: None }
    );

    // Unknown users are allowed rather than locked out.
    assert_eq!(
        governor.check_user_quota(&store, "user-missing").await,
        QuotaDecision::Allowed { remaining: None }
    );
}

#[tokio::test]
async fn test_profile_stat_bump_resets_on_day_boundary() {
    let store = memory_store().await;

    store
        .insert_profile(vettr::entities::user_profiles::Model {
            id: "user-1".to_string(),
            email: None,
            plan: "free".to_string(),
            quota_day: "2000-01-01".to_string(),
            searches_today: 3,
            searches_this_month: 7,
            total_searches: 40,
            last_search_at: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        })
        .await
        .unwrap();

    let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
    store.bump_profile_search_stats("user-1", &today).await.unwrap();

    let profile = store.get_profile("user-1").await.unwrap().unwrap();
    assert_eq!(profile.quota_day, today);
    assert_eq!(profile.searches_today, 1);
    assert_eq!(profile.searches_this_month, 8);
    assert_eq!(profile.total_searches, 41);
    assert!(profile.last_search_at.is_some());

    store.bump_profile_search_stats("user-1", &today).await.unwrap();
    let profile = store.get_profile("user-1").await.unwrap().unwrap();
    assert_eq!(profile.searches_today, 2);
}

#[tokio::test]
async fn test_concurrent_store_of_same_fingerprint_upserts() {
    let store = memory_store().await;

    let query = IdeaQuery::new("note taking app");
    let sources = AggregateSources::default();
    let analysis = heuristic_analysis(&sources);

    for id in ["check_first", "check_second"] {
        store
            .insert_check(NewCheck {
                id,
                fingerprint: &query.fingerprint,
                idea: &query.raw,
                sources: &sources,
                analysis: &analysis,
                user_id: None,
            })
            .await
            .expect("duplicate fingerprint store must not fail");
    }

    let cached = store.find_check(&query.fingerprint).await.unwrap().unwrap();
    // The first row wins the identity; the payload is refreshed.
    assert_eq!(cached.id, "check_first");
}
