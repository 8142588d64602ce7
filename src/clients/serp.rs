use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::{TrendDirection, TrendSnapshot, WebPage};

const SERP_API: &str = "https://serpapi.com";

/// Trend keywords are truncated before lookup; long idea texts make
/// poor trend queries.
pub const TREND_KEYWORD_MAX_CHARS: usize = 50;

#[derive(Debug, Deserialize)]
struct WebSearchResponse {
    #[serde(default)]
    organic_results: Vec<OrganicResult>,
}

#[derive(Debug, Deserialize)]
struct OrganicResult {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrendsResponse {
    interest_over_time: Option<InterestOverTime>,
}

#[derive(Debug, Deserialize)]
struct InterestOverTime {
    #[serde(default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    values: Vec<TimelineValue>,
}

#[derive(Debug, Deserialize)]
struct TimelineValue {
    #[serde(deserialize_with = "flexible_u32", default)]
    value: u32,
}

/// SerpAPI sometimes returns numeric values as strings.
fn flexible_u32<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(u32),
        Text(String),
    }

    Ok(match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => n,
        NumOrString::Text(s) => s.trim().parse().unwrap_or(0),
    })
}

/// Web search and trend lookups via SerpAPI. Requires an API key.
#[derive(Clone)]
pub struct SerpClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl SerpClient {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_shared_client(Client::new(), api_key)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: SERP_API.to_string(),
            api_key,
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("SerpAPI key not configured"))
    }

    pub async fn search_web(&self, idea: &str, limit: usize) -> Result<Vec<WebPage>> {
        let api_key = self.api_key()?;
        let query = format!("{idea} startup app website");
        let url = format!(
            "{}/search?engine=google&q={}&num={}&api_key={}",
            self.base_url,
            urlencoding::encode(&query),
            limit,
            api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("SerpAPI search failed with status {}", response.status());
        }

        let body: WebSearchResponse = response.json().await?;

        Ok(body
            .organic_results
            .into_iter()
            .map(|result| WebPage {
                title: result.title.unwrap_or_default(),
                url: result.link.unwrap_or_default(),
                snippet: result.snippet.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn fetch_trends(&self, idea: &str) -> Result<TrendSnapshot> {
        let api_key = self.api_key()?;
        let keyword: String = idea.chars().take(TREND_KEYWORD_MAX_CHARS).collect();
        let url = format!(
            "{}/search?engine=google_trends&q={}&api_key={}",
            self.base_url,
            urlencoding::encode(&keyword),
            api_key
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("SerpAPI trends failed with status {}", response.status());
        }

        let body: TrendsResponse = response.json().await?;

        let interest = body
            .interest_over_time
            .and_then(|i| i.timeline_data.into_iter().next())
            .and_then(|point| point.values.into_iter().next())
            .map_or(50, |v| v.value)
            .min(100);

        #[allow(clippy::cast_possible_truncation)]
        let interest = interest as u8;

        Ok(TrendSnapshot {
            keyword,
            interest,
            direction: TrendDirection::from_interest(interest),
        })
    }
}
