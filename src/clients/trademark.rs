use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::{TrademarkMatch, TrademarkScan};

const TRADEMARK_API: &str = "https://uspto-trademark.p.rapidapi.com";
const TRADEMARK_API_HOST: &str = "uspto-trademark.p.rapidapi.com";

/// Trademark queries use only the leading words of the idea; full
/// sentences match nothing in the register.
const QUERY_MAX_WORDS: usize = 3;

const MATCHES_LIMIT: usize = 5;

#[derive(Debug, Deserialize)]
struct TrademarkResponse {
    #[serde(default)]
    items: Vec<TrademarkItem>,
}

#[derive(Debug, Deserialize)]
struct TrademarkItem {
    #[serde(rename = "markIdentification")]
    mark_identification: Option<String>,
    status: Option<String>,
    #[serde(rename = "serialNumber")]
    serial_number: Option<String>,
}

/// Searches the USPTO trademark register via RapidAPI. Requires a
/// RapidAPI key.
#[derive(Clone)]
pub struct TrademarkClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl TrademarkClient {
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_shared_client(Client::new(), api_key)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: TRADEMARK_API.to_string(),
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

    pub async fn search(&self, idea: &str) -> Result<TrademarkScan> {
        let Some(api_key) = &self.api_key else {
            anyhow::bail!("RapidAPI key not configured");
        };

        let keywords = idea
            .split_whitespace()
            .take(QUERY_MAX_WORDS)
            .collect::<Vec<_>>()
            .join(" ");

        let url = format!(
            "{}/v1/trademarkSearch/{}",
            self.base_url,
            urlencoding::encode(&keywords)
        );

        let response = self
            .client
            .get(&url)
            .header("X-RapidAPI-Key", api_key)
            .header("X-RapidAPI-Host", TRADEMARK_API_HOST)
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("Trademark search failed with status {}", response.status());
        }

        let body: TrademarkResponse = response.json().await?;

        let matches: Vec<TrademarkMatch> = body
            .items
            .into_iter()
            .take(MATCHES_LIMIT)
            .map(|item| TrademarkMatch {
                name: item.mark_identification.unwrap_or_default(),
                status: item.status.unwrap_or_default(),
                serial_number: item.serial_number.unwrap_or_default(),
            })
            .collect();

        Ok(TrademarkScan {
            found: !matches.is_empty(),
            matches,
        })
    }
}
