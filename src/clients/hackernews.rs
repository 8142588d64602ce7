use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::NewsStory;

const HN_SEARCH_API: &str = "https://hn.algolia.com";

#[derive(Debug, Deserialize)]
struct HnResponse {
    hits: Vec<HnHit>,
}

#[derive(Debug, Deserialize)]
struct HnHit {
    title: Option<String>,
    url: Option<String>,
    points: Option<u32>,
    num_comments: Option<u32>,
    created_at: Option<String>,
    #[serde(rename = "objectID")]
    object_id: String,
}

/// Searches Hacker News stories via the Algolia API. No key required.
#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
    base_url: String,
}

impl Default for HackerNewsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HackerNewsClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: HN_SEARCH_API.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn search_stories(&self, idea: &str, limit: usize) -> Result<Vec<NewsStory>> {
        let url = format!(
            "{}/api/v1/search?query={}&tags=story&hitsPerPage={}",
            self.base_url,
            urlencoding::encode(idea),
            limit
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Hacker News search failed with status {}", response.status());
        }

        let body: HnResponse = response.json().await?;

        Ok(body
            .hits
            .into_iter()
            .map(|hit| NewsStory {
                url: hit.url.unwrap_or_else(|| {
                    format!("https://news.ycombinator.com/item?id={}", hit.object_id)
                }),
                title: hit.title.unwrap_or_default(),
                points: hit.points.unwrap_or(0),
                comments: hit.num_comments.unwrap_or(0),
                created_at: hit.created_at.unwrap_or_default(),
            })
            .collect())
    }
}
