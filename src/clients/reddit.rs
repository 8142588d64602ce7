use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::Discussion;

const REDDIT_API: &str = "https://www.reddit.com";

#[derive(Debug, Deserialize)]
struct RedditResponse {
    data: RedditListing,
}

#[derive(Debug, Deserialize)]
struct RedditListing {
    children: Vec<RedditChild>,
}

#[derive(Debug, Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    title: String,
    permalink: String,
    subreddit: String,
    ups: i64,
    num_comments: u32,
}

/// Searches Reddit posts. No authentication required for search.
#[derive(Clone)]
pub struct RedditClient {
    client: Client,
    base_url: String,
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RedditClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: REDDIT_API.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn search(&self, idea: &str, limit: usize) -> Result<Vec<Discussion>> {
        let url = format!(
            "{}/search.json?q={}&limit={}&sort=relevance",
            self.base_url,
            urlencoding::encode(idea),
            limit
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("Reddit search failed with status {}", response.status());
        }

        let body: RedditResponse = response.json().await?;

        Ok(body
            .data
            .children
            .into_iter()
            .map(|child| Discussion {
                url: format!("https://reddit.com{}", child.data.permalink),
                title: child.data.title,
                subreddit: child.data.subreddit,
                upvotes: child.data.ups,
                comments: child.data.num_comments,
            })
            .collect())
    }
}
