use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::Repo;

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    items: Vec<RepoItem>,
}

#[derive(Debug, Deserialize)]
struct RepoItem {
    name: String,
    html_url: String,
    description: Option<String>,
    stargazers_count: u32,
    language: Option<String>,
}

/// Searches GitHub repositories. Works unauthenticated at a reduced
/// rate limit; a token raises the ceiling.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self::with_shared_client(Client::new(), token)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, token: Option<String>) -> Self {
        Self {
            client,
            base_url: GITHUB_API.to_string(),
            token,
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            token,
        }
    }

    pub async fn search_repositories(&self, idea: &str, limit: usize) -> Result<Vec<Repo>> {
        let url = format!(
            "{}/search/repositories?q={}&sort=stars&order=desc&per_page={}",
            self.base_url,
            urlencoding::encode(idea),
            limit
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json");

        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API error: {} - {}", status, body);
        }

        let body: SearchResponse = response.json().await?;

        Ok(body
            .items
            .into_iter()
            .map(|item| Repo {
                name: item.name,
                url: item.html_url,
                description: item
                    .description
                    .unwrap_or_else(|| "No description".to_string()),
                stars: item.stargazers_count,
                language: item.language.unwrap_or_else(|| "Unknown".to_string()),
            })
            .collect())
    }
}
