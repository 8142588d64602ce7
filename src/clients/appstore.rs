use std::collections::HashSet;

use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;

use crate::models::sources::AppListing;

const ITUNES_API: &str = "https://itunes.apple.com";

#[derive(Debug, Deserialize)]
struct ItunesResponse {
    results: Vec<ItunesApp>,
}

#[derive(Debug, Deserialize)]
struct ItunesApp {
    #[serde(rename = "trackName")]
    track_name: String,
    #[serde(rename = "trackViewUrl")]
    track_view_url: Option<String>,
    #[serde(rename = "averageUserRating")]
    average_user_rating: Option<f32>,
    #[serde(rename = "userRatingCount")]
    user_rating_count: Option<u32>,
    description: Option<String>,
}

/// Searches the iTunes/App Store catalogue. No API key required.
#[derive(Clone)]
pub struct AppStoreClient {
    client: Client,
    base_url: String,
}

impl Default for AppStoreClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStoreClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: ITUNES_API.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn search(&self, idea: &str, limit: usize) -> Result<Vec<AppListing>> {
        let url = format!(
            "{}/search?term={}&entity=software&limit={}",
            self.base_url,
            urlencoding::encode(idea),
            limit
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("App Store search failed with status {}", response.status());
        }

        let body: ItunesResponse = response.json().await?;

        Ok(body
            .results
            .into_iter()
            .map(|app| {
                let haystack = format!(
                    "{} {}",
                    app.track_name,
                    app.description.as_deref().unwrap_or_default()
                );
                AppListing {
                    similarity: similarity_score(idea, &haystack),
                    name: app.track_name,
                    url: app.track_view_url.unwrap_or_default(),
                    rating: app.average_user_rating.unwrap_or(0.0),
                    review_count: app.user_rating_count.unwrap_or(0),
                }
            })
            .collect())
    }
}

/// Token-overlap similarity between two texts: shared lowercase
/// whitespace tokens divided by the larger token-set size, scaled to
/// 0-100.
#[must_use]
pub fn similarity_score(a: &str, b: &str) -> u8 {
    let tokens_a: HashSet<String> = a.to_lowercase().split_whitespace().map(String::from).collect();
    let tokens_b: HashSet<String> = b.to_lowercase().split_whitespace().map(String::from).collect();

    let larger = tokens_a.len().max(tokens_b.len());
    if larger == 0 {
        return 0;
    }

    let overlap = tokens_a.intersection(&tokens_b).count();

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let scaled = ((overlap as f64 / larger as f64) * 100.0).round() as u8;
    scaled.min(100)
}
