use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::sources::LaunchPost;

const PRODUCT_HUNT_API: &str = "https://api.producthunt.com/v2/api/graphql";

#[derive(Serialize)]
struct GraphQLRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Serialize)]
struct Variables<'a> {
    search: &'a str,
    first: i32,
}

#[derive(Deserialize)]
struct GraphQLResponse {
    data: Option<Data>,
}

#[derive(Deserialize)]
struct Data {
    posts: Posts,
}

#[derive(Deserialize)]
struct Posts {
    edges: Vec<Edge>,
}

#[derive(Deserialize)]
struct Edge {
    node: PostNode,
}

#[derive(Deserialize)]
struct PostNode {
    name: String,
    tagline: Option<String>,
    #[serde(rename = "votesCount")]
    votes_count: u32,
    #[serde(rename = "createdAt")]
    created_at: Option<String>,
    url: Option<String>,
}

/// Searches Product Hunt launches via its GraphQL API. Requires an
/// OAuth token.
#[derive(Clone)]
pub struct ProductHuntClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ProductHuntClient {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self::with_shared_client(Client::new(), token)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, token: Option<String>) -> Self {
        Self {
            client,
            base_url: PRODUCT_HUNT_API.to_string(),
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

    pub async fn search(&self, idea: &str, limit: i32) -> Result<Vec<LaunchPost>> {
        let Some(token) = &self.token else {
            anyhow::bail!("Product Hunt token not configured");
        };

        let gql_query = r"
            query ($search: String, $first: Int) {
                posts(first: $first, order: VOTES, topic: $search) {
                    edges {
                        node {
                            name
                            tagline
                            votesCount
                            createdAt
                            url
                        }
                    }
                }
            }
        ";

        let request_body = GraphQLRequest {
            query: gql_query,
            variables: Variables {
                search: idea,
                first: limit,
            },
        };

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(token)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Product Hunt API error: {} - {}", status, body);
        }

        let body: GraphQLResponse = response.json().await?;

        let posts = body
            .data
            .ok_or_else(|| anyhow::anyhow!("Product Hunt response missing data"))?
            .posts;

        Ok(posts
            .edges
            .into_iter()
            .map(|edge| LaunchPost {
                name: edge.node.name,
                url: edge.node.url.unwrap_or_default(),
                tagline: edge.node.tagline.unwrap_or_default(),
                upvotes: edge.node.votes_count,
                launch_date: edge
                    .node
                    .created_at
                    .as_deref()
                    .and_then(|d| d.split('T').next())
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }
}
