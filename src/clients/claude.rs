use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const ANTHROPIC_API: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

/// Text completion against the Anthropic Messages API.
#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl ClaudeClient {
    #[must_use]
    pub fn new(api_key: Option<String>, model: &str) -> Self {
        Self::with_shared_client(Client::new(), api_key, model)
    }

    #[must_use]
    pub fn with_shared_client(client: Client, api_key: Option<String>, model: &str) -> Self {
        Self {
            client,
            base_url: ANTHROPIC_API.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(
        client: Client,
        base_url: &str,
        api_key: Option<String>,
        model: &str,
    ) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            api_key,
            model: model.to_string(),
        }
    }

    /// Sends a single-turn prompt and returns the concatenated text
    /// blocks of the reply.
    pub async fn complete(
        &self,
        system: Option<&str>,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String> {
        let Some(api_key) = &self.api_key else {
            anyhow::bail!("Anthropic API key not configured");
        };

        let request_body = MessagesRequest {
            model: &self.model,
            max_tokens,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Anthropic API error: {} - {}", status, body);
        }

        let body: MessagesResponse = response.json().await?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.is_empty() {
            anyhow::bail!("Anthropic response contained no text content");
        }

        Ok(text)
    }
}
