use anyhow::Result;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::models::sources::DomainCheck;

const DNS_API: &str = "https://dns.google/resolve";

/// DNS RCODE for NXDOMAIN: the name does not resolve, so the domain
/// is most likely unregistered.
const RCODE_NXDOMAIN: u32 = 3;

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Status")]
    status: u32,
}

/// Checks domain availability through DNS-over-HTTPS.
///
/// NXDOMAIN is the only signal trusted to mean "unregistered". A
/// resolving name, an ambiguous response, or any probe error reports
/// the domain as unavailable, so a transient fault never advertises a
/// domain as free.
#[derive(Clone)]
pub struct DnsClient {
    client: Client,
    base_url: String,
}

impl Default for DnsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DnsClient {
    #[must_use]
    pub fn new() -> Self {
        Self::with_shared_client(Client::new())
    }

    #[must_use]
    pub fn with_shared_client(client: Client) -> Self {
        Self {
            client,
            base_url: DNS_API.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
        }
    }

    pub async fn is_available(&self, domain: &str) -> Result<bool> {
        let url = format!(
            "{}?name={}&type=A",
            self.base_url,
            urlencoding::encode(domain)
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("DNS lookup failed with status {}", response.status());
        }

        let body: DohResponse = response.json().await?;
        Ok(body.status == RCODE_NXDOMAIN)
    }

    /// Probes each candidate name under the given extension,
    /// concurrently. Per-name probe errors resolve to
    /// `available: false`.
    pub async fn check_candidates(&self, names: &[String], extension: &str) -> Vec<DomainCheck> {
        let probes = names.iter().map(|name| {
            let domain = format!("{name}{extension}");
            async move {
                let available = match self.is_available(&domain).await {
                    Ok(available) => available,
                    Err(e) => {
                        debug!("Domain probe failed for {domain}: {e}");
                        false
                    }
                };
                DomainCheck {
                    domain,
                    available,
                    extension: extension.to_string(),
                }
            }
        });

        futures::future::join_all(probes).await
    }
}
