use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub sources: SourcesConfig,

    pub ai: AiConfig,

    pub limits: LimitsConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_path: String,

    pub log_level: String,

    #[serde(default)]
    pub suppress_connection_errors: bool,

    /// Event bus buffer size (default: 100)
    pub event_bus_buffer_size: usize,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_path: "sqlite:data/vettr.db".to_string(),
            log_level: "info".to_string(),
            suppress_connection_errors: false,
            event_bus_buffer_size: 100,
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 6780,
            cors_allowed_origins: vec![
                "http://localhost:6780".to_string(),
                "http://127.0.0.1:6780".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Per-request timeout applied to the shared HTTP client. This is
    /// also the effective deadline for each adapter call.
    pub request_timeout_seconds: u64,

    /// Result cap requested from each list-shaped source.
    pub results_per_source: usize,

    /// Extension checked for candidate domain names.
    pub domain_extension: String,

    /// How many candidate names to derive per idea.
    pub max_candidate_names: usize,

    /// Tokens resolve from the environment first, then from here.
    pub github_token: Option<String>,

    pub product_hunt_token: Option<String>,

    pub serp_api_key: Option<String>,

    pub rapid_api_key: Option<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 20,
            results_per_source: 10,
            domain_extension: ".com".to_string(),
            max_candidate_names: 8,
            github_token: None,
            product_hunt_token: None,
            serp_api_key: None,
            rapid_api_key: None,
        }
    }
}

impl SourcesConfig {
    #[must_use]
    pub fn github_token(&self) -> Option<String> {
        resolve_secret("GITHUB_TOKEN", self.github_token.as_deref())
    }

    #[must_use]
    pub fn product_hunt_token(&self) -> Option<String> {
        resolve_secret("PRODUCT_HUNT_TOKEN", self.product_hunt_token.as_deref())
    }

    #[must_use]
    pub fn serp_api_key(&self) -> Option<String> {
        resolve_secret("SERP_API_KEY", self.serp_api_key.as_deref())
    }

    #[must_use]
    pub fn rapid_api_key(&self) -> Option<String> {
        resolve_secret("RAPID_API_KEY", self.rapid_api_key.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// When disabled, every synthesis request uses the deterministic
    /// heuristic and no model calls are made.
    pub enabled: bool,

    pub api_key: Option<String>,

    pub model: String,

    pub max_tokens: u32,

    /// Token budget for the short candidate-name generation call.
    pub name_max_tokens: u32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: "claude-3-5-haiku-latest".to_string(),
            max_tokens: 2000,
            name_max_tokens: 512,
        }
    }
}

impl AiConfig {
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        resolve_secret("ANTHROPIC_API_KEY", self.api_key.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Anonymous fixed-window length in seconds.
    pub anon_window_seconds: u64,

    /// Requests allowed per identity per window.
    pub anon_ceiling: u32,

    /// Daily searches for free-tier users. Paid tier is unlimited.
    pub free_tier_daily: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            anon_window_seconds: 60,
            anon_ceiling: 10,
            free_tier_daily: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
        }
    }
}

fn resolve_secret(env_var: &str, configured: Option<&str>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| configured.map(String::from))
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("vettr").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".vettr").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.limits.anon_window_seconds == 0 {
            anyhow::bail!("Anonymous rate-limit window must be > 0 seconds");
        }

        if self.sources.request_timeout_seconds == 0 {
            anyhow::bail!("Source request timeout must be > 0 seconds");
        }

        if !self.sources.domain_extension.starts_with('.') {
            anyhow::bail!("Domain extension must start with '.'");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let mut config = Config::default();
        config.limits.anon_window_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bare_extension() {
        let mut config = Config::default();
        config.sources.domain_extension = "com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[limits]\nanon_ceiling = 2\n").unwrap();
        assert_eq!(config.limits.anon_ceiling, 2);
        assert_eq!(config.limits.anon_window_seconds, 60);
        assert_eq!(config.sources.results_per_source, 10);
    }
}
