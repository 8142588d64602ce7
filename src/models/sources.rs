use serde::{Deserialize, Serialize};

/// Identifies which adapter produced a result. Used for competitor
/// tagging and for reporting which adapters fell back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceKind {
    Domain,
    AppStore,
    ProductHunt,
    Reddit,
    GitHub,
    Web,
    HackerNews,
    Trends,
    Trademark,
}

impl SourceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Domain => "Domains",
            Self::AppStore => "App Store",
            Self::ProductHunt => "Product Hunt",
            Self::Reddit => "Reddit",
            Self::GitHub => "GitHub",
            Self::Web => "Web",
            Self::HackerNews => "Hacker News",
            Self::Trends => "Trends",
            Self::Trademark => "Trademark",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCheck {
    pub domain: String,
    pub available: bool,
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppListing {
    pub name: String,
    pub url: String,
    pub rating: f32,
    pub review_count: u32,
    /// Token-overlap similarity against the idea text, 0-100.
    pub similarity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchPost {
    pub name: String,
    pub url: String,
    pub tagline: String,
    pub upvotes: u32,
    pub launch_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discussion {
    pub title: String,
    pub url: String,
    pub subreddit: String,
    pub upvotes: i64,
    pub comments: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub name: String,
    pub url: String,
    pub description: String,
    pub stars: u32,
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPage {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStory {
    pub title: String,
    pub url: String,
    pub points: u32,
    pub comments: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Stable,
    Declining,
}

impl TrendDirection {
    /// Three-way label from a 0-100 interest level.
    #[must_use]
    pub const fn from_interest(interest: u8) -> Self {
        if interest > 60 {
            Self::Rising
        } else if interest > 40 {
            Self::Stable
        } else {
            Self::Declining
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendSnapshot {
    pub keyword: String,
    /// Interest level, 0-100.
    pub interest: u8,
    #[serde(rename = "trend")]
    pub direction: TrendDirection,
}

impl TrendSnapshot {
    /// Neutral value used when the trends adapter fails.
    #[must_use]
    pub fn neutral(keyword: &str) -> Self {
        Self {
            keyword: keyword.to_string(),
            interest: 50,
            direction: TrendDirection::Stable,
        }
    }
}

impl Default for TrendSnapshot {
    fn default() -> Self {
        Self::neutral("")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrademarkMatch {
    pub name: String,
    pub status: String,
    pub serial_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrademarkScan {
    pub found: bool,
    pub matches: Vec<TrademarkMatch>,
}

/// Results from every adapter, keyed by source kind. Every field is
/// always present: adapters that fail contribute their empty or
/// neutral default, never a missing key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AggregateSources {
    pub domains: Vec<DomainCheck>,
    pub app_store: Vec<AppListing>,
    pub product_hunt: Vec<LaunchPost>,
    pub reddit: Vec<Discussion>,
    pub github: Vec<Repo>,
    pub web: Vec<WebPage>,
    pub hacker_news: Vec<NewsStory>,
    pub trends: TrendSnapshot,
    pub trademark: TrademarkScan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_direction_thresholds() {
        assert_eq!(TrendDirection::from_interest(100), TrendDirection::Rising);
        assert_eq!(TrendDirection::from_interest(61), TrendDirection::Rising);
        assert_eq!(TrendDirection::from_interest(60), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_interest(41), TrendDirection::Stable);
        assert_eq!(TrendDirection::from_interest(40), TrendDirection::Declining);
        assert_eq!(TrendDirection::from_interest(0), TrendDirection::Declining);
    }

    #[test]
    fn test_aggregate_default_has_every_key() {
        let sources = AggregateSources::default();
        let json = serde_json::to_value(&sources).unwrap();
        for key in [
            "domains",
            "appStore",
            "productHunt",
            "reddit",
            "github",
            "web",
            "hackerNews",
            "trends",
            "trademark",
        ] {
            assert!(json.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(json["trends"]["interest"], 50);
        assert_eq!(json["trends"]["trend"], "stable");
        assert_eq!(json["trademark"]["found"], false);
    }
}
