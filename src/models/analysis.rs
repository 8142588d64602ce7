use serde::{Deserialize, Serialize};

/// Market-competitiveness tier, strictly a function of the overall
/// score. The banding is canonical: AI-produced verdicts are
/// re-derived from the score when they disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    Taken,
    Crowded,
    Opportunity,
    #[serde(rename = "Wide Open")]
    WideOpen,
}

impl Verdict {
    /// Canonical score banding. Total over 0-100 and non-overlapping.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        if score <= 25 {
            Self::Taken
        } else if score <= 60 {
            Self::Crowded
        } else if score <= 85 {
            Self::Opportunity
        } else {
            Self::WideOpen
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Taken => "Taken",
            Self::Crowded => "Crowded",
            Self::Opportunity => "Opportunity",
            Self::WideOpen => "Wide Open",
        }
    }

    #[must_use]
    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Taken" => Some(Self::Taken),
            "Crowded" => Some(Self::Crowded),
            "Opportunity" => Some(Self::Opportunity),
            "Wide Open" => Some(Self::WideOpen),
            _ => None,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub name: String,
    pub url: String,
    pub description: String,
    /// Which source list the competitor came from.
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    /// 0-100; higher means more open market.
    pub overall_score: u8,
    pub verdict: Verdict,
    pub confidence_score: u8,
    pub top_competitors: Vec<Competitor>,
    pub key_risks: Vec<String>,
    pub niche_opportunities: Vec<String>,
    pub unique_angles: Vec<String>,
    pub market_gaps: String,
    pub recommendation: String,
    pub sentiment: String,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            overall_score: 50,
            verdict: Verdict::Crowded,
            confidence_score: 0,
            top_competitors: Vec::new(),
            key_risks: Vec::new(),
            niche_opportunities: Vec::new(),
            unique_angles: Vec::new(),
            market_gaps: String::new(),
            recommendation: String::new(),
            sentiment: "Neutral".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banding_is_total_and_non_overlapping() {
        for score in 0..=100u8 {
            let verdict = Verdict::from_score(score);
            let expected = if score <= 25 {
                Verdict::Taken
            } else if score <= 60 {
                Verdict::Crowded
            } else if score <= 85 {
                Verdict::Opportunity
            } else {
                Verdict::WideOpen
            };
            assert_eq!(verdict, expected, "score {score}");
        }
    }

    #[test]
    fn test_band_edges() {
        assert_eq!(Verdict::from_score(0), Verdict::Taken);
        assert_eq!(Verdict::from_score(25), Verdict::Taken);
        assert_eq!(Verdict::from_score(26), Verdict::Crowded);
        assert_eq!(Verdict::from_score(60), Verdict::Crowded);
        assert_eq!(Verdict::from_score(61), Verdict::Opportunity);
        assert_eq!(Verdict::from_score(85), Verdict::Opportunity);
        assert_eq!(Verdict::from_score(86), Verdict::WideOpen);
        assert_eq!(Verdict::from_score(100), Verdict::WideOpen);
    }

    #[test]
    fn test_verdict_ordering() {
        assert!(Verdict::WideOpen > Verdict::Opportunity);
        assert!(Verdict::Opportunity > Verdict::Crowded);
        assert!(Verdict::Crowded > Verdict::Taken);
    }

    #[test]
    fn test_verdict_serde_labels() {
        assert_eq!(
            serde_json::to_string(&Verdict::WideOpen).unwrap(),
            "\"Wide Open\""
        );
        assert_eq!(
            serde_json::from_str::<Verdict>("\"Taken\"").unwrap(),
            Verdict::Taken
        );
        assert_eq!(Verdict::parse_label(" Wide Open "), Some(Verdict::WideOpen));
        assert_eq!(Verdict::parse_label("wide open"), None);
    }
}
