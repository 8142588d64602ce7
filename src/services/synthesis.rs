use std::sync::Arc;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::clients::claude::ClaudeClient;
use crate::models::analysis::{Analysis, Competitor, Verdict};
use crate::models::sources::AggregateSources;

/// Per-source excerpt caps keep the prompt bounded regardless of how
/// much the adapters returned.
const PROMPT_APPS: usize = 5;
const PROMPT_WEB: usize = 5;
const PROMPT_DISCUSSIONS: usize = 3;
const PROMPT_NEWS: usize = 3;

/// Scores above this read as a clear opening in the heuristic
/// recommendation text.
const GREAT_OPPORTUNITY_THRESHOLD: u8 = 60;

const HEURISTIC_CONFIDENCE: u8 = 70;
const DEFAULT_AI_CONFIDENCE: u8 = 85;

const SYSTEM_PROMPT: &str = "You are a world-class startup investor and market analyst. \
You respond with a single JSON object and nothing else: no prose, no code fences, \
no explanations outside the JSON.";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawAnalysis {
    score: i64,
    verdict: String,
    confidence_score: i64,
    competitors: Vec<RawCompetitor>,
    key_risks: Vec<String>,
    niche_opportunities: Vec<String>,
    unique_angles: Vec<String>,
    market_gaps: String,
    recommendation: String,
    sentiment: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCompetitor {
    name: String,
    url: String,
    description: String,
    source: String,
}

/// Produces an [`Analysis`] for an idea from its aggregated sources.
///
/// The model path is best-effort: any transport error or unparseable
/// reply falls back to the deterministic heuristic, so callers always
/// receive a complete analysis.
pub struct SynthesisService {
    claude: Option<Arc<ClaudeClient>>,
    max_tokens: u32,
}

impl SynthesisService {
    #[must_use]
    pub const fn new(claude: Option<Arc<ClaudeClient>>, max_tokens: u32) -> Self {
        Self { claude, max_tokens }
    }

    pub async fn synthesize(&self, idea: &str, sources: &AggregateSources) -> Analysis {
        let prompt = build_prompt(idea, sources);
        self.run(prompt, sources).await
    }

    /// Re-runs synthesis with the user's objection and the previous
    /// analysis folded into the prompt context.
    pub async fn challenge(
        &self,
        idea: &str,
        sources: &AggregateSources,
        previous: &Analysis,
        user_challenge: &str,
    ) -> Analysis {
        let prompt = build_challenge_prompt(idea, sources, previous, user_challenge);
        self.run(prompt, sources).await
    }

    async fn run(&self, prompt: String, sources: &AggregateSources) -> Analysis {
        if let Some(claude) = &self.claude {
            match claude
                .complete(Some(SYSTEM_PROMPT), &prompt, self.max_tokens)
                .await
            {
                Ok(text) => match parse_analysis(&text) {
                    Ok(raw) => return validate_analysis(raw),
                    Err(e) => warn!("AI reply was not parseable, using heuristic: {e}"),
                },
                Err(e) => warn!("AI synthesis failed, using heuristic: {e}"),
            }
        } else {
            debug!("AI synthesis disabled, using heuristic");
        }

        heuristic_analysis(sources)
    }
}

fn build_prompt(idea: &str, sources: &AggregateSources) -> String {
    let app_lines = join_or_none(
        sources
            .app_store
            .iter()
            .take(PROMPT_APPS)
            .map(|a| format!("- {}: {}% match", a.name, a.similarity)),
    );
    let web_lines = join_or_none(
        sources
            .web
            .iter()
            .take(PROMPT_WEB)
            .map(|w| format!("- {}: {}", w.title, w.snippet)),
    );
    let reddit_lines = join_or_none(
        sources
            .reddit
            .iter()
            .take(PROMPT_DISCUSSIONS)
            .map(|d| format!("- r/{}: {}", d.subreddit, d.title)),
    );
    let news_lines = join_or_none(
        sources
            .hacker_news
            .iter()
            .take(PROMPT_NEWS)
            .map(|s| format!("- {} ({} comments)", s.title, s.comments)),
    );
    let trademark_line = if sources.trademark.found {
        format!("{} matches", sources.trademark.matches.len())
    } else {
        "None found".to_string()
    };
    let available_domains = sources.domains.iter().filter(|d| d.available).count();

    format!(
        "Validate this startup idea: \"{idea}\"\n\
         \n\
         CRITICAL INSTRUCTION:\n\
         Do NOT penalize the score just because the broad category exists. \
         Distinguish between the GENERAL CATEGORY and the SPECIFIC NOVELTY of the idea. \
         If no one is doing EXACTLY what is proposed, it is an \"Opportunity\" or \
         \"Wide Open\" even in a popular field.\n\
         \n\
         RAW DATA GATHERED:\n\
         - Web search results:\n{web_lines}\n\
         - App Store competitors:\n{app_lines}\n\
         - Reddit discussions:\n{reddit_lines}\n\
         - Hacker News mentions:\n{news_lines}\n\
         - GitHub projects: {} repos found\n\
         - Trends: interest level {}/100 and it is {:?}\n\
         - Trademarks: {trademark_line}\n\
         - Candidate domains still unregistered: {available_domains}\n\
         \n\
         EVALUATION CRITERIA:\n\
         1. SPECIFICITY: are competitors doing EXACTLY this, or something in the same family?\n\
         2. MARKET GAPS: what is the delta between existing solutions and this proposal?\n\
         \n\
         Be brutally accurate. Zero direct competitors should score 85+.\n\
         \n\
         Return ONLY JSON with this shape:\n\
         {{\n\
           \"score\": 0-100,\n\
           \"verdict\": \"Wide Open|Opportunity|Crowded|Taken\",\n\
           \"nicheOpportunities\": [\"3 very specific underserved segments\"],\n\
           \"uniqueAngles\": [\"2 specific product features to beat incumbents\"],\n\
           \"keyRisks\": [\"up to 3 concrete risks\"],\n\
           \"marketGaps\": \"how this specific idea fills a gap incumbents missed\",\n\
           \"competitors\": [{{\"name\": \"\", \"description\": \"\", \"url\": \"\", \"source\": \"Web|App Store|Product Hunt|GitHub\"}}],\n\
           \"recommendation\": \"3 sentences explaining WHY it is novel or WHY it is crowded\",\n\
           \"confidenceScore\": 0-100,\n\
           \"sentiment\": \"Positive|Neutral|Critical\"\n\
         }}",
        sources.github.len(),
        sources.trends.interest,
        sources.trends.direction,
    )
}

fn build_challenge_prompt(
    idea: &str,
    sources: &AggregateSources,
    previous: &Analysis,
    user_challenge: &str,
) -> String {
    let previous_json =
        serde_json::to_string(previous).unwrap_or_else(|_| "(unavailable)".to_string());
    let base = build_prompt(idea, sources);

    format!(
        "{base}\n\
         \n\
         PREVIOUS ANALYSIS:\n{previous_json}\n\
         \n\
         The founder challenges that analysis:\n\"{user_challenge}\"\n\
         \n\
         Reassess honestly. Concede points the challenge gets right, hold firm where the \
         data supports the original verdict, and return a revised JSON object in the same shape."
    )
}

fn join_or_none(lines: impl Iterator<Item = String>) -> String {
    let joined: Vec<String> = lines.collect();
    if joined.is_empty() {
        "None".to_string()
    } else {
        joined.join("\n")
    }
}

/// Pulls a JSON object out of a model reply. Tries the whole text
/// first, then a fenced code block, then the outermost brace pair.
fn parse_analysis(text: &str) -> anyhow::Result<RawAnalysis> {
    let trimmed = text.trim();

    if let Ok(raw) = serde_json::from_str::<RawAnalysis>(trimmed) {
        return Ok(raw);
    }

    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    let fence = FENCE
        .get_or_init(|| Regex::new(r"```(?:json)?\s*([\s\S]*?)```").ok())
        .as_ref();

    if let Some(re) = fence
        && let Some(captures) = re.captures(trimmed)
        && let Some(block) = captures.get(1)
        && let Ok(raw) = serde_json::from_str::<RawAnalysis>(block.as_str().trim())
    {
        return Ok(raw);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(raw) = serde_json::from_str::<RawAnalysis>(&trimmed[start..=end])
    {
        return Ok(raw);
    }

    anyhow::bail!("no JSON payload found in model reply")
}

/// Clamps the raw model output into a well-formed [`Analysis`]. The
/// verdict is always re-derived from the score; a disagreeing label
/// from the model is logged rather than trusted.
fn validate_analysis(raw: RawAnalysis) -> Analysis {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let score = raw.score.clamp(0, 100) as u8;
    let banded = Verdict::from_score(score);

    match Verdict::parse_label(&raw.verdict) {
        Some(label) if label != banded => {
            warn!(
                "AI verdict '{}' inconsistent with score {} (banded: {}), using banded verdict",
                raw.verdict, score, banded
            );
        }
        None if !raw.verdict.trim().is_empty() => {
            warn!("AI verdict '{}' is not a known tier, using banded verdict", raw.verdict);
        }
        _ => {}
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let confidence_score = if raw.confidence_score == 0 {
        DEFAULT_AI_CONFIDENCE
    } else {
        raw.confidence_score.clamp(0, 100) as u8
    };

    let sentiment = if raw.sentiment.trim().is_empty() {
        "Neutral".to_string()
    } else {
        raw.sentiment
    };

    Analysis {
        overall_score: score,
        verdict: banded,
        confidence_score,
        top_competitors: raw
            .competitors
            .into_iter()
            .map(|c| Competitor {
                name: c.name,
                url: c.url,
                description: c.description,
                source: c.source,
            })
            .collect(),
        key_risks: raw.key_risks,
        niche_opportunities: raw.niche_opportunities,
        unique_angles: raw.unique_angles,
        market_gaps: raw.market_gaps,
        recommendation: raw.recommendation,
        sentiment,
    }
}

/// Deterministic scorer used when the model is unavailable or its
/// output is unusable: each direct competitor found across the app
/// store, launch posts, and repos costs ten points.
#[must_use]
pub fn heuristic_analysis(sources: &AggregateSources) -> Analysis {
    let competitor_count =
        sources.app_store.len() + sources.product_hunt.len() + sources.github.len();

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    let score = (100i64 - competitor_count as i64 * 10).max(0) as u8;
    let verdict = Verdict::from_score(score);

    let mut top_competitors: Vec<Competitor> = Vec::new();
    for app in sources.app_store.iter().take(3) {
        top_competitors.push(Competitor {
            name: app.name.clone(),
            url: app.url.clone(),
            description: format!("Rated {:.1} with {} reviews", app.rating, app.review_count),
            source: "App Store".to_string(),
        });
    }
    for post in sources.product_hunt.iter().take(3) {
        top_competitors.push(Competitor {
            name: post.name.clone(),
            url: post.url.clone(),
            description: post.tagline.clone(),
            source: "Product Hunt".to_string(),
        });
    }
    for repo in sources.github.iter().take(3) {
        top_competitors.push(Competitor {
            name: repo.name.clone(),
            url: repo.url.clone(),
            description: repo.description.clone(),
            source: "GitHub".to_string(),
        });
    }
    top_competitors.truncate(3);

    let opener = if score > GREAT_OPPORTUNITY_THRESHOLD {
        "Great opportunity! "
    } else {
        "Market is competitive but not impossible. "
    };

    Analysis {
        overall_score: score,
        verdict,
        confidence_score: HEURISTIC_CONFIDENCE,
        top_competitors,
        key_risks: Vec::new(),
        niche_opportunities: vec![
            "Target a specific industry vertical (e.g. healthcare, education)".to_string(),
            "Focus on an underserved demographic (e.g. seniors, students)".to_string(),
            "Specialize in a unique use case or workflow".to_string(),
        ],
        unique_angles: vec![
            "AI-powered automation to reduce manual work".to_string(),
            "Superior UX with focus on simplicity".to_string(),
        ],
        market_gaps: "Existing solutions may lack personalization, modern UX, or affordable \
                      pricing. Consider what pain points remain unsolved."
            .to_string(),
        recommendation: format!(
            "{opener}Find your niche by targeting a specific segment, offering unique \
             features, or building a better user experience than existing solutions."
        ),
        sentiment: "Neutral".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sources::{AppListing, LaunchPost, Repo};

    fn listing(name: &str) -> AppListing {
        AppListing {
            name: name.to_string(),
            url: String::new(),
            rating: 4.0,
            review_count: 10,
            similarity: 50,
        }
    }

    #[test]
    fn test_parse_bare_json() {
        let raw = parse_analysis(r#"{"score": 70, "verdict": "Opportunity"}"#).unwrap();
        assert_eq!(raw.score, 70);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here is my analysis:\n```json\n{\"score\": 42, \"verdict\": \"Crowded\"}\n```\nHope that helps!";
        let raw = parse_analysis(reply).unwrap();
        assert_eq!(raw.score, 42);
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let reply = "Sure. {\"score\": 90, \"verdict\": \"Wide Open\"} — good luck!";
        let raw = parse_analysis(reply).unwrap();
        assert_eq!(raw.score, 90);
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_analysis("I could not produce an analysis.").is_err());
    }

    #[test]
    fn test_validate_rebands_inconsistent_verdict() {
        let raw = RawAnalysis {
            score: 95,
            verdict: "Taken".to_string(),
            ..Default::default()
        };
        let analysis = validate_analysis(raw);
        assert_eq!(analysis.overall_score, 95);
        assert_eq!(analysis.verdict, Verdict::WideOpen);
    }

    #[test]
    fn test_validate_clamps_out_of_range_score() {
        let raw = RawAnalysis {
            score: 250,
            ..Default::default()
        };
        let analysis = validate_analysis(raw);
        assert_eq!(analysis.overall_score, 100);
        assert_eq!(analysis.verdict, Verdict::WideOpen);
    }

    #[test]
    fn test_heuristic_empty_sources_is_wide_open() {
        let analysis = heuristic_analysis(&AggregateSources::default());
        assert_eq!(analysis.overall_score, 100);
        assert_eq!(analysis.verdict, Verdict::WideOpen);
        assert!(analysis.top_competitors.is_empty());
        assert!(analysis.recommendation.starts_with("Great opportunity!"));
    }

    #[test]
    fn test_heuristic_eleven_competitors_is_taken() {
        let sources = AggregateSources {
            app_store: (0..6).map(|i| listing(&format!("app{i}"))).collect(),
            product_hunt: (0..2)
                .map(|i| LaunchPost {
                    name: format!("post{i}"),
                    url: String::new(),
                    tagline: String::new(),
                    upvotes: 0,
                    launch_date: String::new(),
                })
                .collect(),
            github: (0..3)
                .map(|i| Repo {
                    name: format!("repo{i}"),
                    url: String::new(),
                    description: String::new(),
                    stars: 0,
                    language: String::new(),
                })
                .collect(),
            ..Default::default()
        };

        let analysis = heuristic_analysis(&sources);
        assert_eq!(analysis.overall_score, 0);
        assert_eq!(analysis.verdict, Verdict::Taken);
        assert_eq!(analysis.top_competitors.len(), 3);
    }

    #[test]
    fn test_heuristic_verdict_always_matches_banding() {
        for count in 0..=12usize {
            let sources = AggregateSources {
                app_store: (0..count).map(|i| listing(&format!("app{i}"))).collect(),
                ..Default::default()
            };
            let analysis = heuristic_analysis(&sources);
            assert_eq!(analysis.verdict, Verdict::from_score(analysis.overall_score));
        }
    }

    #[tokio::test]
    async fn test_synthesize_without_model_uses_heuristic() {
        let service = SynthesisService::new(None, 2000);
        let analysis = service
            .synthesize("ai meal planner", &AggregateSources::default())
            .await;
        assert_eq!(analysis.overall_score, 100);
        assert_eq!(analysis.verdict, Verdict::WideOpen);
    }
}
