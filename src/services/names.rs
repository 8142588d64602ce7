use std::sync::Arc;

use tracing::debug;

use crate::clients::claude::ClaudeClient;

/// Derives brandable candidate names for an idea, preferring an AI
/// generation pass with a deterministic keyword fallback.
pub struct NameService {
    claude: Option<Arc<ClaudeClient>>,
    max_names: usize,
    max_tokens: u32,
}

impl NameService {
    #[must_use]
    pub const fn new(claude: Option<Arc<ClaudeClient>>, max_names: usize, max_tokens: u32) -> Self {
        Self {
            claude,
            max_names,
            max_tokens,
        }
    }

    pub async fn candidate_names(&self, idea: &str) -> Vec<String> {
        if let Some(claude) = &self.claude {
            match self.generate_names(claude, idea).await {
                Ok(names) if !names.is_empty() => return names,
                Ok(_) => debug!("Name generation returned nothing usable"),
                Err(e) => debug!("Name generation failed: {e}"),
            }
        }

        fallback_names(idea)
    }

    async fn generate_names(
        &self,
        claude: &ClaudeClient,
        idea: &str,
    ) -> anyhow::Result<Vec<String>> {
        let prompt = format!(
            "Generate {} creative, brandable domain names for this startup idea: \"{idea}\"\n\
             \n\
             Requirements:\n\
             - Short (5-12 characters ideal)\n\
             - Memorable and catchy\n\
             - Easy to spell and pronounce\n\
             - Reflects the core concept but NOT literal words\n\
             - Can use: portmanteaus, abbreviations, made-up words, puns, metaphors\n\
             \n\
             Return ONLY the names, one per line, no explanations or extra text.",
            self.max_names
        );

        let text = claude.complete(None, &prompt, self.max_tokens).await?;

        let names: Vec<String> = text
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty() && line.chars().all(|c| c.is_ascii_lowercase()))
            .take(self.max_names)
            .collect();

        Ok(names)
    }
}

/// Keyword-combination fallback used when the model call fails: takes
/// the longer words of the idea and builds simple variants.
#[must_use]
pub fn fallback_names(idea: &str) -> Vec<String> {
    let cleaned: String = idea
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    let words: Vec<&str> = cleaned
        .split_whitespace()
        .filter(|w| w.len() > 3)
        .take(3)
        .collect();

    if words.is_empty() {
        return vec![
            "myapp".to_string(),
            "getapp".to_string(),
            "useapp".to_string(),
        ];
    }

    let base = words[0];
    let mut names = vec![
        base.to_string(),
        format!("{base}app"),
        format!("{base}hq"),
        format!("get{base}"),
        format!("{base}io"),
    ];
    if words.len() > 1 {
        names.push(words[..2].join(""));
    }
    names.truncate(6);
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_names_from_keywords() {
        let names = fallback_names("habit tracker app");
        assert_eq!(names[0], "habit");
        assert!(names.contains(&"habitapp".to_string()));
        assert!(names.contains(&"gethabit".to_string()));
        assert!(names.contains(&"habittracker".to_string()));
        assert!(names.len() <= 6);
    }

    #[test]
    fn test_fallback_names_strips_punctuation() {
        let names = fallback_names("AI-powered meal planner!");
        assert!(names.iter().all(|n| n.chars().all(char::is_alphanumeric)));
    }

    #[test]
    fn test_fallback_names_short_words_only() {
        // Every word is <= 3 chars, so the canned defaults apply.
        let names = fallback_names("a to do app");
        assert_eq!(names, vec!["myapp", "getapp", "useapp"]);
    }

    #[tokio::test]
    async fn test_candidate_names_without_model_uses_fallback() {
        let service = NameService::new(None, 8, 512);
        let names = service.candidate_names("habit tracker").await;
        assert_eq!(names[0], "habit");
    }
}
