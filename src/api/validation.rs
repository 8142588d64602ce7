use super::ApiError;

pub const IDEA_MIN_CHARS: usize = 3;
pub const IDEA_MAX_CHARS: usize = 500;

pub fn validate_idea_text(idea: &str) -> Result<&str, ApiError> {
    let length = idea.chars().count();

    if length < IDEA_MIN_CHARS {
        return Err(ApiError::validation(format!(
            "Idea must be at least {IDEA_MIN_CHARS} characters long"
        )));
    }

    if length > IDEA_MAX_CHARS {
        return Err(ApiError::validation(format!(
            "Idea must be less than {IDEA_MAX_CHARS} characters"
        )));
    }

    Ok(idea)
}

pub fn validate_challenge_text(challenge: &str) -> Result<&str, ApiError> {
    let trimmed = challenge.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Challenge text is required"));
    }
    Ok(trimmed)
}

/// Network identity for rate limiting: the first hop of the forwarded
/// address header, or the "unknown" bucket when absent.
#[must_use]
pub fn network_identity(headers: &axum::http::HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| "unknown".to_string(), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_idea_text_bounds() {
        assert!(validate_idea_text("ab").is_err());
        assert!(validate_idea_text("abc").is_ok());
        assert!(validate_idea_text(&"a".repeat(500)).is_ok());
        assert!(validate_idea_text(&"a".repeat(501)).is_err());
    }

    #[test]
    fn test_validate_idea_text_counts_chars_not_bytes() {
        // Three multibyte characters are still three characters.
        assert!(validate_idea_text("日本語").is_ok());
    }

    #[test]
    fn test_validate_challenge_text() {
        assert!(validate_challenge_text("but my idea is different").is_ok());
        assert!(validate_challenge_text("   ").is_err());
        assert!(validate_challenge_text("").is_err());
    }

    #[test]
    fn test_network_identity_takes_first_hop() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("x-forwarded-for", "1.2.3.4, 10.0.0.1".parse().unwrap());
        assert_eq!(network_identity(&headers), "1.2.3.4");
    }

    #[test]
    fn test_network_identity_defaults_to_unknown() {
        let headers = axum::http::HeaderMap::new();
        assert_eq!(network_identity(&headers), "unknown");
    }
}
