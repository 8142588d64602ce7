use sha2::{Digest, Sha256};

/// A validated idea submission, carrying the canonical form used for
/// cache lookups.
///
/// Two submissions that differ only in casing or surrounding
/// whitespace share the same canonical form, and therefore the same
/// fingerprint.
#[derive(Debug, Clone)]
pub struct IdeaQuery {
    pub raw: String,
    pub canonical: String,
    pub fingerprint: String,
}

impl IdeaQuery {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        let canonical = raw.trim().to_lowercase();
        let fingerprint = fingerprint(&canonical);
        Self {
            raw: raw.to_string(),
            canonical,
            fingerprint,
        }
    }
}

/// SHA-256 hex digest of the canonical idea text.
#[must_use]
pub fn fingerprint(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    use std::fmt::Write;
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_case_and_whitespace_insensitive() {
        let a = IdeaQuery::new("Pet Insurance ");
        let b = IdeaQuery::new("pet insurance");
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.canonical, "pet insurance");
    }

    #[test]
    fn test_fingerprint_distinguishes_different_ideas() {
        let a = IdeaQuery::new("pet insurance");
        let b = IdeaQuery::new("pet sitting");
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint("pet insurance");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
