use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::LimitsConfig;
use crate::db::Store;

const FREE_PLAN: &str = "free";

/// Outcome of the anonymous window gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allowed { remaining: u32 },
    Rejected { retry_after_seconds: u64 },
}

/// Outcome of the per-user daily quota gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed { remaining: Option<u32> },
    Rejected { reason: String },
}

struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Two independent gates in front of the check pipeline.
///
/// The anonymous gate is a fixed window per network identity held in
/// process memory: best-effort abuse mitigation, not accounting.
/// Expired entries are swept on every check, so the map stays bounded
/// by the identities active within one window. The per-user gate
/// reads the profile row and compares the day-scoped counter against
/// the tier ceiling.
pub struct RateGovernor {
    window: Duration,
    ceiling: u32,
    free_tier_daily: u32,
    buckets: Mutex<HashMap<String, WindowEntry>>,
}

impl RateGovernor {
    #[must_use]
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            window: Duration::from_secs(limits.anon_window_seconds),
            ceiling: limits.anon_ceiling,
            free_tier_daily: limits.free_tier_daily,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    pub fn check_network(&self, identity: &str) -> GateDecision {
        self.check_network_at(identity, Instant::now())
    }

    fn check_network_at(&self, identity: &str, now: Instant) -> GateDecision {
        let mut buckets = self
            .buckets
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        buckets.retain(|_, entry| entry.reset_at > now);

        let Some(entry) = buckets.get_mut(identity) else {
            buckets.insert(
                identity.to_string(),
                WindowEntry {
                    count: 1,
                    reset_at: now + self.window,
                },
            );
            return GateDecision::Allowed {
                remaining: self.ceiling.saturating_sub(1),
            };
        };

        if entry.count >= self.ceiling {
            let retry_after_seconds = entry
                .reset_at
                .saturating_duration_since(now)
                .as_secs()
                .max(1);
            return GateDecision::Rejected {
                retry_after_seconds,
            };
        }

        entry.count += 1;
        GateDecision::Allowed {
            remaining: self.ceiling - entry.count,
        }
    }

    /// Checks the authenticated daily quota. A missing profile allows
    /// the request: quota enforcement should never lock out a user
    /// whose profile row has not been provisioned yet.
    pub async fn check_user_quota(&self, store: &Store, user_id: &str) -> QuotaDecision {
        let profile = match store.get_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return QuotaDecision::Allowed { remaining: None },
            Err(e) => {
                tracing::warn!("Profile lookup failed for {user_id}, allowing request: {e}");
                return QuotaDecision::Allowed { remaining: None };
            }
        };

        if profile.plan != FREE_PLAN {
            return QuotaDecision::Allowed { remaining: None };
        }

        let today = chrono::Utc::now().format("%Y-%m-%d").to_string();
        let used_today = if profile.quota_day == today {
            u32::try_from(profile.searches_today.max(0)).unwrap_or(u32::MAX)
        } else {
            0
        };

        if used_today >= self.free_tier_daily {
            return QuotaDecision::Rejected {
                reason: "Daily limit reached. Upgrade to Pro for unlimited searches.".to_string(),
            };
        }

        QuotaDecision::Allowed {
            remaining: Some(self.free_tier_daily - used_today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor(ceiling: u32, window_seconds: u64) -> RateGovernor {
        RateGovernor::new(&LimitsConfig {
            anon_window_seconds: window_seconds,
            anon_ceiling: ceiling,
            free_tier_daily: 3,
        })
    }

    #[test]
    fn test_eleventh_request_in_window_rejected() {
        let governor = governor(10, 60);
        let now = Instant::now();

        for i in 0..10 {
            let decision = governor.check_network_at("1.2.3.4", now);
            assert_eq!(
                decision,
                GateDecision::Allowed { remaining: 9 - i },
                "request {}",
                i + 1
            );
        }

        match governor.check_network_at("1.2.3.4", now) {
            GateDecision::Rejected {
                retry_after_seconds,
            } => assert!(retry_after_seconds >= 1 && retry_after_seconds <= 60),
            GateDecision::Allowed { .. } => panic!("11th request should be rejected"),
        }
    }

    #[test]
    fn test_window_expiry_resets_counter_to_one() {
        let governor = governor(10, 60);
        let start = Instant::now();

        for _ in 0..10 {
            governor.check_network_at("1.2.3.4", start);
        }
        assert!(matches!(
            governor.check_network_at("1.2.3.4", start),
            GateDecision::Rejected { .. }
        ));

        let after_window = start + Duration::from_secs(61);
        assert_eq!(
            governor.check_network_at("1.2.3.4", after_window),
            GateDecision::Allowed { remaining: 9 }
        );
    }

    #[test]
    fn test_identities_are_independent() {
        let governor = governor(1, 60);
        let now = Instant::now();

        assert!(matches!(
            governor.check_network_at("1.1.1.1", now),
            GateDecision::Allowed { .. }
        ));
        assert!(matches!(
            governor.check_network_at("1.1.1.1", now),
            GateDecision::Rejected { .. }
        ));
        assert!(matches!(
            governor.check_network_at("2.2.2.2", now),
            GateDecision::Allowed { .. }
        ));
    }

    #[test]
    fn test_stale_entries_are_swept() {
        let governor = governor(10, 60);
        let start = Instant::now();

        for i in 0..100 {
            governor.check_network_at(&format!("10.0.0.{i}"), start);
        }
        assert_eq!(governor.buckets.lock().unwrap().len(), 100);

        governor.check_network_at("fresh", start + Duration::from_secs(61));
        assert_eq!(governor.buckets.lock().unwrap().len(), 1);
    }
}
