//! Rate Limit Policies
//!
//! The static policy table consulted by the limiter.

use serde::Serialize;

// == Policy ==
/// Quota for one class of endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitPolicy {
    /// Window length in milliseconds
    pub window_ms: u64,
    /// Requests admitted per window
    pub max_requests: u32,
    /// Message returned to rejected callers
    pub message: String,
}

impl RateLimitPolicy {
    pub fn new(window_ms: u64, max_requests: u32, message: impl Into<String>) -> Self {
        Self {
            window_ms,
            max_requests,
            message: message.into(),
        }
    }

    /// TTL given to a stored window, in seconds.
    ///
    /// The smallest whole number of seconds strictly longer than the window,
    /// so a window stored by its opening request is still readable at the
    /// exact boundary, where it still admits or rejects.
    pub fn window_ttl_secs(&self) -> u64 {
        self.window_ms / 1000 + 1
    }
}

// == Policy Kind ==
/// Names of the configured policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    /// Wide window, generous quota
    Default,
    /// Short window, very low quota for expensive or sensitive writes
    Strict,
    /// Privileged operations
    Admin,
    /// Credential-related endpoints
    Auth,
}

// == Policy Table ==
/// The four named policies, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitPolicies {
    pub default: RateLimitPolicy,
    pub strict: RateLimitPolicy,
    pub admin: RateLimitPolicy,
    pub auth: RateLimitPolicy,
}

impl RateLimitPolicies {
    pub fn get(&self, kind: PolicyKind) -> &RateLimitPolicy {
        match kind {
            PolicyKind::Default => &self.default,
            PolicyKind::Strict => &self.strict,
            PolicyKind::Admin => &self.admin,
            PolicyKind::Auth => &self.auth,
        }
    }
}

const MINUTE_MS: u64 = 60 * 1000;

impl Default for RateLimitPolicies {
    fn default() -> Self {
        Self {
            default: RateLimitPolicy::new(
                15 * MINUTE_MS,
                100,
                "Too many requests from this IP, please try again later.",
            ),
            strict: RateLimitPolicy::new(
                MINUTE_MS,
                5,
                "Too many requests for this operation, please try again in a minute.",
            ),
            admin: RateLimitPolicy::new(
                15 * MINUTE_MS,
                50,
                "Too many admin requests, please try again later.",
            ),
            auth: RateLimitPolicy::new(
                15 * MINUTE_MS,
                10,
                "Too many authentication attempts, please try again after 15 minutes.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_ttl_outlives_window() {
        assert_eq!(RateLimitPolicy::new(1000, 1, "").window_ttl_secs(), 2);
        assert_eq!(RateLimitPolicy::new(1001, 1, "").window_ttl_secs(), 2);
        assert_eq!(RateLimitPolicy::new(1999, 1, "").window_ttl_secs(), 2);
        assert_eq!(RateLimitPolicy::new(1, 1, "").window_ttl_secs(), 1);
        assert_eq!(RateLimitPolicy::new(15 * MINUTE_MS, 1, "").window_ttl_secs(), 901);
    }

    #[test]
    fn test_default_table_shape() {
        let policies = RateLimitPolicies::default();

        assert!(policies.strict.window_ms < policies.default.window_ms);
        assert!(policies.strict.max_requests < policies.admin.max_requests);
        assert!(policies.admin.max_requests < policies.default.max_requests);
        assert!(policies.auth.max_requests < policies.default.max_requests);
    }

    #[test]
    fn test_lookup_by_kind() {
        let policies = RateLimitPolicies::default();
        assert_eq!(policies.get(PolicyKind::Auth), &policies.auth);
        assert_eq!(policies.get(PolicyKind::Strict), &policies.strict);
    }
}
