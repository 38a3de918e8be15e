//! Shared utility functions.

use std::collections::HashMap;

use axum::http::HeaderMap;

const SECONDS_PER_DAY: i64 = 86400;

/// How long a paid order keeps its user premium.
///
/// Every plan gets `default_days` unless it has an explicit override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityPolicy {
    pub default_days: i64,
    pub plan_days: HashMap<String, i64>,
}

impl Default for ValidityPolicy {
    fn default() -> Self {
        Self {
            default_days: 30,
            plan_days: HashMap::new(),
        }
    }
}

impl ValidityPolicy {
    pub fn days_for(&self, plan: &str) -> i64 {
        self.plan_days
            .get(plan)
            .copied()
            .unwrap_or(self.default_days)
    }

    /// Expiry of a grant made at `granted_at` for `plan`. Saturates instead
    /// of wrapping, so an oversized window can never land in the past.
    pub fn expires_at(&self, plan: &str, granted_at: i64) -> i64 {
        granted_at.saturating_add(self.days_for(plan).saturating_mul(SECONDS_PER_DAY))
    }
}

/// Extract a Bearer token from the Authorization header.
///
/// Returns the token string without the "Bearer " prefix, or None if
/// the header is missing, malformed, or empty after the prefix.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
}
