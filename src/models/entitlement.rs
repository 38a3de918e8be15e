use serde::{Deserialize, Serialize};

/// Stored premium grant for a user. One row per user; a new grant overwrites
/// the previous one. Expired rows are kept and read back as non-premium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entitlement {
    pub user_id: String,
    pub premium: bool,
    pub plan: String,
    /// Order that granted this entitlement
    pub order_id: String,
    pub granted_at: i64,
    pub expires_at: i64,
}

/// Resolved view of a user's entitlement at a point in time.
///
/// Serializes to `{"premium": false}` for users that never bought anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitlementStatus {
    pub premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl EntitlementStatus {
    pub fn none() -> Self {
        Self {
            premium: false,
            plan: None,
            order_id: None,
            expires_at: None,
        }
    }
}
