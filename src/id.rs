//! Prefixed ID generation for ledger records.
//!
//! Format: `{prefix}_{uuid_simple}` (32 hex chars, no hyphens). The prefixes
//! keep our ids visually distinct from Stripe's (`cs_`, `pi_`, `evt_...` with
//! mixed case), which end up in the same logs and audit rows.

use uuid::Uuid;

/// Record types that have prefixed IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Order,
    OrderEvent,
}

impl EntityType {
    /// Returns the prefix for this entity type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Order => "ord",
            Self::OrderEvent => "evt",
        }
    }

    /// Generates a new prefixed ID for this entity type.
    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }

    /// Cheap format check to reject garbage before hitting the database.
    pub fn is_valid_id(&self, s: &str) -> bool {
        let Some(hex_part) = s
            .strip_prefix(self.prefix())
            .and_then(|rest| rest.strip_prefix('_'))
        else {
            return false;
        };

        hex_part.len() == 32
            && hex_part
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let id = EntityType::Order.gen_id();
        assert!(id.starts_with("ord_"));
        // ord_ (4 chars) + 32 hex chars
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn test_ids_are_unique() {
        let id1 = EntityType::Order.gen_id();
        let id2 = EntityType::Order.gen_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_is_valid_id() {
        assert!(EntityType::Order.is_valid_id("ord_a1b2c3d4e5f6789012345678901234ab"));
        assert!(EntityType::Order.is_valid_id(&EntityType::Order.gen_id()));
        assert!(EntityType::OrderEvent.is_valid_id(&EntityType::OrderEvent.gen_id()));

        assert!(!EntityType::Order.is_valid_id(""));
        assert!(!EntityType::Order.is_valid_id("ord_a1b2c3d4")); // too short
        assert!(!EntityType::Order.is_valid_id("ord_a1b2c3d4e5f6789012345678901234abcd")); // too long
        assert!(!EntityType::Order.is_valid_id("ord_a1b2c3d4e5f6789012345678901234gg")); // non-hex
        assert!(!EntityType::Order.is_valid_id("ord_A1B2C3D4E5F6789012345678901234AB")); // uppercase
        assert!(!EntityType::Order.is_valid_id("evt_a1b2c3d4e5f6789012345678901234ab")); // wrong prefix
        assert!(!EntityType::Order.is_valid_id("orda1b2c3d4e5f6789012345678901234ab")); // missing separator
    }
}
