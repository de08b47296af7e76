use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::tenancy::{FeatureFlag, SubscriptionTier};

/// Row from the platform tenant directory. Provisioned by operators; read on
/// every request, never mutated by end users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub subdomain: String,
    pub name: String,
    pub enabled_features: Vec<String>,
    pub subscription_tier: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn tier(&self) -> SubscriptionTier {
        SubscriptionTier::parse(&self.subscription_tier).unwrap_or(SubscriptionTier::Basic)
    }

    /// Unknown feature tags in the directory are ignored rather than fatal;
    /// a tenant row may predate the current feature set.
    pub fn features(&self) -> Vec<FeatureFlag> {
        self.enabled_features
            .iter()
            .filter_map(|s| FeatureFlag::parse(s))
            .collect()
    }

    pub fn has_feature(&self, flag: FeatureFlag) -> bool {
        self.features().contains(&flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant(features: &[&str], tier: &str) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            subdomain: "harvard".to_string(),
            name: "Harvard Academy".to_string(),
            enabled_features: features.iter().map(|s| s.to_string()).collect(),
            subscription_tier: tier.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn unknown_feature_tags_are_skipped() {
        let t = tenant(&["library", "timetravel", "devices"], "enterprise");
        assert_eq!(
            t.features(),
            vec![FeatureFlag::Library, FeatureFlag::Devices]
        );
    }

    #[test]
    fn unknown_tier_falls_back_to_basic() {
        assert_eq!(tenant(&[], "platinum").tier(), SubscriptionTier::Basic);
        assert_eq!(tenant(&[], "enterprise").tier(), SubscriptionTier::Enterprise);
    }
}
