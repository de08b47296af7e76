use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::tenancy::SubscriptionTier;

/// Platform-wide marketplace catalog entry. Owned by the operator, never by
/// a tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GlobalApp {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub icon: Option<String>,
    pub rating: f64,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub is_trending: bool,
    pub is_recommended: bool,
    pub is_essential: bool,
    pub is_premium: bool,
    pub status: String,
    pub min_tier: String,
    pub is_globally_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GlobalApp {
    pub fn min_tier(&self) -> SubscriptionTier {
        SubscriptionTier::parse(&self.min_tier).unwrap_or(SubscriptionTier::Basic)
    }
}

/// Per-tenant enablement and cosmetic override record. At most one row per
/// (tenant, app) pair; absence means the app is not available to the tenant.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TenantAppAccess {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub app_id: Uuid,
    pub is_enabled: bool,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    pub custom_icon: Option<String>,
    pub changed_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TenantAppAccess {
    pub fn overrides(&self) -> CosmeticOverrides {
        CosmeticOverrides {
            custom_name: self.custom_name.clone(),
            custom_description: self.custom_description.clone(),
            custom_icon: self.custom_icon.clone(),
        }
    }
}

/// The tenant-facing override fields of an access record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct CosmeticOverrides {
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    pub custom_icon: Option<String>,
}

/// Append-only usage event reported by clients. Never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppUsage {
    pub id: Uuid,
    pub app_id: Uuid,
    pub tenant_id: Uuid,
    pub user_id: Uuid,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

/// What a tenant actually sees in the marketplace: global defaults with the
/// tenant's cosmetic overrides coalesced over them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantAppView {
    pub id: Uuid,
    pub name: String,
    /// Global name kept alongside so search still matches it when a custom
    /// name shadows it
    pub global_name: String,
    pub description: Option<String>,
    pub category: String,
    pub icon: Option<String>,
    pub rating: f64,
    pub tags: Vec<String>,
    pub is_featured: bool,
    pub is_trending: bool,
    pub is_recommended: bool,
    pub is_essential: bool,
    pub is_premium: bool,
    pub created_at: DateTime<Utc>,
}

impl TenantAppView {
    /// Coalesce: use the override field when present, else the global field.
    pub fn project(app: GlobalApp, overrides: &CosmeticOverrides) -> Self {
        Self {
            id: app.id,
            name: overrides
                .custom_name
                .clone()
                .unwrap_or_else(|| app.name.clone()),
            global_name: app.name,
            description: overrides.custom_description.clone().or(app.description),
            category: app.category,
            icon: overrides.custom_icon.clone().or(app.icon),
            rating: app.rating,
            tags: app.tags,
            is_featured: app.is_featured,
            is_trending: app.is_trending,
            is_recommended: app.is_recommended,
            is_essential: app.is_essential,
            is_premium: app.is_premium,
            created_at: app.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub fn sample_app(name: &str) -> GlobalApp {
        GlobalApp {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some("Global description".to_string()),
            category: "learning".to_string(),
            icon: Some("icon.svg".to_string()),
            rating: 4.0,
            tags: vec!["math".to_string()],
            is_featured: false,
            is_trending: false,
            is_recommended: false,
            is_essential: false,
            is_premium: false,
            status: "active".to_string(),
            min_tier: "basic".to_string(),
            is_globally_available: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn projection_without_overrides_keeps_global_fields() {
        let app = sample_app("Mathletics");
        let view = TenantAppView::project(app.clone(), &CosmeticOverrides::default());
        assert_eq!(view.name, "Mathletics");
        assert_eq!(view.description.as_deref(), Some("Global description"));
        assert_eq!(view.icon.as_deref(), Some("icon.svg"));
    }

    #[test]
    fn overrides_shadow_global_fields_but_keep_global_name_searchable() {
        let app = sample_app("Mathletics");
        let overrides = CosmeticOverrides {
            custom_name: Some("Numeracy Lab".to_string()),
            custom_icon: Some("custom.svg".to_string()),
            ..Default::default()
        };

        let view = TenantAppView::project(app, &overrides);
        assert_eq!(view.name, "Numeracy Lab");
        assert_eq!(view.global_name, "Mathletics");
        assert_eq!(view.icon.as_deref(), Some("custom.svg"));
    }
}
