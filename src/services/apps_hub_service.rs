//! Global Apps Hub access model.
//!
//! The catalog is platform-owned; tenants see only apps that are active,
//! globally available, and explicitly enabled for them, with per-tenant
//! cosmetic overrides projected over the global defaults. Usage events are
//! append-only and feed the aggregation queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::bind::{bind_params, SqlParam};
use crate::database::manager::DatabaseManager;
use crate::database::models::apps_hub::{
    CosmeticOverrides, GlobalApp, TenantAppAccess, TenantAppView,
};
use crate::error::ApiError;
use crate::tenancy::SubscriptionTier;

const GLOBAL_APP_COLUMNS: &str = "id, name, description, category, icon, rating, tags, \
     is_featured, is_trending, is_recommended, is_essential, is_premium, \
     status, min_tier, is_globally_available, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    Featured,
    Name,
    Rating,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Marketplace listing filters. Boolean filters are equality constraints
/// when present and unconstrained when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    pub trending: Option<bool>,
    pub recommended: Option<bool>,
    pub essential: Option<bool>,
    pub premium: Option<bool>,
    /// Operator-only: constrain by catalog status
    pub status: Option<String>,
    /// Operator-only: constrain by minimum plan requirement
    pub min_tier: Option<SubscriptionTier>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

/// Anything the marketplace can list: the operator's raw catalog rows and
/// the tenant-projected views share filter and sort semantics.
pub trait CatalogEntry {
    fn display_name(&self) -> &str;
    fn rating(&self) -> f64;
    fn created_at(&self) -> DateTime<Utc>;
    fn category(&self) -> &str;
    fn flag(&self, which: FlagKind) -> bool;
    /// Case-insensitive free-text search targets
    fn search_terms(&self) -> Vec<&str>;
    fn tags(&self) -> &[String];
    fn status(&self) -> Option<&str> {
        None
    }
    fn min_tier(&self) -> Option<SubscriptionTier> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FlagKind {
    Featured,
    Trending,
    Recommended,
    Essential,
    Premium,
}

impl CatalogEntry for GlobalApp {
    fn display_name(&self) -> &str {
        &self.name
    }
    fn rating(&self) -> f64 {
        self.rating
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn flag(&self, which: FlagKind) -> bool {
        match which {
            FlagKind::Featured => self.is_featured,
            FlagKind::Trending => self.is_trending,
            FlagKind::Recommended => self.is_recommended,
            FlagKind::Essential => self.is_essential,
            FlagKind::Premium => self.is_premium,
        }
    }
    fn search_terms(&self) -> Vec<&str> {
        let mut terms = vec![self.name.as_str()];
        if let Some(d) = &self.description {
            terms.push(d.as_str());
        }
        terms
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
    fn status(&self) -> Option<&str> {
        Some(&self.status)
    }
    fn min_tier(&self) -> Option<SubscriptionTier> {
        Some(GlobalApp::min_tier(self))
    }
}

impl CatalogEntry for TenantAppView {
    fn display_name(&self) -> &str {
        &self.name
    }
    fn rating(&self) -> f64 {
        self.rating
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn flag(&self, which: FlagKind) -> bool {
        match which {
            FlagKind::Featured => self.is_featured,
            FlagKind::Trending => self.is_trending,
            FlagKind::Recommended => self.is_recommended,
            FlagKind::Essential => self.is_essential,
            FlagKind::Premium => self.is_premium,
        }
    }
    fn search_terms(&self) -> Vec<&str> {
        // Custom override name and the global name it shadows both match
        let mut terms = vec![self.name.as_str(), self.global_name.as_str()];
        if let Some(d) = &self.description {
            terms.push(d.as_str());
        }
        terms
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Apply listing filters in order; every present filter must hold.
pub fn apply_filters<T: CatalogEntry>(entries: Vec<T>, filters: &AppFilters) -> Vec<T> {
    entries
        .into_iter()
        .filter(|e| matches_filters(e, filters))
        .collect()
}

fn matches_filters<T: CatalogEntry>(entry: &T, filters: &AppFilters) -> bool {
    let flag_checks = [
        (filters.featured, FlagKind::Featured),
        (filters.trending, FlagKind::Trending),
        (filters.recommended, FlagKind::Recommended),
        (filters.essential, FlagKind::Essential),
        (filters.premium, FlagKind::Premium),
    ];
    for (wanted, kind) in flag_checks {
        if let Some(wanted) = wanted {
            if entry.flag(kind) != wanted {
                return false;
            }
        }
    }

    if let Some(category) = &filters.category {
        if !entry.category().eq_ignore_ascii_case(category) {
            return false;
        }
    }

    if let Some(status) = &filters.status {
        if let Some(entry_status) = entry.status() {
            if !entry_status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
    }

    if let Some(min_tier) = filters.min_tier {
        if let Some(entry_tier) = entry.min_tier() {
            if entry_tier != min_tier {
                return false;
            }
        }
    }

    if let Some(search) = &filters.search {
        if !search_matches(entry, search) {
            return false;
        }
    }

    true
}

/// Case-insensitive substring match against name/description, plus exact
/// (case-insensitive) tag membership.
fn search_matches<T: CatalogEntry>(entry: &T, search: &str) -> bool {
    let needle = search.to_lowercase();
    if needle.is_empty() {
        return true;
    }
    entry
        .search_terms()
        .iter()
        .any(|t| t.to_lowercase().contains(&needle))
        || entry.tags().iter().any(|t| t.eq_ignore_ascii_case(search))
}

/// Sort semantics carried over from the original platform: `name` honors the
/// requested order, `rating` and `created_at` are always descending, and the
/// default is featured-first with rating as tiebreak. (The asymmetry is a
/// known quirk; see DESIGN.md.)
pub fn sort_entries<T: CatalogEntry>(entries: &mut [T], sort_by: SortBy, sort_order: SortOrder) {
    match sort_by {
        SortBy::Featured => entries.sort_by(|a, b| {
            b.flag(FlagKind::Featured)
                .cmp(&a.flag(FlagKind::Featured))
                .then_with(|| b.rating().total_cmp(&a.rating()))
        }),
        SortBy::Name => entries.sort_by(|a, b| {
            let ord = a
                .display_name()
                .to_lowercase()
                .cmp(&b.display_name().to_lowercase());
            match sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }),
        SortBy::Rating => entries.sort_by(|a, b| b.rating().total_cmp(&a.rating())),
        SortBy::CreatedAt => entries.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
    }
}

/// Joined row for the tenant marketplace query.
#[derive(FromRow)]
struct TenantCatalogRow {
    #[sqlx(flatten)]
    app: GlobalApp,
    #[sqlx(flatten)]
    overrides: CosmeticOverrides,
}

/// Operator payload for creating a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalAppInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_essential: bool,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub min_tier: Option<SubscriptionTier>,
    #[serde(default = "default_true")]
    pub is_globally_available: bool,
}

fn default_status() -> String {
    "active".to_string()
}

fn default_true() -> bool {
    true
}

/// Operator patch for an existing catalog entry; absent fields are left
/// untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GlobalAppPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub icon: Option<String>,
    pub rating: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub is_featured: Option<bool>,
    pub is_trending: Option<bool>,
    pub is_recommended: Option<bool>,
    pub is_essential: Option<bool>,
    pub is_premium: Option<bool>,
    pub status: Option<String>,
    pub min_tier: Option<SubscriptionTier>,
    pub is_globally_available: Option<bool>,
}

/// Enablement/override patch for a (tenant, app) pair; absent fields keep
/// their current value on merge.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccessPatch {
    pub is_enabled: Option<bool>,
    pub custom_name: Option<String>,
    pub custom_description: Option<String>,
    pub custom_icon: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BulkAccessResult {
    pub app_id: Uuid,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    Day,
    Week,
    Month,
}

impl AnalyticsPeriod {
    pub fn window_days(&self) -> i32 {
        match self {
            AnalyticsPeriod::Day => 1,
            AnalyticsPeriod::Week => 7,
            AnalyticsPeriod::Month => 30,
        }
    }
}

/// One aggregated analytics bucket: usage grouped by app, tenant, action and
/// day inside the rolling window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UsageBucket {
    pub app_id: Uuid,
    pub tenant_id: Uuid,
    pub action: String,
    pub day: DateTime<Utc>,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PopularApp {
    pub app_id: Uuid,
    pub name: String,
    pub usage_count: i64,
    pub tenant_count: i64,
}

#[derive(Clone)]
pub struct AppsHubService {
    pool: PgPool,
}

impl AppsHubService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Marketplace as one tenant sees it: active, globally available, and
    /// enabled for the tenant, with overrides projected.
    pub async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
        filters: &AppFilters,
    ) -> Result<Vec<TenantAppView>, ApiError> {
        let sql = "SELECT g.*, a.custom_name, a.custom_description, a.custom_icon \
             FROM global_apps g \
             JOIN tenant_app_access a ON a.app_id = g.id AND a.tenant_id = $1 \
             WHERE g.status = 'active' \
               AND g.is_globally_available = true \
               AND a.is_enabled = true";

        let rows = sqlx::query_as::<_, TenantCatalogRow>(sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        let views = rows
            .into_iter()
            .map(|r| TenantAppView::project(r.app, &r.overrides))
            .collect();

        let mut views = apply_filters(views, filters);
        sort_entries(
            &mut views,
            filters.sort_by.unwrap_or(SortBy::Featured),
            filters.sort_order.unwrap_or(SortOrder::Desc),
        );
        Ok(views)
    }

    /// Operator view of the whole catalog; no per-tenant join.
    pub async fn list_global(&self, filters: &AppFilters) -> Result<Vec<GlobalApp>, ApiError> {
        let sql = format!("SELECT {} FROM global_apps", GLOBAL_APP_COLUMNS);
        let apps = sqlx::query_as::<_, GlobalApp>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let mut apps = apply_filters(apps, filters);
        sort_entries(
            &mut apps,
            filters.sort_by.unwrap_or(SortBy::Featured),
            filters.sort_order.unwrap_or(SortOrder::Desc),
        );
        Ok(apps)
    }

    pub async fn create_global_app(&self, input: &GlobalAppInput) -> Result<GlobalApp, ApiError> {
        let sql = format!(
            "INSERT INTO global_apps \
             (name, description, category, icon, rating, tags, is_featured, is_trending, \
              is_recommended, is_essential, is_premium, status, min_tier, is_globally_available) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {}",
            GLOBAL_APP_COLUMNS
        );

        let app = sqlx::query_as::<_, GlobalApp>(&sql)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.icon)
            .bind(input.rating)
            .bind(&input.tags)
            .bind(input.is_featured)
            .bind(input.is_trending)
            .bind(input.is_recommended)
            .bind(input.is_essential)
            .bind(input.is_premium)
            .bind(&input.status)
            .bind(input.min_tier.unwrap_or(SubscriptionTier::Basic).as_str())
            .bind(input.is_globally_available)
            .fetch_one(&self.pool)
            .await?;

        Ok(app)
    }

    pub async fn update_global_app(
        &self,
        id: Uuid,
        patch: &GlobalAppPatch,
    ) -> Result<GlobalApp, ApiError> {
        let mut assignments: Vec<String> = Vec::new();
        let mut params: Vec<SqlParam> = Vec::new();

        let mut push = |assignments: &mut Vec<String>, params: &mut Vec<SqlParam>, column: &str, value: SqlParam| {
            params.push(value);
            assignments.push(format!("{} = ${}", column, params.len()));
        };

        if let Some(v) = &patch.name {
            push(&mut assignments, &mut params, "name", SqlParam::Text(v.clone()));
        }
        if let Some(v) = &patch.description {
            push(&mut assignments, &mut params, "description", SqlParam::Text(v.clone()));
        }
        if let Some(v) = &patch.category {
            push(&mut assignments, &mut params, "category", SqlParam::Text(v.clone()));
        }
        if let Some(v) = &patch.icon {
            push(&mut assignments, &mut params, "icon", SqlParam::Text(v.clone()));
        }
        if let Some(v) = patch.rating {
            push(&mut assignments, &mut params, "rating", SqlParam::Float(v));
        }
        if let Some(v) = &patch.tags {
            push(
                &mut assignments,
                &mut params,
                "tags",
                SqlParam::TextArray(v.clone()),
            );
        }
        if let Some(v) = patch.is_featured {
            push(&mut assignments, &mut params, "is_featured", SqlParam::Bool(v));
        }
        if let Some(v) = patch.is_trending {
            push(&mut assignments, &mut params, "is_trending", SqlParam::Bool(v));
        }
        if let Some(v) = patch.is_recommended {
            push(&mut assignments, &mut params, "is_recommended", SqlParam::Bool(v));
        }
        if let Some(v) = patch.is_essential {
            push(&mut assignments, &mut params, "is_essential", SqlParam::Bool(v));
        }
        if let Some(v) = patch.is_premium {
            push(&mut assignments, &mut params, "is_premium", SqlParam::Bool(v));
        }
        if let Some(v) = &patch.status {
            push(&mut assignments, &mut params, "status", SqlParam::Text(v.clone()));
        }
        if let Some(v) = patch.min_tier {
            push(&mut assignments, &mut params, "min_tier", SqlParam::Text(v.as_str().to_string()));
        }
        if let Some(v) = patch.is_globally_available {
            push(&mut assignments, &mut params, "is_globally_available", SqlParam::Bool(v));
        }

        if assignments.is_empty() {
            return Err(ApiError::bad_request("Update payload must set at least one field"));
        }

        assignments.push("updated_at = NOW()".to_string());
        params.push(SqlParam::Uuid(id));

        let sql = format!(
            "UPDATE global_apps SET {} WHERE id = ${} RETURNING {}",
            assignments.join(", "),
            params.len(),
            GLOBAL_APP_COLUMNS
        );

        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(GlobalApp::from_row(&row)?),
            None => Err(ApiError::not_found(format!("No catalog app with id {}", id))),
        }
    }

    /// Idempotent: deleting an absent catalog entry is a no-op success.
    pub async fn delete_global_app(&self, id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM global_apps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Upsert the (tenant, app) access record, merging only the fields the
    /// patch provides and bumping updated_at.
    pub async fn set_tenant_app_access(
        &self,
        tenant_id: Uuid,
        app_id: Uuid,
        patch: &AccessPatch,
        actor: Uuid,
    ) -> Result<TenantAppAccess, ApiError> {
        let access = sqlx::query_as::<_, TenantAppAccess>(
            r#"
            INSERT INTO tenant_app_access
                (tenant_id, app_id, is_enabled, custom_name, custom_description, custom_icon, changed_by)
            VALUES ($1, $2, COALESCE($3, false), $4, $5, $6, $7)
            ON CONFLICT (tenant_id, app_id) DO UPDATE SET
                is_enabled = COALESCE($3, tenant_app_access.is_enabled),
                custom_name = COALESCE($4, tenant_app_access.custom_name),
                custom_description = COALESCE($5, tenant_app_access.custom_description),
                custom_icon = COALESCE($6, tenant_app_access.custom_icon),
                changed_by = $7,
                updated_at = NOW()
            RETURNING id, tenant_id, app_id, is_enabled, custom_name, custom_description,
                      custom_icon, changed_by, created_at, updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(app_id)
        .bind(patch.is_enabled)
        .bind(&patch.custom_name)
        .bind(&patch.custom_description)
        .bind(&patch.custom_icon)
        .bind(actor)
        .fetch_one(&self.pool)
        .await?;

        Ok(access)
    }

    /// Sequential per-app upserts. Deliberately not transactional: a failure
    /// partway through leaves earlier entries committed, and the per-id
    /// results report exactly which ones landed.
    pub async fn bulk_set_tenant_app_access(
        &self,
        tenant_id: Uuid,
        app_ids: &[Uuid],
        enabled: bool,
        actor: Uuid,
    ) -> Vec<BulkAccessResult> {
        let patch = AccessPatch {
            is_enabled: Some(enabled),
            ..Default::default()
        };

        let mut results = Vec::with_capacity(app_ids.len());
        for app_id in app_ids {
            match self
                .set_tenant_app_access(tenant_id, *app_id, &patch, actor)
                .await
            {
                Ok(_) => results.push(BulkAccessResult {
                    app_id: *app_id,
                    success: true,
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!("bulk access update failed for app {}: {}", app_id, e);
                    results.push(BulkAccessResult {
                        app_id: *app_id,
                        success: false,
                        error: Some(e.message().to_string()),
                    });
                }
            }
        }
        results
    }

    pub async fn list_access_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<TenantAppAccess>, ApiError> {
        let rows = sqlx::query_as::<_, TenantAppAccess>(
            r#"
            SELECT id, tenant_id, app_id, is_enabled, custom_name, custom_description,
                   custom_icon, changed_by, created_at, updated_at
            FROM tenant_app_access
            WHERE tenant_id = $1
            ORDER BY updated_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Append-only; usage rows are never updated or deleted.
    pub async fn record_usage(
        &self,
        app_id: Uuid,
        tenant_id: Uuid,
        user_id: Uuid,
        action: &str,
    ) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO app_usage (app_id, tenant_id, user_id, action) VALUES ($1, $2, $3, $4)",
        )
        .bind(app_id)
        .bind(tenant_id)
        .bind(user_id)
        .bind(action)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Pure aggregation: usage events bucketed by day inside the rolling
    /// window, grouped by (app, tenant, action, day).
    pub async fn global_usage_analytics(
        &self,
        period: AnalyticsPeriod,
    ) -> Result<Vec<UsageBucket>, ApiError> {
        let buckets = sqlx::query_as::<_, UsageBucket>(
            r#"
            SELECT app_id, tenant_id, action,
                   date_trunc('day', created_at) AS day,
                   COUNT(*) AS count
            FROM app_usage
            WHERE created_at >= NOW() - make_interval(days => $1)
            GROUP BY app_id, tenant_id, action, day
            ORDER BY day DESC, count DESC
            "#,
        )
        .bind(period.window_days())
        .fetch_all(&self.pool)
        .await?;

        Ok(buckets)
    }

    /// Catalog apps ranked by total usage-event count, with distinct-tenant
    /// reach as the secondary measure. Apps with no usage events at all are
    /// omitted rather than ranked at zero.
    pub async fn global_popular_apps(&self, limit: i64) -> Result<Vec<PopularApp>, ApiError> {
        let apps = sqlx::query_as::<_, PopularApp>(
            r#"
            SELECT g.id AS app_id, g.name,
                   COUNT(u.id) AS usage_count,
                   COUNT(DISTINCT u.tenant_id) AS tenant_count
            FROM global_apps g
            JOIN app_usage u ON u.app_id = g.id
            GROUP BY g.id, g.name
            ORDER BY usage_count DESC, tenant_count DESC
            LIMIT $1
            "#,
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(apps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(name: &str) -> GlobalApp {
        GlobalApp {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some("Practice arithmetic daily".to_string()),
            category: "learning".to_string(),
            icon: None,
            rating: 3.5,
            tags: vec!["math".to_string(), "stem".to_string()],
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
    fn boolean_filters_are_equality_when_present() {
        let mut featured = app("Mathletics");
        featured.is_featured = true;
        let plain = app("ReadAlong");

        let filters = AppFilters {
            featured: Some(true),
            ..Default::default()
        };
        let names: Vec<String> = apply_filters(vec![featured, plain], &filters)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["Mathletics"]);

        // absent filter is unconstrained
        let all = apply_filters(
            vec![app("A"), app("B")],
            &AppFilters::default(),
        );
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn search_matches_name_description_and_tags() {
        let a = app("Mathletics");
        let search = |term: &str| {
            let filters = AppFilters {
                search: Some(term.to_string()),
                ..Default::default()
            };
            !apply_filters(vec![a.clone()], &filters).is_empty()
        };

        assert!(search("MATHLET"));
        assert!(search("arithmetic"));
        assert!(search("STEM")); // tag membership, case-insensitive
        assert!(!search("ste")); // tag match is whole-term, not substring
        assert!(!search("chemistry"));
    }

    #[test]
    fn tenant_view_search_matches_shadowed_global_name() {
        let view = TenantAppView::project(
            app("Mathletics"),
            &CosmeticOverrides {
                custom_name: Some("Numeracy Lab".to_string()),
                ..Default::default()
            },
        );

        let filters = AppFilters {
            search: Some("mathletics".to_string()),
            ..Default::default()
        };
        assert!(!apply_filters(vec![view.clone()], &filters).is_empty());

        let filters = AppFilters {
            search: Some("numeracy".to_string()),
            ..Default::default()
        };
        assert!(!apply_filters(vec![view], &filters).is_empty());
    }

    #[test]
    fn default_sort_is_featured_then_rating_descending() {
        let mut low = app("Low");
        low.rating = 1.0;
        let mut high = app("High");
        high.rating = 4.5;
        let mut featured = app("Featured");
        featured.is_featured = true;
        featured.rating = 0.5;

        let mut entries = vec![low, high, featured];
        sort_entries(&mut entries, SortBy::Featured, SortOrder::Desc);
        let names: Vec<&str> = entries.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Featured", "High", "Low"]);
    }

    #[test]
    fn name_sort_honors_order_but_rating_stays_descending() {
        let mut a = app("Alpha");
        a.rating = 1.0;
        let mut z = app("Zulu");
        z.rating = 5.0;

        let mut entries = vec![z.clone(), a.clone()];
        sort_entries(&mut entries, SortBy::Name, SortOrder::Asc);
        assert_eq!(entries[0].name, "Alpha");

        let mut entries = vec![a.clone(), z.clone()];
        sort_entries(&mut entries, SortBy::Name, SortOrder::Desc);
        assert_eq!(entries[0].name, "Zulu");

        // rating ignores the requested ascending order (preserved quirk)
        let mut entries = vec![a, z];
        sort_entries(&mut entries, SortBy::Rating, SortOrder::Asc);
        assert_eq!(entries[0].name, "Zulu");
    }

    #[test]
    fn operator_filters_constrain_status_and_tier() {
        let mut retired = app("Old");
        retired.status = "retired".to_string();
        let active = app("New");

        let filters = AppFilters {
            status: Some("active".to_string()),
            ..Default::default()
        };
        let names: Vec<String> = apply_filters(vec![retired, active], &filters)
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["New"]);

        let mut premium_only = app("Premium App");
        premium_only.min_tier = "premium".to_string();
        let filters = AppFilters {
            min_tier: Some(SubscriptionTier::Premium),
            ..Default::default()
        };
        let kept = apply_filters(vec![premium_only, app("Basic App")], &filters);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Premium App");
    }

    #[test]
    fn analytics_periods_map_to_rolling_windows() {
        assert_eq!(AnalyticsPeriod::Day.window_days(), 1);
        assert_eq!(AnalyticsPeriod::Week.window_days(), 7);
        assert_eq!(AnalyticsPeriod::Month.window_days(), 30);
    }
}
