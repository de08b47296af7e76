//! Apps Hub endpoints: the tenant marketplace, usage recording, and the
//! operator surface for the global catalog, per-tenant enablement and
//! analytics.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::apps_hub::{GlobalApp, TenantAppAccess, TenantAppView};
use crate::guard::AccessGuard;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, CurrentUser};
use crate::roles::Permission;
use crate::services::apps_hub_service::{
    AccessPatch, AnalyticsPeriod, AppFilters, AppsHubService, BulkAccessResult, GlobalAppInput,
    GlobalAppPatch, PopularApp, UsageBucket,
};
use crate::services::AuditService;
use crate::tenancy::FeatureFlag;

/// GET `/api/apps-hub` — the marketplace the signed-in tenant sees.
pub async fn list_tenant_apps(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Query(filters): Query<AppFilters>,
) -> ApiResult<Vec<TenantAppView>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_user()
        .require_feature(FeatureFlag::AppsHub)
        .check()?;

    let views = AppsHubService::new()
        .await?
        .list_for_tenant(tenant.0.id, &filters)
        .await?;
    Ok(ApiResponse::success(views))
}

#[derive(Debug, Deserialize)]
pub struct UsageInput {
    pub app_id: Uuid,
    pub action: String,
}

/// POST `/api/apps-hub/usage` — append one usage event for the caller.
pub async fn record_usage(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<UsageInput>,
) -> ApiResult<Value> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_user()
        .require_feature(FeatureFlag::AppsHub)
        .check()?;

    AppsHubService::new()
        .await?
        .record_usage(input.app_id, tenant.0.id, user.id, &input.action)
        .await?;
    Ok(ApiResponse::success(json!({ "recorded": true })))
}

/// GET `/api/global-apps-hub` — operator view of the whole catalog.
pub async fn list_global_apps(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Query(filters): Query<AppFilters>,
) -> ApiResult<Vec<GlobalApp>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let apps = AppsHubService::new().await?.list_global(&filters).await?;
    Ok(ApiResponse::success(apps))
}

pub async fn create_global_app(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<GlobalAppInput>,
) -> ApiResult<GlobalApp> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let app = AppsHubService::new().await?.create_global_app(&input).await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        "global_app.create",
        json!({ "id": app.id, "name": app.name }),
    );
    Ok(ApiResponse::created(app))
}

pub async fn update_global_app(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(patch): Json<GlobalAppPatch>,
) -> ApiResult<GlobalApp> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let app = AppsHubService::new().await?.update_global_app(id, &patch).await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        "global_app.update",
        json!({ "id": id }),
    );
    Ok(ApiResponse::success(app))
}

pub async fn delete_global_app(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Value> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    AppsHubService::new().await?.delete_global_app(id).await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        "global_app.delete",
        json!({ "id": id }),
    );
    Ok(ApiResponse::success(json!({ "deleted": true })))
}

#[derive(Debug, Deserialize)]
pub struct AccessInput {
    pub tenant_id: Uuid,
    pub app_id: Uuid,
    #[serde(flatten)]
    pub patch: AccessPatch,
}

/// POST `/api/tenant-app-access` — upsert one (tenant, app) enablement
/// record, merging only the fields present in the payload.
pub async fn set_tenant_app_access(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<AccessInput>,
) -> ApiResult<TenantAppAccess> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let access = AppsHubService::new()
        .await?
        .set_tenant_app_access(input.tenant_id, input.app_id, &input.patch, user.id)
        .await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        "tenant_app_access.set",
        json!({ "tenant_id": input.tenant_id, "app_id": input.app_id }),
    );
    Ok(ApiResponse::success(access))
}

#[derive(Debug, Deserialize)]
pub struct BulkAccessInput {
    pub tenant_id: Uuid,
    pub app_ids: Vec<Uuid>,
    pub enabled: bool,
}

/// POST `/api/tenant-app-access/bulk` — sequential per-app upserts with
/// per-id outcomes; partial failure is reported, not rolled back.
pub async fn bulk_set_tenant_app_access(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<BulkAccessInput>,
) -> ApiResult<Vec<BulkAccessResult>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let results = AppsHubService::new()
        .await?
        .bulk_set_tenant_app_access(input.tenant_id, &input.app_ids, input.enabled, user.id)
        .await;
    AuditService::record(
        tenant.0.id,
        user.id,
        "tenant_app_access.bulk_set",
        json!({ "tenant_id": input.tenant_id, "count": input.app_ids.len(), "enabled": input.enabled }),
    );
    Ok(ApiResponse::success(results))
}

/// GET `/api/tenant-app-access/:tenant_id` — all enablement records for one
/// tenant, newest change first.
pub async fn list_tenant_app_access(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<Vec<TenantAppAccess>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ManageAppsHub)
        .check()?;

    let rows = AppsHubService::new()
        .await?
        .list_access_for_tenant(tenant_id)
        .await?;
    Ok(ApiResponse::success(rows))
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    #[serde(default = "default_period")]
    pub period: AnalyticsPeriod,
}

fn default_period() -> AnalyticsPeriod {
    AnalyticsPeriod::Week
}

/// GET `/api/global-analytics` — usage buckets over a rolling window.
pub async fn global_analytics(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AnalyticsQuery>,
) -> ApiResult<Vec<UsageBucket>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ViewGlobalAnalytics)
        .check()?;

    let buckets = AppsHubService::new()
        .await?
        .global_usage_analytics(query.period)
        .await?;
    Ok(ApiResponse::success(buckets))
}

#[derive(Debug, Deserialize)]
pub struct PopularQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    10
}

/// GET `/api/global-popular-apps` — catalog ranked by usage volume.
pub async fn global_popular_apps(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<PopularQuery>,
) -> ApiResult<Vec<PopularApp>> {
    AccessGuard::new(&tenant.0, Some(&user))
        .require_permission(Permission::ViewGlobalAnalytics)
        .check()?;

    let apps = AppsHubService::new()
        .await?
        .global_popular_apps(query.limit)
        .await?;
    Ok(ApiResponse::success(apps))
}
