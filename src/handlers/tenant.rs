//! Public tenant resolution endpoint: who am I talking to, what can they do.

use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, CurrentTenant};

#[derive(Debug, Serialize)]
pub struct TenantInfo {
    pub id: uuid::Uuid,
    pub subdomain: String,
    pub name: String,
    pub subscription_tier: String,
    pub enabled_features: Vec<String>,
}

pub async fn get_tenant(Extension(tenant): Extension<CurrentTenant>) -> ApiResult<TenantInfo> {
    let t = tenant.0;
    Ok(ApiResponse::success(TenantInfo {
        id: t.id,
        subdomain: t.subdomain,
        name: t.name,
        subscription_tier: t.subscription_tier,
        enabled_features: t.enabled_features,
    }))
}
