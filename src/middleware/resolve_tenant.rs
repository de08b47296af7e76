use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

use crate::config;
use crate::database::models::tenant::Tenant;
use crate::error::ApiError;
use crate::is_development;
use crate::services::{TenantError, TenantService};
use crate::tenancy::{resolve_host, HostResolution};

/// Resolved tenant for the current request, injected by middleware.
#[derive(Clone, Debug)]
pub struct CurrentTenant(pub Tenant);

/// Middleware that maps the request host to a tenant and attaches it to the
/// request. Outside development, an unrecognized host fails the whole
/// request with 404.
pub async fn resolve_tenant_middleware(
    Extension(tenant_service): Extension<TenantService>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let host = request
        .headers()
        .get(axum::http::header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
        .to_string();

    let override_param = tenant_override(request.uri().query());
    let default_tenant = &config::config().tenancy.default_tenant;

    let candidate = match resolve_host(&host, override_param.as_deref(), default_tenant) {
        HostResolution::Subdomain(subdomain) => subdomain,
        HostResolution::Local(tenant) => tenant,
        HostResolution::Apex => {
            if is_development!() {
                default_tenant.clone()
            } else {
                return Err(ApiError::tenant_not_found(format!(
                    "No institution is registered for host '{}'",
                    host
                )));
            }
        }
    };

    let tenant = match tenant_service.find_by_subdomain(&candidate).await {
        Ok(tenant) => tenant,
        // Development keeps working against the fallback tenant even when a
        // crafted host names something that doesn't exist
        Err(TenantError::NotFound(_)) if is_development!() && candidate != *default_tenant => {
            tenant_service.find_by_subdomain(default_tenant).await?
        }
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(
        "Tenant resolution successful: {} ({})",
        tenant.name,
        tenant.subdomain
    );

    request.extensions_mut().insert(CurrentTenant(tenant));
    Ok(next.run(request).await)
}

/// In non-production contexts the tenant may be forced with ?tenant=<id>
fn tenant_override(query: Option<&str>) -> Option<String> {
    let query = query?;
    query.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        match (parts.next(), parts.next()) {
            (Some("tenant"), Some(value)) if !value.is_empty() => Some(value.to_string()),
            _ => None,
        }
    })
}
