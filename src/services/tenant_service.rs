use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::tenant::Tenant;

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Tenant not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for TenantError {
    fn from(err: sqlx::Error) -> Self {
        TenantError::Database(DatabaseError::Sqlx(err))
    }
}

/// Directory of provisioned tenants. Looked up on every request, so reads go
/// through a TTL cache keyed by subdomain. The pool is acquired lazily per
/// call so the service can be constructed before the database is reachable.
#[derive(Clone)]
pub struct TenantService {
    cache: TtlCache<Tenant>,
}

impl TenantService {
    pub fn new() -> Self {
        let ttl = config::config().tenancy.directory_cache_ttl_secs;
        Self::with_cache_ttl(Duration::from_secs(ttl))
    }

    pub fn with_cache_ttl(cache_ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(cache_ttl),
        }
    }

    async fn pool(&self) -> Result<PgPool, TenantError> {
        Ok(DatabaseManager::pool().await?)
    }

    /// Resolve a subdomain to its tenant, failing with NotFound for unknown
    /// or deactivated tenants.
    pub async fn find_by_subdomain(&self, subdomain: &str) -> Result<Tenant, TenantError> {
        if let Some(tenant) = self.cache.get(subdomain).await {
            return Ok(tenant);
        }

        let row = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, subdomain, name, enabled_features, subscription_tier,
                   is_active, created_at, updated_at
            FROM tenants
            WHERE subdomain = $1 AND is_active = true
            "#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool().await?)
        .await?;

        let tenant = row.ok_or_else(|| TenantError::NotFound(subdomain.to_string()))?;
        self.cache.set(subdomain, tenant.clone()).await;
        Ok(tenant)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Tenant, TenantError> {
        let row = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT id, subdomain, name, enabled_features, subscription_tier,
                   is_active, created_at, updated_at
            FROM tenants
            WHERE id = $1 AND is_active = true
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool().await?)
        .await?;

        row.ok_or_else(|| TenantError::NotFound(id.to_string()))
    }

    /// Drop a cached directory entry, e.g. after an operator edits the tenant
    pub async fn invalidate(&self, subdomain: &str) {
        self.cache.invalidate(subdomain).await;
    }
}
