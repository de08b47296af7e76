use axum::{
    extract::Request,
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use uuid::Uuid;

use super::auth::AuthClaims;
use super::resolve_tenant::CurrentTenant;
use crate::database::manager::DatabaseManager;
use crate::database::models::user::User;
use crate::error::ApiError;
use crate::roles::{Permission, Role};

/// Resolved principal for the current request: the user row re-validated
/// against the store, with role and effective grants parsed.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub full_name: String,
    pub role: Role,
    pub grants: Vec<Permission>,
}

/// Middleware that loads the authenticated user's record within the resolved
/// tenant. Token claims are never trusted for authorization; only the row is.
pub async fn resolve_user_middleware(
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<AuthClaims>()
        .ok_or_else(|| {
            ApiError::unauthenticated("Authentication required before user resolution")
        })?
        .clone();

    let CurrentTenant(tenant) = request
        .extensions()
        .get::<CurrentTenant>()
        .ok_or_else(|| ApiError::internal("Tenant must be resolved before user resolution"))?
        .clone();

    let pool = DatabaseManager::pool().await?;
    let user = load_user(&pool, claims.user_id, tenant.id).await?;

    if !user.is_active {
        tracing::warn!(
            "User resolution failed: user '{}' is deactivated in tenant '{}'",
            user.id,
            tenant.subdomain
        );
        return Err(ApiError::forbidden("User account is deactivated"));
    }

    let role = user.role().ok_or_else(|| {
        tracing::error!("User '{}' carries unrecognized role '{}'", user.id, user.role);
        ApiError::forbidden("User role is not recognized")
    })?;

    let current_user = CurrentUser {
        id: user.id,
        tenant_id: user.tenant_id,
        institution_id: user.institution_id,
        full_name: user.full_name.clone(),
        role,
        grants: user.grants(),
    };

    tracing::debug!(
        "User resolution successful: {} ({}) in tenant '{}'",
        current_user.full_name,
        current_user.role.as_str(),
        tenant.subdomain
    );

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

async fn load_user(pool: &PgPool, user_id: Uuid, tenant_id: Uuid) -> Result<User, ApiError> {
    let row = sqlx::query_as::<_, User>(
        r#"
        SELECT id, tenant_id, institution_id, full_name, email, role,
               extra_permissions, is_active, created_at, updated_at
        FROM users
        WHERE id = $1 AND tenant_id = $2
        "#,
    )
    .bind(user_id)
    .bind(tenant_id)
    .fetch_optional(pool)
    .await?;

    row.ok_or_else(|| {
        tracing::warn!(
            "User resolution failed: no user '{}' in tenant '{}'",
            user_id,
            tenant_id
        );
        ApiError::unauthenticated("Unknown user")
    })
}
