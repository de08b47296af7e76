//! Uniform CRUD surface over the institution-scoped entity catalog.
//!
//! One handler set serves every entity family; the path slug selects the
//! catalog entry and the guard chain decides whether the caller may touch
//! it. Every query is scoped to the caller's institution.

use axum::{extract::Path, Extension, Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::entity::EntityKind;
use crate::error::ApiError;
use crate::guard::AccessGuard;
use crate::middleware::{ApiResponse, ApiResult, CurrentTenant, CurrentUser};
use crate::services::{AuditService, CrudService};

fn parse_kind(slug: &str) -> Result<EntityKind, ApiError> {
    EntityKind::from_slug(slug)
        .ok_or_else(|| ApiError::not_found(format!("Unknown resource type '{}'", slug)))
}

fn read_scope(
    tenant: &CurrentTenant,
    user: &CurrentUser,
    kind: EntityKind,
) -> Result<Uuid, ApiError> {
    let mut guard = AccessGuard::new(&tenant.0, Some(user)).require_user();
    if let Some(flag) = kind.required_feature() {
        guard = guard.require_feature(flag);
    }
    if let Some(permission) = kind.read_permission() {
        guard = guard.require_permission(permission);
    }
    guard.check_institution()
}

fn write_scope(
    tenant: &CurrentTenant,
    user: &CurrentUser,
    kind: EntityKind,
) -> Result<Uuid, ApiError> {
    let mut guard = AccessGuard::new(&tenant.0, Some(user)).require_user();
    if let Some(flag) = kind.required_feature() {
        guard = guard.require_feature(flag);
    }
    guard
        .require_permission(kind.write_permission())
        .check_institution()
}

pub async fn list(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path(entity): Path<String>,
) -> ApiResult<Vec<Value>> {
    let kind = parse_kind(&entity)?;
    let institution_id = read_scope(&tenant, &user, kind)?;

    let rows = CrudService::new().await?.list(kind, institution_id).await?;
    Ok(ApiResponse::success(rows))
}

pub async fn get(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path((entity, id)): Path<(String, Uuid)>,
) -> ApiResult<Value> {
    let kind = parse_kind(&entity)?;
    let institution_id = read_scope(&tenant, &user, kind)?;

    let row = CrudService::new().await?.get(kind, institution_id, id).await?;
    Ok(ApiResponse::success(row))
}

pub async fn create(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path(entity): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let kind = parse_kind(&entity)?;
    let institution_id = write_scope(&tenant, &user, kind)?;

    let row = CrudService::new().await?.create(kind, institution_id, &body).await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        &format!("{}.create", kind.slug()),
        json!({ "id": row.get("id") }),
    );
    Ok(ApiResponse::created(row))
}

pub async fn update(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path((entity, id)): Path<(String, Uuid)>,
    Json(patch): Json<Value>,
) -> ApiResult<Value> {
    let kind = parse_kind(&entity)?;
    let institution_id = write_scope(&tenant, &user, kind)?;

    let row = CrudService::new()
        .await?
        .update(kind, institution_id, id, &patch)
        .await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        &format!("{}.update", kind.slug()),
        json!({ "id": id }),
    );
    Ok(ApiResponse::success(row))
}

pub async fn delete(
    Extension(tenant): Extension<CurrentTenant>,
    Extension(user): Extension<CurrentUser>,
    Path((entity, id)): Path<(String, Uuid)>,
) -> ApiResult<Value> {
    let kind = parse_kind(&entity)?;
    let institution_id = write_scope(&tenant, &user, kind)?;

    CrudService::new().await?.delete(kind, institution_id, id).await?;
    AuditService::record(
        tenant.0.id,
        user.id,
        &format!("{}.delete", kind.slug()),
        json!({ "id": id }),
    );
    Ok(ApiResponse::success(json!({ "deleted": true })))
}
