//! Uniform institution-scoped CRUD over the entity catalog.
//!
//! Every statement carries an equality filter on the owning institution id;
//! there is no cross-institution query path. Statements are assembled from
//! the closed catalog (table and column names are compile-time constants)
//! and all client values arrive pre-validated as typed parameters.

use serde_json::Value;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::bind::{bind_params, SqlParam};
use crate::database::manager::DatabaseManager;
use crate::entity::{present_row, validate_payload, EntityKind, ValidationMode};
use crate::error::ApiError;

#[derive(Clone)]
pub struct CrudService {
    pool: PgPool,
}

impl CrudService {
    pub async fn new() -> Result<Self, ApiError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Validate and insert. Not idempotent: repeated calls create duplicate
    /// rows unless a uniqueness constraint rejects them (surfaced as 409).
    pub async fn create(
        &self,
        kind: EntityKind,
        institution_id: Uuid,
        body: &Value,
    ) -> Result<Value, ApiError> {
        let fields = validate_payload(kind, body, ValidationMode::Create)?;

        let mut columns = vec!["institution_id".to_string()];
        let mut placeholders = vec!["$1".to_string()];
        let mut params = vec![SqlParam::Uuid(institution_id)];

        for (i, (name, param)) in fields.into_iter().enumerate() {
            columns.push(format!("\"{}\"", name));
            placeholders.push(format!("${}", i + 2));
            params.push(param);
        }

        let sql = format!(
            "INSERT INTO \"{table}\" ({columns}) VALUES ({placeholders}) RETURNING row_to_json(\"{table}\".*) AS row",
            table = kind.table(),
            columns = columns.join(", "),
            placeholders = placeholders.join(", "),
        );

        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_one(&self.pool)
            .await?;

        Ok(row_json(row.try_get("row")?))
    }

    pub async fn list(
        &self,
        kind: EntityKind,
        institution_id: Uuid,
    ) -> Result<Vec<Value>, ApiError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{table}\" WHERE \"institution_id\" = $1 ORDER BY created_at DESC) t",
            table = kind.table(),
        );

        let rows = sqlx::query(&sql)
            .bind(institution_id)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(row_json(row.try_get("row")?));
        }
        Ok(out)
    }

    pub async fn get(
        &self,
        kind: EntityKind,
        institution_id: Uuid,
        id: Uuid,
    ) -> Result<Value, ApiError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM (SELECT * FROM \"{table}\" WHERE id = $1 AND \"institution_id\" = $2) t",
            table = kind.table(),
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .bind(institution_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row_json(row.try_get("row")?)),
            None => Err(ApiError::not_found(format!(
                "No {} record with id {}",
                kind.slug(),
                id
            ))),
        }
    }

    /// Idempotent for identical payloads; unknown id is NotFound.
    pub async fn update(
        &self,
        kind: EntityKind,
        institution_id: Uuid,
        id: Uuid,
        patch: &Value,
    ) -> Result<Value, ApiError> {
        let fields = validate_payload(kind, patch, ValidationMode::Update)?;

        let mut assignments = Vec::with_capacity(fields.len() + 1);
        let mut params = Vec::with_capacity(fields.len() + 2);
        for (i, (name, param)) in fields.into_iter().enumerate() {
            assignments.push(format!("\"{}\" = ${}", name, i + 1));
            params.push(param);
        }
        assignments.push("updated_at = NOW()".to_string());

        let id_idx = params.len() + 1;
        let scope_idx = params.len() + 2;
        params.push(SqlParam::Uuid(id));
        params.push(SqlParam::Uuid(institution_id));

        let sql = format!(
            "UPDATE \"{table}\" SET {assignments} WHERE id = ${id_idx} AND \"institution_id\" = ${scope_idx} RETURNING row_to_json(\"{table}\".*) AS row",
            table = kind.table(),
            assignments = assignments.join(", "),
        );

        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row_json(row.try_get("row")?)),
            None => Err(ApiError::not_found(format!(
                "No {} record with id {}",
                kind.slug(),
                id
            ))),
        }
    }

    /// Idempotent delete: removing an id that is already gone is a no-op
    /// success, never an error.
    pub async fn delete(
        &self,
        kind: EntityKind,
        institution_id: Uuid,
        id: Uuid,
    ) -> Result<(), ApiError> {
        let sql = format!(
            "DELETE FROM \"{table}\" WHERE id = $1 AND \"institution_id\" = $2",
            table = kind.table(),
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(institution_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn row_json(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(present_row(map)),
        other => other,
    }
}
