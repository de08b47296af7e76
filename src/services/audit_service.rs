//! Fire-and-forget activity log.
//!
//! Audit writes ride on a spawned task so they can never block or fail the
//! primary operation; a failed write is logged and dropped.

use serde_json::Value;
use uuid::Uuid;

use crate::config;
use crate::database::manager::DatabaseManager;

#[derive(Clone, Copy)]
pub struct AuditService;

impl AuditService {
    /// Queue an audit entry. Returns immediately; the insert happens on its
    /// own task and any failure is swallowed after a warn log.
    pub fn record(tenant_id: Uuid, actor_id: Uuid, action: &str, detail: Value) {
        if !config::config().security.enable_audit_logging {
            return;
        }

        let action = action.to_string();
        tokio::spawn(async move {
            if let Err(e) = Self::insert(tenant_id, actor_id, &action, detail).await {
                tracing::warn!("audit log write failed for action '{}': {}", action, e);
            }
        });
    }

    async fn insert(
        tenant_id: Uuid,
        actor_id: Uuid,
        action: &str,
        detail: Value,
    ) -> Result<(), crate::database::manager::DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        sqlx::query(
            "INSERT INTO activity_log (tenant_id, actor_id, action, detail) VALUES ($1, $2, $3, $4)",
        )
        .bind(tenant_id)
        .bind(actor_id)
        .bind(action)
        .bind(detail)
        .execute(&pool)
        .await?;
        Ok(())
    }
}
