use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::roles::{Permission, Role};

/// Platform user row. Role is immutable post-assignment; explicit grants can
/// extend (but never revoke) what the role's static table provides.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub institution_id: Option<Uuid>,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub extra_permissions: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    pub fn grants(&self) -> Vec<Permission> {
        self.extra_permissions
            .iter()
            .filter_map(|s| Permission::parse(s))
            .collect()
    }
}
