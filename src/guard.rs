//! Resource access guard: the composable checks every domain operation runs
//! before touching the store.
//!
//! Checks compose by short-circuit AND; the first failing check fixes the
//! error the caller sees, and nothing before the final check has side
//! effects.

use uuid::Uuid;

use crate::database::models::tenant::Tenant;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::roles::{has_all_permissions, has_any_permission, has_permission, Permission};
use crate::tenancy::FeatureFlag;

pub struct AccessGuard<'a> {
    tenant: &'a Tenant,
    user: Option<&'a CurrentUser>,
    failure: Option<ApiError>,
}

impl<'a> AccessGuard<'a> {
    pub fn new(tenant: &'a Tenant, user: Option<&'a CurrentUser>) -> Self {
        Self {
            tenant,
            user,
            failure: None,
        }
    }

    pub fn require_user(mut self) -> Self {
        if self.failure.is_none() && self.user.is_none() {
            self.failure = Some(ApiError::unauthenticated("Authentication required"));
        }
        self
    }

    pub fn require_feature(mut self, flag: FeatureFlag) -> Self {
        if self.failure.is_none() && !self.tenant.has_feature(flag) {
            self.failure = Some(ApiError::tenant_feature_disabled(format!(
                "The '{}' feature is not enabled for this institution",
                flag.as_str()
            )));
        }
        self
    }

    pub fn require_permission(mut self, required: Permission) -> Self {
        if self.failure.is_none() {
            match self.user {
                None => {
                    self.failure = Some(ApiError::unauthenticated("Authentication required"));
                }
                Some(user) if !has_permission(user.role, &user.grants, required) => {
                    self.failure = Some(ApiError::forbidden(format!(
                        "Missing required permission '{}'",
                        required.as_str()
                    )));
                }
                Some(_) => {}
            }
        }
        self
    }

    pub fn require_any_permission(mut self, required: &[Permission]) -> Self {
        if self.failure.is_none() {
            match self.user {
                None => {
                    self.failure = Some(ApiError::unauthenticated("Authentication required"));
                }
                Some(user) if !has_any_permission(user.role, &user.grants, required) => {
                    self.failure = Some(ApiError::forbidden("Insufficient permissions"));
                }
                Some(_) => {}
            }
        }
        self
    }

    pub fn require_all_permissions(mut self, required: &[Permission]) -> Self {
        if self.failure.is_none() {
            match self.user {
                None => {
                    self.failure = Some(ApiError::unauthenticated("Authentication required"));
                }
                Some(user) if !has_all_permissions(user.role, &user.grants, required) => {
                    self.failure = Some(ApiError::forbidden("Insufficient permissions"));
                }
                Some(_) => {}
            }
        }
        self
    }

    /// Some operations only make sense inside an institution scope.
    pub fn require_institution(mut self) -> Self {
        if self.failure.is_none() {
            match self.user {
                None => {
                    self.failure = Some(ApiError::unauthenticated("Authentication required"));
                }
                Some(user) if user.institution_id.is_none() => {
                    self.failure = Some(ApiError::no_institution(
                        "This operation requires an institution association",
                    ));
                }
                Some(_) => {}
            }
        }
        self
    }

    pub fn check(self) -> Result<(), ApiError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Like check, but hands back the institution scope the CRUD layer
    /// filters every statement by.
    pub fn check_institution(self) -> Result<Uuid, ApiError> {
        let user = self.user;
        self.check()?;
        user.and_then(|u| u.institution_id)
            .ok_or_else(|| {
                ApiError::no_institution("This operation requires an institution association")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Role;
    use chrono::Utc;

    fn tenant(features: &[&str]) -> Tenant {
        Tenant {
            id: Uuid::new_v4(),
            subdomain: "demo".to_string(),
            name: "Demo School".to_string(),
            enabled_features: features.iter().map(|s| s.to_string()).collect(),
            subscription_tier: "premium".to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(role: Role, institution: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            institution_id: institution.then(Uuid::new_v4),
            full_name: "Test User".to_string(),
            role,
            grants: vec![],
        }
    }

    #[test]
    fn anonymous_requests_fail_closed() {
        let t = tenant(&["library"]);
        let err = AccessGuard::new(&t, None).require_user().check().unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn missing_feature_rejects_with_distinguishing_code() {
        let t = tenant(&[]);
        let u = user(Role::SchoolAdmin, true);
        let err = AccessGuard::new(&t, Some(&u))
            .require_user()
            .require_feature(FeatureFlag::Library)
            .require_permission(Permission::ManageLibrary)
            .check()
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.error_code(), "TENANT_FEATURE_DISABLED");
    }

    #[test]
    fn missing_permission_rejects_forbidden() {
        let t = tenant(&["library"]);
        let u = user(Role::Student, true);
        let err = AccessGuard::new(&t, Some(&u))
            .require_user()
            .require_feature(FeatureFlag::Library)
            .require_permission(Permission::ManageLibrary)
            .check()
            .unwrap_err();
        assert_eq!(err.error_code(), "FORBIDDEN");
    }

    #[test]
    fn first_failing_check_determines_the_error() {
        let t = tenant(&[]);
        // Both the feature and the permission checks would fail; feature
        // comes first in the chain so its error wins
        let u = user(Role::Student, true);
        let err = AccessGuard::new(&t, Some(&u))
            .require_feature(FeatureFlag::Devices)
            .require_permission(Permission::ManageDevices)
            .check()
            .unwrap_err();
        assert_eq!(err.error_code(), "TENANT_FEATURE_DISABLED");
    }

    #[test]
    fn all_checks_passing_proceeds() {
        let t = tenant(&["library"]);
        let u = user(Role::Librarian, true);
        assert!(AccessGuard::new(&t, Some(&u))
            .require_user()
            .require_feature(FeatureFlag::Library)
            .require_permission(Permission::ManageLibrary)
            .check()
            .is_ok());
    }

    #[test]
    fn institution_scope_is_required_when_asked() {
        let t = tenant(&[]);
        let u = user(Role::SchoolAdmin, false);
        let err = AccessGuard::new(&t, Some(&u))
            .require_user()
            .require_institution()
            .check()
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_INSTITUTION");

        let scoped = user(Role::SchoolAdmin, true);
        let id = AccessGuard::new(&t, Some(&scoped))
            .require_user()
            .check_institution()
            .unwrap();
        assert_eq!(Some(id), scoped.institution_id);
    }

    #[test]
    fn explicit_grants_satisfy_permission_checks() {
        let t = tenant(&["devices"]);
        let mut u = user(Role::Teacher, true);
        u.grants = vec![Permission::ManageDevices];
        assert!(AccessGuard::new(&t, Some(&u))
            .require_feature(FeatureFlag::Devices)
            .require_permission(Permission::ManageDevices)
            .check()
            .is_ok());
    }
}
