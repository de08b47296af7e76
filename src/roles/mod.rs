//! Static role -> permission and role -> rank tables.
//!
//! Both tables are configuration data loaded once at process start; nothing
//! mutates them at runtime. A user's effective permission set is the union of
//! their role's static permissions and any explicit grants on the user record.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PlatformAdmin,
    SchoolAdmin,
    Teacher,
    Librarian,
    Parent,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PlatformAdmin => "platform_admin",
            Role::SchoolAdmin => "school_admin",
            Role::Teacher => "teacher",
            Role::Librarian => "librarian",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "platform_admin" => Some(Role::PlatformAdmin),
            "school_admin" => Some(Role::SchoolAdmin),
            "teacher" => Some(Role::Teacher),
            "librarian" => Some(Role::Librarian),
            "parent" => Some(Role::Parent),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ManageTenants,
    ManageAppsHub,
    ViewGlobalAnalytics,
    ManageStudents,
    ViewStudentRecords,
    ManageTeachers,
    ManageClasses,
    ManageSubjects,
    ManageLibrary,
    BorrowLibrary,
    ManageSchedule,
    ViewSchedule,
    RecordAttendance,
    ViewAttendance,
    ManageNotifications,
    ManageLockers,
    ManageLicenses,
    ManageDevices,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageTenants => "manage_tenants",
            Permission::ManageAppsHub => "manage_apps_hub",
            Permission::ViewGlobalAnalytics => "view_global_analytics",
            Permission::ManageStudents => "manage_students",
            Permission::ViewStudentRecords => "view_student_records",
            Permission::ManageTeachers => "manage_teachers",
            Permission::ManageClasses => "manage_classes",
            Permission::ManageSubjects => "manage_subjects",
            Permission::ManageLibrary => "manage_library",
            Permission::BorrowLibrary => "borrow_library",
            Permission::ManageSchedule => "manage_schedule",
            Permission::ViewSchedule => "view_schedule",
            Permission::RecordAttendance => "record_attendance",
            Permission::ViewAttendance => "view_attendance",
            Permission::ManageNotifications => "manage_notifications",
            Permission::ManageLockers => "manage_lockers",
            Permission::ManageLicenses => "manage_licenses",
            Permission::ManageDevices => "manage_devices",
        }
    }

    pub fn parse(s: &str) -> Option<Permission> {
        use Permission::*;
        match s {
            "manage_tenants" => Some(ManageTenants),
            "manage_apps_hub" => Some(ManageAppsHub),
            "view_global_analytics" => Some(ViewGlobalAnalytics),
            "manage_students" => Some(ManageStudents),
            "view_student_records" => Some(ViewStudentRecords),
            "manage_teachers" => Some(ManageTeachers),
            "manage_classes" => Some(ManageClasses),
            "manage_subjects" => Some(ManageSubjects),
            "manage_library" => Some(ManageLibrary),
            "borrow_library" => Some(BorrowLibrary),
            "manage_schedule" => Some(ManageSchedule),
            "view_schedule" => Some(ViewSchedule),
            "record_attendance" => Some(RecordAttendance),
            "view_attendance" => Some(ViewAttendance),
            "manage_notifications" => Some(ManageNotifications),
            "manage_lockers" => Some(ManageLockers),
            "manage_licenses" => Some(ManageLicenses),
            "manage_devices" => Some(ManageDevices),
            _ => None,
        }
    }
}

/// Permissions granted unconditionally by each role.
pub static ROLE_PERMISSIONS: Lazy<HashMap<Role, HashSet<Permission>>> = Lazy::new(|| {
    use Permission::*;

    let mut table = HashMap::new();

    table.insert(
        Role::PlatformAdmin,
        HashSet::from([
            ManageTenants,
            ManageAppsHub,
            ViewGlobalAnalytics,
            ManageStudents,
            ViewStudentRecords,
            ManageTeachers,
            ManageClasses,
            ManageSubjects,
            ManageLibrary,
            BorrowLibrary,
            ManageSchedule,
            ViewSchedule,
            RecordAttendance,
            ViewAttendance,
            ManageNotifications,
            ManageLockers,
            ManageLicenses,
            ManageDevices,
        ]),
    );

    table.insert(
        Role::SchoolAdmin,
        HashSet::from([
            ManageStudents,
            ViewStudentRecords,
            ManageTeachers,
            ManageClasses,
            ManageSubjects,
            ManageLibrary,
            ManageSchedule,
            ViewSchedule,
            RecordAttendance,
            ViewAttendance,
            ManageNotifications,
            ManageLockers,
            ManageLicenses,
            ManageDevices,
        ]),
    );

    table.insert(
        Role::Teacher,
        HashSet::from([
            ViewStudentRecords,
            ManageClasses,
            ViewSchedule,
            RecordAttendance,
            ViewAttendance,
            BorrowLibrary,
        ]),
    );

    table.insert(
        Role::Librarian,
        HashSet::from([ManageLibrary, BorrowLibrary, ViewSchedule]),
    );

    table.insert(Role::Parent, HashSet::from([ViewSchedule, ViewAttendance]));

    table.insert(
        Role::Student,
        HashSet::from([ViewSchedule, BorrowLibrary]),
    );

    table
});

/// Numeric rank used only for "can this role administratively act on that
/// role" comparisons. Strictly greater wins; peers never manage each other.
pub static ROLE_RANK: Lazy<HashMap<Role, u8>> = Lazy::new(|| {
    HashMap::from([
        (Role::PlatformAdmin, 100),
        (Role::SchoolAdmin, 80),
        (Role::Teacher, 60),
        (Role::Librarian, 50),
        (Role::Parent, 30),
        (Role::Student, 10),
    ])
});

/// Effective permission check: role permissions are a lower bound that
/// explicit grants can only extend, never revoke.
pub fn has_permission(role: Role, grants: &[Permission], required: Permission) -> bool {
    ROLE_PERMISSIONS
        .get(&role)
        .map(|set| set.contains(&required))
        .unwrap_or(false)
        || grants.contains(&required)
}

pub fn has_any_permission(role: Role, grants: &[Permission], required: &[Permission]) -> bool {
    required.iter().any(|p| has_permission(role, grants, *p))
}

pub fn has_all_permissions(role: Role, grants: &[Permission], required: &[Permission]) -> bool {
    required.iter().all(|p| has_permission(role, grants, *p))
}

/// Strict rank inequality: irreflexive, so no role manages its own peers.
pub fn can_manage(actor: Role, target: Role) -> bool {
    let actor_rank = ROLE_RANK.get(&actor).copied().unwrap_or(0);
    let target_rank = ROLE_RANK.get(&target).copied().unwrap_or(0);
    actor_rank > target_rank
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_permissions_are_a_lower_bound() {
        // Whatever the static table grants holds with or without explicit grants
        for (role, perms) in ROLE_PERMISSIONS.iter() {
            for p in perms {
                assert!(has_permission(*role, &[], *p));
                assert!(has_permission(*role, &[Permission::ManageLockers], *p));
            }
        }
    }

    #[test]
    fn explicit_grants_extend_role_permissions() {
        assert!(!has_permission(Role::Student, &[], Permission::ManageLibrary));
        assert!(has_permission(
            Role::Student,
            &[Permission::ManageLibrary],
            Permission::ManageLibrary
        ));
    }

    #[test]
    fn any_and_all_quantify_over_required_sets() {
        let required = [Permission::ManageClasses, Permission::ManageDevices];
        assert!(has_any_permission(Role::Teacher, &[], &required));
        assert!(!has_all_permissions(Role::Teacher, &[], &required));
        assert!(has_all_permissions(Role::SchoolAdmin, &[], &required));
    }

    #[test]
    fn can_manage_is_irreflexive() {
        for role in [
            Role::PlatformAdmin,
            Role::SchoolAdmin,
            Role::Teacher,
            Role::Librarian,
            Role::Parent,
            Role::Student,
        ] {
            assert!(!can_manage(role, role));
        }
    }

    #[test]
    fn can_manage_requires_strictly_higher_rank() {
        assert!(can_manage(Role::SchoolAdmin, Role::Teacher));
        assert!(!can_manage(Role::Teacher, Role::SchoolAdmin));
        assert!(can_manage(Role::PlatformAdmin, Role::Student));
        // equal ranks never manage each other in either direction
        for (r1, rank1) in ROLE_RANK.iter() {
            for (r2, rank2) in ROLE_RANK.iter() {
                if rank1 <= rank2 {
                    assert!(!can_manage(*r1, *r2), "{:?} should not manage {:?}", r1, r2);
                }
            }
        }
    }

    #[test]
    fn role_tags_round_trip() {
        for role in [
            Role::PlatformAdmin,
            Role::SchoolAdmin,
            Role::Teacher,
            Role::Librarian,
            Role::Parent,
            Role::Student,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("janitor"), None);
    }
}
