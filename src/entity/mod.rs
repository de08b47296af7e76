//! Catalog of the institution-scoped entity families the CRUD layer serves.
//!
//! Every family maps a URL slug to its table, column spec, the feature flag
//! the tenant must carry, and the permissions that gate reads and writes.
//! The set is closed: table names never come from the request, so dynamic
//! statements stay injection-safe.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::bind::SqlParam;
use crate::error::ApiError;
use crate::roles::Permission;
use crate::tenancy::FeatureFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Student,
    Teacher,
    Class,
    Subject,
    LibraryResource,
    Schedule,
    Attendance,
    Notification,
    LockerItem,
    License,
    Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Bool,
    Int,
    Float,
    Uuid,
    Timestamp,
    Date,
    Json,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub required: bool,
}

const fn required(name: &'static str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec {
        name,
        column_type,
        required: true,
    }
}

const fn optional(name: &'static str, column_type: ColumnType) -> ColumnSpec {
    ColumnSpec {
        name,
        column_type,
        required: false,
    }
}

const STUDENT_COLUMNS: &[ColumnSpec] = &[
    required("first_name", ColumnType::Text),
    required("last_name", ColumnType::Text),
    required("admission_number", ColumnType::Text),
    optional("class_id", ColumnType::Uuid),
    optional("guardian_contact", ColumnType::Text),
    optional("date_of_birth", ColumnType::Date),
];

const TEACHER_COLUMNS: &[ColumnSpec] = &[
    required("first_name", ColumnType::Text),
    required("last_name", ColumnType::Text),
    required("staff_number", ColumnType::Text),
    optional("email", ColumnType::Text),
    optional("phone", ColumnType::Text),
];

const CLASS_COLUMNS: &[ColumnSpec] = &[
    required("name", ColumnType::Text),
    optional("grade_level", ColumnType::Int),
    optional("stream", ColumnType::Text),
    optional("teacher_id", ColumnType::Uuid),
];

const SUBJECT_COLUMNS: &[ColumnSpec] = &[
    required("name", ColumnType::Text),
    required("code", ColumnType::Text),
    optional("department", ColumnType::Text),
];

const LIBRARY_RESOURCE_COLUMNS: &[ColumnSpec] = &[
    required("title", ColumnType::Text),
    optional("author", ColumnType::Text),
    optional("isbn", ColumnType::Text),
    optional("category", ColumnType::Text),
    optional("copies", ColumnType::Int),
];

const SCHEDULE_COLUMNS: &[ColumnSpec] = &[
    required("class_id", ColumnType::Uuid),
    required("subject_id", ColumnType::Uuid),
    required("day_of_week", ColumnType::Int),
    required("starts_at", ColumnType::Text),
    required("ends_at", ColumnType::Text),
];

const ATTENDANCE_COLUMNS: &[ColumnSpec] = &[
    required("student_id", ColumnType::Uuid),
    required("class_id", ColumnType::Uuid),
    required("date", ColumnType::Date),
    required("status", ColumnType::Text),
    optional("recorded_by", ColumnType::Uuid),
];

const NOTIFICATION_COLUMNS: &[ColumnSpec] = &[
    required("title", ColumnType::Text),
    required("body", ColumnType::Text),
    optional("audience", ColumnType::Text),
    optional("published_at", ColumnType::Timestamp),
];

const LOCKER_ITEM_COLUMNS: &[ColumnSpec] = &[
    required("owner_id", ColumnType::Uuid),
    required("label", ColumnType::Text),
    optional("resource_url", ColumnType::Text),
    optional("metadata", ColumnType::Json),
];

const LICENSE_COLUMNS: &[ColumnSpec] = &[
    required("product", ColumnType::Text),
    optional("vendor", ColumnType::Text),
    optional("seats", ColumnType::Int),
    optional("expires_at", ColumnType::Date),
];

const DEVICE_COLUMNS: &[ColumnSpec] = &[
    required("serial_number", ColumnType::Text),
    optional("model", ColumnType::Text),
    optional("assigned_to", ColumnType::Uuid),
    optional("status", ColumnType::Text),
];

impl EntityKind {
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Student,
        EntityKind::Teacher,
        EntityKind::Class,
        EntityKind::Subject,
        EntityKind::LibraryResource,
        EntityKind::Schedule,
        EntityKind::Attendance,
        EntityKind::Notification,
        EntityKind::LockerItem,
        EntityKind::License,
        EntityKind::Device,
    ];

    /// URL path segment under /api/:entity
    pub fn from_slug(slug: &str) -> Option<EntityKind> {
        match slug {
            "students" => Some(EntityKind::Student),
            "teachers" => Some(EntityKind::Teacher),
            "classes" => Some(EntityKind::Class),
            "subjects" => Some(EntityKind::Subject),
            "library-resources" => Some(EntityKind::LibraryResource),
            "schedules" => Some(EntityKind::Schedule),
            "attendance" => Some(EntityKind::Attendance),
            "notifications" => Some(EntityKind::Notification),
            "locker-items" => Some(EntityKind::LockerItem),
            "licenses" => Some(EntityKind::License),
            "devices" => Some(EntityKind::Device),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Teacher => "teachers",
            EntityKind::Class => "classes",
            EntityKind::Subject => "subjects",
            EntityKind::LibraryResource => "library-resources",
            EntityKind::Schedule => "schedules",
            EntityKind::Attendance => "attendance",
            EntityKind::Notification => "notifications",
            EntityKind::LockerItem => "locker-items",
            EntityKind::License => "licenses",
            EntityKind::Device => "devices",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Student => "students",
            EntityKind::Teacher => "teachers",
            EntityKind::Class => "classes",
            EntityKind::Subject => "subjects",
            EntityKind::LibraryResource => "library_resources",
            EntityKind::Schedule => "schedule_entries",
            EntityKind::Attendance => "attendance_records",
            EntityKind::Notification => "notifications",
            EntityKind::LockerItem => "locker_items",
            EntityKind::License => "software_licenses",
            EntityKind::Device => "devices",
        }
    }

    /// Feature flag the tenant must carry; None for the core school entities
    /// every subscription includes.
    pub fn required_feature(&self) -> Option<FeatureFlag> {
        match self {
            EntityKind::Student | EntityKind::Teacher | EntityKind::Class | EntityKind::Subject => {
                None
            }
            EntityKind::LibraryResource => Some(FeatureFlag::Library),
            EntityKind::Schedule => Some(FeatureFlag::Schedule),
            EntityKind::Attendance => Some(FeatureFlag::Attendance),
            EntityKind::Notification => Some(FeatureFlag::Notifications),
            EntityKind::LockerItem => Some(FeatureFlag::Lockers),
            EntityKind::License => Some(FeatureFlag::Licenses),
            EntityKind::Device => Some(FeatureFlag::Devices),
        }
    }

    /// Permission required to read; None means any authenticated tenant user.
    pub fn read_permission(&self) -> Option<Permission> {
        match self {
            EntityKind::Student => Some(Permission::ViewStudentRecords),
            EntityKind::Schedule => Some(Permission::ViewSchedule),
            EntityKind::Attendance => Some(Permission::ViewAttendance),
            _ => None,
        }
    }

    /// Permission required for create/update/delete.
    pub fn write_permission(&self) -> Permission {
        match self {
            EntityKind::Student => Permission::ManageStudents,
            EntityKind::Teacher => Permission::ManageTeachers,
            EntityKind::Class => Permission::ManageClasses,
            EntityKind::Subject => Permission::ManageSubjects,
            EntityKind::LibraryResource => Permission::ManageLibrary,
            EntityKind::Schedule => Permission::ManageSchedule,
            EntityKind::Attendance => Permission::RecordAttendance,
            EntityKind::Notification => Permission::ManageNotifications,
            EntityKind::LockerItem => Permission::ManageLockers,
            EntityKind::License => Permission::ManageLicenses,
            EntityKind::Device => Permission::ManageDevices,
        }
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            EntityKind::Student => STUDENT_COLUMNS,
            EntityKind::Teacher => TEACHER_COLUMNS,
            EntityKind::Class => CLASS_COLUMNS,
            EntityKind::Subject => SUBJECT_COLUMNS,
            EntityKind::LibraryResource => LIBRARY_RESOURCE_COLUMNS,
            EntityKind::Schedule => SCHEDULE_COLUMNS,
            EntityKind::Attendance => ATTENDANCE_COLUMNS,
            EntityKind::Notification => NOTIFICATION_COLUMNS,
            EntityKind::LockerItem => LOCKER_ITEM_COLUMNS,
            EntityKind::License => LICENSE_COLUMNS,
            EntityKind::Device => DEVICE_COLUMNS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// All required columns must be present
    Create,
    /// Any subset of known columns; empty patches are rejected
    Update,
}

/// Validate a JSON payload against the entity's column spec, producing the
/// typed (column, parameter) list the statement builder binds.
pub fn validate_payload(
    kind: EntityKind,
    body: &Value,
    mode: ValidationMode,
) -> Result<Vec<(&'static str, SqlParam)>, ApiError> {
    let obj = body
        .as_object()
        .ok_or_else(|| ApiError::bad_request("Request body must be a JSON object"))?;

    let columns = kind.columns();
    let mut field_errors: HashMap<String, String> = HashMap::new();
    let mut out: Vec<(&'static str, SqlParam)> = Vec::new();

    for key in obj.keys() {
        if !columns.iter().any(|c| c.name == key) {
            field_errors.insert(key.clone(), "Unknown field".to_string());
        }
    }

    for spec in columns {
        match obj.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required && mode == ValidationMode::Create {
                    field_errors.insert(spec.name.to_string(), "This field is required".to_string());
                } else if obj.contains_key(spec.name) && !spec.required {
                    // explicit null clears an optional column
                    out.push((spec.name, SqlParam::Null(spec.column_type)));
                } else if obj.contains_key(spec.name) && spec.required {
                    field_errors.insert(spec.name.to_string(), "This field cannot be null".to_string());
                }
            }
            Some(value) => match coerce(spec, value) {
                Ok(param) => out.push((spec.name, param)),
                Err(msg) => {
                    field_errors.insert(spec.name.to_string(), msg);
                }
            },
        }
    }

    if !field_errors.is_empty() {
        return Err(ApiError::validation_error(
            "Request payload failed validation",
            Some(field_errors),
        ));
    }

    if mode == ValidationMode::Update && out.is_empty() {
        return Err(ApiError::bad_request("Update payload must set at least one field"));
    }

    Ok(out)
}

fn coerce(spec: &ColumnSpec, value: &Value) -> Result<SqlParam, String> {
    match spec.column_type {
        ColumnType::Text => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(SqlParam::Text(s.clone())),
            Value::String(_) => Err("Must not be empty".to_string()),
            _ => Err("Expected a string".to_string()),
        },
        ColumnType::Bool => value
            .as_bool()
            .map(SqlParam::Bool)
            .ok_or_else(|| "Expected a boolean".to_string()),
        ColumnType::Int => value
            .as_i64()
            .map(SqlParam::Int)
            .ok_or_else(|| "Expected an integer".to_string()),
        ColumnType::Float => value
            .as_f64()
            .map(SqlParam::Float)
            .ok_or_else(|| "Expected a number".to_string()),
        ColumnType::Uuid => match value.as_str().map(Uuid::parse_str) {
            Some(Ok(u)) => Ok(SqlParam::Uuid(u)),
            Some(Err(_)) => Err(format!("Invalid UUID format: {}", value)),
            None => Err("Expected a UUID string".to_string()),
        },
        ColumnType::Timestamp => match value.as_str().map(|s| s.parse::<DateTime<Utc>>()) {
            Some(Ok(ts)) => Ok(SqlParam::Timestamp(ts)),
            Some(Err(_)) => Err(format!("Invalid timestamp format: {}", value)),
            None => Err("Expected an RFC 3339 timestamp string".to_string()),
        },
        ColumnType::Date => match value.as_str().map(|s| s.parse::<NaiveDate>()) {
            Some(Ok(d)) => Ok(SqlParam::Date(d)),
            Some(Err(_)) => Err(format!("Invalid date format: {}", value)),
            None => Err("Expected a YYYY-MM-DD date string".to_string()),
        },
        ColumnType::Json => match value {
            Value::Object(_) | Value::Array(_) => Ok(SqlParam::Json(value.clone())),
            _ => Err("Expected a JSON object or array".to_string()),
        },
    }
}

/// Strip server-managed fields from a row before echoing it to clients.
pub fn present_row(mut row: Map<String, Value>) -> Map<String, Value> {
    row.remove("institution_id");
    row.remove("tenant_id");
    row
}
