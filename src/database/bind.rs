//! Typed parameter binding for dynamically assembled statements.
//!
//! CRUD statements are built per entity from the column catalog, so the
//! parameter list is only known at runtime. Values are validated into
//! `SqlParam` first; binding never sees raw client JSON.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use sqlx::postgres::PgArguments;
use uuid::Uuid;

use crate::entity::ColumnType;

/// A validated, typed statement parameter. Nulls carry the column's type so
/// the placeholder is declared with the right Postgres type; an untyped null
/// would be sent as TEXT and fail with a datatype mismatch on non-text
/// columns.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null(ColumnType),
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    TextArray(Vec<String>),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Json(Value),
}

pub fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    p: &'q SqlParam,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match p {
        SqlParam::Null(column_type) => match column_type {
            ColumnType::Text => q.bind(None::<String>),
            ColumnType::Bool => q.bind(None::<bool>),
            ColumnType::Int => q.bind(None::<i64>),
            ColumnType::Float => q.bind(None::<f64>),
            ColumnType::Uuid => q.bind(None::<Uuid>),
            ColumnType::Timestamp => q.bind(None::<DateTime<Utc>>),
            ColumnType::Date => q.bind(None::<NaiveDate>),
            ColumnType::Json => q.bind(None::<Value>),
        },
        SqlParam::Bool(b) => q.bind(*b),
        SqlParam::Int(i) => q.bind(*i),
        SqlParam::Float(f) => q.bind(*f),
        SqlParam::Text(s) => q.bind(s),
        SqlParam::TextArray(items) => q.bind(items),
        SqlParam::Uuid(u) => q.bind(*u),
        SqlParam::Timestamp(ts) => q.bind(*ts),
        SqlParam::Date(d) => q.bind(*d),
        SqlParam::Json(v) => q.bind(v.clone()),
    }
}

pub fn bind_params<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for p in params {
        q = bind_param(q, p);
    }
    q
}
