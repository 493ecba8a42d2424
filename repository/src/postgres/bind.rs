//! Binding loosely-typed JSON parameters to sqlx queries
//!
//! A parameter compared with a known column kind binds with that kind's
//! type. Only parameters without a kind (primary key lookups, caller-built
//! conditions) fall back to reading the type off the value.

use crate::query_builder::SqlParam;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::{Query, QueryScalar};
use type_mapping::{parse_temporal, value_to_text, ColumnKind, Temporal};
use uuid::Uuid;

/// The concrete type a parameter is sent as
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BindValue {
    Null,
    Text(String),
    Int(i32),
    BigInt(i64),
    Float(f64),
    Bool(bool),
    Timestamptz(DateTime<Utc>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
    Json(Value),
}

impl BindValue {
    pub(crate) fn from_param(param: SqlParam) -> Self {
        match param.kind {
            Some(kind) => Self::for_kind(kind, param.value),
            None => Self::infer(param.value),
        }
    }

    fn for_kind(kind: ColumnKind, value: Value) -> Self {
        if value.is_null() {
            return BindValue::Null;
        }
        match (kind, value) {
            // other kinds are compared as `column::text`
            (ColumnKind::String | ColumnKind::Other, value) => match value_to_text(&value) {
                Some(text) => BindValue::Text(text),
                None => BindValue::Json(value),
            },
            (ColumnKind::Numeric, Value::Number(n)) => Self::number(&n),
            (ColumnKind::Boolean, Value::Bool(b)) => BindValue::Bool(b),
            (ColumnKind::Date, Value::String(s)) => match parse_temporal(&s) {
                Some(temporal) => Self::temporal(temporal),
                None => BindValue::Text(s),
            },
            (_, value) => Self::infer(value),
        }
    }

    // Strings that look like timestamps, dates or UUIDs are bound with their
    // PostgreSQL type so they compare against typed columns.
    fn infer(value: Value) -> Self {
        match value {
            Value::String(s) => {
                if let Some(temporal) = parse_temporal(&s) {
                    Self::temporal(temporal)
                } else if let Ok(uuid) = Uuid::parse_str(&s) {
                    BindValue::Uuid(uuid)
                } else {
                    BindValue::Text(s)
                }
            }
            Value::Number(n) => Self::number(&n),
            Value::Bool(b) => BindValue::Bool(b),
            Value::Null => BindValue::Null,
            other => BindValue::Json(other),
        }
    }

    fn number(n: &Number) -> Self {
        if let Some(i) = n.as_i64() {
            match i32::try_from(i) {
                Ok(small) => BindValue::Int(small),
                Err(_) => BindValue::BigInt(i),
            }
        } else if let Some(f) = n.as_f64() {
            BindValue::Float(f)
        } else {
            BindValue::Text(n.to_string())
        }
    }

    fn temporal(temporal: Temporal) -> Self {
        match temporal {
            Temporal::Zoned(dt) => BindValue::Timestamptz(dt.with_timezone(&Utc)),
            Temporal::Date(date) => BindValue::Date(date),
            Temporal::Naive(dt) => BindValue::Timestamp(dt),
        }
    }
}

macro_rules! bind_value {
    ($query:expr, $value:expr) => {
        match $value {
            BindValue::Null => $query.bind(Option::<String>::None),
            BindValue::Text(s) => $query.bind(s),
            BindValue::Int(i) => $query.bind(i),
            BindValue::BigInt(i) => $query.bind(i),
            BindValue::Float(f) => $query.bind(f),
            BindValue::Bool(b) => $query.bind(b),
            BindValue::Timestamptz(dt) => $query.bind(dt),
            BindValue::Date(date) => $query.bind(date),
            BindValue::Timestamp(dt) => $query.bind(dt),
            BindValue::Uuid(uuid) => $query.bind(uuid),
            BindValue::Json(value) => $query.bind(value),
        }
    };
}

pub(crate) fn bind_param<'q>(
    query: Query<'q, Postgres, PgArguments>,
    param: SqlParam,
) -> Query<'q, Postgres, PgArguments> {
    bind_value!(query, BindValue::from_param(param))
}

pub(crate) fn bind_scalar_param<'q, O>(
    query: QueryScalar<'q, Postgres, O, PgArguments>,
    param: SqlParam,
) -> QueryScalar<'q, Postgres, O, PgArguments> {
    bind_value!(query, BindValue::from_param(param))
}
