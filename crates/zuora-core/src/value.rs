//! Dynamic values held by record fields.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use crate::error::MalformedValueError;
use crate::field::FieldKind;
use crate::validate::{NUMERIC_PATTERN, matches_pattern};

/// In-memory pointer from one record to another.
///
/// Only the identity is kept; an id of `None` means the target has never
/// been persisted remotely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRef {
    pub type_name: &'static str,
    pub id: Option<String>,
}

impl RecordRef {
    pub fn new(type_name: &'static str, id: Option<String>) -> Self {
        Self { type_name, id }
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }
}

/// A field value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Decimal number kept in its textual form to avoid precision loss.
    Decimal(String),
    Text(String),
    Date(NaiveDate),
    DateTime(DateTime<FixedOffset>),
    Ref(RecordRef),
    /// Ordered free-form options; keys are snake_case.
    Options(Vec<(String, Value)>),
}

impl Value {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, whitespace-only text, or an empty option set.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) | Value::Decimal(s) => s.trim().is_empty(),
            Value::Options(entries) => entries.is_empty(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Decimal(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_reference(&self) -> Option<&RecordRef> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_options(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Options(entries) => Some(entries),
            _ => None,
        }
    }

    /// Convert this value into the representation of `kind`.
    ///
    /// Null always coerces to null. Text is parsed leniently: dates accept
    /// `YYYY-MM-DD`, datetimes accept RFC 3339 and `YYYY-MM-DD HH:MM:SS` with
    /// or without an offset (no offset means UTC).
    pub fn coerce(&self, kind: FieldKind) -> Result<Value, MalformedValueError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let malformed = || MalformedValueError::new(kind, self.to_string());

        match kind {
            FieldKind::Text => Ok(match self {
                Value::Text(_) => self.clone(),
                other => Value::Text(other.to_string()),
            }),
            FieldKind::Integer => match self {
                Value::Int(_) => Ok(self.clone()),
                Value::Text(s) | Value::Decimal(s) => {
                    s.trim().parse().map(Value::Int).map_err(|_| malformed())
                }
                _ => Err(malformed()),
            },
            FieldKind::Decimal => match self {
                Value::Decimal(_) => Ok(self.clone()),
                Value::Int(i) => Ok(Value::Decimal(i.to_string())),
                Value::Text(s) if matches_pattern(s.trim(), NUMERIC_PATTERN) => {
                    Ok(Value::Decimal(s.trim().to_string()))
                }
                _ => Err(malformed()),
            },
            FieldKind::Boolean => match self {
                Value::Bool(_) => Ok(self.clone()),
                Value::Text(s) => match s.trim() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(malformed()),
                },
                _ => Err(malformed()),
            },
            FieldKind::Date => match self {
                Value::Date(_) => Ok(self.clone()),
                Value::DateTime(dt) => Ok(Value::Date(dt.date_naive())),
                Value::Text(s) => parse_date(s).map(Value::Date).ok_or_else(malformed),
                _ => Err(malformed()),
            },
            FieldKind::DateTime => match self {
                Value::DateTime(_) => Ok(self.clone()),
                Value::Date(d) => midnight_utc(*d).map(Value::DateTime).ok_or_else(malformed),
                Value::Text(s) => parse_datetime(s).map(Value::DateTime).ok_or_else(malformed),
                _ => Err(malformed()),
            },
            FieldKind::Reference => match self {
                Value::Ref(_) => Ok(self.clone()),
                _ => Err(malformed()),
            },
            FieldKind::Options => match self {
                Value::Options(_) => Ok(self.clone()),
                _ => Err(malformed()),
            },
        }
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

/// Midnight UTC on the given day.
pub fn midnight_utc(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| utc_offset().from_utc_datetime(&naive))
}

fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(input).map(|dt| dt.date_naive()))
}

fn parse_datetime(input: &str) -> Option<DateTime<FixedOffset>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%:z") {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(utc_offset().from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(midnight_utc)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Decimal(s) | Value::Text(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%:z")),
            Value::Ref(r) => f.write_str(r.id.as_deref().unwrap_or_default()),
            Value::Options(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.with_timezone(&utc_offset()))
    }
}

impl From<RecordRef> for Value {
    fn from(v: RecordRef) -> Self {
        Value::Ref(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
