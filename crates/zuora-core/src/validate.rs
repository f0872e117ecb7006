//! Declarative record validation.
//!
//! Each [`Schema`](crate::Schema) carries an ordered list of [`Rule`]s. A rule
//! pairs a [`Check`] on one field with a [`Condition`] on the record's state;
//! [`validate`] runs every rule whose condition holds and rebuilds the record's
//! error map from scratch. There is no short-circuit: one pass reports every
//! problem.

use std::collections::HashMap;
use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::field::FieldKind;
use crate::record::{Record, RecordErrors};
use crate::value::Value;

/// Signed integer or decimal literal.
pub const NUMERIC_PATTERN: &str = r"^[+-]?(\d+(\.\d*)?|\.\d+)$";

/// Thread-safe cache of compiled patterns.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Check if a string matches a regex pattern.
///
/// Compiled patterns are cached for the lifetime of the program. An invalid
/// pattern never matches and is logged.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

/// Returns an error message if the pattern does not compile.
pub fn validate_pattern(pattern: &str) -> Option<String> {
    match Regex::new(pattern) {
        Ok(_) => None,
        Err(e) => Some(format!("invalid regex pattern: {e}")),
    }
}

/// When a rule applies.
#[derive(Clone, Copy)]
pub enum Condition {
    Always,
    /// The field's value renders as exactly this text.
    Equals(&'static str, &'static str),
    /// The field's value renders as one of these texts.
    OneOf(&'static str, &'static [&'static str]),
    /// Arbitrary predicate over the whole record.
    Predicate(fn(&Record) -> bool),
}

impl Condition {
    #[must_use]
    pub fn holds(&self, record: &Record) -> bool {
        match self {
            Condition::Always => true,
            Condition::Equals(field, expected) => {
                text_of(record.value(field)).as_deref() == Some(*expected)
            }
            Condition::OneOf(field, set) => text_of(record.value(field))
                .is_some_and(|text| set.contains(&text.as_str())),
            Condition::Predicate(predicate) => predicate(record),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("Always"),
            Condition::Equals(field, value) => {
                f.debug_tuple("Equals").field(field).field(value).finish()
            }
            Condition::OneOf(field, set) => {
                f.debug_tuple("OneOf").field(field).field(set).finish()
            }
            Condition::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// What a rule checks.
#[derive(Clone, Copy)]
pub enum Check {
    Presence,
    Length {
        min: Option<usize>,
        max: Option<usize>,
    },
    Inclusion(&'static [&'static str]),
    /// Value must be `true` or `false`.
    Boolean,
    Numericality,
    Date,
    DateTime,
    /// Rendered value must match the regex.
    Format(&'static str),
    /// A referenced record must already have a remote id.
    Existing,
    /// Free-form check; may report on any field or on `base`.
    Custom(fn(&Record, &mut Vec<ValidationError>)),
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::Presence => f.write_str("Presence"),
            Check::Length { min, max } => f
                .debug_struct("Length")
                .field("min", min)
                .field("max", max)
                .finish(),
            Check::Inclusion(set) => f.debug_tuple("Inclusion").field(set).finish(),
            Check::Boolean => f.write_str("Boolean"),
            Check::Numericality => f.write_str("Numericality"),
            Check::Date => f.write_str("Date"),
            Check::DateTime => f.write_str("DateTime"),
            Check::Format(pattern) => f.debug_tuple("Format").field(pattern).finish(),
            Check::Existing => f.write_str("Existing"),
            Check::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// One validation rule.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    field: &'static str,
    check: Check,
    condition: Condition,
    allow_nil: bool,
}

impl Rule {
    pub const fn new(field: &'static str, check: Check) -> Self {
        Self {
            field,
            check,
            condition: Condition::Always,
            allow_nil: false,
        }
    }

    pub const fn presence(field: &'static str) -> Self {
        Self::new(field, Check::Presence)
    }

    pub const fn max_length(field: &'static str, max: usize) -> Self {
        Self::new(field, Check::Length { min: None, max: Some(max) })
    }

    pub const fn min_length(field: &'static str, min: usize) -> Self {
        Self::new(field, Check::Length { min: Some(min), max: None })
    }

    pub const fn inclusion(field: &'static str, set: &'static [&'static str]) -> Self {
        Self::new(field, Check::Inclusion(set))
    }

    pub const fn boolean(field: &'static str) -> Self {
        Self::new(field, Check::Boolean)
    }

    pub const fn numericality(field: &'static str) -> Self {
        Self::new(field, Check::Numericality)
    }

    pub const fn date(field: &'static str) -> Self {
        Self::new(field, Check::Date)
    }

    pub const fn datetime(field: &'static str) -> Self {
        Self::new(field, Check::DateTime)
    }

    pub const fn format(field: &'static str, pattern: &'static str) -> Self {
        Self::new(field, Check::Format(pattern))
    }

    pub const fn existing(field: &'static str) -> Self {
        Self::new(field, Check::Existing)
    }

    pub const fn custom(check: fn(&Record, &mut Vec<ValidationError>)) -> Self {
        Self::new(RecordErrors::BASE, Check::Custom(check))
    }

    /// Skip the check when the value is null.
    #[must_use]
    pub const fn allow_nil(mut self) -> Self {
        self.allow_nil = true;
        self
    }

    /// Only apply while `field` renders as `value`.
    #[must_use]
    pub const fn when_eq(mut self, field: &'static str, value: &'static str) -> Self {
        self.condition = Condition::Equals(field, value);
        self
    }

    /// Only apply while `field` renders as one of `values`.
    #[must_use]
    pub const fn when_in(mut self, field: &'static str, values: &'static [&'static str]) -> Self {
        self.condition = Condition::OneOf(field, values);
        self
    }

    #[must_use]
    pub const fn when(mut self, predicate: fn(&Record) -> bool) -> Self {
        self.condition = Condition::Predicate(predicate);
        self
    }

    /// Field the rule inspects; `None` for custom checks.
    #[must_use]
    pub fn field(&self) -> Option<&'static str> {
        match self.check {
            Check::Custom(_) => None,
            _ => Some(self.field),
        }
    }

    #[must_use]
    pub const fn check(&self) -> &Check {
        &self.check
    }

    #[must_use]
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Run this rule if its condition holds, appending any failure.
    pub fn apply(&self, record: &Record, out: &mut Vec<ValidationError>) {
        if !self.condition.holds(record) {
            return;
        }
        if let Check::Custom(check) = self.check {
            check(record, out);
            return;
        }

        let raw = record.value(self.field);
        let malformed = is_malformed(record, self.field, raw);
        let value = if malformed { &Value::Null } else { raw };

        let failure = match self.check {
            Check::Date | Check::DateTime if malformed => Some(self.temporal_kind()),
            _ if value.is_null() && self.allow_nil => None,
            Check::Presence => value.is_blank().then_some(ValidationErrorKind::Blank),
            Check::Length { min, max } => {
                let len = value.to_string().chars().count();
                if max.is_some_and(|max| len > max) {
                    max.map(|max| ValidationErrorKind::TooLong { max })
                } else if min.is_some_and(|min| len < min) {
                    min.map(|min| ValidationErrorKind::TooShort { min })
                } else {
                    None
                }
            }
            Check::Inclusion(set) => text_of(value)
                .is_none_or(|text| !set.contains(&text.as_str()))
                .then_some(ValidationErrorKind::Inclusion),
            Check::Boolean => value
                .as_bool()
                .is_none()
                .then_some(ValidationErrorKind::Inclusion),
            Check::Numericality => (!is_numeric(value)).then_some(ValidationErrorKind::NotANumber),
            Check::Date | Check::DateTime => {
                (!matches!(value, Value::Date(_) | Value::DateTime(_)))
                    .then(|| self.temporal_kind())
            }
            Check::Format(pattern) => (!matches_pattern(&value.to_string(), pattern))
                .then_some(ValidationErrorKind::Invalid),
            Check::Existing => match value {
                Value::Null => None,
                Value::Ref(r) if r.is_persisted() => None,
                _ => Some(ValidationErrorKind::Referential),
            },
            Check::Custom(_) => None,
        };

        if let Some(kind) = failure {
            out.push(ValidationError::new(self.field, kind));
        }
    }

    fn temporal_kind(&self) -> ValidationErrorKind {
        match self.check {
            Check::DateTime => ValidationErrorKind::InvalidDateTime,
            _ => ValidationErrorKind::InvalidDate,
        }
    }
}

/// Render a value for comparison; null has no text.
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Int(_) => true,
        Value::Decimal(s) | Value::Text(s) => matches_pattern(s.trim(), NUMERIC_PATTERN),
        _ => false,
    }
}

/// Text in a date/datetime field that does not parse.
fn is_malformed(record: &Record, field: &str, value: &Value) -> bool {
    let Some(info) = record.schema().field(field) else {
        return false;
    };
    info.kind.is_temporal() && matches!(value, Value::Text(_)) && value.coerce(info.kind).is_err()
}

/// Settable values that the encoder cannot render for their field's kind.
///
/// Reported whether or not a rule names the field. Unset fields are left to
/// the rules.
fn shape_failures(record: &Record, out: &mut Vec<ValidationError>) {
    let fields = record.schema().fields();
    for (info, (_, value)) in fields.iter().zip(record.values()) {
        if !info.is_settable() || value.is_null() || value.coerce(info.kind).is_ok() {
            continue;
        }
        let kind = match info.kind {
            FieldKind::Date => ValidationErrorKind::InvalidDate,
            FieldKind::DateTime => ValidationErrorKind::InvalidDateTime,
            FieldKind::Reference => ValidationErrorKind::Referential,
            FieldKind::Options => ValidationErrorKind::Invalid,
            _ => continue,
        };
        if out.iter().any(|f| f.field == info.name && f.kind == kind) {
            continue;
        }
        out.push(ValidationError::new(info.name, kind));
    }
}

/// Run every applicable rule of the record's schema without touching it.
#[must_use]
pub fn check(record: &Record) -> Vec<ValidationError> {
    let mut failures = Vec::new();
    for rule in record.schema().rules() {
        rule.apply(record, &mut failures);
    }
    shape_failures(record, &mut failures);
    failures
}

/// Validate the record, replacing its error map.
///
/// Returns `true` iff no rule reported a failure.
pub fn validate(record: &mut Record) -> bool {
    let failures = check(record);

    let mut errors = RecordErrors::default();
    for failure in &failures {
        errors.add(failure.field, failure.kind.message());
    }
    let valid = errors.is_empty();

    tracing::debug!(
        record_type = record.schema().name(),
        failures = failures.len(),
        valid,
        "Validated record"
    );

    *record.errors_mut() = errors;
    valid
}
