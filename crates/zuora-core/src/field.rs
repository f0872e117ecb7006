//! Field definitions.

use std::fmt;

use crate::value::Value;

/// Semantic type of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    /// Arbitrary-precision number, kept as its decimal string.
    Decimal,
    Boolean,
    /// Calendar date; rendered on the wire as midnight UTC.
    Date,
    /// Instant with an explicit UTC offset.
    DateTime,
    /// In-memory reference to another record.
    ///
    /// Transient: never written as a flat attribute. Record types that send
    /// a reference declare a nested section for it in their codec spec.
    Reference,
    /// Free-form key/value options emitted as their own payload section.
    Options,
}

impl FieldKind {
    /// Whether the field is written as a flat attribute of the object.
    #[must_use]
    pub const fn is_attribute(self) -> bool {
        !matches!(self, FieldKind::Reference | FieldKind::Options)
    }

    /// Whether the kind holds a date or a datetime.
    #[must_use]
    pub const fn is_temporal(self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Decimal => "decimal",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "datetime",
            FieldKind::Reference => "reference",
            FieldKind::Options => "options",
        })
    }
}

/// A default applied to a freshly constructed record.
///
/// Kept `const`-constructible so field tables can be declared statically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Text(&'static str),
    Integer(i64),
    Boolean(bool),
}

impl DefaultValue {
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Text(s) => Value::Text(s.to_string()),
            DefaultValue::Integer(i) => Value::Int(i),
            DefaultValue::Boolean(b) => Value::Bool(b),
        }
    }
}

/// Metadata about a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    /// Internal snake_case name (e.g. `"subscription_id"`).
    pub name: &'static str,
    /// Semantic type used for coercion and rendering.
    pub kind: FieldKind,
    /// Populated by hydration but never sent in outbound payloads.
    pub read_only: bool,
    /// Value applied when a new record is constructed.
    pub default: Option<DefaultValue>,
    /// Wire name override; when unset the name is camelized.
    pub wire_alias: Option<&'static str>,
}

impl FieldInfo {
    /// Create a new writable field without a default.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            read_only: false,
            default: None,
            wire_alias: None,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldKind::Integer)
    }

    pub const fn decimal(name: &'static str) -> Self {
        Self::new(name, FieldKind::Decimal)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub const fn reference(name: &'static str) -> Self {
        Self::new(name, FieldKind::Reference)
    }

    pub const fn options(name: &'static str) -> Self {
        Self::new(name, FieldKind::Options)
    }

    /// Mark the field read-only.
    ///
    /// Read-only fields are still writable in memory (hydration needs them);
    /// they are only dropped when a payload is encoded.
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the default value.
    pub const fn default(mut self, value: DefaultValue) -> Self {
        self.default = Some(value);
        self
    }

    /// Set the wire name explicitly.
    pub const fn wire_alias(mut self, name: &'static str) -> Self {
        self.wire_alias = Some(name);
        self
    }

    /// Whether setters may stage this field for an outbound payload.
    #[must_use]
    pub const fn is_settable(&self) -> bool {
        !self.read_only
    }

    /// Whether the field is written as a flat attribute when encoding.
    #[must_use]
    pub const fn is_encoded(&self) -> bool {
        !self.read_only && self.kind.is_attribute()
    }
}
