//! Error types for Zuora Rust.
//!
//! Two families live here:
//!
//! - **Reported** problems ([`ValidationError`], [`MalformedValueError`],
//!   [`RemoteRejection`]) never escape as `Err`. They are rendered into the
//!   record's error map and the operation returns `false`.
//! - **Raised** problems ([`TransportError`], [`ResolutionError`],
//!   [`ResponseError`]) are wrapped by [`Error`] and propagated with `?`.

use std::fmt;

use thiserror::Error;

use crate::field::FieldKind;

/// The primary error type for operations that can fail outright.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport collaborator failed; passed through untouched.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An association or record type could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The remote response did not have the expected shape.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// `update` was asked of a record the remote service has never seen.
    #[error("cannot update a {record_type} that has not been created")]
    NotPersisted { record_type: &'static str },

    /// A field name that the record's schema does not declare.
    #[error("unknown field `{field}` on {record_type}")]
    UnknownField {
        record_type: &'static str,
        field: String,
    },
}

/// Result type alias for Zuora operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by the transport collaborator.
///
/// The mapping layer never interprets these; it only carries them out.
#[derive(Debug, Error)]
#[error("transport error during `{operation}`: {message}")]
pub struct TransportError {
    pub operation: String,
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl TransportError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

/// An association could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Children cannot be filtered by a parent that does not exist remotely.
    #[error("cannot load `{association}` for a {record_type} without an id")]
    MissingParentId {
        record_type: &'static str,
        association: &'static str,
    },

    #[error("{record_type} has no association named `{association}`")]
    UnknownAssociation {
        record_type: &'static str,
        association: String,
    },

    #[error("no record type named `{0}` is registered")]
    UnknownType(String),
}

/// The response tree is missing the node the operation reads its result from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("response has no `{path}` node")]
pub struct ResponseError {
    pub path: String,
}

impl ResponseError {
    pub fn missing(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// A date/time-typed field holds text that does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{input}` is not a valid {kind}")]
pub struct MalformedValueError {
    pub kind: FieldKind,
    pub input: String,
}

impl MalformedValueError {
    pub fn new(kind: FieldKind, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }

    /// The field-scoped message this failure is downgraded to.
    #[must_use]
    pub fn message(&self) -> String {
        match self.kind {
            FieldKind::Date => ValidationErrorKind::InvalidDate.message(),
            FieldKind::DateTime => ValidationErrorKind::InvalidDateTime.message(),
            FieldKind::Integer | FieldKind::Decimal => ValidationErrorKind::NotANumber.message(),
            _ => ValidationErrorKind::Invalid.message(),
        }
    }
}

/// Kind of a field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    Blank,
    TooLong { max: usize },
    TooShort { min: usize },
    Inclusion,
    NotANumber,
    InvalidDate,
    InvalidDateTime,
    /// Value failed a format check.
    Invalid,
    /// Referenced record has no remote identifier.
    Referential,
    Custom(String),
}

impl ValidationErrorKind {
    /// Human-readable message appended to the field's error list.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Blank => "can't be blank".to_string(),
            Self::TooLong { max } => format!("is too long (maximum is {max} characters)"),
            Self::TooShort { min } => format!("is too short (minimum is {min} characters)"),
            Self::Inclusion => "is not included in the list".to_string(),
            Self::NotANumber => "is not a number".to_string(),
            Self::InvalidDate => "is not a valid date".to_string(),
            Self::InvalidDateTime => "is not a valid datetime".to_string(),
            Self::Invalid | Self::Referential => "is invalid".to_string(),
            Self::Custom(message) => message.clone(),
        }
    }
}

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub const fn new(field: &'static str, kind: ValidationErrorKind) -> Self {
        Self { field, kind }
    }

    /// True for the referential subtype.
    #[must_use]
    pub const fn is_referential(&self) -> bool {
        matches!(self.kind, ValidationErrorKind::Referential)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.kind.message())
    }
}

impl std::error::Error for ValidationError {}

/// The remote service refused an operation. Always base-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RemoteRejection {
    pub message: String,
}

impl RemoteRejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationErrorKind::Blank.message(), "can't be blank");
        assert_eq!(
            ValidationErrorKind::TooLong { max: 100 }.message(),
            "is too long (maximum is 100 characters)"
        );
        assert_eq!(ValidationErrorKind::Referential.message(), "is invalid");
        assert_eq!(
            ValidationErrorKind::InvalidDateTime.message(),
            "is not a valid datetime"
        );
    }

    #[test]
    fn test_malformed_value_downgrades_to_field_message() {
        let err = MalformedValueError::new(FieldKind::Date, "garbage");
        assert_eq!(err.message(), "is not a valid date");
        assert_eq!(err.to_string(), "`garbage` is not a valid date");

        let err = MalformedValueError::new(FieldKind::DateTime, "nope");
        assert_eq!(err.message(), "is not a valid datetime");
    }

    #[test]
    fn test_transport_error_passes_through() {
        let err: Error = TransportError::new("amend", "connection reset").into();
        assert_eq!(
            err.to_string(),
            "transport error during `amend`: connection reset"
        );
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::new("product_rate_plan", ValidationErrorKind::Referential);
        assert!(err.is_referential());
        assert_eq!(err.to_string(), "product_rate_plan is invalid");
    }
}
