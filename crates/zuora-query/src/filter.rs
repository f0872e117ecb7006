//! ZOQL filter expressions.

use std::fmt;

/// A `where` clause.
///
/// # Example
///
/// ```
/// use zuora_query::Filter;
///
/// let filter = Filter::eq("SubscriptionId", "4028e488").and(Filter::ne("Status", "Draft"));
/// assert_eq!(
///     filter.to_zoql(),
///     "SubscriptionId = '4028e488' and Status != 'Draft'"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq(String, String),
    Ne(String, String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    /// Passed through verbatim.
    Raw(String),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    /// `Id = '<id>'`.
    pub fn id(id: impl Into<String>) -> Self {
        Filter::eq("Id", id)
    }

    pub fn raw(clause: impl Into<String>) -> Self {
        Filter::Raw(clause.into())
    }

    /// Conjoin with another filter, flattening nested `and`s.
    #[must_use]
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    #[must_use]
    pub fn or(self, other: Filter) -> Self {
        match self {
            Filter::Or(mut parts) => {
                parts.push(other);
                Filter::Or(parts)
            }
            first => Filter::Or(vec![first, other]),
        }
    }

    #[must_use]
    pub fn to_zoql(&self) -> String {
        match self {
            Filter::Eq(field, value) => format!("{field} = {}", quote(value)),
            Filter::Ne(field, value) => format!("{field} != {}", quote(value)),
            Filter::And(parts) => join(parts, " and "),
            Filter::Or(parts) => join(parts, " or "),
            Filter::Raw(clause) => clause.clone(),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_zoql())
    }
}

fn join(parts: &[Filter], separator: &str) -> String {
    parts
        .iter()
        .map(|part| match part {
            Filter::And(_) | Filter::Or(_) => format!("({})", part.to_zoql()),
            _ => part.to_zoql(),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Single-quote a literal, escaping quotes and backslashes.
#[must_use]
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if matches!(c, '\'' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}
