//! Response tree -> outcome and records.
//!
//! Responses arrive as `serde_json::Value` trees with snake_case keys. Where a
//! node can hold one entry or many (results, errors, query records), both
//! shapes are accepted.

use serde_json::Value as Json;
use zuora_core::{Record, ResponseError, ResponsePath, ResponseTree, Schema, Value, underscore};

use crate::encode::QUERY;

/// Outcome of a create, update or amend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub success: bool,
    pub id: Option<String>,
    pub error_message: Option<String>,
}

/// Read the operation outcome found at `path`.
pub fn decode(tree: &ResponseTree, path: &ResponsePath) -> Result<Decoded, ResponseError> {
    let result = tree
        .get(path.envelope)
        .and_then(|envelope| envelope.get(path.result))
        .and_then(first)
        .ok_or_else(|| ResponseError::missing(path.to_string()))?;

    let success = result.get("success").is_some_and(truthy);
    let id = result.get("id").and_then(text).filter(|id| !id.is_empty());
    let error_message = if success {
        None
    } else {
        result
            .get("errors")
            .and_then(first)
            .and_then(|error| error.get("message"))
            .and_then(text)
    };

    Ok(Decoded {
        success,
        id,
        error_message,
    })
}

/// Hydrate the records of a query response.
///
/// A result without `records` is an empty match. Keys are matched to fields by
/// their snake_case form; unknown and `@`-prefixed keys are ignored. Values
/// that do not coerce to their field's kind are kept as text.
pub fn decode_records(tree: &ResponseTree, schema: &'static Schema) -> Result<Vec<Record>, ResponseError> {
    let path = QUERY.response;
    let result = tree
        .get(path.envelope)
        .and_then(|envelope| envelope.get(path.result))
        .ok_or_else(|| ResponseError::missing(path.to_string()))?;

    let entries: Vec<&Json> = match result.get("records") {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };

    let records: Vec<Record> = entries
        .into_iter()
        .filter_map(Json::as_object)
        .map(|entry| hydrate(schema, entry))
        .collect();

    tracing::debug!(
        target: "zuora::codec",
        record_type = schema.name(),
        count = records.len(),
        "Decoded query records"
    );
    Ok(records)
}

fn hydrate(schema: &'static Schema, entry: &serde_json::Map<String, Json>) -> Record {
    let id = entry.get("id").and_then(text);
    let mut record = Record::hydrate(schema, id);

    for (key, raw) in entry {
        if key.starts_with('@') || key == "id" {
            continue;
        }
        let name = underscore(key);
        let Some(field) = schema.field(&name) else {
            tracing::trace!(target: "zuora::codec", key = %key, "Ignoring unknown response key");
            continue;
        };
        let value = json_to_value(raw);
        let value = match value.coerce(field.kind) {
            Ok(coerced) => coerced,
            Err(e) => {
                tracing::warn!(
                    target: "zuora::codec",
                    record_type = schema.name(),
                    field = field.name,
                    error = %e,
                    "Keeping response value uncoerced"
                );
                value
            }
        };
        let _ = record.load(field.name, value);
    }
    record
}

/// Convert a JSON leaf into a field value.
#[must_use]
pub fn json_to_value(raw: &Json) -> Value {
    match raw {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Decimal(n.to_string()), Value::Int),
        Json::String(s) => Value::Text(s.clone()),
        other => Value::Text(other.to_string()),
    }
}

/// A single entry, or the first of a list.
fn first(node: &Json) -> Option<&Json> {
    match node {
        Json::Array(items) => items.first(),
        Json::Null => None,
        other => Some(other),
    }
}

fn truthy(node: &Json) -> bool {
    match node {
        Json::Bool(b) => *b,
        Json::String(s) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn text(node: &Json) -> Option<String> {
    match node {
        Json::String(s) => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
