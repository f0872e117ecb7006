//! Field name conversion between Rust and the wire.

use convert_case::{Case, Casing};

use crate::field::FieldInfo;

/// `subscription_id` -> `SubscriptionId`.
#[must_use]
pub fn camelize(name: &str) -> String {
    name.to_case(Case::Pascal)
}

/// `SubscriptionId` -> `subscription_id`.
#[must_use]
pub fn underscore(name: &str) -> String {
    name.to_case(Case::Snake)
}

/// Element name of a field in outbound payloads.
#[must_use]
pub fn wire_name(field: &FieldInfo) -> String {
    field
        .wire_alias
        .map_or_else(|| camelize(field.name), str::to_string)
}
