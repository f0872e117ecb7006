//! ZOQL `select` statements.

use zuora_core::{Schema, wire_name};

use crate::filter::Filter;

/// A ZOQL select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Select {
    object: String,
    fields: Vec<String>,
    filter: Option<Filter>,
}

impl Select {
    /// Select nothing yet from `object`.
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            fields: Vec::new(),
            filter: None,
        }
    }

    /// `Id` plus every flat attribute the schema declares, read-only included.
    pub fn for_schema(schema: &Schema) -> Self {
        let mut select = Self::new(schema.name()).field("Id");
        for field in schema.fields().iter().filter(|f| f.kind.is_attribute()) {
            select = select.field(wire_name(field));
        }
        select
    }

    /// Add a field; duplicates are ignored.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.fields.contains(&name) {
            self.fields.push(name);
        }
        self
    }

    #[must_use]
    pub fn fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().fold(self, Select::field)
    }

    /// Add a filter, conjoined with any existing one.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(filter),
            None => filter,
        });
        self
    }

    #[must_use]
    pub fn object(&self) -> &str {
        &self.object
    }

    #[must_use]
    pub fn to_zoql(&self) -> String {
        let fields = if self.fields.is_empty() {
            "Id".to_string()
        } else {
            self.fields.join(", ")
        };
        let mut zoql = format!("select {fields} from {}", self.object);
        if let Some(filter) = &self.filter {
            zoql.push_str(" where ");
            zoql.push_str(&filter.to_zoql());
        }
        tracing::trace!(target: "zuora::query", zoql = %zoql, "Built select");
        zoql
    }
}
