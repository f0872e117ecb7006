//! Schema-driven records.
//!
//! A [`Record`] stores one value per declared field, positionally, plus the
//! state the mapping layer needs around it: the remote id, which fields changed,
//! the error map of the last validation pass, and memoized belongs-to lookups.
//! Concrete record types wrap a `Record` and implement [`Model`].

use std::collections::HashMap;

use convert_case::{Case, Casing};

use crate::dirty::DirtyTracker;
use crate::error::{Error, ResolutionError, Result};
use crate::schema::Schema;
use crate::value::{RecordRef, Value};

static NULL: Value = Value::Null;

/// A dynamically-typed instance of one schema.
///
/// # Example
///
/// ```ignore
/// let mut amendment = Record::new(amendment_schema());
/// amendment.set("name", "Add gold plan")?;
/// assert!(amendment.is_dirty("name"));
/// assert!(amendment.is_new());
/// ```
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static Schema,
    id: Option<String>,
    values: Vec<Value>,
    dirty: DirtyTracker,
    errors: RecordErrors,
    associations: HashMap<&'static str, Box<Record>>,
}

impl Record {
    /// A new, unsaved record.
    ///
    /// Defaults are applied and every settable field starts dirty, so the first
    /// save sends everything that has a value.
    pub fn new(schema: &'static Schema) -> Self {
        let mut record = Self::hydrate(schema, None);
        for (name, value) in schema.defaults_for() {
            if let Some(idx) = schema.index_of(name) {
                record.values[idx] = value;
            }
        }
        for (idx, field) in schema.fields().iter().enumerate() {
            if field.is_settable() {
                record.dirty.mark_dirty(idx);
            }
        }
        record
    }

    /// A clean record as returned by a lookup: no defaults, nothing dirty.
    pub fn hydrate(schema: &'static Schema, id: Option<String>) -> Self {
        let len = schema.fields().len();
        Self {
            schema,
            id,
            values: vec![Value::Null; len],
            dirty: DirtyTracker::clean(len),
            errors: RecordErrors::default(),
            associations: HashMap::new(),
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Remote type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.schema.name()
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// True until the remote service has assigned an id.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.as_deref().is_none_or(|id| id.trim().is_empty())
    }

    /// Identity of this record for use as a reference value.
    #[must_use]
    pub fn to_ref(&self) -> RecordRef {
        RecordRef::new(self.type_name(), self.id.clone())
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.schema.index_of(field).and_then(|idx| self.values.get(idx))
    }

    /// Value of `field`, or null when the schema does not declare it.
    #[must_use]
    pub fn value(&self, field: &str) -> &Value {
        self.get(field).unwrap_or(&NULL)
    }

    /// Values paired with their field positions, in declaration order.
    pub fn values(&self) -> impl Iterator<Item = (usize, &Value)> {
        self.values.iter().enumerate()
    }

    /// Write a field, marking it dirty first.
    ///
    /// The value is coerced to the field's kind. Text that does not coerce is
    /// kept as-is so validation can report it.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<()> {
        let idx = self.require_index(field)?;
        let value = value.into();
        let kind = self.schema.fields()[idx].kind;
        let value = match value.coerce(kind) {
            Ok(coerced) => coerced,
            Err(e) => {
                tracing::debug!(
                    record_type = self.type_name(),
                    field,
                    error = %e,
                    "Keeping uncoerced value"
                );
                value
            }
        };
        self.dirty.mark_dirty(idx);
        self.values[idx] = value;
        Ok(())
    }

    /// Like [`set`](Self::set), but an unknown field is logged and ignored.
    ///
    /// Used by generated typed setters whose field names are fixed.
    pub fn assign(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        if let Err(e) = self.set(field, value) {
            tracing::warn!(record_type = self.type_name(), error = %e, "Dropping assignment");
        }
        self
    }

    /// Write a field without marking it dirty. Used when hydrating.
    pub fn load(&mut self, field: &str, value: Value) -> Result<()> {
        let idx = self.require_index(field)?;
        self.values[idx] = value;
        Ok(())
    }

    /// Point a reference-kind field at another record.
    pub fn set_reference(&mut self, field: &str, target: &Record) -> Result<()> {
        self.set(field, target.to_ref())
    }

    /// Set a belongs-to association.
    ///
    /// Writes the target's id into the key field (marking it dirty) and
    /// replaces the cached resolution with `target`.
    pub fn set_association(&mut self, link: &str, target: Record) -> Result<()> {
        let schema = self.schema;
        let info = schema
            .association(link)
            .filter(|a| a.is_belongs_to())
            .ok_or_else(|| ResolutionError::UnknownAssociation {
                record_type: schema.name(),
                association: link.to_string(),
            })?;
        if let Some(key) = info.foreign_key {
            self.set(key, Value::from(target.id().map(str::to_string)))?;
        }
        self.associations.insert(info.name, Box::new(target));
        Ok(())
    }

    #[must_use]
    pub fn has_cached(&self, link: &str) -> bool {
        self.associations.contains_key(link)
    }

    #[must_use]
    pub fn cached_association(&self, link: &str) -> Option<&Record> {
        self.associations.get(link).map(AsRef::as_ref)
    }

    /// Memoize a resolved belongs-to target.
    pub fn cache_association(&mut self, link: &'static str, target: Record) -> &Record {
        self.associations
            .entry(link)
            .insert_entry(Box::new(target))
            .into_mut()
    }

    /// Forget a memoized belongs-to target.
    pub fn clear_association(&mut self, link: &str) -> Option<Record> {
        self.associations.remove(link).map(|boxed| *boxed)
    }

    #[must_use]
    pub fn is_dirty(&self, field: &str) -> bool {
        self.schema
            .index_of(field)
            .is_some_and(|idx| self.dirty.is_dirty(idx))
    }

    #[must_use]
    pub fn is_dirty_at(&self, idx: usize) -> bool {
        self.dirty.is_dirty(idx)
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.dirty.has_changes()
    }

    /// Names of fields changed since the last save.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.names(self.dirty.changed().iter())
    }

    /// Names of fields that went out with the last successful save.
    #[must_use]
    pub fn previously_changed(&self) -> Vec<&'static str> {
        self.names(self.dirty.previously_changed().iter())
    }

    #[must_use]
    pub fn errors(&self) -> &RecordErrors {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut RecordErrors {
        &mut self.errors
    }

    /// Run the schema's validation rules. See [`crate::validate::validate`].
    pub fn validate(&mut self) -> bool {
        crate::validate::validate(self)
    }

    /// Record a successful save: assign the id and archive the dirty set.
    pub fn mark_persisted(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
        self.dirty.commit();
    }

    fn names(&self, positions: impl Iterator<Item = usize>) -> Vec<&'static str> {
        positions
            .filter_map(|idx| self.schema.fields().get(idx).map(|f| f.name))
            .collect()
    }

    fn require_index(&self, field: &str) -> Result<usize> {
        self.schema
            .index_of(field)
            .ok_or_else(|| Error::UnknownField {
                record_type: self.type_name(),
                field: field.to_string(),
            })
    }
}

/// Ordered field -> messages map, plus the record-level `base` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl RecordErrors {
    /// Key for errors that concern the record as a whole.
    pub const BASE: &'static str = "base";

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.add(Self::BASE, message);
    }

    /// Messages for `field`; empty when there are none.
    #[must_use]
    pub fn on(&self, field: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn base(&self) -> &[String] {
        self.on(Self::BASE)
    }

    #[must_use]
    pub fn contains(&self, field: &str, message: &str) -> bool {
        self.on(field).iter().any(|m| m == message)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(|(_, messages)| messages.is_empty())
    }

    /// Total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    /// Messages prefixed with a humanized field name; base messages are bare.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        self.iter()
            .flat_map(|(field, messages)| {
                messages.iter().map(move |message| {
                    if field == Self::BASE {
                        message.clone()
                    } else {
                        format!("{} {message}", field.to_case(Case::Sentence))
                    }
                })
            })
            .collect()
    }
}

/// A typed record.
///
/// Implementors wrap a [`Record`] of their schema and add typed accessors.
pub trait Model: Sized {
    /// The schema every instance of this type uses.
    fn schema() -> &'static Schema;

    /// Wrap a record of this type's schema.
    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;

    fn into_record(self) -> Record;

    /// A new instance with defaults applied.
    fn build() -> Self {
        Self::from_record(Record::new(Self::schema()))
    }

    fn id(&self) -> Option<&str> {
        self.record().id()
    }

    fn is_new(&self) -> bool {
        self.record().is_new()
    }

    fn errors(&self) -> &RecordErrors {
        self.record().errors()
    }

    fn validate(&mut self) -> bool {
        self.record_mut().validate()
    }
}
