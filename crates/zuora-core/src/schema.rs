//! Per-type record declarations.
//!
//! A [`Schema`] is the single source of truth for one remote object type: its
//! fields, associations, validation rules and wire layout. Schemas are built
//! once (typically inside a `OnceLock`) and only read afterwards, so they can be
//! shared freely between threads.

use std::collections::HashMap;
use std::fmt;

use crate::error::ResolutionError;
use crate::field::FieldInfo;
use crate::record::Record;
use crate::relationship::AssociationInfo;
use crate::validate::Rule;
use crate::value::Value;

/// Where an operation's outcome sits inside the response tree.
///
/// Zuora is not uniform here: `amend` answers under `amend_response/results`
/// while every other call uses `<operation>_response/result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponsePath {
    pub envelope: &'static str,
    pub result: &'static str,
}

impl ResponsePath {
    pub const fn new(envelope: &'static str, result: &'static str) -> Self {
        Self { envelope, result }
    }
}

impl fmt::Display for ResponsePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.envelope, self.result)
    }
}

/// Request layout and response path for one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    /// Remote operation name passed to the transport.
    pub name: &'static str,
    /// Optional wrapper element around the object section.
    pub container: Option<&'static str>,
    /// Element holding the object's attributes.
    pub section: &'static str,
    /// Whether the section carries the object's remote type name.
    pub typed: bool,
    pub response: ResponsePath,
}

impl OperationSpec {
    /// Generic `create` of a `zObjects` entry.
    pub const CREATE: OperationSpec = OperationSpec {
        name: "create",
        container: None,
        section: "zObjects",
        typed: true,
        response: ResponsePath::new("create_response", "result"),
    };

    /// Generic `update` of a `zObjects` entry.
    pub const UPDATE: OperationSpec = OperationSpec {
        name: "update",
        container: None,
        section: "zObjects",
        typed: true,
        response: ResponsePath::new("update_response", "result"),
    };
}

/// A reference field sent as a nested section holding only the target's id.
#[derive(Clone, Copy)]
pub struct NestedReference {
    /// Reference-kind field whose id is sent.
    pub field: &'static str,
    /// Elements wrapping the id, outermost first.
    pub path: &'static [&'static str],
    /// Name of the id element; must be a pure function of the record.
    pub designation: fn(&Record) -> &'static str,
}

impl fmt::Debug for NestedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedReference")
            .field("field", &self.field)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// An options-kind field sent as a sibling section of the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionsSection {
    pub field: &'static str,
    pub section: &'static str,
}

/// How a record type is laid out on the wire.
#[derive(Debug, Clone, Copy)]
pub struct CodecSpec {
    pub create: OperationSpec,
    pub update: OperationSpec,
    pub nested_reference: Option<NestedReference>,
    pub options: Option<OptionsSection>,
}

impl Default for CodecSpec {
    fn default() -> Self {
        Self {
            create: OperationSpec::CREATE,
            update: OperationSpec::UPDATE,
            nested_reference: None,
            options: None,
        }
    }
}

/// Declaration of one record type.
#[derive(Debug)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldInfo>,
    index: HashMap<&'static str, usize>,
    read_only: Vec<&'static str>,
    associations: Vec<AssociationInfo>,
    rules: Vec<Rule>,
    codec: CodecSpec,
}

impl Schema {
    /// Start declaring the type with the given remote name.
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            name,
            fields: Vec::new(),
            associations: Vec::new(),
            rules: Vec::new(),
            codec: CodecSpec::default(),
        }
    }

    /// Remote object name (e.g. `"Amendment"`).
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    #[must_use]
    pub fn read_only_fields(&self) -> &[&'static str] {
        &self.read_only
    }

    /// Defaults a new instance starts with, in declaration order.
    #[must_use]
    pub fn defaults_for(&self) -> Vec<(&'static str, Value)> {
        self.fields
            .iter()
            .filter_map(|f| f.default.map(|d| (f.name, d.to_value())))
            .collect()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.index_of(name).and_then(|idx| self.fields.get(idx))
    }

    #[must_use]
    pub fn associations(&self) -> &[AssociationInfo] {
        &self.associations
    }

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&AssociationInfo> {
        self.associations.iter().find(|a| a.name == name)
    }

    /// Belongs-to link whose key field is `field`.
    #[must_use]
    pub fn association_for_key(&self, field: &str) -> Option<&AssociationInfo> {
        self.associations
            .iter()
            .find(|a| a.foreign_key == Some(field))
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn codec(&self) -> &CodecSpec {
        &self.codec
    }
}

/// Builder for [`Schema`].
#[derive(Debug)]
pub struct SchemaBuilder {
    name: &'static str,
    fields: Vec<FieldInfo>,
    associations: Vec<AssociationInfo>,
    rules: Vec<Rule>,
    codec: CodecSpec,
}

impl SchemaBuilder {
    pub fn field(mut self, field: FieldInfo) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: &[FieldInfo]) -> Self {
        self.fields.extend_from_slice(fields);
        self
    }

    pub fn association(mut self, association: AssociationInfo) -> Self {
        self.associations.push(association);
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn codec(mut self, codec: CodecSpec) -> Self {
        self.codec = codec;
        self
    }

    /// Finish the declaration.
    ///
    /// A field declared twice keeps its first position. Rules naming an
    /// undeclared field are kept (they may inspect associations) but logged.
    pub fn build(self) -> Schema {
        let mut index = HashMap::with_capacity(self.fields.len());
        for (idx, field) in self.fields.iter().enumerate() {
            if index.contains_key(field.name) {
                tracing::warn!(
                    record_type = self.name,
                    field = field.name,
                    "Field declared twice; keeping first declaration"
                );
                continue;
            }
            index.insert(field.name, idx);
        }

        for field in self.rules.iter().filter_map(Rule::field) {
            if !index.contains_key(field) {
                tracing::warn!(
                    record_type = self.name,
                    field,
                    "Validation rule targets an undeclared field"
                );
            }
        }

        let read_only = self
            .fields
            .iter()
            .filter(|f| f.read_only)
            .map(|f| f.name)
            .collect();

        Schema {
            name: self.name,
            fields: self.fields,
            index,
            read_only,
            associations: self.associations,
            rules: self.rules,
            codec: self.codec,
        }
    }
}

/// Record types by remote name.
///
/// Built once at startup; association targets and dynamic lookups go through it.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: HashMap<&'static str, &'static Schema>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema under its remote name.
    #[must_use]
    pub fn register(mut self, schema: &'static Schema) -> Self {
        self.schemas.insert(schema.name(), schema);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static Schema> {
        self.schemas.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<&'static Schema, ResolutionError> {
        self.get(name)
            .ok_or_else(|| ResolutionError::UnknownType(name.to_string()))
    }

    /// Registered remote names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }
}
