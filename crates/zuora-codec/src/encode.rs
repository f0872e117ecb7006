//! Record -> request tree.
//!
//! Layout per operation comes from the record's [`CodecSpec`]. Every flat
//! attribute is written under the object namespace with its camelized name;
//! read-only, transient and null fields are left out.

use zuora_core::value::midnight_utc;
use zuora_core::{
    CodecSpec, Element, FieldKind, Namespace, OperationSpec, Record, TreeBuilder, Value, camelize,
    wire_name,
};
use zuora_query::Select;

/// Timestamp layout on the wire: ISO-8601 with an explicit offset.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Name and result path of the lookup operation.
pub const QUERY: OperationSpec = OperationSpec {
    name: "query",
    container: None,
    section: "queryString",
    typed: false,
    response: zuora_core::ResponsePath::new("query_response", "result"),
};

/// An encoded request body, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: &'static str,
    pub body: Vec<Element>,
}

impl Request {
    /// Write the body into the transport's builder.
    pub fn write(&self, builder: &mut TreeBuilder) {
        for element in &self.body {
            builder.push(element.clone());
        }
    }

    /// First top-level element with the given name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Element> {
        self.body.iter().find(|e| e.name == name)
    }

    /// Render the body as XML, for diagnostics.
    #[must_use]
    pub fn to_xml(&self) -> String {
        self.body.iter().map(Element::to_xml).collect()
    }
}

/// Encode a new record for its create operation.
///
/// Every non-null attribute is sent, plus the nested reference and the
/// options section when the record type declares them.
#[must_use]
pub fn encode_create(record: &Record) -> Request {
    let codec = record.schema().codec();
    let op = codec.create;
    let mut section = open_section(record, &op);
    section.children.extend(attributes(record, false));
    if let Some(nested) = nested_reference(record, codec) {
        section.children.push(nested);
    }
    Request {
        operation: op.name,
        body: wrap(&op, section, options_section(record, codec)),
    }
}

/// Encode a persisted record's changed fields for the update operation.
///
/// Returns `None` for a record without an id.
#[must_use]
pub fn encode_update(record: &Record) -> Option<Request> {
    let id = record.id().filter(|_| !record.is_new())?;
    let codec = record.schema().codec();
    let op = codec.update;
    let mut section = open_section(record, &op);
    section
        .children
        .push(Element::leaf(Namespace::Object, "Id", id));
    section.children.extend(attributes(record, true));
    Some(Request {
        operation: op.name,
        body: wrap(&op, section, None),
    })
}

/// Encode a ZOQL lookup.
#[must_use]
pub fn encode_query(select: &Select) -> Request {
    Request {
        operation: QUERY.name,
        body: vec![Element::leaf(
            Namespace::Api,
            QUERY.section,
            select.to_zoql(),
        )],
    }
}

/// Wire text of a value held by a field of `kind`; `None` for null.
#[must_use]
pub fn render_value(value: &Value, kind: FieldKind) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Date(d) => midnight_utc(*d).map(|dt| dt.format(TIMESTAMP_FORMAT).to_string()),
        Value::DateTime(dt) => Some(dt.format(TIMESTAMP_FORMAT).to_string()),
        Value::Text(_) if kind.is_temporal() => {
            tracing::warn!(
                target: "zuora::codec",
                kind = %kind,
                value = %value,
                "Skipping unparsed temporal value"
            );
            None
        }
        Value::Ref(r) => r.id.clone(),
        other => Some(other.to_string()),
    }
}

fn open_section(record: &Record, op: &OperationSpec) -> Element {
    let section = Element::new(Namespace::Api, op.section);
    if op.typed {
        section.with_attribute(
            "xsi:type",
            format!("{}:{}", Namespace::Object.prefix(), record.type_name()),
        )
    } else {
        section
    }
}

fn attributes(record: &Record, only_dirty: bool) -> Vec<Element> {
    record
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(idx, field)| field.is_encoded() && (!only_dirty || record.is_dirty_at(*idx)))
        .filter_map(|(_, field)| {
            render_value(record.value(field.name), field.kind)
                .map(|text| Element::leaf(Namespace::Object, wire_name(field), text))
        })
        .collect()
}

fn nested_reference(record: &Record, codec: &CodecSpec) -> Option<Element> {
    let nested = codec.nested_reference?;
    let id = record.value(nested.field).as_reference()?.id.clone()?;
    let designation = (nested.designation)(record);
    let mut element = Element::leaf(Namespace::Object, designation, id);
    for name in nested.path.iter().rev() {
        let mut parent = Element::new(Namespace::Api, *name);
        parent.children.push(element);
        element = parent;
    }
    Some(element)
}

fn options_section(record: &Record, codec: &CodecSpec) -> Option<Element> {
    let spec = codec.options?;
    let entries = record.value(spec.field).as_options()?;
    if entries.is_empty() {
        return None;
    }
    let mut section = Element::new(Namespace::Api, spec.section);
    for (key, value) in entries {
        if let Some(text) = render_value(value, FieldKind::Text) {
            section
                .children
                .push(Element::leaf(Namespace::Api, camelize(key), text));
        }
    }
    Some(section)
}

fn wrap(op: &OperationSpec, section: Element, options: Option<Element>) -> Vec<Element> {
    let mut parts = vec![section];
    parts.extend(options);
    match op.container {
        Some(container) => {
            let mut outer = Element::new(Namespace::Api, container);
            outer.children = parts;
            vec![outer]
        }
        None => parts,
    }
}
