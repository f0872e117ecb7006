//! Outbound request trees.
//!
//! Requests are built as a small namespaced element tree. The transport owns
//! the SOAP envelope; this crate only fills in the body. `zns` qualifies API
//! containers and `ons` qualifies object attributes.

use std::fmt::Write as _;

/// XML namespace of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// API namespace (`zns`): operations and their containers.
    Api,
    /// Object namespace (`ons`): record attributes.
    Object,
}

impl Namespace {
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Namespace::Api => "zns",
            Namespace::Object => "ons",
        }
    }
}

/// One element of a request tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub namespace: Namespace,
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// An element holding only text.
    pub fn leaf(namespace: Namespace, name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(namespace, name);
        element.text = Some(text.into());
        element
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// `prefix:name`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.namespace.prefix(), self.name)
    }

    /// First child with the given local name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Follow a path of local names below this element.
    #[must_use]
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        path.iter().try_fold(self, |el, name| el.child(name))
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Render as XML, for diagnostics.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        let name = self.qualified_name();
        let _ = write!(out, "<{name}");
        for (key, value) in &self.attributes {
            let _ = write!(out, " {key}=\"{}\"", escape(value));
        }
        if self.text.is_none() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        if let Some(text) = &self.text {
            out.push_str(&escape(text));
        }
        for child in &self.children {
            child.write_xml(out);
        }
        let _ = write!(out, "</{name}>");
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Builder handed to the transport's build callback.
///
/// ```ignore
/// builder.element(Namespace::Api, "requests", |b| {
///     b.element(Namespace::Api, "Amendments", |b| {
///         b.leaf(Namespace::Object, "Name", "Add gold plan");
///     });
/// });
/// ```
#[derive(Debug, Default)]
pub struct TreeBuilder {
    roots: Vec<Element>,
    stack: Vec<Element>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an element, fill it through `body`, and close it.
    pub fn element(
        &mut self,
        namespace: Namespace,
        name: &str,
        body: impl FnOnce(&mut TreeBuilder),
    ) -> &mut Self {
        self.open(Element::new(namespace, name), body)
    }

    /// Like [`element`](Self::element), tagged with the object's remote type.
    pub fn typed_element(
        &mut self,
        namespace: Namespace,
        name: &str,
        type_name: &str,
        body: impl FnOnce(&mut TreeBuilder),
    ) -> &mut Self {
        let element = Element::new(namespace, name)
            .with_attribute("xsi:type", format!("{}:{type_name}", Namespace::Object.prefix()));
        self.open(element, body)
    }

    pub fn leaf(&mut self, namespace: Namespace, name: &str, text: impl Into<String>) -> &mut Self {
        self.push(Element::leaf(namespace, name, text))
    }

    /// Append a finished element at the current position.
    pub fn push(&mut self, element: Element) -> &mut Self {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.roots.push(element),
        }
        self
    }

    /// Top-level elements built so far.
    #[must_use]
    pub fn finish(mut self) -> Vec<Element> {
        while let Some(open) = self.stack.pop() {
            self.push(open);
        }
        self.roots
    }

    fn open(&mut self, element: Element, body: impl FnOnce(&mut TreeBuilder)) -> &mut Self {
        self.stack.push(element);
        body(self);
        if let Some(done) = self.stack.pop() {
            self.push(done);
        }
        self
    }
}
