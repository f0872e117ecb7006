//! Recording transport and small schemas for unit tests.

use std::collections::VecDeque;
use std::sync::{Mutex, OnceLock};

use zuora_core::{
    AssociationInfo, DefaultValue, Element, FieldInfo, Registry, ResponseTree, Rule, Schema,
    Transport, TransportError, TreeBuilder,
};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub operation: String,
    pub body: Vec<Element>,
    pub xml: String,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ResponseTree, String>>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: ResponseTree) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.operation == operation)
            .count()
    }
}

impl Transport for MockTransport {
    fn invoke(
        &self,
        operation: &str,
        build: &mut dyn FnMut(&mut TreeBuilder),
    ) -> Result<ResponseTree, TransportError> {
        let mut builder = TreeBuilder::new();
        build(&mut builder);
        let body = builder.finish();
        let xml = body.iter().map(Element::to_xml).collect();
        self.requests.lock().unwrap().push(Recorded {
            operation: operation.to_string(),
            body,
            xml,
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(operation, message)),
            None => Err(TransportError::new(operation, "no canned response")),
        }
    }
}

pub fn owner() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("Owner")
            .field(FieldInfo::text("name"))
            .association(AssociationInfo::has_many("widgets", "Widget"))
            .build()
    })
}

pub fn widget() -> &'static Schema {
    static SCHEMA: OnceLock<Schema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        Schema::builder("Widget")
            .field(FieldInfo::text("name"))
            .field(FieldInfo::text("status").default(DefaultValue::Text("Draft")))
            .field(FieldInfo::text("owner_id"))
            .field(FieldInfo::datetime("created_date").read_only())
            .association(AssociationInfo::belongs_to("owner", "Owner", "owner_id"))
            .rule(Rule::presence("name"))
            .build()
    })
}

pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| Registry::new().register(owner()).register(widget()))
}
