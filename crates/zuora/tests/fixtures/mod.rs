//! Shared test support: a recording transport and canned responses.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{Value as Json, json};
use zuora::{Element, ResponseTree, Transport, TransportError, TreeBuilder};

pub const SUBSCRIPTION_ID: &str = "4028e48834aa10a30134c9fcdf9f6764";
pub const PRODUCT_RATE_PLAN_ID: &str = "4028e4883491c50901349d0e1e571341";
pub const AMENDMENT_ID: &str = "4028e4873491cc7701349d6124d30036";

/// One request as the transport saw it.
#[derive(Debug, Clone)]
pub struct Sent {
    pub operation: String,
    pub body: Vec<Element>,
}

impl Sent {
    /// Text of the element at `path`, starting from a top-level element.
    pub fn text_at(&self, path: &[&str]) -> Option<&str> {
        let (first, rest) = path.split_first()?;
        self.body
            .iter()
            .find(|element| element.name == *first)
            .and_then(|element| element.find(rest))
            .and_then(Element::text)
    }

    pub fn element_at(&self, path: &[&str]) -> Option<&Element> {
        let (first, rest) = path.split_first()?;
        self.body
            .iter()
            .find(|element| element.name == *first)
            .and_then(|element| element.find(rest))
    }

    pub fn xml(&self) -> String {
        self.body.iter().map(Element::to_xml).collect()
    }
}

/// Transport that answers from a queue and records every call.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Json, String>>>,
    sent: Mutex<Vec<Sent>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn responds_with(&self, response: Json) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(response));
        self
    }

    pub fn fails_with(&self, message: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
        self
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last(&self) -> Sent {
        self.sent().pop().expect("no request was sent")
    }

    pub fn count(&self, operation: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|sent| sent.operation == operation)
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
        self.sent.lock().unwrap().push(Sent {
            operation: operation.to_string(),
            body: builder.finish(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TransportError::new(operation, message)),
            None => Err(TransportError::new(operation, "no canned response queued")),
        }
    }
}

fn query_result(records: Json) -> Json {
    json!({
        "query_response": {
            "result": {
                "done": true,
                "size": records.as_array().map_or(1, Vec::len),
                "records": records
            }
        }
    })
}

pub fn subscription_find_success() -> Json {
    query_result(json!({
        "@xsi:type": "ons:Subscription",
        "id": SUBSCRIPTION_ID,
        "account_id": "4028e4873491cc770134972e75746e4c",
        "name": "A-S00000035",
        "status": "Active",
        "auto_renew": "false",
        "initial_term": "12",
        "renewal_term": "0",
        "term_type": "TERMED",
        "version": "1",
        "contract_effective_date": "2011-01-01T00:00:00.000-08:00",
        "subscription_start_date": "2011-01-01",
        "subscription_end_date": "2012-08-20",
        "term_start_date": "2011-01-01"
    }))
}

pub fn product_rate_plan_find_success() -> Json {
    query_result(json!({
        "@xsi:type": "ons:ProductRatePlan",
        "id": PRODUCT_RATE_PLAN_ID,
        "product_id": "4028e4883491c50901349d0b1a2d133a",
        "name": "Gold Plan",
        "description": "Monthly gold tier",
        "effective_start_date": "2011-01-01",
        "effective_end_date": "2020-01-01"
    }))
}

pub fn amendments_find_success() -> Json {
    query_result(json!([
        {
            "id": AMENDMENT_ID,
            "subscription_id": SUBSCRIPTION_ID,
            "name": "Add Product",
            "type": "NewProduct",
            "status": "Completed"
        },
        {
            "id": "4028e4873491cc7701349d6124d30037",
            "subscription_id": SUBSCRIPTION_ID,
            "name": "Change Terms",
            "type": "TermsAndConditions",
            "status": "Completed",
            "term_start_date": "2012-08-21"
        }
    ]))
}

pub fn empty_find() -> Json {
    json!({ "query_response": { "result": { "done": true, "size": 0 } } })
}

pub fn amendment_success() -> Json {
    json!({
        "amend_response": {
            "results": {
                "amendment_ids": AMENDMENT_ID,
                "id": AMENDMENT_ID,
                "success": true
            }
        }
    })
}

pub fn amendment_failure() -> Json {
    json!({
        "amend_response": {
            "results": {
                "errors": {
                    "code": "INVALID_VALUE",
                    "message": "The Contract effective date should not be later than the term end date."
                },
                "success": false
            }
        }
    })
}

pub fn create_success(id: &str) -> Json {
    json!({ "create_response": { "result": { "id": id, "success": true } } })
}

pub fn update_success(id: &str) -> Json {
    json!({ "update_response": { "result": { "id": id, "success": true } } })
}
