//! Session layer for Zuora Rust.
//!
//! The [`Session`] owns a [`Transport`] and is the only place remote calls are
//! made from. It runs the create/update lifecycle (validate, encode, invoke,
//! decode, apply), resolves associations, and answers lookups.
//!
//! # Design Philosophy
//!
//! - **One call per operation**: no retries, no batching, no caching beyond
//!   the per-record belongs-to cache
//! - **Failures as data**: validation failures and remote rejections end up in
//!   the record's errors; only transport, resolution and malformed-response
//!   problems are returned as `Err`
//! - **Synchronous**: the transport call is the only blocking point
//!
//! # Example
//!
//! ```ignore
//! let session = Session::new(transport, zuora::registry());
//!
//! let mut amendment = Amendment::build();
//! amendment.set_type("NewProduct").set_name("Add Product");
//! if !session.create(amendment.record_mut())? {
//!     for message in amendment.errors().full_messages() {
//!         eprintln!("{message}");
//!     }
//! }
//! ```

pub mod associations;
pub mod config;
pub mod lookups;
pub mod submit;

#[cfg(test)]
mod mock;

use zuora_codec::{Request, decode_records, encode_query};
use zuora_core::{Model, Record, Registry, ResponseTree, Result, Schema, Transport, TransportError};
use zuora_query::{Filter, Select};

pub use associations::HasMany;
pub use config::SessionConfig;
pub use lookups::{LookupStats, LookupTracker};
pub use submit::{Persistence, SubmitState};

/// Entry point for every remote interaction.
pub struct Session<T: Transport> {
    transport: T,
    registry: &'static Registry,
    config: SessionConfig,
    lookups: LookupTracker,
}

impl<T: Transport> Session<T> {
    /// Create a session with the default configuration.
    pub fn new(transport: T, registry: &'static Registry) -> Self {
        Self::with_config(transport, registry, SessionConfig::default())
    }

    pub fn with_config(transport: T, registry: &'static Registry, config: SessionConfig) -> Self {
        let mut lookups = LookupTracker::new().with_threshold(config.lookup_warn_threshold);
        if !config.track_lookups {
            lookups.disable();
        }
        Self {
            transport,
            registry,
            config,
            lookups,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn registry(&self) -> &'static Registry {
        self.registry
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn lookups(&self) -> &LookupTracker {
        &self.lookups
    }

    pub fn lookups_mut(&mut self) -> &mut LookupTracker {
        &mut self.lookups
    }

    /// Records of `schema`'s type matching `filter`.
    #[tracing::instrument(level = "debug", skip(self, schema), fields(record_type = schema.name()))]
    pub fn find(&self, schema: &'static Schema, filter: Filter) -> Result<Vec<Record>> {
        self.select(schema, &Select::for_schema(schema).filter(filter))
    }

    /// The record with the given id, if any.
    pub fn find_by_id(&self, schema: &'static Schema, id: &str) -> Result<Option<Record>> {
        Ok(self.find(schema, Filter::id(id))?.into_iter().next())
    }

    /// Run an arbitrary select and hydrate the results as `schema` records.
    pub fn select(&self, schema: &'static Schema, select: &Select) -> Result<Vec<Record>> {
        let request = encode_query(select);
        let response = self.invoke(&request)?;
        let records = decode_records(&response, schema)?;
        tracing::debug!(
            record_type = schema.name(),
            matches = records.len(),
            "Lookup finished"
        );
        Ok(records)
    }

    /// Typed [`find`](Self::find).
    pub fn find_all<M: Model>(&self, filter: Filter) -> Result<Vec<M>> {
        Ok(self
            .find(M::schema(), filter)?
            .into_iter()
            .map(M::from_record)
            .collect())
    }

    /// Typed [`find_by_id`](Self::find_by_id).
    pub fn get<M: Model>(&self, id: &str) -> Result<Option<M>> {
        Ok(self.find_by_id(M::schema(), id)?.map(M::from_record))
    }

    /// Hand an encoded request to the transport.
    pub(crate) fn invoke(&self, request: &Request) -> std::result::Result<ResponseTree, TransportError> {
        if self.config.log_payloads {
            tracing::debug!(
                target: "zuora::payload",
                operation = request.operation,
                body = %request.to_xml(),
                "Sending request"
            );
        }
        self.transport
            .invoke(request.operation, &mut |builder| request.write(builder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockTransport, registry, widget};
    use serde_json::json;

    #[test]
    fn test_find_issues_query_and_hydrates() {
        let transport = MockTransport::new();
        transport.respond(json!({
            "query_response": { "result": { "records": [
                { "id": "w-1", "name": "first" },
                { "id": "w-2", "name": "second" }
            ] } }
        }));
        let session = Session::new(&transport, registry());

        let found = session.find(widget(), Filter::eq("Name", "first")).unwrap();
        assert_eq!(found.len(), 2);
        assert!(!found[0].has_changes());

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].operation, "query");
        assert!(requests[0].xml.contains("where Name = &apos;first&apos;"));
    }

    #[test]
    fn test_find_by_id_none() {
        let transport = MockTransport::new();
        transport.respond(json!({ "query_response": { "result": { "size": 0 } } }));
        let session = Session::new(&transport, registry());
        assert!(session.find_by_id(widget(), "missing").unwrap().is_none());
    }

    #[test]
    fn test_transport_errors_pass_through() {
        let transport = MockTransport::new();
        transport.fail("connection reset");
        let session = Session::new(&transport, registry());
        let err = session.find(widget(), Filter::id("w-1")).unwrap_err();
        assert!(matches!(err, zuora_core::Error::Transport(_)));
    }

    #[test]
    fn test_config_drives_tracker() {
        let transport = MockTransport::new();
        let session = Session::with_config(
            &transport,
            registry(),
            SessionConfig::default()
                .with_lookup_tracking(false)
                .with_lookup_warn_threshold(7),
        );
        assert!(!session.lookups().is_enabled());
        assert_eq!(session.lookups().threshold(), 7);
    }
}
