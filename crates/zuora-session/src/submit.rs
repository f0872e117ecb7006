//! The create/update lifecycle.
//!
//! ```text
//! Unvalidated -> Invalid                       (no request sent)
//! Unvalidated -> Valid -> Sent -> Applied      (id assigned, dirty set committed)
//!                Valid -> Sent -> Rejected     (message added to `base`)
//! ```
//!
//! Each call makes at most one remote request and never retries.

use zuora_codec::{Decoded, Request, decode, encode_create, encode_update};
use zuora_core::{
    Error, Model, Record, ResponseError, ResponsePath, Result, Transport, validate,
};
use zuora_query::Filter;

use crate::Session;

/// Base message used when a rejection carries no text.
pub const UNSPECIFIED_REJECTION: &str = "was rejected by the remote service";

/// Where a submission ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitState {
    Unvalidated,
    /// Validation failed; nothing was sent.
    Invalid,
    Valid,
    /// Handed to the transport, awaiting the response.
    Sent,
    /// The remote service accepted the record.
    Applied,
    /// The remote service refused the record.
    Rejected,
}

impl SubmitState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmitState::Invalid | SubmitState::Applied | SubmitState::Rejected
        )
    }

    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, SubmitState::Applied)
    }
}

fn advance(state: &mut SubmitState, next: SubmitState) {
    tracing::trace!(from = ?*state, to = ?next, "Submission state");
    *state = next;
}

impl<T: Transport> Session<T> {
    /// Validate, encode and send a new record with its create operation.
    ///
    /// Returns the terminal state. Only transport failures and malformed
    /// responses are returned as `Err`.
    #[tracing::instrument(level = "debug", skip(self, record), fields(record_type = record.type_name()))]
    pub fn submit(&self, record: &mut Record) -> Result<SubmitState> {
        let mut state = SubmitState::Unvalidated;
        if !validate(record) {
            advance(&mut state, SubmitState::Invalid);
            tracing::info!(
                record_type = record.type_name(),
                errors = record.errors().len(),
                "Record failed validation; not sent"
            );
            return Ok(state);
        }
        advance(&mut state, SubmitState::Valid);

        let request = encode_create(record);
        let path = record.schema().codec().create.response;
        self.send(record, &request, &path, &mut state)?;
        Ok(state)
    }

    /// [`submit`](Self::submit), reduced to whether the record was applied.
    pub fn create(&self, record: &mut Record) -> Result<bool> {
        Ok(self.submit(record)?.is_success())
    }

    /// Send the changed fields of a persisted record.
    ///
    /// A record with no changes is valid and returns `true` without a request.
    #[tracing::instrument(level = "debug", skip(self, record), fields(record_type = record.type_name()))]
    pub fn update(&self, record: &mut Record) -> Result<bool> {
        if record.is_new() {
            return Err(Error::NotPersisted {
                record_type: record.type_name(),
            });
        }
        let mut state = SubmitState::Unvalidated;
        if !validate(record) {
            advance(&mut state, SubmitState::Invalid);
            return Ok(false);
        }
        advance(&mut state, SubmitState::Valid);

        let Some(request) = encode_update(record).filter(|_| record.has_changes()) else {
            tracing::debug!("No changed fields; skipping update");
            return Ok(true);
        };
        let path = record.schema().codec().update.response;
        self.send(record, &request, &path, &mut state)?;
        Ok(state.is_success())
    }

    /// Create a new record, update a persisted one.
    pub fn save(&self, record: &mut Record) -> Result<bool> {
        if record.is_new() {
            self.create(record)
        } else {
            self.update(record)
        }
    }

    fn send(
        &self,
        record: &mut Record,
        request: &Request,
        path: &ResponsePath,
        state: &mut SubmitState,
    ) -> Result<()> {
        tracing::info!(
            record_type = record.type_name(),
            operation = request.operation,
            "Submitting record"
        );
        advance(state, SubmitState::Sent);
        let response = self.invoke(request)?;
        let decoded = decode(&response, path)?;
        advance(state, apply(record, decoded, path)?);
        tracing::info!(
            record_type = record.type_name(),
            id = record.id().unwrap_or_default(),
            outcome = ?*state,
            "Submission finished"
        );
        Ok(())
    }
}

/// Fold a decoded outcome into the record.
fn apply(record: &mut Record, decoded: Decoded, path: &ResponsePath) -> Result<SubmitState> {
    if decoded.success {
        let id = decoded
            .id
            .or_else(|| record.id().map(str::to_string))
            .ok_or_else(|| ResponseError::missing(format!("{path}/id")))?;
        record.mark_persisted(id);
        return Ok(SubmitState::Applied);
    }

    let message = decoded
        .error_message
        .unwrap_or_else(|| UNSPECIFIED_REJECTION.to_string());
    tracing::info!(record_type = record.type_name(), message = %message, "Remote rejection");
    record.errors_mut().add_base(message);
    Ok(SubmitState::Rejected)
}

/// Lifecycle and lookup operations on typed records.
///
/// Implemented for every [`Model`].
pub trait Persistence: Model {
    fn submit<T: Transport>(&mut self, session: &Session<T>) -> Result<SubmitState> {
        session.submit(self.record_mut())
    }

    fn create<T: Transport>(&mut self, session: &Session<T>) -> Result<bool> {
        session.create(self.record_mut())
    }

    fn update<T: Transport>(&mut self, session: &Session<T>) -> Result<bool> {
        session.update(self.record_mut())
    }

    fn save<T: Transport>(&mut self, session: &Session<T>) -> Result<bool> {
        session.save(self.record_mut())
    }

    fn find<T: Transport>(session: &Session<T>, filter: Filter) -> Result<Vec<Self>> {
        session.find_all(filter)
    }

    fn find_by_id<T: Transport>(session: &Session<T>, id: &str) -> Result<Option<Self>> {
        session.get(id)
    }
}

impl<M: Model> Persistence for M {}
