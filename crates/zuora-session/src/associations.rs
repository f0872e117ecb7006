//! Association resolution.
//!
//! Belongs-to targets are looked up by id once and memoized on the record.
//! Has-many collections are re-queried on every [`HasMany::fetch`]; nothing
//! about them is cached.
//!
//! The belongs-to cache is replaced by [`Record::set_association`] but not
//! invalidated by writing the key field directly, so a raw key change keeps
//! returning the previously resolved parent until
//! [`Record::clear_association`] is called.

use zuora_core::{
    AssociationInfo, AssociationKind, Error, Model, Record, ResolutionError, Result, Schema,
    Transport,
};
use zuora_query::Filter;

use crate::Session;

/// A has-many collection, resolved lazily.
///
/// Each [`fetch`](Self::fetch) issues a new lookup.
#[derive(Debug, Clone)]
pub struct HasMany {
    parent_type: &'static str,
    association: &'static str,
    target: &'static Schema,
    filter: Filter,
}

impl HasMany {
    #[must_use]
    pub fn target(&self) -> &'static Schema {
        self.target
    }

    /// The child filter, `<ParentType>Id = '<parent id>'`.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Query the children now.
    pub fn fetch<T: Transport>(&self, session: &mut Session<T>) -> Result<Vec<Record>> {
        session
            .lookups
            .record_lookup(self.parent_type, self.association);
        session.find(self.target, self.filter.clone())
    }

    /// Typed [`fetch`](Self::fetch).
    pub fn fetch_as<M: Model, T: Transport>(&self, session: &mut Session<T>) -> Result<Vec<M>> {
        Ok(self
            .fetch(session)?
            .into_iter()
            .map(M::from_record)
            .collect())
    }
}

impl<T: Transport> Session<T> {
    /// Resolve a belongs-to association.
    ///
    /// Returns the cached target when there is one. A blank key resolves to
    /// `None` without a lookup; so does a key that matches nothing.
    #[tracing::instrument(level = "debug", skip(self, record), fields(record_type = record.type_name()))]
    pub fn belongs_to<'r>(&mut self, record: &'r mut Record, link: &str) -> Result<Option<&'r Record>> {
        let info = association(record, link, AssociationKind::BelongsTo)?;
        if record.has_cached(info.name) {
            tracing::debug!(association = info.name, "Belongs-to cache hit");
            return Ok(record.cached_association(info.name));
        }

        let id = info
            .foreign_key
            .map(|key| record.value(key).to_string())
            .unwrap_or_default();
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        let target = self.registry.require(info.target)?;
        self.lookups.record_lookup(record.type_name(), info.name);
        match self.find_by_id(target, id)? {
            Some(found) => Ok(Some(record.cache_association(info.name, found))),
            None => {
                tracing::debug!(association = info.name, id, "Belongs-to target not found");
                Ok(None)
            }
        }
    }

    /// Prepare a has-many association of a persisted record.
    ///
    /// Fails with [`ResolutionError::MissingParentId`] when `record` has no id.
    pub fn has_many(&self, record: &Record, link: &str) -> Result<HasMany> {
        let info = association(record, link, AssociationKind::HasMany)?;
        let Some(id) = record.id().filter(|_| !record.is_new()) else {
            return Err(ResolutionError::MissingParentId {
                record_type: record.type_name(),
                association: info.name,
            }
            .into());
        };
        Ok(HasMany {
            parent_type: record.type_name(),
            association: info.name,
            target: self.registry.require(info.target)?,
            filter: Filter::eq(AssociationInfo::child_key(record.type_name()), id),
        })
    }
}

fn association(record: &Record, link: &str, kind: AssociationKind) -> Result<&'static AssociationInfo> {
    record
        .schema()
        .association(link)
        .filter(|info| info.kind == kind)
        .ok_or_else(|| {
            Error::from(ResolutionError::UnknownAssociation {
                record_type: record.type_name(),
                association: link.to_string(),
            })
        })
}
