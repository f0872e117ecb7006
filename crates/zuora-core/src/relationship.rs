//! Association metadata for Zuora records.
//!
//! Associations are declared once per record type on its [`Schema`](crate::Schema)
//! and resolved lazily by the session. Only the two shapes the Zuora object
//! model needs exist: a single parent reached through a foreign key, and a
//! child collection reached through a remote filter.

/// The shape of an association.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AssociationKind {
    /// `Amendment` belongs to one `Subscription` via `subscription_id`.
    ///
    /// Resolved by point lookup and memoized on the record instance.
    #[default]
    BelongsTo,
    /// One `Subscription` has many `Amendment`s.
    ///
    /// Resolved by a filtered lookup on every access; never cached.
    HasMany,
}

/// Metadata about an association between record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssociationInfo {
    /// Accessor name (e.g. `"subscription"`).
    pub name: &'static str,

    /// Remote name of the target record type (e.g. `"Subscription"`).
    pub target: &'static str,

    pub kind: AssociationKind,

    /// Local foreign-key field holding the parent id (belongs-to only).
    pub foreign_key: Option<&'static str>,
}

impl AssociationInfo {
    /// A belongs-to link whose key field is `<name>_id`.
    ///
    /// The key name has to be spelled out because declarations are `const`.
    #[must_use]
    pub const fn belongs_to(
        name: &'static str,
        target: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            kind: AssociationKind::BelongsTo,
            foreign_key: Some(foreign_key),
        }
    }

    /// A has-many link; children are filtered by `<ParentType>Id`.
    #[must_use]
    pub const fn has_many(name: &'static str, target: &'static str) -> Self {
        Self {
            name,
            target,
            kind: AssociationKind::HasMany,
            foreign_key: None,
        }
    }

    #[must_use]
    pub const fn is_belongs_to(&self) -> bool {
        matches!(self.kind, AssociationKind::BelongsTo)
    }

    /// Remote field on the child that points back at `parent_type`.
    #[must_use]
    pub fn child_key(parent_type: &str) -> String {
        format!("{parent_type}Id")
    }
}
