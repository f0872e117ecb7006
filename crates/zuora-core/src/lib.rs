//! Core types and traits for Zuora Rust.
//!
//! `zuora-core` is the **foundation layer** of the workspace. It defines how a
//! billing record is described, held in memory, validated and handed to the
//! transport.
//!
//! # Role In The Architecture
//!
//! - **Registry**: [`FieldInfo`], [`AssociationInfo`] and [`Rule`]s are
//!   collected into one immutable [`Schema`] per remote object type, and
//!   schemas into a [`Registry`].
//! - **State**: [`Record`] holds positional [`Value`]s, the dirty set, the
//!   error map and the belongs-to cache. [`Model`] is implemented by typed
//!   wrappers such as `Amendment`.
//! - **Contract**: [`Transport`] is the only seam to the network; requests are
//!   written through a [`TreeBuilder`].
//!
//! # Who Uses This Crate
//!
//! - `zuora-query` renders lookups for [`Schema`]s.
//! - `zuora-codec` turns [`Record`]s into request trees and responses back
//!   into records.
//! - `zuora-session` drives validation, the codec and the [`Transport`].
//! - The `zuora` facade declares the concrete object types.

pub mod dirty;
pub mod error;
pub mod field;
pub mod naming;
pub mod record;
pub mod relationship;
pub mod schema;
pub mod transport;
pub mod tree;
pub mod validate;
pub mod value;

pub use dirty::{DirtyTracker, FieldsSet};
pub use error::{
    Error, MalformedValueError, RemoteRejection, ResolutionError, ResponseError, Result,
    TransportError, ValidationError, ValidationErrorKind,
};
pub use field::{DefaultValue, FieldInfo, FieldKind};
pub use naming::{camelize, underscore, wire_name};
pub use record::{Model, Record, RecordErrors};
pub use relationship::{AssociationInfo, AssociationKind};
pub use schema::{
    CodecSpec, NestedReference, OperationSpec, OptionsSection, Registry, ResponsePath, Schema,
    SchemaBuilder,
};
pub use transport::{ResponseTree, Transport};
pub use tree::{Element, Namespace, TreeBuilder};
pub use validate::{Check, Condition, Rule, matches_pattern, validate};
pub use value::{RecordRef, Value};
