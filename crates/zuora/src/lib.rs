//! Zuora Rust: typed billing records over the Zuora SOAP API.
//!
//! This is the facade crate. It declares the concrete object types
//! ([`Account`], [`Subscription`], [`ProductRatePlan`], [`Amendment`]), builds
//! the type [`registry`] and re-exports what applications need from the lower
//! layers.
//!
//! # Quick Start
//!
//! ```ignore
//! use zuora::prelude::*;
//!
//! let mut session = zuora::session(my_transport);
//!
//! let subscription = Subscription::find_by_id(&session, "4028e48834aa10a30134c9fcdf9f6764")?
//!     .expect("subscription exists");
//! let plan = ProductRatePlan::find_by_id(&session, "4028e4883491c50901349d0e1e571341")?
//!     .expect("plan exists");
//!
//! let mut amendment = Amendment::build();
//! amendment
//!     .set_type("NewProduct")
//!     .set_name("Add Product")
//!     .set_status("Completed")
//!     .set_product_rate_plan(&plan)
//!     .set_amend_options([("generate_invoice", true), ("process_payments", false)]);
//! amendment.set_subscription(&subscription)?;
//!
//! if !amendment.create(&session)? {
//!     for message in amendment.errors().full_messages() {
//!         eprintln!("{message}");
//!     }
//! }
//! ```
//!
//! # Crate Layout
//!
//! - `zuora-core`: values, schemas, records, validation, the transport trait
//! - `zuora-query`: ZOQL filters and selects
//! - `zuora-codec`: request encoding and response decoding
//! - `zuora-session`: submission, lookups and associations

pub mod objects;

use std::sync::OnceLock;

pub use objects::{Account, Amendment, ProductRatePlan, Subscription};

pub use zuora_core::{
    AssociationInfo, AssociationKind, Check, CodecSpec, Condition, DefaultValue, Element, Error,
    FieldInfo, FieldKind, MalformedValueError, Model, Namespace, Record, RecordErrors, RecordRef,
    Registry, RemoteRejection, ResolutionError, ResponseError, ResponsePath, ResponseTree, Result,
    Rule, Schema, Transport, TransportError, TreeBuilder, ValidationError, ValidationErrorKind,
    Value, validate,
};
pub use zuora_query::{Filter, Select};
pub use zuora_session::{
    HasMany, LookupStats, LookupTracker, Persistence, Session, SessionConfig, SubmitState,
};

/// Every record type this crate declares, keyed by remote name.
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let registry = Registry::new()
            .register(Account::schema())
            .register(Subscription::schema())
            .register(ProductRatePlan::schema())
            .register(Amendment::schema());
        tracing::debug!(types = ?registry.names(), "Built record type registry");
        registry
    })
}

/// A session over `transport` using the default [`registry`].
pub fn session<T: Transport>(transport: T) -> Session<T> {
    Session::new(transport, registry())
}

/// Like [`session`], with explicit configuration.
pub fn session_with_config<T: Transport>(transport: T, config: SessionConfig) -> Session<T> {
    Session::with_config(transport, registry(), config)
}

/// Commonly used items.
///
/// ```ignore
/// use zuora::prelude::*;
/// ```
pub mod prelude {
    pub use crate::objects::{Account, Amendment, ProductRatePlan, Subscription};
    pub use crate::{registry, session};
    pub use zuora_core::{Error, Model, Record, RecordErrors, Result, Transport, Value};
    pub use zuora_query::Filter;
    pub use zuora_session::{Persistence, Session, SessionConfig, SubmitState};
}
