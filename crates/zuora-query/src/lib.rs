//! ZOQL builders for Zuora Rust.
//!
//! `zuora-query` renders the lookups the session issues: point lookups by
//! `Id`, has-many lookups by `<Parent>Id`, and caller-supplied `find` filters.
//! Literals are always quoted and escaped; [`Filter::raw`] is the only way to
//! pass a clause through untouched.

pub mod filter;
pub mod select;

pub use filter::{Filter, quote};
pub use select::Select;
