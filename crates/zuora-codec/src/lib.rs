//! Payload codec for Zuora Rust.
//!
//! Translates between [`Record`](zuora_core::Record)s and the remote API's
//! nested payloads, in both directions:
//!
//! - [`encode_create`], [`encode_update`] and [`encode_query`] produce a
//!   [`Request`] body for the transport.
//! - [`decode`] reads an operation outcome from the per-operation
//!   [`ResponsePath`](zuora_core::ResponsePath); [`decode_records`] hydrates
//!   lookup results into clean records.

pub mod decode;
pub mod encode;

pub use decode::{Decoded, decode, decode_records, json_to_value};
pub use encode::{
    QUERY, Request, TIMESTAMP_FORMAT, encode_create, encode_query, encode_update, render_value,
};
