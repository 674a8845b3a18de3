//! `gangway-protocol`: wire codec for the shared-memory HTTP bridge.
//!
//! Host and guest share a single WASM linear memory but cannot pass
//! structured values across the boundary, only integers and raw bytes.
//! This crate is the byte-level contract both sides compile against:
//!
//! - **Request/response codec:** fixed-layout little-endian encoding
//!   (PROTOCOL.md §3, §4), bounds-checked against the request workspace
//!   on the encode side.
//! - **Packed results:** the dual-purpose `u64` returned by both guest
//!   entry points: offset on success, error-string offset on failure
//!   (PROTOCOL.md §2, §5).
//! - **Protocol versions:** the explicit V1/V2 capability flag that
//!   resolves the legacy bare-offset / missing-query divergence
//!   (PROTOCOL.md §7).
//!
//! Everything here is pure byte manipulation with no I/O and no
//! Wasmtime dependency, so the same code runs on the host and inside
//! the `wasm32-unknown-unknown` guest.

pub mod codec;
pub mod error;
pub mod result;
pub mod types;

pub use codec::{decode_request, decode_response, encode_request, encode_response};
pub use error::WireError;
pub use result::PackedResult;
pub use types::{ProtocolVersion, Request, Response, ARENA_SIZE, METHOD_FIELD_LEN};
