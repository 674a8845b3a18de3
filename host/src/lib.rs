//! `gangway-host`: Wasmtime host runtime for the shared-memory bridge.
//!
//! This crate loads, validates, and drives a Gangway guest module. Per
//! call it performs the PROTOCOL.md §1 sequence: reserve the request
//! workspace through the guest allocator, encode the request into
//! linear memory, invoke `gangway_start_request`, and decode the
//! response (or the error channel) from wherever the guest placed it.
//!
//! - **ABI validation:** required exports and their version-dependent
//!   signatures are checked before a module is accepted; imports are
//!   restricted to the `gangway_host` module, no WASI.
//! - **Single-flight:** [`BridgeInstance`] owns the Wasmtime `Store`
//!   and takes `&mut self` per call, so the one-in-flight-call rule is
//!   enforced by the type system rather than by convention.
//! - **Debug log channel:** the guest's `debug_log` import is wired to
//!   an injected [`LogSink`] capability (PROTOCOL.md §6).
//!
//! The primary entry points are [`Bridge::new`] and
//! [`BridgeInstance::call`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod linker;
pub mod log;
pub mod memory;
pub mod validation;

pub use bridge::{Bridge, BridgeInstance};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use log::{BufferSink, LogSink, TracingSink};
