//! `gangway-guest`: guest-side runtime for the shared-memory bridge.
//!
//! This crate is what an application links to become a Gangway guest.
//! It owns the protocol mechanics (the reusable request arena, the
//! packed-result error channel, the request decode / response encode
//! mirror) and leaves one seam open: the [`Handler`] trait, which is
//! the application's routing/dispatch logic and is deliberately opaque
//! to the protocol.
//!
//! On `wasm32-unknown-unknown` the [`export_guest!`] macro wires a
//! handler to the two exported entry points from PROTOCOL.md §2. Off
//! wasm32 the same [`GuestRuntime`] runs natively, which is how the
//! mirror codec is tested without a WASM build.

pub mod arena;
pub mod error;
pub mod exports;
pub mod handler;
pub mod imports;
pub mod runtime;

pub use arena::Arena;
pub use error::GuestError;
pub use handler::{FnHandler, Handler};
pub use imports::debug_log;
pub use runtime::GuestRuntime;

// Re-exported for the export_guest! macro expansion.
#[doc(hidden)]
pub use gangway_protocol::PackedResult;
