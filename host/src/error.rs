//! Host runtime error types.

use gangway_protocol::WireError;

/// Top-level error type for the host crate.
///
/// The two protocol error classes from PROTOCOL.md §5 appear here as
/// `Wire` (local encode-time failure, never sent to the guest) and
/// `Guest` (the zero-primary-offset packed result, message decoded
/// from the error channel). Everything else is host plumbing.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Wasmtime engine, compilation, or instantiation error.
    #[error("wasmtime error: {0}")]
    Wasmtime(#[from] anyhow::Error),

    /// Module validation failed (missing exports, bad imports, etc.).
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Wire codec failure on the host side (encode overflow, truncated
    /// response bytes).
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// The guest reported a failure through the packed-result error
    /// channel. The message is what the auxiliary offset pointed at, or
    /// a placeholder when the deployment has no error channel (V1).
    #[error("guest reported error: {0}")]
    Guest(String),

    /// A linear-memory access fell outside the guest's memory.
    #[error("memory error: {0}")]
    MemoryError(String),

    /// WASM guest trapped during an entry-point call.
    #[error("guest trapped: {0}")]
    GuestTrapped(String),
}
