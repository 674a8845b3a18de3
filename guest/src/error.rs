//! Guest runtime error types.
//!
//! Whatever fails inside the guest crosses the boundary as a display
//! string through the packed-result error channel (PROTOCOL.md §5), so
//! these messages are exactly what the host surfaces to its caller.

use gangway_protocol::WireError;

/// Errors the guest runtime reports through the error channel.
#[derive(Debug, thiserror::Error)]
pub enum GuestError {
    /// The host asked for a workspace larger than the arena's
    /// configured ceiling.
    #[error("buffer too small: requested {requested} bytes, limit {limit}")]
    BufferTooSmall { requested: usize, limit: usize },

    /// `gangway_start_request` was called before any workspace was
    /// reserved.
    #[error("no request workspace: gangway_alloc_request has not been called")]
    NoWorkspace,

    /// The workspace bytes did not decode as a request.
    #[error("malformed request: {0}")]
    Wire(#[from] WireError),

    /// The handler's response does not fit the wire format, e.g. a
    /// header value longer than its length prefix allows.
    #[error("unencodable response: {0}")]
    BadResponse(WireError),
}
