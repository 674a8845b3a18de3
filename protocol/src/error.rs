//! Wire codec error types.

/// Errors raised by the wire codec.
///
/// `Overflow` is the host-local fatal encode error from PROTOCOL.md §3:
/// it is raised before any byte past the workspace bound is written and
/// never reaches the guest. `Truncated` is the decode-side counterpart
/// for a slice that ends before its length prefixes claim it should.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// The encoded request would exceed the reserved workspace size.
    #[error("encoded request needs {needed} bytes but workspace holds {capacity}")]
    Overflow { needed: usize, capacity: usize },

    /// The buffer ended before the structure was fully decoded.
    #[error("unexpected end of data at offset {offset}")]
    Truncated { offset: usize },

    /// A field or count is larger than its length prefix can carry.
    /// Raised instead of letting the prefix cast wrap, which would
    /// produce a corrupted wire image from a valid in-memory value.
    #[error("field length {len} exceeds the framing limit {limit}")]
    FieldTooLong { len: usize, limit: usize },
}
