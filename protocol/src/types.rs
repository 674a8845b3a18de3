//! Bridge boundary types and protocol constants.
//!
//! `Request` and `Response` are the structured forms of the byte
//! layouts in PROTOCOL.md §3 and §4. Headers are an ordered list of
//! pairs, not a map: the wire format preserves insertion order and
//! transmits duplicate keys, and the codec never normalizes key case
//! (case policy belongs to the host platform, not the protocol).

/// Size of the request workspace in bytes. Every observed deployment
/// reserves exactly one WASM page worth of workspace.
pub const ARENA_SIZE: usize = 65536;

/// Width of the fixed method field (PROTOCOL.md §3).
pub const METHOD_FIELD_LEN: usize = 6;

/// Wire protocol version (PROTOCOL.md §7).
///
/// The divergence between deployments (bare 32-bit offset returns and
/// no query field versus packed 64-bit results with a query field) is
/// a deployment-level capability choice. It is carried explicitly in
/// configuration on both sides and never inferred from call-site
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProtocolVersion {
    /// Legacy: entry points return a bare `i32` offset (0 = failure,
    /// no error message); the request layout has no query field.
    V1,
    /// Current: entry points return a packed `u64` (PROTOCOL.md §2);
    /// the request layout carries a query field.
    #[default]
    V2,
}

impl ProtocolVersion {
    /// Whether the request layout carries the query-string field.
    pub fn has_query(self) -> bool {
        matches!(self, ProtocolVersion::V2)
    }

    /// Whether entry points return the packed `u64` form.
    pub fn packed_results(self) -> bool {
        matches!(self, ProtocolVersion::V2)
    }
}

/// An HTTP-like request crossing the bridge host → guest.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    /// Request method, e.g. `GET`. Encoded into a fixed 6-byte field;
    /// longer names are truncated on the wire (a policy, not an error).
    pub method: String,
    /// Request path, e.g. `/users/42`.
    pub path: String,
    /// Raw query string with no leading `?`. Empty when absent, and
    /// never transmitted under `ProtocolVersion::V1`.
    pub query: String,
    /// Ordered header pairs. Order preserved, duplicates transmitted.
    pub headers: Vec<(String, String)>,
}

impl Request {
    /// Convenience constructor for the common no-query, no-header case.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: String::new(),
            headers: Vec::new(),
        }
    }
}

/// An HTTP-like response crossing the bridge guest → host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Ordered header pairs, same framing rules as the request.
    pub headers: Vec<(String, String)>,
    /// Response body, raw bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// A plain-text response with a single `content-type` header.
    pub fn text(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version_is_v2() {
        let v = ProtocolVersion::default();
        assert!(v.has_query());
        assert!(v.packed_results());
    }

    #[test]
    fn test_v1_capabilities() {
        assert!(!ProtocolVersion::V1.has_query());
        assert!(!ProtocolVersion::V1.packed_results());
    }

    #[test]
    fn test_text_response() {
        let resp = Response::text(404, "Not Found");
        assert_eq!(resp.status, 404);
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.body, b"Not Found");
    }
}
