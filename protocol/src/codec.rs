//! Request/response wire codec (PROTOCOL.md §3, §4).
//!
//! All multi-byte integers are little-endian. Variable-length fields
//! are length-prefixed (u16 for strings and header fields, u32 for the
//! body). The request encoder writes into a caller-provided workspace
//! slice and checks the cumulative position *before* every write, so a
//! request that would exceed the workspace fails with `Overflow` and no
//! byte past the bound is ever touched. A field too large for its
//! length prefix fails with `FieldTooLong` before the prefix is
//! written; the cast never wraps. Decoding trusts the length prefixes
//! (the other side already enforced the bound) but fails with
//! `Truncated` rather than panicking if the buffer runs out.
//!
//! Byte sequences are decoded as UTF-8 permissively: malformed
//! sequences are accepted as opaque bytes, never rejected.

use crate::error::WireError;
use crate::types::{ProtocolVersion, Request, Response, METHOD_FIELD_LEN};

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        let end = self
            .pos
            .checked_add(n)
            .ok_or(WireError::Truncated { offset: self.pos })?;
        if end > self.data.len() {
            return Err(WireError::Truncated { offset: self.pos });
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u16(&mut self) -> Result<u16, WireError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a u16-length-prefixed string, decoded permissively.
    fn read_str(&mut self) -> Result<String, WireError> {
        let len = self.read_u16()? as usize;
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}

/// A cursor for writing into a fixed-capacity workspace slice.
///
/// Every write checks the cumulative position against the slice length
/// first; a would-be overflow leaves the buffer untouched from the
/// current position onward.
struct Writer<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> Writer<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn write_bytes(&mut self, data: &[u8]) -> Result<(), WireError> {
        let end = self.pos.saturating_add(data.len());
        if end > self.buf.len() {
            return Err(WireError::Overflow {
                needed: end,
                capacity: self.buf.len(),
            });
        }
        self.buf[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn write_u16(&mut self, v: u16) -> Result<(), WireError> {
        self.write_bytes(&v.to_le_bytes())
    }

    fn write_u32(&mut self, v: u32) -> Result<(), WireError> {
        self.write_bytes(&v.to_le_bytes())
    }

    /// Write a u16-length-prefixed byte string.
    fn write_var(&mut self, data: &[u8]) -> Result<(), WireError> {
        self.write_u16(u16_len(data.len())?)?;
        self.write_bytes(data)
    }
}

/// A length destined for a u16 prefix. The cast must never wrap: a
/// wrapped prefix with the full bytes behind it is a corrupted wire
/// image, not an encoding.
fn u16_len(len: usize) -> Result<u16, WireError> {
    u16::try_from(len).map_err(|_| WireError::FieldTooLong {
        len,
        limit: u16::MAX as usize,
    })
}

// ── Request (PROTOCOL.md §3) ──

/// Encode a request into `workspace` at offset 0.
///
/// `workspace` is the region the guest reserved via
/// `gangway_alloc_request`; its length is the overflow bound. The
/// fixed method field is zero-filled before the method bytes are
/// written, so stale bytes from a previous (longer) method never bleed
/// through the reused workspace. Returns the total encoded length.
pub fn encode_request(
    workspace: &mut [u8],
    request: &Request,
    version: ProtocolVersion,
) -> Result<usize, WireError> {
    let mut w = Writer::new(workspace);

    // Method: fixed width, left-justified, zero-padded, truncated at 6.
    let mut method = [0u8; METHOD_FIELD_LEN];
    let m = request.method.as_bytes();
    let n = m.len().min(METHOD_FIELD_LEN);
    method[..n].copy_from_slice(&m[..n]);
    w.write_bytes(&method)?;

    w.write_var(request.path.as_bytes())?;

    if version.has_query() {
        w.write_var(request.query.as_bytes())?;
    }

    w.write_u16(u16_len(request.headers.len())?)?;
    for (key, value) in &request.headers {
        w.write_var(key.as_bytes())?;
        w.write_var(value.as_bytes())?;
    }

    // Body size placeholder: always zero, no body bytes follow.
    w.write_u32(0)?;

    Ok(w.pos)
}

/// Decode a request from the workspace, the guest-side mirror of
/// [`encode_request`].
///
/// Zero padding in the method field is not part of the logical value
/// and is stripped.
pub fn decode_request(data: &[u8], version: ProtocolVersion) -> Result<Request, WireError> {
    let mut r = Reader::new(data);

    let method_field = r.read_bytes(METHOD_FIELD_LEN)?;
    let method_len = method_field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(METHOD_FIELD_LEN);
    let method = String::from_utf8_lossy(&method_field[..method_len]).into_owned();

    let path = r.read_str()?;

    let query = if version.has_query() {
        r.read_str()?
    } else {
        String::new()
    };

    let header_count = r.read_u16()? as usize;
    let mut headers = Vec::with_capacity(header_count);
    for _ in 0..header_count {
        let key = r.read_str()?;
        let value = r.read_str()?;
        headers.push((key, value));
    }

    // Body size is a reserved placeholder; no body bytes follow it.
    let _body_size = r.read_u32()?;

    Ok(Request {
        method,
        path,
        query,
        headers,
    })
}

// ── Response (PROTOCOL.md §4) ──

/// Encode a response to a guest-owned buffer.
///
/// Unlike the request, the response buffer is allocated by the guest
/// wherever it likes, so there is no capacity bound to overflow. The
/// only failure mode is a header or body too large for its length
/// prefix.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(64 + response.body.len());

    buf.extend_from_slice(&response.status.to_le_bytes());
    buf.extend_from_slice(&u16_len(response.headers.len())?.to_le_bytes());
    for (key, value) in &response.headers {
        buf.extend_from_slice(&u16_len(key.len())?.to_le_bytes());
        buf.extend_from_slice(key.as_bytes());
        buf.extend_from_slice(&u16_len(value.len())?.to_le_bytes());
        buf.extend_from_slice(value.as_bytes());
    }
    let body_size = u32::try_from(response.body.len()).map_err(|_| WireError::FieldTooLong {
        len: response.body.len(),
        limit: u32::MAX as usize,
    })?;
    buf.extend_from_slice(&body_size.to_le_bytes());
    buf.extend_from_slice(&response.body);

    Ok(buf)
}

/// Decode a response, the host-side mirror of [`encode_response`].
///
/// Decoding is purely positional: status, header count, that many
/// pairs, body size, then exactly that many body bytes. Length fields
/// inconsistent with the bytes actually written are undefined behavior
/// per PROTOCOL.md §4; the decoder fails with `Truncated` when the
/// buffer runs out rather than reading past it.
pub fn decode_response(data: &[u8]) -> Result<Response, WireError> {
    let mut r = Reader::new(data);

    let status = r.read_u16()?;

    let header_count = r.read_u16()? as usize;
    let mut headers = Vec::with_capacity(header_count);
    for _ in 0..header_count {
        let key = r.read_str()?;
        let value = r.read_str()?;
        headers.push((key, value));
    }

    let body_size = r.read_u32()? as usize;
    let body = r.read_bytes(body_size)?.to_vec();

    Ok(Response {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ARENA_SIZE;

    fn sample_request() -> Request {
        Request {
            method: "POST".into(),
            path: "/users/42".into(),
            query: "page=2&limit=10".into(),
            headers: vec![
                ("host".into(), "example.com".into()),
                ("accept".into(), "text/html".into()),
            ],
        }
    }

    fn roundtrip(request: &Request, version: ProtocolVersion) -> Request {
        let mut workspace = vec![0u8; ARENA_SIZE];
        let len = encode_request(&mut workspace, request, version).unwrap();
        decode_request(&workspace[..len], version).unwrap()
    }

    #[test]
    fn test_request_roundtrip_v2() {
        let req = sample_request();
        assert_eq!(roundtrip(&req, ProtocolVersion::V2), req);
    }

    #[test]
    fn test_request_roundtrip_v1_drops_query() {
        let req = sample_request();
        let decoded = roundtrip(&req, ProtocolVersion::V1);
        assert_eq!(decoded.method, req.method);
        assert_eq!(decoded.path, req.path);
        assert_eq!(decoded.headers, req.headers);
        assert_eq!(decoded.query, "");
    }

    #[test]
    fn test_minimal_get_is_17_bytes() {
        // 6 (method) + 2+1 (path "/") + 2+0 (query) + 2 (headers) + 4 (body size)
        let req = Request::new("GET", "/");
        let mut workspace = vec![0u8; ARENA_SIZE];
        let len = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap();
        assert_eq!(len, 17);
        assert_eq!(&workspace[..6], b"GET\0\0\0");
        assert_eq!(&workspace[6..8], &1u16.to_le_bytes());
        assert_eq!(workspace[8], b'/');
    }

    #[test]
    fn test_method_truncated_to_six_bytes() {
        let req = Request::new("OPTIONS", "/");
        let mut workspace = vec![0u8; ARENA_SIZE];
        let len = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap();
        assert_eq!(&workspace[..6], b"OPTION");

        let decoded = decode_request(&workspace[..len], ProtocolVersion::V2).unwrap();
        assert_eq!(decoded.method, "OPTION");
    }

    #[test]
    fn test_method_padding_not_in_logical_value() {
        let req = Request::new("GET", "/");
        let mut workspace = vec![0u8; ARENA_SIZE];
        let len = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap();
        let decoded = decode_request(&workspace[..len], ProtocolVersion::V2).unwrap();
        assert_eq!(decoded.method, "GET");
    }

    #[test]
    fn test_stale_method_bytes_zero_filled() {
        let mut workspace = vec![0u8; ARENA_SIZE];
        let long = Request::new("DELETE", "/");
        encode_request(&mut workspace, &long, ProtocolVersion::V2).unwrap();

        let short = Request::new("GET", "/");
        let len = encode_request(&mut workspace, &short, ProtocolVersion::V2).unwrap();
        assert_eq!(&workspace[..6], b"GET\0\0\0");
        let decoded = decode_request(&workspace[..len], ProtocolVersion::V2).unwrap();
        assert_eq!(decoded.method, "GET");
    }

    #[test]
    fn test_header_order_and_duplicates_preserved() {
        let req = Request {
            method: "GET".into(),
            path: "/".into(),
            query: String::new(),
            headers: vec![
                ("Accept".into(), "1".into()),
                ("accept".into(), "2".into()),
                ("Accept".into(), "3".into()),
            ],
        };
        let decoded = roundtrip(&req, ProtocolVersion::V2);
        assert_eq!(decoded.headers, req.headers);
    }

    #[test]
    fn test_encode_exactly_at_capacity_succeeds() {
        // 6 + 2 + path_len + 2 + 2 + 4 = arena size  =>  path_len = size - 16
        let req = Request::new("GET", "a".repeat(ARENA_SIZE - 16));
        let mut workspace = vec![0u8; ARENA_SIZE];
        let len = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap();
        assert_eq!(len, ARENA_SIZE);
    }

    #[test]
    fn test_encode_one_byte_over_capacity_fails() {
        let req = Request::new("GET", "a".repeat(ARENA_SIZE - 15));
        let mut workspace = vec![0xFFu8; ARENA_SIZE];
        let err = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap_err();
        assert!(matches!(err, WireError::Overflow { .. }));
    }

    #[test]
    fn test_overflow_leaves_no_partial_write_past_bound() {
        // Path fits, but the trailing body-size field would not. The
        // final four bytes must remain untouched by the failed write.
        let req = Request::new("GET", "a".repeat(ARENA_SIZE - 14));
        let mut workspace = vec![0u8; ARENA_SIZE];
        workspace[ARENA_SIZE - 2] = 0xEE;
        let err = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap_err();
        assert!(matches!(err, WireError::Overflow { .. }));
        assert_eq!(workspace[ARENA_SIZE - 2], 0xEE);
    }

    #[test]
    fn test_empty_method_is_all_padding() {
        let req = Request::new("", "/");
        let decoded = roundtrip(&req, ProtocolVersion::V2);
        assert_eq!(decoded.method, "");
    }

    #[test]
    fn test_path_over_u16_rejected_even_when_workspace_fits() {
        // A workspace above the standard size no longer makes the
        // arena bound hit first; the prefix cap must hold on its own.
        let mut workspace = vec![0u8; 2 * ARENA_SIZE];
        let req = Request::new("GET", "a".repeat(70_000));
        let err = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap_err();
        assert!(matches!(err, WireError::FieldTooLong { len: 70_000, .. }));
    }

    #[test]
    fn test_response_header_value_over_u16_rejected() {
        let resp = Response {
            status: 200,
            headers: vec![("x-payload".into(), "v".repeat(70_000))],
            body: Vec::new(),
        };
        let err = encode_response(&resp).unwrap_err();
        assert!(matches!(err, WireError::FieldTooLong { len: 70_000, .. }));
    }

    #[test]
    fn test_response_roundtrip() {
        let resp = Response {
            status: 201,
            headers: vec![
                ("content-type".into(), "application/json".into()),
                ("x-request-id".into(), "abc123".into()),
            ],
            body: br#"{"ok":true}"#.to_vec(),
        };
        let encoded = encode_response(&resp).unwrap();
        let decoded = decode_response(&encoded).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn test_response_it_works_vector() {
        let resp = Response {
            status: 200,
            headers: vec![("content-type".into(), "text/plain".into())],
            body: b"It works!\n".to_vec(),
        };
        let encoded = encode_response(&resp).unwrap();

        // status + count + (2+12 key) + (2+10 value) + body size + 10 body bytes
        assert_eq!(encoded.len(), 2 + 2 + 14 + 12 + 4 + 10);
        assert_eq!(&encoded[..2], &200u16.to_le_bytes());

        let decoded = decode_response(&encoded).unwrap();
        assert_eq!(decoded.status, 200);
        assert_eq!(decoded.headers, vec![("content-type".to_string(), "text/plain".to_string())]);
        assert_eq!(decoded.body, b"It works!\n");
    }

    #[test]
    fn test_response_decode_ignores_trailing_bytes() {
        // Positional decoding: bytes after the body are not the
        // decoder's business (the response sits inside a larger memory).
        let resp = Response::text(200, "ok");
        let mut encoded = encode_response(&resp).unwrap();
        encoded.extend_from_slice(&[0xAA; 32]);
        let decoded = decode_response(&encoded).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn test_decode_truncated_request() {
        let err = decode_request(&[0u8; 3], ProtocolVersion::V2).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn test_decode_truncated_response_body() {
        let resp = Response::text(200, "hello world");
        let encoded = encode_response(&resp).unwrap();
        let err = decode_response(&encoded[..encoded.len() - 4]).unwrap_err();
        assert!(matches!(err, WireError::Truncated { .. }));
    }

    #[test]
    fn test_malformed_utf8_decoded_permissively() {
        let mut workspace = vec![0u8; ARENA_SIZE];
        let req = Request::new("GET", "/ok");
        let len = encode_request(&mut workspace, &req, ProtocolVersion::V2).unwrap();
        // Corrupt a path byte with an invalid UTF-8 sequence start.
        workspace[9] = 0xFF;
        let decoded = decode_request(&workspace[..len], ProtocolVersion::V2).unwrap();
        assert_eq!(decoded.path.chars().count(), 3);
        assert!(decoded.path.contains('\u{FFFD}'));
    }
}
