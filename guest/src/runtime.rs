//! The guest runtime: everything between the raw entry points and the
//! application handler.
//!
//! `GuestRuntime` owns the arena, the handler, the retained response
//! buffer, and the error channel's message buffer. Its methods work in
//! slices and `Result`s; the pointer-packing into the raw `u64` return
//! values happens only in the wasm32 `export_guest!` expansion, which
//! is why the whole request path is testable natively.

use gangway_protocol::{codec, ProtocolVersion};

use crate::arena::Arena;
use crate::error::GuestError;
use crate::handler::Handler;

/// Per-instance guest state driving the two entry points.
pub struct GuestRuntime<H> {
    arena: Arena,
    handler: H,
    version: ProtocolVersion,
    /// Encoded response from the last call. Retained so the offset
    /// handed to the host stays valid until the next call.
    response: Vec<u8>,
    /// NUL-terminated message for the error channel, retained for the
    /// same reason.
    error: Vec<u8>,
}

impl<H: Handler> GuestRuntime<H> {
    /// A V2 runtime with the deployment-standard arena.
    pub fn new(handler: H) -> Self {
        Self::with_parts(handler, ProtocolVersion::V2, Arena::new())
    }

    /// Full-control constructor for nonstandard deployments.
    pub fn with_parts(handler: H, version: ProtocolVersion, arena: Arena) -> Self {
        Self {
            arena,
            handler,
            version,
            response: Vec::new(),
            error: Vec::new(),
        }
    }

    /// Entry point 1: reserve the request workspace.
    pub fn alloc_request(&mut self, size: u32) -> Result<&mut [u8], GuestError> {
        self.arena.acquire(size)
    }

    /// Entry point 2: decode the pending request, run the handler,
    /// encode the response. The returned slice is valid until the next
    /// runtime call.
    pub fn start_request(&mut self) -> Result<&[u8], GuestError> {
        let workspace = self.arena.current().ok_or(GuestError::NoWorkspace)?;
        let request = codec::decode_request(workspace, self.version)?;
        let response = self.handler.handle(request);
        self.response = codec::encode_response(&response).map_err(GuestError::BadResponse)?;
        Ok(&self.response)
    }

    /// Store `err` in the error channel buffer, NUL-terminated, and
    /// return it. The returned slice is what the packed failure's
    /// auxiliary offset points at.
    pub fn set_error(&mut self, err: &GuestError) -> &[u8] {
        let message = err.to_string();
        self.error.clear();
        // Interior NULs would truncate the message on the host side.
        self.error
            .extend(message.bytes().map(|b| if b == 0 { b' ' } else { b }));
        self.error.push(0);
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FnHandler;
    use gangway_protocol::{
        decode_response, encode_request, result::read_error_message, Request, Response,
    };

    fn echo_runtime() -> GuestRuntime<FnHandler<impl FnMut(Request) -> Response>> {
        GuestRuntime::new(FnHandler(|req: Request| Response {
            status: 200,
            headers: req.headers,
            body: format!("{} {}?{}", req.method, req.path, req.query).into_bytes(),
        }))
    }

    /// Drive a full call the way the host would: acquire, encode into
    /// the returned workspace, start, decode.
    fn call(
        runtime: &mut GuestRuntime<impl Handler>,
        request: &Request,
        version: ProtocolVersion,
    ) -> Response {
        let workspace = runtime.alloc_request(65536).unwrap();
        encode_request(workspace, request, version).unwrap();
        let encoded = runtime.start_request().unwrap();
        decode_response(encoded).unwrap()
    }

    #[test]
    fn test_full_mirror_roundtrip() {
        let mut runtime = echo_runtime();
        let mut request = Request::new("GET", "/widgets");
        request.query = "color=red".into();
        request.headers.push(("accept".into(), "*/*".into()));

        let response = call(&mut runtime, &request, ProtocolVersion::V2);
        assert_eq!(response.status, 200);
        assert_eq!(response.headers, vec![("accept".to_string(), "*/*".to_string())]);
        assert_eq!(response.body, b"GET /widgets?color=red");
    }

    #[test]
    fn test_v1_runtime_reads_queryless_layout() {
        let mut runtime = GuestRuntime::with_parts(
            FnHandler(|req: Request| Response::text(200, req.path)),
            ProtocolVersion::V1,
            Arena::new(),
        );
        let request = Request::new("GET", "/legacy");
        let response = call(&mut runtime, &request, ProtocolVersion::V1);
        assert_eq!(response.body, b"/legacy");
    }

    #[test]
    fn test_workspace_reused_across_calls() {
        let mut runtime = echo_runtime();
        let first = call(&mut runtime, &Request::new("GET", "/one"), ProtocolVersion::V2);
        assert_eq!(first.body, b"GET /one?");
        // Second call with a shorter path: no stale bytes may leak.
        let second = call(&mut runtime, &Request::new("PUT", "/2"), ProtocolVersion::V2);
        assert_eq!(second.body, b"PUT /2?");
    }

    #[test]
    fn test_start_before_alloc_is_an_error() {
        let mut runtime = echo_runtime();
        assert!(matches!(
            runtime.start_request(),
            Err(GuestError::NoWorkspace)
        ));
    }

    #[test]
    fn test_oversized_alloc_reports_buffer_too_small() {
        let mut runtime = echo_runtime();
        let err = runtime.alloc_request(70_000).unwrap_err();
        assert!(matches!(err, GuestError::BufferTooSmall { .. }));

        // The error-channel buffer must read back as the message, NUL
        // handling included, exactly as the host would read it.
        let channel = runtime.set_error(&err).to_vec();
        assert_eq!(*channel.last().unwrap(), 0);
        let message = read_error_message(&channel, 0).unwrap();
        assert!(message.starts_with("buffer too small"));
    }

    #[test]
    fn test_garbage_workspace_reports_wire_error() {
        let mut runtime = echo_runtime();
        // Reserve a workspace far too small to hold even the fixed
        // fields, and never encode into it.
        runtime.alloc_request(3).unwrap();
        let err = runtime.start_request().unwrap_err();
        assert!(matches!(err, GuestError::Wire(_)));
    }

    #[test]
    fn test_oversized_handler_response_reports_bad_response() {
        // The handler is free to build any Response in memory; one
        // whose header value cannot be framed must fail the call
        // through the error channel, never encode with a wrapped
        // prefix.
        let mut runtime = GuestRuntime::new(FnHandler(|_req: Request| Response {
            status: 200,
            headers: vec![("x-payload".into(), "v".repeat(70_000))],
            body: Vec::new(),
        }));
        let workspace = runtime.alloc_request(256).unwrap();
        encode_request(workspace, &Request::new("GET", "/"), ProtocolVersion::V2).unwrap();

        let err = runtime.start_request().unwrap_err();
        assert!(matches!(err, GuestError::BadResponse(_)));

        let channel = runtime.set_error(&err).to_vec();
        let message = read_error_message(&channel, 0).unwrap();
        assert!(message.starts_with("unencodable response"));
    }

    #[test]
    fn test_error_buffer_replaced_per_error() {
        let mut runtime = echo_runtime();
        let err = runtime.alloc_request(70_000).unwrap_err();
        runtime.set_error(&err);
        let second = GuestError::NoWorkspace;
        let channel = runtime.set_error(&second).to_vec();
        let message = read_error_message(&channel, 0).unwrap();
        assert!(message.starts_with("no request workspace"));
    }
}
