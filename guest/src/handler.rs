//! The application-logic seam.
//!
//! Routing and dispatch, deciding how to answer a request, is not
//! part of the protocol. The runtime hands a decoded [`Request`] across
//! this trait and encodes whatever [`Response`] comes back.

use gangway_protocol::{Request, Response};

/// Application logic invoked once per bridge call.
///
/// Takes `&mut self`: the guest instance is single-flight by protocol
/// rule, so handlers may keep per-instance state without locking.
pub trait Handler {
    fn handle(&mut self, request: Request) -> Response;
}

impl Handler for Box<dyn Handler> {
    fn handle(&mut self, request: Request) -> Response {
        (**self).handle(request)
    }
}

/// Adapter for closure handlers.
pub struct FnHandler<F>(pub F);

impl<F> Handler for FnHandler<F>
where
    F: FnMut(Request) -> Response,
{
    fn handle(&mut self, request: Request) -> Response {
        (self.0)(request)
    }
}
