//! The diagnostic sink behind the guest's debug log channel.
//!
//! PROTOCOL.md §6 specifies the channel as a single narrow capability:
//! the guest hands the host a byte range, the host decodes it as text
//! and emits it somewhere, best-effort. `LogSink` is that capability as
//! a trait, injected into the linker rather than reading arbitrary
//! memory through a free function, so embedders can route guest
//! diagnostics wherever their platform wants them.

use std::sync::{Arc, Mutex};

/// Where decoded guest log messages go.
///
/// Delivery is best-effort and synchronous with the guest's call; the
/// guest never observes whether a message was actually emitted.
pub trait LogSink: Send {
    fn log(&self, message: &str);
}

/// Default sink: emits guest messages as `tracing` debug events under
/// the `gangway::guest` target.
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        tracing::debug!(target: "gangway::guest", "{message}");
    }
}

/// A sink that retains messages in memory. Useful for tests and for
/// embedders that surface guest diagnostics through their own channel.
#[derive(Debug, Clone, Default)]
pub struct BufferSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl LogSink for BufferSink {
    fn log(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
