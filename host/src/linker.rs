//! Host function registration via the Wasmtime linker.
//!
//! The guest imports exactly one capability (PROTOCOL.md §6):
//! `gangway_host::debug_log(ptr, len) -> i32`. It decodes a byte range
//! from linear memory and forwards it to the injected [`LogSink`].
//! The call is fire-and-forget: the return value is always 0 and the
//! guest must not branch on it, so a bad range drops the message
//! instead of failing the call.

use wasmtime::{Caller, Linker, Memory, StoreLimits};

use crate::error::BridgeError;
use crate::log::LogSink;
use crate::memory;

/// Per-instance host state stored in the Wasmtime `Store`.
pub struct HostState {
    /// Sink for the guest's debug log channel.
    pub sink: Box<dyn LogSink>,
    /// Linear-memory growth limits, enforced by Wasmtime.
    pub limits: StoreLimits,
}

/// Get the guest's exported memory from a Caller.
fn get_memory(caller: &mut Caller<'_, HostState>) -> Option<Memory> {
    caller.get_export("memory").and_then(|e| e.into_memory())
}

/// Register all `gangway_host` functions with the linker.
pub fn register_host_functions(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    register_debug_log(linker)?;
    Ok(())
}

fn register_debug_log(linker: &mut Linker<HostState>) -> Result<(), BridgeError> {
    linker.func_wrap(
        "gangway_host",
        "debug_log",
        |mut caller: Caller<'_, HostState>, ptr: i32, len: i32| -> i32 {
            let mem = match get_memory(&mut caller) {
                Some(m) => m,
                None => return 0,
            };

            let bytes = {
                let data = mem.data(&caller);
                match memory::read_bytes(data, ptr, len) {
                    Ok(b) => b,
                    Err(_) => {
                        tracing::warn!(ptr, len, "guest debug_log range out of bounds, dropped");
                        return 0;
                    }
                }
            };

            let message = String::from_utf8_lossy(&bytes);
            caller.data().sink.log(&message);

            0
        },
    )?;
    Ok(())
}
