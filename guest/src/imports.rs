//! Host function imports (PROTOCOL.md §6).
//!
//! The guest imports exactly one capability, under the `gangway_host`
//! WASM module: the debug log channel. It is fire-and-forget; the
//! host always answers 0 and the guest must never branch on it.

#[cfg(target_arch = "wasm32")]
mod ffi {
    #[link(wasm_import_module = "gangway_host")]
    extern "C" {
        /// Emit `len` bytes at `ptr` to the host's diagnostic sink.
        pub fn debug_log(ptr: i32, len: i32) -> i32;
    }
}

/// Send a message down the debug log channel.
///
/// Best-effort: the result is discarded per protocol. Off wasm32 this
/// is a no-op so guest code (and its tests) runs natively.
pub fn debug_log(message: &str) {
    #[cfg(target_arch = "wasm32")]
    unsafe {
        let _ = ffi::debug_log(message.as_ptr() as i32, message.len() as i32);
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}
