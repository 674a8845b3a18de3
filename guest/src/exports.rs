//! Guest entry-point generation (PROTOCOL.md §2).
//!
//! A guest application calls [`export_guest!`] once with an expression
//! that builds its handler; the macro expands to the two `#[no_mangle]`
//! entry points around a lazily initialized runtime:
//!
//! ```ignore
//! use gangway_guest::{export_guest, FnHandler};
//! use gangway_protocol::{Request, Response};
//!
//! export_guest!(FnHandler(|req: Request| Response::text(200, req.path)));
//! ```
//!
//! The entry points must never panic (panics in WASM trap the whole
//! call), so every failure is routed through the packed-result error
//! channel instead. Offsets are linear-memory addresses, which is why
//! the pointer-to-`u32` packing only exists under `target_arch =
//! "wasm32"`; everywhere else the runtime is driven directly through
//! its slice-based methods.
//!
//! The guest is single-threaded by construction (one instance, one
//! in-flight call), which is what makes the `static mut` runtime cell
//! sound.

/// Wire a handler to the `gangway_alloc_request` / `gangway_start_request`
/// exports. Call exactly once per guest binary.
#[macro_export]
macro_rules! export_guest {
    ($handler:expr) => {
        #[cfg(target_arch = "wasm32")]
        #[doc(hidden)]
        mod __gangway_guest_exports {
            use super::*;

            #[allow(static_mut_refs)]
            fn runtime() -> &'static mut $crate::GuestRuntime<Box<dyn $crate::Handler>> {
                static mut RUNTIME: Option<$crate::GuestRuntime<Box<dyn $crate::Handler>>> =
                    None;
                unsafe {
                    RUNTIME.get_or_insert_with(|| {
                        let handler: Box<dyn $crate::Handler> = Box::new($handler);
                        $crate::GuestRuntime::new(handler)
                    })
                }
            }

            #[no_mangle]
            pub extern "C" fn gangway_alloc_request(size: i32) -> u64 {
                let rt = runtime();
                match rt.alloc_request(size as u32) {
                    Ok(region) => $crate::PackedResult::Success {
                        offset: region.as_mut_ptr() as u32,
                    }
                    .pack(),
                    Err(err) => {
                        let channel = rt.set_error(&err);
                        $crate::PackedResult::Failure {
                            error_offset: channel.as_ptr() as u32,
                        }
                        .pack()
                    }
                }
            }

            #[no_mangle]
            pub extern "C" fn gangway_start_request() -> u64 {
                let rt = runtime();
                match rt.start_request() {
                    Ok(encoded) => $crate::PackedResult::Success {
                        offset: encoded.as_ptr() as u32,
                    }
                    .pack(),
                    Err(err) => {
                        let channel = rt.set_error(&err);
                        $crate::PackedResult::Failure {
                            error_offset: channel.as_ptr() as u32,
                        }
                        .pack()
                    }
                }
            }
        }
    };
}
