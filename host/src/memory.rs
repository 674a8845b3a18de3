//! Safe linear-memory reads with bounds checking.
//!
//! Pointer and length arguments are validated against the guest's
//! linear memory size before accessing. The guest is sandboxed but not
//! trusted with offsets: an out-of-bounds range is a `MemoryError`,
//! never a panic or a wild read.

use crate::error::BridgeError;

/// Read `len` bytes from guest memory at `ptr`.
///
/// Returns `Err(MemoryError)` if the range `[ptr, ptr+len)` is out of
/// bounds.
pub fn read_bytes(mem: &[u8], ptr: i32, len: i32) -> Result<Vec<u8>, BridgeError> {
    if ptr < 0 || len < 0 {
        return Err(BridgeError::MemoryError(format!(
            "negative pointer or length: ptr={ptr}, len={len}"
        )));
    }
    let start = ptr as usize;
    let end = start.checked_add(len as usize).ok_or_else(|| {
        BridgeError::MemoryError("pointer arithmetic overflow".into())
    })?;
    if end > mem.len() {
        return Err(BridgeError::MemoryError(format!(
            "range [{start}, {end}) exceeds memory size {}",
            mem.len()
        )));
    }
    Ok(mem[start..end].to_vec())
}
