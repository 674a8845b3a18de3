//! Packed entry-point results and the error channel (PROTOCOL.md §2, §5).
//!
//! Both guest entry points return a single integer that must be read
//! unambiguously on both sides with zero shared type system. In V2 it
//! is a `u64`: low 32 bits carry the primary offset, high 32 bits an
//! auxiliary offset that only means anything when the primary offset is
//! zero, the universal failure sentinel. V1 deployments return a bare
//! `u32` offset with no error channel at all.

use crate::error::WireError;

/// The decoded meaning of an entry-point return value.
///
/// The decoding discipline is fixed: test the primary (low) half for
/// zero *before* trusting the auxiliary (high) half. On success the
/// auxiliary bits are ignored entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedResult {
    /// Non-zero primary offset: the request workspace or response
    /// buffer lives at `offset` in the guest's linear memory.
    Success { offset: u32 },
    /// Zero primary offset: the call failed. `error_offset` points at a
    /// NUL-terminated message in the same linear memory, or is 0 when
    /// the deployment has no error channel (V1).
    Failure { error_offset: u32 },
}

impl PackedResult {
    /// Decode the packed `u64` form.
    pub fn unpack(raw: u64) -> Self {
        let primary = raw as u32;
        if primary != 0 {
            PackedResult::Success { offset: primary }
        } else {
            PackedResult::Failure {
                error_offset: (raw >> 32) as u32,
            }
        }
    }

    /// Encode to the packed `u64` form.
    pub fn pack(self) -> u64 {
        match self {
            PackedResult::Success { offset } => offset as u64,
            PackedResult::Failure { error_offset } => (error_offset as u64) << 32,
        }
    }

    /// Decode the legacy bare-offset form (PROTOCOL.md §7).
    pub fn from_bare(raw: u32) -> Self {
        if raw != 0 {
            PackedResult::Success { offset: raw }
        } else {
            PackedResult::Failure { error_offset: 0 }
        }
    }

    /// Encode to the legacy bare-offset form. A failure collapses to 0;
    /// the error offset has nowhere to go in V1.
    pub fn to_bare(self) -> u32 {
        match self {
            PackedResult::Success { offset } => offset,
            PackedResult::Failure { .. } => 0,
        }
    }
}

/// Read the NUL-terminated error message at `offset` in linear memory.
///
/// The message runs up to, not including, the first zero byte, decoded
/// permissively as UTF-8. An unterminated message (no zero byte before
/// the end of memory) is `Truncated`: the guest broke the framing
/// contract.
pub fn read_error_message(memory: &[u8], offset: u32) -> Result<String, WireError> {
    let start = offset as usize;
    if start >= memory.len() {
        return Err(WireError::Truncated { offset: start });
    }
    let tail = &memory[start..];
    let len = tail
        .iter()
        .position(|&b| b == 0)
        .ok_or(WireError::Truncated { offset: memory.len() })?;
    Ok(String::from_utf8_lossy(&tail[..len]).into_owned())
}
