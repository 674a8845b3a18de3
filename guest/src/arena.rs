//! The request arena, the guest-owned workspace region.
//!
//! One contiguous, reusable buffer per guest instance. The host asks
//! for a reservation through `gangway_alloc_request`, encodes the
//! request into it, and the reservation is implicitly released by the
//! next one. There is no deallocation call, and the region is always
//! scratch, never long-term state (PROTOCOL.md §1).
//!
//! Modelling the arena as an owned type (rather than the ambient
//! shared buffer the bridge technically is) keeps the lifetime rule
//! borrow-checked: `acquire` hands out a `&mut [u8]` that cannot
//! outlive the arena or coexist with a second reservation.

use gangway_protocol::ARENA_SIZE;

use crate::error::GuestError;

/// The single reusable request workspace.
#[derive(Debug)]
pub struct Arena {
    buf: Vec<u8>,
    limit: usize,
    /// Size of the current reservation; `None` until the first acquire.
    reserved: Option<usize>,
}

impl Arena {
    /// An arena with the deployment-standard 65536-byte ceiling.
    pub fn new() -> Self {
        Self::with_limit(ARENA_SIZE)
    }

    /// An arena with a custom ceiling on reservation size.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            buf: Vec::new(),
            limit,
            reserved: None,
        }
    }

    /// Reserve (or reuse) a workspace of at least `size` bytes.
    ///
    /// Fails when `size` exceeds the configured ceiling; the arena
    /// never grows past it. The returned region replaces any previous
    /// reservation; offsets into the old one are dead.
    pub fn acquire(&mut self, size: u32) -> Result<&mut [u8], GuestError> {
        let size = size as usize;
        if size > self.limit {
            return Err(GuestError::BufferTooSmall {
                requested: size,
                limit: self.limit,
            });
        }
        if self.buf.len() < size {
            self.buf.resize(size, 0);
        }
        self.reserved = Some(size);
        Ok(&mut self.buf[..size])
    }

    /// The current reservation, if any. This is what
    /// `gangway_start_request` decodes.
    pub fn current(&self) -> Option<&[u8]> {
        self.reserved.map(|size| &self.buf[..size])
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}
