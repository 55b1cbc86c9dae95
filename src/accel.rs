//! Hash-chain search accelerator.
//!
//! Two tables track where each 3-byte prefix was last seen:
//!
//! - `most_recent` maps every possible 3-byte key (2^24 entries) to the most
//!   recent input position starting with that key.
//! - `backchain` is a ring with one slot per sliding-window position. The
//!   slot at `pos & (WINDOW_SIZE - 1)` holds the previous position sharing
//!   `pos`'s 3-byte prefix. Old entries are never invalidated, only shadowed
//!   by later positions landing on the same slot, so chain consumers must
//!   reject any link that falls outside the current window before trusting it.
//!
//! Positions are stored as `pos + 1` with 0 meaning "none", so the tables
//! can come straight from the zeroed-allocation path: one accelerator is
//! built per encode call and the most-recent table alone is 64 MiB.

extern crate alloc;

use alloc::alloc::{alloc_zeroed, Layout};
use alloc::boxed::Box;

use crate::compress::CompressError;

/// Sliding-window size. Must be a power of two.
pub(crate) const WINDOW_SIZE: usize = 128 * 1024;

const KEY_SPACE: usize = 1 << 24;

fn zeroed_table(len: usize) -> Result<Box<[u32]>, CompressError> {
    let layout = Layout::array::<u32>(len).map_err(|_| CompressError::AllocationFailed)?;
    // zeroed u32s are a valid table of "none" entries
    unsafe {
        let ptr = alloc_zeroed(layout) as *mut u32;
        if ptr.is_null() {
            return Err(CompressError::AllocationFailed);
        }
        Ok(Box::from_raw(core::ptr::slice_from_raw_parts_mut(ptr, len)))
    }
}

pub(crate) struct SearchAccel {
    most_recent: Box<[u32]>,
    backchain: Box<[u32]>,
}

impl SearchAccel {
    pub(crate) fn new() -> Result<Self, CompressError> {
        Ok(Self {
            most_recent: zeroed_table(KEY_SPACE)?,
            backchain: zeroed_table(WINDOW_SIZE)?,
        })
    }

    /// Records `pos` as the latest occurrence of its 3-byte prefix.
    ///
    /// Positions must be recorded in strictly increasing order, and only
    /// positions with at least 3 bytes ahead of them. There is no internal
    /// validation of either; out-of-order calls corrupt the chains silently.
    pub(crate) fn record_position(&mut self, input: &[u8], pos: usize) {
        let key = ((input[pos] as usize) << 16)
            | ((input[pos + 1] as usize) << 8)
            | (input[pos + 2] as usize);

        self.backchain[pos & (WINDOW_SIZE - 1)] = self.most_recent[key];
        self.most_recent[key] = pos as u32 + 1;
    }

    /// The position preceding `pos` in its prefix chain. Only meaningful
    /// while `pos` is within the window of the most recently recorded
    /// position.
    pub(crate) fn chain_prev(&self, pos: usize) -> Option<usize> {
        match self.backchain[pos & (WINDOW_SIZE - 1)] {
            0 => None,
            prev => Some(prev as usize - 1),
        }
    }
}
