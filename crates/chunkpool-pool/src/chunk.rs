//! Byte-level convention shared by blocks and pools.
//!
//! A chunk is `[meta][payload ...]`. `meta` is one word holding the address
//! of the block header and never changes after the block is initialized.
//! While the chunk is free, the first word of the payload holds the slot index
//! of the next free chunk in the same block ([`NIL`] terminates the list).

use core::ptr::NonNull;

use crate::{
  WORD,
  block::Header,
};

/// Free-list terminator.
pub const NIL: usize = usize::MAX;

/// Start of a chunk (its metadata word), not of the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Chunk(NonNull<u8>);

// SAFETY: a chunk is an address; ownership of the bytes behind it moves with
// the value, which is how it travels through another pool's garbage queue.
unsafe impl Send for Chunk {}

impl Chunk {
  /// # Safety
  ///
  /// `ptr` must be the start of a chunk slot inside a live block.
  pub const unsafe fn from_raw(ptr: NonNull<u8>) -> Self {
    Self(ptr)
  }

  /// Recovers the chunk from a payload pointer handed out by a pool.
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by a pool and its block must still be
  /// alive.
  pub unsafe fn from_payload(payload: NonNull<u8>) -> Self {
    Self(unsafe { payload.byte_sub(WORD) })
  }

  pub const fn as_ptr(self) -> *mut u8 {
    self.0.as_ptr()
  }

  pub fn addr(self) -> usize {
    self.0.as_ptr() as usize
  }

  pub fn payload(self) -> NonNull<u8> {
    // meta word and payload share one slot, so this stays in bounds
    unsafe { self.0.byte_add(WORD) }
  }

  /// # Safety
  ///
  /// The chunk's block must be alive and initialized.
  pub unsafe fn block(self) -> NonNull<Header> {
    unsafe { self.0.cast::<NonNull<Header>>().read() }
  }

  /// # Safety
  ///
  /// Only called while initializing the owning block.
  pub unsafe fn set_block(self, header: NonNull<Header>) {
    unsafe { self.0.cast::<NonNull<Header>>().write(header) };
  }

  /// # Safety
  ///
  /// The chunk must be free.
  pub unsafe fn link(self) -> usize {
    unsafe { self.payload().cast::<usize>().read() }
  }

  /// # Safety
  ///
  /// The chunk must be free (or about to become free).
  pub unsafe fn set_link(self, next: usize) {
    unsafe { self.payload().cast::<usize>().write(next) };
  }
}
