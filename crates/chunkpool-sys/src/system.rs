use core::{
  alloc::Layout,
  ptr::NonNull,
};

use thiserror::Error;

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::unix::UNIX_SYSTEM;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SysError {
  #[error("operation is not supported by this system")]
  Unsupported,
  #[error("system is out of memory")]
  OutOfMemory,
  #[error("invalid argument passed to the system")]
  InvalidArgument,
}

pub type SysResult<T> = Result<T, SysError>;

/// Raw memory provider. Pools only ever talk to it at block granularity.
///
/// # Safety
///
/// Implementors must ensure that:
/// - `alloc` returns memory valid for reads and writes of `layout.size()` bytes,
///   aligned to at least `layout.align()`
/// - `dealloc` only accepts memory previously returned by `alloc` on the same
///   system with the same layout
/// - memory stays valid until `dealloc` is called on it
pub unsafe trait System
where
  Self: Send + Sync,
{
  /// Allocates one region described by `layout`.
  ///
  /// # Safety
  ///
  /// `layout.size()` must be non-zero.
  unsafe fn alloc(&self, layout: Layout) -> SysResult<NonNull<u8>> {
    _ = layout;
    Err(SysError::Unsupported)
  }

  /// Returns a region to the system.
  ///
  /// # Safety
  ///
  /// `ptr` must come from `alloc` on this system with the same `layout`, and
  /// must not be touched afterwards.
  unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) -> SysResult<()> {
    _ = (ptr, layout);
    Err(SysError::Unsupported)
  }
}

pub struct UnsupportedSystem {}
unsafe impl System for UnsupportedSystem {}

/// Provider backed by the Rust global allocator.
pub struct HeapSystem {}

pub static HEAP_SYSTEM: HeapSystem = HeapSystem {};

unsafe impl System for HeapSystem {
  unsafe fn alloc(&self, layout: Layout) -> SysResult<NonNull<u8>> {
    if layout.size() == 0 {
      return Err(SysError::InvalidArgument);
    }

    let ptr = unsafe { alloc::alloc::alloc(layout) };
    NonNull::new(ptr).ok_or(SysError::OutOfMemory)
  }

  unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) -> SysResult<()> {
    unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) };
    Ok(())
  }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static GLOBAL_SYSTEM: &dyn System = &UNIX_SYSTEM;

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub static GLOBAL_SYSTEM: &dyn System = &HEAP_SYSTEM;

#[cfg(test)]
mod tests;
