#[cfg(any(target_os = "linux", target_os = "macos"))]
use core::{
  alloc::Layout,
  ptr::NonNull,
};

#[cfg(any(target_os = "linux", target_os = "macos"))]
use crate::{
  prim::word_width,
  system::{
    SysError,
    SysResult,
    System,
  },
};

pub struct UnixSystem {}

#[cfg(any(target_os = "linux", target_os = "macos"))]
pub static UNIX_SYSTEM: UnixSystem = UnixSystem {};

#[cfg(any(target_os = "linux", target_os = "macos"))]
impl UnixSystem {
  // posix_memalign wants a power of two that is also a multiple of the word
  const fn align_for(layout: Layout) -> usize {
    if layout.align() < word_width() {
      word_width()
    } else {
      layout.align()
    }
  }

  const fn as_c(ptr: NonNull<u8>) -> *mut libc::c_void {
    ptr.as_ptr() as *mut libc::c_void
  }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
unsafe impl System for UnixSystem {
  unsafe fn alloc(&self, layout: Layout) -> SysResult<NonNull<u8>> {
    if layout.size() == 0 {
      return Err(SysError::InvalidArgument);
    }

    let mut out: *mut libc::c_void = core::ptr::null_mut();
    let result = unsafe { libc::posix_memalign(&mut out, Self::align_for(layout), layout.size()) };

    match result {
      0 => NonNull::new(out as *mut u8).ok_or(SysError::OutOfMemory),
      libc::EINVAL => Err(SysError::InvalidArgument),
      _ => Err(SysError::OutOfMemory),
    }
  }

  unsafe fn dealloc(&self, ptr: NonNull<u8>, layout: Layout) -> SysResult<()> {
    _ = layout;
    unsafe { libc::free(Self::as_c(ptr)) };
    Ok(())
  }
}
