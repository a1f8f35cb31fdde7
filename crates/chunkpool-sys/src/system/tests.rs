use super::*;

fn layout(size: usize, align: usize) -> Layout {
  Layout::from_size_align(size, align).unwrap()
}

fn roundtrip(system: &dyn System, layout: Layout) {
  unsafe {
    let memory = system.alloc(layout);
    assert!(memory.is_ok(), "Should allocate {:?}", layout);

    let ptr = memory.unwrap();
    assert_eq!(ptr.as_ptr() as usize % layout.align(), 0, "Should honor alignment");

    let slice = core::slice::from_raw_parts_mut(ptr.as_ptr(), layout.size());
    slice[0] = 42;
    slice[layout.size() - 1] = 24;
    assert_eq!(slice[0], 42, "Should be able to write to allocated memory");
    assert_eq!(slice[layout.size() - 1], 24, "Should be able to write to the end");

    let result = system.dealloc(ptr, layout);
    assert!(result.is_ok(), "Should deallocate memory successfully");
  }
}

#[test]
fn test_global_system_alloc_dealloc() {
  roundtrip(GLOBAL_SYSTEM, layout(320, 32));
  roundtrip(GLOBAL_SYSTEM, layout(4096, 64));
}

#[test]
fn test_global_system_small_alignment() {
  // alignment below the word is raised internally by posix_memalign
  roundtrip(GLOBAL_SYSTEM, layout(24, 1));
  roundtrip(GLOBAL_SYSTEM, layout(24, 2));
}

#[test]
fn test_global_system_large_alignment() {
  roundtrip(GLOBAL_SYSTEM, layout(8192, 4096));
}

#[test]
fn test_global_system_zero_size() {
  let result = unsafe { GLOBAL_SYSTEM.alloc(layout(0, 8)) };
  assert!(matches!(result, Err(SysError::InvalidArgument)));
}

#[test]
fn test_heap_system_alloc_dealloc() {
  roundtrip(&HEAP_SYSTEM, layout(320, 32));
  roundtrip(&HEAP_SYSTEM, layout(1024, 128));
}

#[test]
fn test_unsupported_system() {
  let system = UnsupportedSystem {};

  unsafe {
    let result = system.alloc(layout(64, 8));
    assert!(matches!(result, Err(SysError::Unsupported)), "Should return Unsupported");

    let dummy = NonNull::<u8>::dangling();
    let result = system.dealloc(dummy, layout(64, 8));
    assert!(matches!(result, Err(SysError::Unsupported)), "Should return Unsupported");
  }
}

#[test]
fn test_sys_error_display() {
  assert_eq!(SysError::OutOfMemory.to_string(), "system is out of memory");
}

#[test]
fn test_global_system_selection() {
  let global = GLOBAL_SYSTEM as *const dyn System;

  #[cfg(any(target_os = "linux", target_os = "macos"))]
  assert!(core::ptr::addr_eq(global, &crate::unix::UNIX_SYSTEM as *const _));

  #[cfg(not(any(target_os = "linux", target_os = "macos")))]
  assert!(core::ptr::addr_eq(global, &HEAP_SYSTEM as *const _));
}
