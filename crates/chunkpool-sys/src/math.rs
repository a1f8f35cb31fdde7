use core::ptr::NonNull;

pub const fn is_aligned(value: usize, align: usize) -> Option<bool> {
  if !align.is_power_of_two() {
    return None;
  }
  Some((value & (align - 1)) == 0)
}

pub const fn align_up(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  let mask = align - 1;
  match value.checked_add(mask) {
    Some(sum) => Some(sum & !mask),
    None => None,
  }
}

pub const fn align_down(value: usize, align: usize) -> Option<usize> {
  if !align.is_power_of_two() {
    return None;
  }

  Some(value & !(align - 1))
}

pub fn align_ptr<T>(ptr: NonNull<T>, align: usize) -> Option<NonNull<T>> {
  let addr = ptr.as_ptr() as usize;
  let aligned_addr = align_up(addr, align)?;
  NonNull::new(ptr.as_ptr().wrapping_byte_add(aligned_addr - addr))
}

pub const fn align_offset(addr: usize, align: usize) -> Option<usize> {
  match align_up(addr, align) {
    Some(aligned) => Some(aligned - addr),
    None => None,
  }
}

/// Smallest power of two that is `>= value`. Zero maps to one.
pub const fn boundary(value: usize) -> Option<usize> {
  if value <= 1 {
    return Some(1);
  }
  value.checked_next_power_of_two()
}

/// Rounds `value` up to a multiple of `align`, normalizing `align` to a power
/// of two first.
pub const fn adjust(value: usize, align: usize) -> Option<usize> {
  match boundary(align) {
    Some(pow2) => align_up(value, pow2),
    None => None,
  }
}
