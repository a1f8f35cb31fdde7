/// Width of one machine word. Every chunk carries exactly one of these in
/// front of its payload.
pub const fn word_width() -> usize {
  core::mem::size_of::<usize>()
}

/// Default alignment handed to callers when none is requested.
pub const fn min_align() -> usize {
  core::mem::align_of::<u128>()
}
