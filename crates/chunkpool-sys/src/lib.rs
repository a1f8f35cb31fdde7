#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod math;
pub mod prim;
pub mod system;
pub mod unix;

pub use system::GLOBAL_SYSTEM;

pub mod prelude {
  pub use super::{
    GLOBAL_SYSTEM,
    math::{
      adjust,
      align_down,
      align_offset,
      align_ptr,
      align_up,
      boundary,
      is_aligned,
    },
    prim::{
      min_align,
      word_width,
    },
    system::{
      HeapSystem,
      SysError,
      SysResult,
      System,
    },
  };
}
