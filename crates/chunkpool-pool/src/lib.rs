//! Fixed-size chunk pools.
//!
//! A [`Pool`](pool::Pool) hands out equally sized chunks carved from large
//! blocks obtained from a [`System`](chunkpool_sys::system::System). Each
//! chunk carries one word of metadata in front of its payload that names the
//! block it lives in, so a bare payload pointer is enough to find the owning
//! pool. Chunks freed by a pool that does not own them travel back to the
//! owner through a lock-free queue and are reclaimed on the owner's thread.
//!
//! ```text
//!  block for chunk = 96, align = 32, count = 2 (64-bit)
//!
//!  0        32      56     64          160   184    192          288   312  320
//!  ├────────┼───────┼──────┼───────────┼─────┼──────┼───────────┼─────┼────┤
//!  │ header │  pad  │ meta │ data (96) │ pad │ meta │ data (96) │ pad │pad │
//!  └────────┴───────┼──────┴───────────┴─────┼──────┴───────────┴─────┼────┘
//!                   └──────── chunk ─────────┴──────── chunk ─────────┘
//! ```

use chunkpool_sys::prim::word_width;

pub mod block;
pub mod chunk;
pub mod config;
pub mod error;
pub mod garbage;
pub mod local;
pub mod pool;
mod table;

const WORD: usize = word_width();

pub mod prelude {
  pub use super::{
    config::{
      COUNT_GRANULE,
      DEFAULT_ALIGN,
      DEFAULT_COUNT,
      Geometry,
      PoolConfig,
    },
    error::{
      PoolError,
      PoolResult,
    },
    local::{
      self,
      Local,
    },
    pool::{
      Pool,
      Reclaimed,
    },
  };
}
