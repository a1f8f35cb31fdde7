//! Fixed-size chunk pools with cross-thread frees.
//!
//! ```
//! use chunkpool::prelude::*;
//!
//! let mut pool = Pool::with_config(PoolConfig::of::<[u64; 4]>()).unwrap();
//! let value = pool.construct([1u64, 2, 3, 4]).unwrap();
//! assert_eq!(unsafe { value.as_ref() }[3], 4);
//! unsafe { pool.destruct(value.as_ptr()) };
//! ```

pub use chunkpool_pool::{
  local,
  pool::Pool,
};

pub mod prelude {
  pub use chunkpool_pool::prelude::*;
  pub use chunkpool_sys::prelude::*;
}
