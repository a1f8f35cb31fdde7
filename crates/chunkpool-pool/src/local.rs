//! Per-thread default pools.
//!
//! Each thread lazily gets one [`Pool`] per [`PoolConfig`] it asks for. The
//! pools live until the thread exits. Chunks may still be freed from other
//! threads; they travel back through the owning pool's garbage queue.
//!
//! [`with`] closures must not nest: using the registry from inside one on the
//! same thread panics. [`destruct`] runs the value's destructor outside the
//! registry, so destructors may free other pooled values.

use core::{
  cell::RefCell,
  ptr::{
    self,
    NonNull,
  },
};
use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use crate::{
  config::{
    DEFAULT_ALIGN,
    DEFAULT_COUNT,
    PoolConfig,
  },
  error::{
    PoolError,
    PoolResult,
  },
  pool::{
    Pool,
    Reclaimed,
  },
};

thread_local! {
  static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

#[derive(Default)]
pub struct Registry {
  pools: FxHashMap<PoolConfig, Pool>,
}

impl Registry {
  pub fn pool(&mut self, config: PoolConfig) -> PoolResult<&mut Pool> {
    match self.pools.entry(config) {
      Entry::Occupied(entry) => Ok(entry.into_mut()),
      Entry::Vacant(entry) => {
        let pool = Pool::with_config(config)?;
        tracing::trace!(?config, "thread-local pool created");
        Ok(entry.insert(pool))
      }
    }
  }

  pub fn len(&self) -> usize {
    self.pools.len()
  }

  pub fn is_empty(&self) -> bool {
    self.pools.is_empty()
  }

  pub fn cleanup(&mut self) -> Reclaimed {
    self
      .pools
      .values_mut()
      .map(Pool::cleanup)
      .fold(Reclaimed::default(), |acc, next| Reclaimed {
        chunks: acc.chunks + next.chunks,
        blocks: acc.blocks + next.blocks,
      })
  }
}

/// Runs `f` on this thread's pool for `config`, creating it on first use.
pub fn with<R>(config: PoolConfig, f: impl FnOnce(&mut Pool) -> R) -> PoolResult<R> {
  REGISTRY
    .try_with(|registry| {
      let mut registry = registry.borrow_mut();
      let pool = registry.pool(config)?;
      Ok(f(pool))
    })
    .map_err(|_| PoolError::Teardown)?
}

/// Number of pools this thread has created so far.
pub fn pools() -> usize {
  REGISTRY.try_with(|registry| registry.borrow().len()).unwrap_or(0)
}

/// Runs [`Pool::cleanup`] on every pool of the calling thread.
pub fn cleanup_all() -> Reclaimed {
  REGISTRY
    .try_with(|registry| registry.borrow_mut().cleanup())
    .unwrap_or_default()
}

/// Moves `value` into this thread's pool sized for `T`.
pub fn construct<T>(value: T) -> Option<NonNull<T>> {
  with(PoolConfig::of::<T>(), |pool| pool.construct(value))
    .ok()
    .flatten()
}

/// Drops and frees a `T` from [`construct`], on any thread.
///
/// # Safety
///
/// See [`Pool::destruct`].
pub unsafe fn destruct<T>(ptr: *mut T) {
  unsafe { destruct_in(PoolConfig::of::<T>(), ptr) };
}

unsafe fn destruct_in<T>(config: PoolConfig, ptr: *mut T) {
  if ptr.is_null() {
    return;
  }

  // drop outside the registry borrow, `T::drop` may free into it again
  unsafe { ptr::drop_in_place(ptr) };
  let ptr = ptr.cast::<u8>();
  if with(config, |pool| unsafe { pool.deallocate(ptr) }).is_err() {
    // no local pool to route through, hand it straight to the owner
    unsafe { Pool::release_raw(ptr) };
  }
}

/// Compile-time keyed access to the thread-local pools.
///
/// ```ignore
/// type Nodes = Local<{ size_of::<Node>() }>;
/// let node = Nodes::construct(Node::default()).unwrap();
/// unsafe { Nodes::destruct(node.as_ptr()) };
/// ```
pub struct Local<const SIZE: usize, const COUNT: usize = DEFAULT_COUNT, const ALIGN: usize = DEFAULT_ALIGN>;

impl<const SIZE: usize, const COUNT: usize, const ALIGN: usize> Local<SIZE, COUNT, ALIGN> {
  pub const CONFIG: PoolConfig = PoolConfig::new(SIZE).with_count(COUNT).with_align(ALIGN);

  pub fn construct<T>(value: T) -> Option<NonNull<T>> {
    with(Self::CONFIG, |pool| pool.construct(value)).ok().flatten()
  }

  /// # Safety
  ///
  /// See [`Pool::destruct`].
  pub unsafe fn destruct<T>(ptr: *mut T) {
    unsafe { destruct_in(Self::CONFIG, ptr) };
  }

  pub fn allocate() -> Option<NonNull<u8>> {
    with(Self::CONFIG, Pool::allocate).ok().flatten()
  }

  /// # Safety
  ///
  /// See [`Pool::deallocate`].
  pub unsafe fn deallocate(ptr: *mut u8) {
    if with(Self::CONFIG, |pool| unsafe { pool.deallocate(ptr) }).is_err() {
      unsafe { Pool::release_raw(ptr) };
    }
  }

  pub fn cleanup() -> Reclaimed {
    with(Self::CONFIG, Pool::cleanup).unwrap_or_default()
  }

  /// Runs `f` on this thread's pool for this configuration.
  pub fn with<R>(f: impl FnOnce(&mut Pool) -> R) -> PoolResult<R> {
    with(Self::CONFIG, f)
  }
}
