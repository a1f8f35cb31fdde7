use core::{
  alloc::Layout,
  ptr::{
    self,
    NonNull,
  },
};

use chunkpool_list::List;
use chunkpool_ring::Ring;
use chunkpool_sys::{
  GLOBAL_SYSTEM,
  system::System,
};
use tracing::{
  Level,
  debug,
  trace,
  warn,
};

use crate::{
  block::Block,
  chunk::Chunk,
  config::{
    Geometry,
    PoolConfig,
  },
  error::PoolResult,
  garbage::Garbage,
  table::Table,
};

/// What a [`Pool::cleanup`] pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reclaimed {
  /// Cross-owner chunks pulled back into their blocks.
  pub chunks: usize,
  /// Idle blocks returned to the system.
  pub blocks: usize,
}

/// Fixed-size chunk allocator.
///
/// A pool is driven by one thread at a time and is neither `Send` nor `Sync`.
/// The pointers it hands out are plain memory and may be freed from anywhere:
/// through [`Pool::destruct`] on any pool (a foreign pool routes the chunk back
/// to its owner) or through the owner-agnostic [`Pool::release`].
///
/// Dropping a pool returns every block to the system, live chunks included.
pub struct Pool {
  config: PoolConfig,
  geometry: Geometry,
  system: &'static dyn System,
  /// Boxed so its address stays put while the pool moves; block headers
  /// point at it.
  garbage: NonNull<Garbage>,
  /// Blocks with at least one free chunk, most recently revived first.
  active: List,
  /// Blocks with no live chunk, oldest first.
  idle: Ring<Block>,
  blocks: Table,
}

impl Pool {
  pub fn new(chunk: usize) -> PoolResult<Self> {
    Self::with_config(PoolConfig::new(chunk))
  }

  pub fn with_config(config: PoolConfig) -> PoolResult<Self> {
    Self::with_system(config, GLOBAL_SYSTEM)
  }

  pub fn with_system(config: PoolConfig, system: &'static dyn System) -> PoolResult<Self> {
    let geometry = Geometry::compute(&config)?;
    let garbage = NonNull::from(Box::leak(Box::new(Garbage::new())));

    Ok(Self {
      config,
      geometry,
      system,
      garbage,
      active: List::new(),
      idle: Ring::new(),
      blocks: Table::default(),
    })
  }

  pub fn config(&self) -> &PoolConfig {
    &self.config
  }

  pub fn geometry(&self) -> &Geometry {
    &self.geometry
  }

  /// Blocks currently held from the system.
  pub fn blocks(&self) -> usize {
    self.blocks.len()
  }

  /// Blocks waiting in the idle queue.
  pub fn idle(&self) -> usize {
    self.idle.len()
  }

  /// Blocks on the active list.
  pub fn active(&self) -> usize {
    self.active.len()
  }

  /// Chunks other pools have queued for this one.
  pub fn pending(&self) -> usize {
    self.garbage().len()
  }

  /// Free chunks across all blocks, not counting pending cross-owner chunks.
  pub fn available(&self) -> usize {
    self.blocks.iter().map(Block::free).sum()
  }

  /// Whether `ptr` points into one of this pool's chunk slots.
  pub fn owns(&self, ptr: *const u8) -> bool {
    let addr = ptr as usize;
    self.blocks.iter().any(|block| block.contains(&self.geometry, addr))
  }

  fn garbage(&self) -> &Garbage {
    unsafe { self.garbage.as_ref() }
  }

  /// Obtains `blocks` fresh blocks up front and parks them in the idle queue.
  /// They are handed out before any new block is requested, and released by
  /// the next [`Pool::cleanup`] if still unused.
  pub fn reserve(&mut self, blocks: usize) -> PoolResult<()> {
    for _ in 0..blocks {
      let block = self.setup()?;
      self.idle.push(block);
    }
    Ok(())
  }

  fn setup(&mut self) -> PoolResult<Block> {
    let layout = self.geometry.layout();
    let base = unsafe { self.system.alloc(layout) }?;

    let id = self.blocks.next_handle();
    let block = unsafe { Block::initialize(base, self.garbage, id, &self.geometry) };
    self.blocks.insert(block);

    tracing::event!(
      Level::TRACE,
      block = ?block.base(),
      id,
      bytes = layout.size(),
      "block obtained"
    );
    Ok(block)
  }

  fn teardown(&self, block: Block) {
    let layout = self.geometry.layout();
    if let Err(err) = unsafe { self.system.dealloc(block.base(), layout) } {
      warn!(%err, block = ?block.base(), "system refused to take a block back");
      return;
    }
    tracing::event!(Level::TRACE, block = ?block.base(), id = block.id(), "block released");
  }

  fn acquire(&mut self) -> Option<Chunk> {
    if self.active.is_empty() {
      if let Some(block) = self.idle.pop() {
        self.active.push_front(block.id());
      } else if let Some(chunk) = self.garbage().try_pop() {
        return Some(chunk);
      } else {
        match self.setup() {
          Ok(block) => {
            self.active.push_front(block.id());
          }
          Err(err) => {
            warn!(%err, chunk = self.config.chunk(), "pool exhausted");
            return None;
          }
        }
      }
    }

    let head = self.blocks.get(self.active.front()?)?;
    let chunk = head.take(&self.geometry)?;
    if head.is_full() {
      self.active.pop_front();
    }
    Some(chunk)
  }

  fn recycle(&mut self, chunk: Chunk) {
    let block = unsafe { Block::from_header(chunk.block()) };
    debug_assert_eq!(block.owner(), self.garbage);

    if block.is_full() {
      self.active.push_front(block.id());
    }

    block.give(&self.geometry, chunk);

    if block.is_idle(&self.geometry) && self.active.front() != Some(block.id()) {
      self.active.remove(block.id());
      self.idle.push(block);
      trace!(block = ?block.base(), id = block.id(), "block idle");
    }
  }

  /// Recycles what other pools queued for us, bounded by what is queued now.
  fn drain(&mut self) {
    let pending = self.garbage().len();
    for _ in 0..pending {
      match self.garbage().try_pop() {
        Some(chunk) => self.recycle(chunk),
        None => break,
      }
    }
  }

  /// Hands out one uninitialized payload of at least `chunk` bytes, aligned
  /// to the pool's alignment. `None` when the system cannot supply a block.
  pub fn allocate(&mut self) -> Option<NonNull<u8>> {
    self.acquire().map(Chunk::payload)
  }

  /// Returns a payload obtained from any pool. Null is ignored.
  ///
  /// The chunk goes straight back to its block if this pool owns it, and onto
  /// the owner's garbage queue otherwise. Either way, chunks other pools have
  /// queued for this one are recycled afterwards.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or a live payload from a pool that has not been
  /// dropped, and must not be used afterwards.
  pub unsafe fn deallocate(&mut self, ptr: *mut u8) {
    let Some(payload) = NonNull::new(ptr) else {
      return;
    };

    let chunk = unsafe { Chunk::from_payload(payload) };
    let owner = unsafe { Block::from_header(chunk.block()) }.owner();

    if owner == self.garbage {
      self.recycle(chunk);
    } else {
      unsafe { owner.as_ref() }.push(chunk);
      trace!(chunk = ?chunk.as_ptr(), "routed to owner");
    }

    self.drain();
  }

  /// Moves `value` into a fresh chunk.
  ///
  /// `None` if `T` does not fit the chunk size or alignment, or the system is
  /// out of memory; `value` is dropped in that case.
  pub fn construct<T>(&mut self, value: T) -> Option<NonNull<T>> {
    let layout = Layout::new::<T>();
    if !self.geometry.fits(layout) {
      warn!(
        size = layout.size(),
        align = layout.align(),
        payload = self.geometry.payload(),
        "type does not fit the chunk"
      );
      return None;
    }

    let ptr = self.allocate()?.cast::<T>();
    unsafe { ptr.as_ptr().write(value) };
    Some(ptr)
  }

  /// Drops the `T` behind `ptr` and returns its chunk like
  /// [`Pool::deallocate`]. Null is ignored.
  ///
  /// # Safety
  ///
  /// `ptr` must be null or come from [`Pool::construct`] on a live pool, hold
  /// an initialized `T`, and not be used afterwards.
  pub unsafe fn destruct<T>(&mut self, ptr: *mut T) {
    if ptr.is_null() {
      return;
    }

    unsafe {
      ptr::drop_in_place(ptr);
      self.deallocate(ptr.cast());
    }
  }

  /// Queues a payload on its owner's garbage queue without looking at the
  /// caller's pool. Null is ignored.
  ///
  /// # Safety
  ///
  /// Same contract as [`Pool::deallocate`].
  pub unsafe fn release_raw(ptr: *mut u8) {
    let Some(payload) = NonNull::new(ptr) else {
      return;
    };

    let chunk = unsafe { Chunk::from_payload(payload) };
    let owner = unsafe { Block::from_header(chunk.block()) }.owner();
    unsafe { owner.as_ref() }.push(chunk);
  }

  /// Drops the `T` behind `ptr` and queues its chunk on the owner's garbage
  /// queue. Null is ignored.
  ///
  /// # Safety
  ///
  /// Same contract as [`Pool::destruct`].
  pub unsafe fn release<T>(ptr: *mut T) {
    if ptr.is_null() {
      return;
    }

    unsafe {
      ptr::drop_in_place(ptr);
      Self::release_raw(ptr.cast());
    }
  }

  /// Recycles every queued cross-owner chunk, then gives every idle block
  /// back to the system. The only place blocks are freed before drop.
  pub fn cleanup(&mut self) -> Reclaimed {
    let mut reclaimed = Reclaimed::default();

    while let Some(chunk) = self.garbage().try_pop() {
      self.recycle(chunk);
      reclaimed.chunks += 1;
    }

    while let Some(block) = self.idle.pop() {
      self.blocks.remove(block.id());
      self.teardown(block);
      reclaimed.blocks += 1;
    }

    debug!(
      chunks = reclaimed.chunks,
      blocks = reclaimed.blocks,
      remaining = self.blocks.len(),
      "cleanup"
    );
    reclaimed
  }
}

impl Drop for Pool {
  fn drop(&mut self) {
    self.active.clear();
    self.idle.clear();

    let blocks: Vec<Block> = self.blocks.drain().collect();
    for block in blocks {
      self.teardown(block);
    }

    drop(unsafe { Box::from_raw(self.garbage.as_ptr()) });
  }
}
