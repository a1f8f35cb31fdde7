//! One raw region from the system, split into `count` equal chunks.
//!
//! The [`Header`] sits at the start of the region. Chunk slots follow at
//! [`Geometry::offset`], `Geometry::size` bytes apart, and are addressed by
//! slot index internally. Header fields are only read and written through raw
//! place expressions: `owner` is read by foreign threads while the owning
//! thread updates `cursor` and `free`.

use core::ptr::NonNull;

use chunkpool_list::Handle;

use crate::{
  chunk::{
    Chunk,
    NIL,
  },
  config::Geometry,
  garbage::Garbage,
};

#[repr(C)]
pub struct Header {
  /// Garbage queue of the pool that created this block. Doubles as the
  /// owner's identity and is never rewritten.
  owner: NonNull<Garbage>,
  /// Slot index of the first free chunk, or [`NIL`] when fully allocated.
  cursor: usize,
  /// Number of free chunks.
  free: usize,
  /// Handle of this block in the owner's block table.
  id: Handle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Block(NonNull<Header>);

impl Block {
  /// Writes the header and threads every chunk onto the free list in slot
  /// order.
  ///
  /// # Safety
  ///
  /// `base` must point to `geo.bytes()` writable bytes aligned to `geo.align()`.
  pub unsafe fn initialize(
    base: NonNull<u8>,
    owner: NonNull<Garbage>,
    id: Handle,
    geo: &Geometry,
  ) -> Self {
    let header = base.cast::<Header>();
    unsafe {
      header.write(Header {
        owner,
        cursor: 0,
        free: geo.count(),
        id,
      })
    };

    let block = Self(header);
    let last = geo.count() - 1;
    for slot in 0..geo.count() {
      let chunk = block.slot(geo, slot);
      let next = if slot == last { NIL } else { slot + 1 };
      unsafe {
        chunk.set_block(header);
        chunk.set_link(next);
      }
    }

    block
  }

  /// # Safety
  ///
  /// `header` must come from [`Chunk::block`] of a chunk whose block is alive.
  pub const unsafe fn from_header(header: NonNull<Header>) -> Self {
    Self(header)
  }

  pub fn base(self) -> NonNull<u8> {
    self.0.cast()
  }

  pub fn owner(self) -> NonNull<Garbage> {
    unsafe { (*self.0.as_ptr()).owner }
  }

  pub fn id(self) -> Handle {
    unsafe { (*self.0.as_ptr()).id }
  }

  pub fn cursor(self) -> usize {
    unsafe { (*self.0.as_ptr()).cursor }
  }

  pub fn free(self) -> usize {
    unsafe { (*self.0.as_ptr()).free }
  }

  /// No free chunk left.
  pub fn is_full(self) -> bool {
    self.cursor() == NIL
  }

  /// No live chunk left.
  pub fn is_idle(self, geo: &Geometry) -> bool {
    self.free() == geo.count()
  }

  pub fn slot(self, geo: &Geometry, index: usize) -> Chunk {
    debug_assert!(index < geo.count());
    let at = geo.offset() + index * geo.size();
    unsafe { Chunk::from_raw(self.base().byte_add(at)) }
  }

  pub fn index_of(self, geo: &Geometry, chunk: Chunk) -> usize {
    (chunk.addr() - self.base().as_ptr() as usize - geo.offset()) / geo.size()
  }

  /// Whether `addr` falls inside one of this block's chunk slots.
  pub fn contains(self, geo: &Geometry, addr: usize) -> bool {
    let start = self.base().as_ptr() as usize + geo.offset();
    let end = start + geo.size() * geo.count();
    (start..end).contains(&addr)
  }

  /// Pops the chunk at the cursor.
  pub fn take(self, geo: &Geometry) -> Option<Chunk> {
    let cursor = self.cursor();
    if cursor == NIL {
      return None;
    }

    let chunk = self.slot(geo, cursor);
    let header = self.0.as_ptr();
    unsafe {
      (*header).cursor = chunk.link();
      (*header).free -= 1;
    }
    Some(chunk)
  }

  /// Pushes `chunk` back in front of the cursor.
  pub fn give(self, geo: &Geometry, chunk: Chunk) {
    debug_assert_eq!(unsafe { chunk.block() }, self.0);

    let header = self.0.as_ptr();
    unsafe {
      chunk.set_link((*header).cursor);
      (*header).cursor = self.index_of(geo, chunk);
      (*header).free += 1;
    }
  }
}

#[cfg(test)]
mod tests {
  use std::alloc::{
    alloc,
    dealloc,
  };

  use super::*;
  use crate::config::PoolConfig;

  struct Region {
    base: NonNull<u8>,
    geo: Geometry,
  }

  impl Region {
    fn new(config: PoolConfig) -> Self {
      let geo = Geometry::compute(&config).unwrap();
      let base = NonNull::new(unsafe { alloc(geo.layout()) }).unwrap();
      Self { base, geo }
    }

    fn block(&self, id: Handle) -> Block {
      unsafe { Block::initialize(self.base, NonNull::dangling(), id, &self.geo) }
    }
  }

  impl Drop for Region {
    fn drop(&mut self) {
      unsafe { dealloc(self.base.as_ptr(), self.geo.layout()) };
    }
  }

  #[test]
  fn test_initialize_threads_free_list() {
    let region = Region::new(PoolConfig::new(24).with_count(4).with_align(16));
    let block = region.block(7);
    let geo = &region.geo;

    assert_eq!(block.id(), 7);
    assert_eq!(block.cursor(), 0);
    assert_eq!(block.free(), 4);
    assert!(block.is_idle(geo));

    for slot in 0..4 {
      let chunk = block.slot(geo, slot);
      assert_eq!(unsafe { chunk.block() }, block.0);
      let expected = if slot == 3 { NIL } else { slot + 1 };
      assert_eq!(unsafe { chunk.link() }, expected);
      assert_eq!(chunk.payload().as_ptr() as usize % 16, 0);
    }
  }

  #[test]
  fn test_take_until_full() {
    let region = Region::new(PoolConfig::new(8).with_count(2));
    let block = region.block(0);
    let geo = &region.geo;

    let a = block.take(geo).unwrap();
    let b = block.take(geo).unwrap();

    assert_eq!(block.index_of(geo, a), 0);
    assert_eq!(block.index_of(geo, b), 1);
    assert!(block.is_full());
    assert_eq!(block.free(), 0);
    assert!(block.take(geo).is_none());
  }

  #[test]
  fn test_give_is_lifo() {
    let region = Region::new(PoolConfig::new(8).with_count(4));
    let block = region.block(0);
    let geo = &region.geo;

    let chunks: Vec<Chunk> = (0..4).map(|_| block.take(geo).unwrap()).collect();
    block.give(geo, chunks[2]);
    block.give(geo, chunks[0]);

    assert_eq!(block.free(), 2);
    assert_eq!(block.take(geo), Some(chunks[0]));
    assert_eq!(block.take(geo), Some(chunks[2]));
    assert!(block.take(geo).is_none());
  }

  #[test]
  fn test_first_slot_back_is_not_idle() {
    let region = Region::new(PoolConfig::new(8).with_count(2));
    let block = region.block(0);
    let geo = &region.geo;

    let a = block.take(geo).unwrap();
    let _b = block.take(geo).unwrap();
    block.give(geo, a);

    // the cursor is back on slot 0 while slot 1 is still live
    assert_eq!(block.cursor(), 0);
    assert!(!block.is_idle(geo));
  }

  #[test]
  fn test_contains() {
    let region = Region::new(PoolConfig::new(32).with_count(2).with_align(32));
    let block = region.block(0);
    let geo = &region.geo;

    let first = block.slot(geo, 0);
    let last = block.slot(geo, 1);
    assert!(block.contains(geo, first.addr()));
    assert!(block.contains(geo, last.payload().as_ptr() as usize));
    assert!(!block.contains(geo, block.base().as_ptr() as usize));
    assert!(!block.contains(geo, last.addr() + geo.size()));
  }
}
