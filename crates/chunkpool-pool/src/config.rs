use core::{
  alloc::Layout,
  cmp,
  mem,
};

use chunkpool_sys::{
  math::{
    adjust,
    boundary,
  },
  prim::min_align,
};
use getset::CopyGetters;

use crate::{
  WORD,
  block::Header,
  error::{
    PoolError,
    PoolResult,
  },
};

/// Chunks per block when the caller does not say otherwise.
pub const DEFAULT_COUNT: usize = 64;
/// Payload alignment when the caller does not say otherwise.
pub const DEFAULT_ALIGN: usize = min_align();
/// Chunk counts are rounded up to a multiple of this.
pub const COUNT_GRANULE: usize = 2;

/// What the caller asked for. Immutable once a pool is built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, CopyGetters)]
pub struct PoolConfig {
  #[getset(get_copy = "pub")]
  chunk: usize,
  #[getset(get_copy = "pub")]
  count: usize,
  #[getset(get_copy = "pub")]
  align: usize,
}

impl PoolConfig {
  pub const fn new(chunk: usize) -> Self {
    Self {
      chunk,
      count: DEFAULT_COUNT,
      align: DEFAULT_ALIGN,
    }
  }

  /// Configuration fitting exactly one `T` per chunk.
  pub const fn of<T>() -> Self {
    Self::new(mem::size_of::<T>()).with_align(mem::align_of::<T>())
  }

  pub const fn with_count(mut self, count: usize) -> Self {
    self.count = count;
    self
  }

  pub const fn with_align(mut self, align: usize) -> Self {
    self.align = align;
    self
  }
}

/// Sizes derived from a [`PoolConfig`], computed once per pool.
///
/// - `align`: power of two, at least the block header's alignment
/// - `size`: one chunk, metadata word included, a multiple of `align`
/// - `count`: chunks per block, a multiple of [`COUNT_GRANULE`]
/// - `offset`: byte offset of the first chunk inside a block, chosen so that
///   every payload starts on an `align` boundary
/// - `bytes`: total size of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Geometry {
  align: usize,
  size: usize,
  count: usize,
  offset: usize,
  bytes: usize,
}

impl Geometry {
  pub fn compute(config: &PoolConfig) -> PoolResult<Self> {
    let requested = cmp::max(config.align, mem::align_of::<Header>());
    let align = boundary(requested).ok_or(PoolError::Overflow)?;

    // a free chunk stores its link in the payload, so keep room for a word
    let payload = cmp::max(config.chunk, WORD);
    let size = payload
      .checked_add(WORD)
      .and_then(|raw| adjust(raw, align))
      .ok_or(PoolError::Overflow)?;

    let count = adjust(cmp::max(config.count, 1), COUNT_GRANULE).ok_or(PoolError::Overflow)?;

    let offset = adjust(mem::size_of::<Header>() + WORD, align).ok_or(PoolError::Overflow)? - WORD;

    let bytes = size
      .checked_mul(count)
      .and_then(|chunks| chunks.checked_add(offset))
      .and_then(|raw| adjust(raw, align))
      .ok_or(PoolError::Overflow)?;

    Layout::from_size_align(bytes, align).map_err(|_| PoolError::Overflow)?;

    Ok(Self {
      align,
      size,
      count,
      offset,
      bytes,
    })
  }

  pub fn layout(&self) -> Layout {
    // validated in `compute`
    unsafe { Layout::from_size_align_unchecked(self.bytes, self.align) }
  }

  /// Usable bytes behind each payload pointer.
  pub fn payload(&self) -> usize {
    self.size - WORD
  }

  pub fn fits(&self, layout: Layout) -> bool {
    layout.size() <= self.payload() && layout.align() <= self.align
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reference_geometry() {
    let config = PoolConfig::new(96).with_count(2).with_align(32);
    let geo = Geometry::compute(&config).unwrap();

    assert_eq!(geo.align(), 32);
    assert_eq!(geo.size(), adjust(96 + WORD, 32).unwrap());
    assert_eq!(geo.count(), 2);
    assert_eq!((geo.offset() + WORD) % 32, 0);
    assert_eq!(geo.bytes() % 32, 0);
    assert!(geo.bytes() >= geo.offset() + geo.size() * geo.count());
  }

  #[test]
  #[cfg(target_pointer_width = "64")]
  fn test_reference_geometry_64() {
    let config = PoolConfig::new(96).with_count(2).with_align(32);
    let geo = Geometry::compute(&config).unwrap();

    assert_eq!(geo.size(), 128);
    assert_eq!(geo.offset(), 56);
    assert_eq!(geo.bytes(), 320);
  }

  #[test]
  fn test_alignment_is_normalized() {
    let geo = Geometry::compute(&PoolConfig::new(10).with_align(24)).unwrap();
    assert_eq!(geo.align(), 32);

    let geo = Geometry::compute(&PoolConfig::new(10).with_align(1)).unwrap();
    assert_eq!(geo.align(), mem::align_of::<Header>());

    let geo = Geometry::compute(&PoolConfig::new(10).with_align(0)).unwrap();
    assert_eq!(geo.align(), mem::align_of::<Header>());
  }

  #[test]
  fn test_count_is_rounded() {
    let geo = Geometry::compute(&PoolConfig::new(8).with_count(3)).unwrap();
    assert_eq!(geo.count(), 4);

    let geo = Geometry::compute(&PoolConfig::new(8).with_count(0)).unwrap();
    assert_eq!(geo.count(), COUNT_GRANULE);

    let geo = Geometry::compute(&PoolConfig::new(8)).unwrap();
    assert_eq!(geo.count(), DEFAULT_COUNT);
  }

  #[test]
  fn test_tiny_chunks_hold_a_link() {
    let geo = Geometry::compute(&PoolConfig::new(0).with_align(1)).unwrap();
    assert!(geo.payload() >= WORD);
    assert_eq!(geo.size() % geo.align(), 0);
  }

  #[test]
  fn test_payloads_are_aligned() {
    for align in [8usize, 16, 32, 64, 128, 4096] {
      for chunk in [1usize, 7, 24, 96, 100, 1000] {
        let geo = Geometry::compute(&PoolConfig::new(chunk).with_align(align)).unwrap();
        assert_eq!(geo.size() % align, 0);
        assert_eq!((geo.offset() + WORD) % align, 0);
        assert!(geo.payload() >= chunk);
      }
    }
  }

  #[test]
  fn test_overflow() {
    let config = PoolConfig::new(usize::MAX - 4);
    assert_eq!(Geometry::compute(&config), Err(PoolError::Overflow));

    let half = 1usize << (usize::BITS / 2);
    let config = PoolConfig::new(half).with_count(half);
    assert_eq!(Geometry::compute(&config), Err(PoolError::Overflow));

    let config = PoolConfig::new(8).with_align(usize::MAX);
    assert_eq!(Geometry::compute(&config), Err(PoolError::Overflow));
  }

  #[test]
  fn test_fits() {
    let geo = Geometry::compute(&PoolConfig::new(16).with_align(16)).unwrap();
    assert!(geo.fits(Layout::new::<u128>()));
    assert!(geo.fits(Layout::new::<[u8; 16]>()));
    assert!(!geo.fits(Layout::from_size_align(16, 32).unwrap()));
    assert!(!geo.fits(Layout::from_size_align(geo.payload() + 1, 1).unwrap()));
  }

  #[test]
  fn test_config_of() {
    let config = PoolConfig::of::<[u64; 3]>();
    assert_eq!(config.chunk(), 24);
    assert_eq!(config.align(), mem::align_of::<u64>());
    assert_eq!(config.count(), DEFAULT_COUNT);
  }
}
