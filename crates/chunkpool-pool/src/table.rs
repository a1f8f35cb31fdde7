use chunkpool_list::Handle;

use crate::block::Block;

/// Every block a pool currently holds from the system, indexed by handle.
/// Freed handles are reused so the active list's link table stays dense.
#[derive(Debug, Default)]
pub(crate) struct Table {
  slots: Vec<Option<Block>>,
  vacant: Vec<Handle>,
  len: usize,
}

impl Table {
  pub fn len(&self) -> usize {
    self.len
  }

  /// Handle the next [`Table::insert`] will occupy.
  pub fn next_handle(&self) -> Handle {
    self.vacant.last().copied().unwrap_or(self.slots.len())
  }

  pub fn insert(&mut self, block: Block) {
    let id = block.id();
    debug_assert_eq!(id, self.next_handle());

    if self.vacant.last() == Some(&id) {
      self.vacant.pop();
      self.slots[id] = Some(block);
    } else {
      self.slots.push(Some(block));
    }
    self.len += 1;
  }

  pub fn get(&self, id: Handle) -> Option<Block> {
    self.slots.get(id).copied().flatten()
  }

  pub fn remove(&mut self, id: Handle) -> Option<Block> {
    let block = self.slots.get_mut(id)?.take()?;
    self.vacant.push(id);
    self.len -= 1;
    Some(block)
  }

  pub fn iter(&self) -> impl Iterator<Item = Block> + '_ {
    self.slots.iter().filter_map(|slot| *slot)
  }

  pub fn drain(&mut self) -> impl Iterator<Item = Block> + '_ {
    self.vacant.clear();
    self.len = 0;
    self.slots.drain(..).flatten()
  }
}
