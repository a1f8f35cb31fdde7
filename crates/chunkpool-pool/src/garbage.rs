//! Cross-owner return channel.
//!
//! The only state a pool shares with other threads. Any thread may `push`;
//! only the owning pool pops.

use crossbeam_queue::SegQueue;

use crate::chunk::Chunk;

#[derive(Debug, Default)]
pub struct Garbage {
  queue: SegQueue<Chunk>,
}

impl Garbage {
  pub fn new() -> Self {
    Self {
      queue: SegQueue::new(),
    }
  }

  pub fn push(&self, chunk: Chunk) {
    self.queue.push(chunk);
  }

  pub fn try_pop(&self) -> Option<Chunk> {
    self.queue.pop()
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }
}
