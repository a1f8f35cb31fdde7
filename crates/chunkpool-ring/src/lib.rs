#![cfg_attr(not(test), no_std)]

extern crate alloc;

use alloc::vec::Vec;

const MIN_CAPACITY: usize = 4;

/// Growable circular buffer.
///
/// `push`/`pop` give FIFO order; `push_front`/`pop_back` make it usable as a
/// double-ended queue. Storage doubles when full and only shrinks on request.
pub struct Ring<T> {
  buf: Vec<Option<T>>,
  head: usize,
  len: usize,
}

impl<T> Ring<T> {
  pub const fn new() -> Self {
    Self {
      buf: Vec::new(),
      head: 0,
      len: 0,
    }
  }

  pub fn with_capacity(capacity: usize) -> Self {
    let mut ring = Self::new();
    ring.buf.resize_with(capacity, || None);
    ring
  }

  pub fn capacity(&self) -> usize {
    self.buf.len()
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn is_full(&self) -> bool {
    self.len == self.buf.len()
  }

  fn slot(&self, nth: usize) -> usize {
    (self.head + nth) % self.buf.len()
  }

  fn grow(&mut self) {
    let old = self.buf.len();
    let new = if old == 0 { MIN_CAPACITY } else { old * 2 };

    let mut buf = Vec::with_capacity(new);
    for nth in 0..self.len {
      let at = self.slot(nth);
      buf.push(self.buf[at].take());
    }
    buf.resize_with(new, || None);

    self.buf = buf;
    self.head = 0;
  }

  /// Appends at the back.
  pub fn push(&mut self, val: T) {
    if self.is_full() {
      self.grow();
    }

    let at = self.slot(self.len);
    self.buf[at] = Some(val);
    self.len += 1;
  }

  pub fn push_front(&mut self, val: T) {
    if self.is_full() {
      self.grow();
    }

    let cap = self.buf.len();
    self.head = (self.head + cap - 1) % cap;
    self.buf[self.head] = Some(val);
    self.len += 1;
  }

  /// Removes from the front (oldest first).
  pub fn pop(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }

    let val = self.buf[self.head].take();
    self.head = (self.head + 1) % self.buf.len();
    self.len -= 1;

    val
  }

  pub fn pop_back(&mut self) -> Option<T> {
    if self.is_empty() {
      return None;
    }

    let at = self.slot(self.len - 1);
    self.len -= 1;
    self.buf[at].take()
  }

  pub fn peek(&self) -> Option<&T> {
    if self.is_empty() {
      return None;
    }
    self.buf[self.head].as_ref()
  }

  pub fn clear(&mut self) {
    while self.pop().is_some() {}
    self.head = 0;
  }

  pub fn shrink_to_fit(&mut self) {
    let mut buf = Vec::with_capacity(self.len);
    while let Some(val) = self.pop() {
      buf.push(Some(val));
    }
    self.len = buf.len();
    self.head = 0;
    self.buf = buf;
  }

  pub fn iter(&self) -> RingIter<'_, T> {
    RingIter {
      ring: self,
      nth: 0,
    }
  }
}

impl<T> Default for Ring<T> {
  fn default() -> Self {
    Self::new()
  }
}

pub struct RingIter<'ring, T> {
  ring: &'ring Ring<T>,
  nth: usize,
}

impl<'ring, T> Iterator for RingIter<'ring, T> {
  type Item = &'ring T;

  fn next(&mut self) -> Option<Self::Item> {
    if self.nth >= self.ring.len {
      return None;
    }

    let at = self.ring.slot(self.nth);
    self.nth += 1;
    self.ring.buf[at].as_ref()
  }
}
