#![cfg_attr(not(test), no_std)]

//! Doubly-linked list over dense `usize` handles.
//!
//! The links live in a side table owned by the list instead of inside the
//! linked items, so nodes never point at each other. Every operation except
//! table growth is O(1).

extern crate alloc;

use alloc::vec::Vec;

use getset::{
  CopyGetters,
  Getters,
};

pub type Handle = usize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct Link {
  #[getset(get_copy = "pub")]
  next: Option<Handle>,
  #[getset(get_copy = "pub")]
  prev: Option<Handle>,
  #[getset(get_copy = "pub")]
  linked: bool,
}

#[derive(Debug, Default, Getters, CopyGetters)]
pub struct List {
  #[getset(get = "pub")]
  links: Vec<Link>,
  #[getset(get_copy = "pub")]
  head: Option<Handle>,
  #[getset(get_copy = "pub")]
  tail: Option<Handle>,
  #[getset(get_copy = "pub")]
  len: usize,
}

impl List {
  pub const fn new() -> Self {
    Self {
      links: Vec::new(),
      head: None,
      tail: None,
      len: 0,
    }
  }

  fn ensure(&mut self, handle: Handle) {
    if handle >= self.links.len() {
      self.links.resize(handle + 1, Link::default());
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  pub fn front(&self) -> Option<Handle> {
    self.head
  }

  pub fn link(&self, handle: Handle) -> Option<&Link> {
    self.links.get(handle)
  }

  pub fn contains(&self, handle: Handle) -> bool {
    self.links.get(handle).is_some_and(|link| link.linked)
  }

  /// Links `handle` in front of the current head. Returns `false` if it is
  /// already part of the list.
  pub fn push_front(&mut self, handle: Handle) -> bool {
    if self.contains(handle) {
      return false;
    }
    self.ensure(handle);

    let old = self.head;
    self.links[handle] = Link {
      next: old,
      prev: None,
      linked: true,
    };

    match old {
      Some(old) => self.links[old].prev = Some(handle),
      None => self.tail = Some(handle),
    }

    self.head = Some(handle);
    self.len += 1;
    true
  }

  pub fn push_back(&mut self, handle: Handle) -> bool {
    if self.contains(handle) {
      return false;
    }
    self.ensure(handle);

    let old = self.tail;
    self.links[handle] = Link {
      next: None,
      prev: old,
      linked: true,
    };

    match old {
      Some(old) => self.links[old].next = Some(handle),
      None => self.head = Some(handle),
    }

    self.tail = Some(handle);
    self.len += 1;
    true
  }

  pub fn pop_front(&mut self) -> Option<Handle> {
    let head = self.head?;
    self.remove(head);
    Some(head)
  }

  /// Unlinks `handle`, stitching its neighbours together. Returns `false`
  /// when the handle was not linked.
  pub fn remove(&mut self, handle: Handle) -> bool {
    if !self.contains(handle) {
      return false;
    }

    let Link { next, prev, .. } = self.links[handle];

    match prev {
      Some(prev) => self.links[prev].next = next,
      None => self.head = next,
    }

    match next {
      Some(next) => self.links[next].prev = prev,
      None => self.tail = prev,
    }

    self.links[handle] = Link::default();
    self.len -= 1;
    true
  }

  pub fn iter(&self) -> ListIter<'_> {
    ListIter {
      list: self,
      next: self.head,
    }
  }

  pub fn clear(&mut self) {
    self.links.clear();
    self.head = None;
    self.tail = None;
    self.len = 0;
  }
}

pub struct ListIter<'list> {
  list: &'list List,
  next: Option<Handle>,
}

impl<'list> Iterator for ListIter<'list> {
  type Item = Handle;

  fn next(&mut self) -> Option<Self::Item> {
    let current = self.next?;
    self.next = self.list.links[current].next;
    Some(current)
  }
}

pub struct ListDrainer<'list> {
  list: &'list mut List,
}

impl<'list> From<&'list mut List> for ListDrainer<'list> {
  fn from(list: &'list mut List) -> Self {
    Self { list }
  }
}

impl<'list> Iterator for ListDrainer<'list> {
  type Item = Handle;

  fn next(&mut self) -> Option<Self::Item> {
    self.list.pop_front()
  }
}

pub mod prelude {
  pub use super::{
    Handle,
    Link,
    List,
    ListDrainer,
    ListIter,
  };
}
