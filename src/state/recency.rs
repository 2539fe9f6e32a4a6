//! Recency index: a hash map plus doubly linked list tracking touch order
//! of live connections. Maintained as scaffolding for a future
//! idle-eviction policy; never itself consulted for eviction.
//!
//! Implemented as an arena of nodes (a `Vec<Option<Node>>` with a free list)
//! indexed by handle: the hash map holds handles (lookup only), the arena
//! owns the nodes' lifetime. `touch` reuses the existing slot rather than
//! allocating a fresh one.

use crate::error::RecencyError;
use crate::state::ConnId;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug)]
struct Node {
    id: ConnId,
    prev: Option<usize>,
    next: Option<usize>,
}

struct Inner {
    arena: Vec<Option<Node>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    handles: HashMap<ConnId, usize>,
}

impl Inner {
    fn new() -> Self {
        Self {
            arena: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            handles: HashMap::new(),
        }
    }

    fn alloc(&mut self, id: ConnId) -> usize {
        let node = Node { id, prev: None, next: None };
        if let Some(slot) = self.free.pop() {
            self.arena[slot] = Some(node);
            slot
        } else {
            self.arena.push(Some(node));
            self.arena.len() - 1
        }
    }

    /// Unlink `slot` from the list without freeing it.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.arena[slot].as_ref().expect("unlink of freed slot");
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.arena[p].as_mut().unwrap().next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.arena[n].as_mut().unwrap().prev = prev,
            None => self.tail = prev,
        }
        let node = self.arena[slot].as_mut().unwrap();
        node.prev = None;
        node.next = None;
    }

    /// Append `slot` to the tail (most-recently-touched end).
    fn link_tail(&mut self, slot: usize) {
        match self.tail {
            Some(t) => {
                self.arena[t].as_mut().unwrap().next = Some(slot);
                self.arena[slot].as_mut().unwrap().prev = Some(t);
                self.tail = Some(slot);
            }
            None => {
                self.head = Some(slot);
                self.tail = Some(slot);
            }
        }
    }
}

/// Tracks a most-recently-active ordering over live connection identifiers.
pub struct RecencyIndex {
    inner: Mutex<Inner>,
}

impl RecencyIndex {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::new()) }
    }

    /// Appends `id` to the tail. Fails if `id` is already present.
    pub fn add(&self, id: ConnId) -> Result<(), RecencyError> {
        let mut inner = self.inner.lock();
        if inner.handles.contains_key(&id) {
            return Err(RecencyError::AlreadyPresent);
        }
        let slot = inner.alloc(id);
        inner.link_tail(slot);
        inner.handles.insert(id, slot);
        Ok(())
    }

    /// Unlinks and deletes `id`'s node. Fails if `id` is absent.
    pub fn remove(&self, id: ConnId) -> Result<(), RecencyError> {
        let mut inner = self.inner.lock();
        let slot = inner.handles.remove(&id).ok_or(RecencyError::NotPresent)?;
        inner.unlink(slot);
        inner.arena[slot] = None;
        inner.free.push(slot);
        Ok(())
    }

    /// Moves `id`'s node to the tail. Fails if `id` is absent. A no-op on
    /// ordering if `id` is already the only element, but must still succeed.
    pub fn touch(&self, id: ConnId) -> Result<(), RecencyError> {
        let mut inner = self.inner.lock();
        let slot = *inner.handles.get(&id).ok_or(RecencyError::NotPresent)?;
        inner.unlink(slot);
        inner.link_tail(slot);
        Ok(())
    }

    /// Current order head (least-recently-touched) to tail (most-recent).
    pub fn snapshot(&self) -> Vec<ConnId> {
        let inner = self.inner.lock();
        let mut out = Vec::new();
        let mut cur = inner.head;
        while let Some(slot) = cur {
            let node = inner.arena[slot].as_ref().expect("live slot in list");
            out.push(node.id);
            cur = node.next;
        }
        out
    }
}

impl Default for RecencyIndex {
    fn default() -> Self {
        Self::new()
    }
}
