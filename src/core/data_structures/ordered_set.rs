/*!
 * Ordered Set
 *
 * Sorted, duplicate-free singly-linked chain of keys stored in a node
 * arena. Links are stable `NodeId` indices rather than pointers; freed
 * slots are recycled through a free list.
 *
 * The set performs no synchronization. Callers bracket every access with
 * the appropriate lock mode.
 */

use crate::core::errors::SetError;
use crate::core::types::{Key, SetResult};

type NodeId = usize;

#[derive(Debug, Clone, Copy)]
struct Node {
    key: Key,
    next: Option<NodeId>,
}

/// Position of a key in the chain
///
/// `pred` is the last node with a smaller key, `curr` the first node whose
/// key is `>=` the probe.
struct Cursor {
    pred: Option<NodeId>,
    curr: Option<NodeId>,
}

/// Sorted singly-linked set of integer keys
///
/// # Performance
///
/// - Insert / member / delete: O(n) scan from the head
/// - Node reuse: freed slots are recycled before the arena grows
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    head: Option<NodeId>,
    len: usize,
}

impl OrderedSet {
    /// Create an empty set
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
            head: None,
            len: 0,
        }
    }

    /// Create an empty set with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    /// Build a set from arbitrary keys (duplicates collapse)
    pub fn from_keys<I>(keys: I) -> SetResult<Self>
    where
        I: IntoIterator<Item = Key>,
    {
        let mut set = Self::new();
        for key in keys {
            set.insert(key)?;
        }
        Ok(set)
    }

    #[inline]
    fn locate(&self, key: Key) -> Cursor {
        let mut pred = None;
        let mut curr = self.head;
        while let Some(idx) = curr {
            let node = &self.nodes[idx];
            if node.key >= key {
                break;
            }
            pred = Some(idx);
            curr = node.next;
        }
        Cursor { pred, curr }
    }

    #[inline]
    fn key_at(&self, idx: Option<NodeId>) -> Option<Key> {
        idx.map(|i| self.nodes[i].key)
    }

    fn link(&mut self, pred: Option<NodeId>, target: Option<NodeId>) {
        match pred {
            Some(p) => self.nodes[p].next = target,
            None => self.head = target,
        }
    }

    fn alloc(&mut self, node: Node) -> SetResult<NodeId> {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            return Ok(idx);
        }
        let key = node.key;
        let fail = move |_| SetError::AllocationFailure { key };
        self.nodes.try_reserve(1).map_err(fail)?;
        // Free list must be able to hold every node, so delete never allocates.
        let spare = (self.nodes.len() + 1).saturating_sub(self.free.len());
        self.free.try_reserve(spare).map_err(fail)?;
        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Insert `key`, keeping the chain sorted
    ///
    /// Returns `Ok(false)` if the key was already present (no change).
    /// On allocation failure the set is left unchanged.
    pub fn insert(&mut self, key: Key) -> SetResult<bool> {
        let Cursor { pred, curr } = self.locate(key);
        if self.key_at(curr) == Some(key) {
            return Ok(false);
        }

        let idx = self.alloc(Node { key, next: curr })?;
        self.link(pred, Some(idx));
        self.len += 1;
        Ok(true)
    }

    /// Whether `key` is present
    pub fn member(&self, key: Key) -> bool {
        let Cursor { curr, .. } = self.locate(key);
        self.key_at(curr) == Some(key)
    }

    /// Remove `key`, returning whether it was present
    pub fn delete(&mut self, key: Key) -> bool {
        let Cursor { pred, curr } = self.locate(key);
        match curr {
            Some(idx) if self.nodes[idx].key == key => {
                let next = self.nodes[idx].next;
                self.link(pred, next);
                self.free.push(idx);
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Number of keys
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the set holds no keys
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Drop every node at once
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.head = None;
        self.len = 0;
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Keys<'_> {
        Keys {
            set: self,
            next: self.head,
        }
    }

    /// Whether the chain is strictly ascending (no duplicates)
    pub fn is_strictly_ascending(&self) -> bool {
        let mut prev: Option<Key> = None;
        for key in self.keys() {
            if prev.is_some_and(|p| p >= key) {
                return false;
            }
            prev = Some(key);
        }
        true
    }
}

/// Ascending iterator over [`OrderedSet`] keys
pub struct Keys<'a> {
    set: &'a OrderedSet,
    next: Option<NodeId>,
}

impl Iterator for Keys<'_> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        let idx = self.next?;
        let node = &self.set.nodes[idx];
        self.next = node.next;
        Some(node.key)
    }
}
