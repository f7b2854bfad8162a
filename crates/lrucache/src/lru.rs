//! LRU (Least Recently Used) cache implementation
//!
//! Entries live in a slot arena and are chained by slot index into a
//! doubly-linked list bounded by two sentinel slots:
//!
//! ```text
//! [HEAD] <-> most recent <-> ... <-> least recent <-> [TAIL]
//! ```
//!
//! The sentinels are never removed, so splicing never has to special-case an
//! empty list or a missing neighbor.

use std::collections::HashMap;
use std::fmt;

use ahash::RandomState;
use tracing::{debug, error, trace};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use crate::stats::CacheStats;

/// Value returned by [`LruCache::get`] for a key that is not cached
pub const NOT_FOUND: i64 = -1;

/// Front sentinel slot
const HEAD: usize = 0;
/// Back sentinel slot
const TAIL: usize = 1;
/// Link value of a slot that is not in the list
const NIL: usize = usize::MAX;
/// Most entries reserved up front; larger caches grow as entries arrive
const PREALLOC_LIMIT: usize = 4096;

/// Node in the LRU doubly-linked list
#[derive(Debug, Clone, Copy)]
struct Node {
    key: i64,
    value: i64,
    prev: usize,
    next: usize,
}

impl Node {
    fn unlinked(key: i64, value: i64) -> Self {
        Self {
            key,
            value,
            prev: NIL,
            next: NIL,
        }
    }
}

/// LRU cache with fixed capacity over integer keys and values
pub struct LruCache {
    map: HashMap<i64, usize, RandomState>,
    nodes: Vec<Node>,
    free_list: Vec<usize>,
    capacity: usize,
    stats: CacheStats,
}

impl LruCache {
    /// Create a new LRU cache with the given capacity
    ///
    /// # Errors
    /// [`Error::InvalidConfiguration`] if `capacity <= 0`.
    ///
    /// # Example
    /// ```
    /// use lrucache::LruCache;
    ///
    /// let mut cache = LruCache::new(2).unwrap();
    /// cache.put(1, 10);
    /// assert_eq!(cache.get(1), 10);
    /// assert_eq!(cache.get(2), lrucache::NOT_FOUND);
    /// assert!(LruCache::new(0).is_err());
    /// ```
    pub fn new(capacity: i64) -> Result<Self> {
        Self::with_config(CacheConfig::with_capacity(capacity))
    }

    /// Create a new LRU cache from a [`CacheConfig`]
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        let capacity = config.validate()?;

        let reserve = capacity.min(PREALLOC_LIMIT);

        let mut nodes = Vec::with_capacity(reserve + 2);
        nodes.push(Node {
            key: 0,
            value: 0,
            prev: NIL,
            next: TAIL,
        });
        nodes.push(Node {
            key: 0,
            value: 0,
            prev: HEAD,
            next: NIL,
        });

        debug!(capacity, "created lru cache");

        Ok(Self {
            map: HashMap::with_capacity_and_hasher(reserve, RandomState::new()),
            nodes,
            free_list: Vec::new(),
            capacity,
            stats: CacheStats::new(),
        })
    }

    /// Get a value, marking the key as most recently used
    ///
    /// Returns [`NOT_FOUND`] if the key is not cached.
    pub fn get(&mut self, key: i64) -> i64 {
        self.lookup(key).unwrap_or(NOT_FOUND)
    }

    /// Like [`get`](Self::get), but reports a miss as `None`
    pub fn lookup(&mut self, key: i64) -> Option<i64> {
        match self.map.get(&key) {
            Some(&idx) => {
                self.stats.record_hit();
                self.promote(idx);
                Some(self.nodes[idx].value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    /// Insert or overwrite a key, marking it as most recently used
    ///
    /// Inserting a new key into a full cache first evicts the least recently
    /// used entry.
    pub fn put(&mut self, key: i64, value: i64) {
        if let Some(&idx) = self.map.get(&key) {
            self.nodes[idx].value = value;
            self.stats.record_update();
            self.promote(idx);
            return;
        }

        if self.map.len() >= self.capacity {
            self.evict();
        }

        let idx = self.alloc_node(key, value);
        self.insert_at_front(idx);
        self.map.insert(key, idx);
        self.stats.record_insert();
    }

    /// Read a value without touching recency
    pub fn peek(&self, key: i64) -> Option<i64> {
        self.map.get(&key).map(|&idx| self.nodes[idx].value)
    }

    /// Check membership without touching recency
    pub fn contains(&self, key: i64) -> bool {
        self.map.contains_key(&key)
    }

    /// The entry that the next insert of a new key would evict
    pub fn peek_lru(&self) -> Option<(i64, i64)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            None
        } else {
            let node = &self.nodes[idx];
            Some((node.key, node.value))
        }
    }

    /// Iterate `(key, value)` pairs from most to least recently used
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            cursor: self.nodes[HEAD].next,
            remaining: self.map.len(),
        }
    }

    /// Iterate keys from most to least recently used
    pub fn keys(&self) -> impl Iterator<Item = i64> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Copy out capacity, size, items and recency order
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            capacity: self.capacity as i64,
            size: self.map.len(),
            ..Snapshot::default()
        };
        for (key, value) in self.iter() {
            snapshot.items.insert(key, value);
            snapshot.order.push(key);
        }
        snapshot
    }

    /// Get the current size of the cache
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Get the configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Walk the list in both directions and cross-check it against the index
    ///
    /// # Errors
    /// [`Error::InvariantViolation`] describing the first inconsistency found.
    pub fn check_invariants(&self) -> Result<()> {
        if self.nodes[HEAD].prev != NIL || self.nodes[TAIL].next != NIL {
            return Err(Error::invariant("sentinel has an outer link"));
        }

        // Any walk longer than the arena means a cycle.
        let limit = self.nodes.len();

        let mut forward = 0;
        let mut prev = HEAD;
        let mut cur = self.nodes[HEAD].next;
        while cur != TAIL {
            if cur == NIL || cur == HEAD || cur >= self.nodes.len() {
                return Err(Error::invariant(format!(
                    "slot {} links forward to invalid slot {}",
                    prev, cur
                )));
            }
            if forward >= limit {
                return Err(Error::invariant("cycle in forward links"));
            }
            let node = &self.nodes[cur];
            if node.prev != prev {
                return Err(Error::invariant(format!(
                    "slot {} has prev {}, expected {}",
                    cur, node.prev, prev
                )));
            }
            match self.map.get(&node.key) {
                Some(&idx) if idx == cur => {}
                Some(&idx) => {
                    return Err(Error::invariant(format!(
                        "key {} indexed at slot {} but linked at slot {}",
                        node.key, idx, cur
                    )))
                }
                None => {
                    return Err(Error::invariant(format!(
                        "key {} linked at slot {} but missing from index",
                        node.key, cur
                    )))
                }
            }
            forward += 1;
            prev = cur;
            cur = node.next;
        }
        if self.nodes[TAIL].prev != prev {
            return Err(Error::invariant(format!(
                "tail prev is {}, expected {}",
                self.nodes[TAIL].prev, prev
            )));
        }

        let mut backward = 0;
        let mut cur = self.nodes[TAIL].prev;
        while cur != HEAD {
            if cur == NIL || cur >= self.nodes.len() || backward >= limit {
                return Err(Error::invariant("broken backward links"));
            }
            backward += 1;
            cur = self.nodes[cur].prev;
        }

        if forward != backward {
            return Err(Error::invariant(format!(
                "forward walk saw {} entries, backward walk saw {}",
                forward, backward
            )));
        }
        if forward != self.map.len() {
            return Err(Error::invariant(format!(
                "list holds {} entries, index holds {}",
                forward,
                self.map.len()
            )));
        }
        if forward > self.capacity {
            return Err(Error::invariant(format!(
                "{} entries exceed capacity {}",
                forward, self.capacity
            )));
        }
        Ok(())
    }

    fn promote(&mut self, idx: usize) {
        if self.nodes[HEAD].next == idx {
            return; // Already at front
        }

        match self.detach(idx) {
            Ok(()) => self.insert_at_front(idx),
            Err(err) => invariant_failed(&err),
        }
    }

    fn evict(&mut self) {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return;
        }

        if let Err(err) = self.detach(idx) {
            invariant_failed(&err);
            return;
        }

        let key = self.nodes[idx].key;
        self.map.remove(&key);
        self.free_node(idx);
        self.stats.record_eviction();
        trace!(key, "evicted least recently used entry");
    }

    /// Unlink a slot from its neighbors and clear its own links
    fn detach(&mut self, idx: usize) -> Result<()> {
        if idx == HEAD || idx == TAIL {
            return Err(Error::invariant(format!(
                "cannot detach sentinel slot {}",
                idx
            )));
        }

        let Node { prev, next, .. } = self.nodes[idx];
        if prev == NIL || next == NIL {
            return Err(Error::invariant(format!("slot {} is not linked", idx)));
        }

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let node = &mut self.nodes[idx];
        node.prev = NIL;
        node.next = NIL;
        Ok(())
    }

    /// Splice an unlinked slot in right after the front sentinel
    fn insert_at_front(&mut self, idx: usize) {
        debug_assert!(
            self.nodes[idx].prev == NIL && self.nodes[idx].next == NIL,
            "slot {} is already linked",
            idx
        );

        let first = self.nodes[HEAD].next;

        let node = &mut self.nodes[idx];
        node.prev = HEAD;
        node.next = first;

        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn alloc_node(&mut self, key: i64, value: i64) -> usize {
        let node = Node::unlinked(key, value);
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }
}

fn invariant_failed(err: &Error) {
    error!(%err, "lru ordering corrupted");
    if cfg!(debug_assertions) {
        panic!("{}", err);
    }
}

impl fmt::Debug for LruCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .field("entries", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

/// Iterator over cache entries, most recently used first
pub struct Iter<'a> {
    nodes: &'a [Node],
    cursor: usize,
    remaining: usize,
}

impl Iterator for Iter<'_> {
    type Item = (i64, i64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL || self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.cursor];
        self.cursor = node.next;
        self.remaining -= 1;
        Some((node.key, node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl<'a> IntoIterator for &'a LruCache {
    type Item = (i64, i64);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
