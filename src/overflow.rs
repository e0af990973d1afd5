//! Growable arena of overflow nodes forming per-bucket excess chains.
//!
//! A chain is rooted at a full bucket whose last slot carries a link, and is
//! walked by following link indices until a key match, an empty slot, or a
//! non-link terminal. Chains only grow at the terminal and nodes are never
//! removed individually; `clear` empties the whole arena. Because slots fill
//! in order, the first empty slot along a chain proves the key is absent
//! downstream.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use crate::key::KeyWord;
use crate::key::Slot;

/// Fraction of table capacity reserved for overflow nodes up front. A
/// tuning heuristic, not a bound; the arena still grows on demand.
const RESERVE_DIVISOR: usize = 10;

pub(crate) struct OverflowList<K, const BIG_NODE_KEYS: usize> {
    nodes: Vec<[Slot<K>; BIG_NODE_KEYS]>,
}

impl<K: KeyWord, const BIG_NODE_KEYS: usize> OverflowList<K, BIG_NODE_KEYS> {
    pub(crate) fn for_capacity(capacity: usize) -> Self {
        OverflowList {
            nodes: Vec::with_capacity(capacity / RESERVE_DIVISOR),
        }
    }

    pub(crate) fn try_for_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        let mut nodes = Vec::new();
        nodes.try_reserve(capacity / RESERVE_DIVISOR)?;
        Ok(OverflowList { nodes })
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Appends a node seeded with a displaced key and a newly inserted key.
    /// Returns the new node's index for the caller to relink.
    #[inline]
    pub(crate) fn push_pair(&mut self, displaced: u64, key: u64) -> usize {
        let mut node = [Slot::empty(); BIG_NODE_KEYS];
        node[0] = Slot::key(displaced);
        node[1] = Slot::key(key);
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    /// Inserts `key` into the chain rooted at node `head`. Returns `true`
    /// iff the key was not already present.
    pub(crate) fn insert(&mut self, head: usize, key: u64) -> bool {
        let mut index = head;
        loop {
            for i in 0..BIG_NODE_KEYS {
                let slot = self.nodes[index][i];
                if !slot.is_occupied() {
                    self.nodes[index][i] = Slot::key(key);
                    return true;
                }
                if !slot.is_link() && slot.payload() == key {
                    return false;
                }
            }
            let last = self.nodes[index][BIG_NODE_KEYS - 1];
            if last.is_link() {
                index = last.link_index();
                continue;
            }
            // Full terminal node: displace its last key into a fresh node
            // alongside the new key and relink.
            let next = self.push_pair(last.payload(), key);
            self.nodes[index][BIG_NODE_KEYS - 1] = Slot::link(next);
            return true;
        }
    }

    /// Read-only membership walk over the chain rooted at `head`.
    pub(crate) fn contains(&self, head: usize, key: u64) -> bool {
        let mut index = head;
        loop {
            for i in 0..BIG_NODE_KEYS {
                let slot = self.nodes[index][i];
                if !slot.is_occupied() {
                    return false;
                }
                if !slot.is_link() && slot.payload() == key {
                    return true;
                }
            }
            let last = self.nodes[index][BIG_NODE_KEYS - 1];
            if !last.is_link() {
                return false;
            }
            index = last.link_index();
        }
    }
}
