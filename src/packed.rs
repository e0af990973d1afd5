//! Inline-packed compact hash set: the baseline layout.
//!
//! Every slot is a single key word with the occupied and link flags packed
//! into its top two bits, so a probe touches exactly one word. The price is
//! paid on `clear`, which has to zero the whole node table regardless of how
//! few keys were inserted. [`FlaggedSet`](crate::FlaggedSet) is the same
//! algorithm with the flags split out for a cheaper clear.

use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec;
use alloc::vec::Vec;

use crate::key::KeyWord;
use crate::key::Slot;
use crate::overflow::OverflowList;

/// A fixed-capacity exact-membership set with bit-packed inline nodes and
/// overflow chaining.
///
/// `K` is `u32` or `u64`; two bits of the word hold flags, so keys are
/// limited to 30 or 62 significant bits and higher bits are silently masked
/// off. Each of the `capacity` buckets owns one inline node of `NODE_KEYS`
/// slots; once a node fills, excess keys spill into a growable list of
/// `BIG_NODE_KEYS`-slot overflow nodes chained by index.
///
/// There is no deletion and no resizing. Inserting more keys than
/// `capacity` stays correct but degrades into long overflow chains.
///
/// # Examples
///
/// ```rust
/// use churn_set::PackedSet;
///
/// let mut seen: PackedSet<u32> = PackedSet::with_capacity(64);
/// assert!(seen.insert(17));
/// assert!(!seen.insert(17));
/// assert!(seen.contains(17));
///
/// seen.clear();
/// assert!(!seen.contains(17));
/// assert_eq!(seen.len(), 0);
/// ```
pub struct PackedSet<K, const NODE_KEYS: usize = 2, const BIG_NODE_KEYS: usize = 4> {
    nodes: Box<[Slot<K>]>,
    overflow: OverflowList<K, BIG_NODE_KEYS>,
    capacity: usize,
    len: usize,
}

impl<K: KeyWord, const NODE_KEYS: usize, const BIG_NODE_KEYS: usize>
    PackedSet<K, NODE_KEYS, BIG_NODE_KEYS>
{
    /// Creates a set with `capacity` buckets.
    ///
    /// Allocates the zeroed node table up front and reserves overflow
    /// storage for roughly a tenth of the buckets. Aborts on allocation
    /// failure like `Vec`; use [`try_with_capacity`](Self::try_with_capacity)
    /// to handle it instead.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::PackedSet;
    ///
    /// let seen: PackedSet<u64> = PackedSet::with_capacity(1000);
    /// assert_eq!(seen.capacity(), 1000);
    /// assert!(seen.is_empty());
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        const {
            assert!(NODE_KEYS > 1, "inline nodes must hold at least two slots");
            assert!(
                NODE_KEYS < BIG_NODE_KEYS,
                "overflow nodes must be larger than inline nodes"
            );
        }
        assert!(capacity > 0, "capacity must be non-zero");

        PackedSet {
            nodes: vec![Slot::empty(); capacity * NODE_KEYS].into_boxed_slice(),
            overflow: OverflowList::for_capacity(capacity),
            capacity,
            len: 0,
        }
    }

    /// Fallible variant of [`with_capacity`](Self::with_capacity).
    ///
    /// Returns an error if the node table or the overflow reservation
    /// cannot be allocated; no partially built set is observable.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TryReserveError> {
        const {
            assert!(NODE_KEYS > 1, "inline nodes must hold at least two slots");
            assert!(
                NODE_KEYS < BIG_NODE_KEYS,
                "overflow nodes must be larger than inline nodes"
            );
        }
        assert!(capacity > 0, "capacity must be non-zero");

        let slots = capacity * NODE_KEYS;
        let mut nodes = Vec::new();
        nodes.try_reserve_exact(slots)?;
        nodes.resize(slots, Slot::empty());

        Ok(PackedSet {
            nodes: nodes.into_boxed_slice(),
            overflow: OverflowList::try_for_capacity(capacity)?,
            capacity,
            len: 0,
        })
    }

    #[inline(always)]
    fn bucket_of(&self, key: u64) -> usize {
        (K::from_word(key).mix().to_word() % self.capacity as u64) as usize
    }

    /// Adds a key to the set.
    ///
    /// Returns `true` iff the key was not already present. Bits above the
    /// key width (`K::KEY_BITS`) are silently discarded, so two keys that
    /// only differ in their high bits alias to one.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::PackedSet;
    ///
    /// let mut seen: PackedSet<u32> = PackedSet::with_capacity(16);
    /// assert!(seen.insert(5));
    /// assert!(!seen.insert(5));
    /// assert_eq!(seen.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        let key = key.to_word() & Slot::<K>::PAYLOAD_MASK;
        let base = self.bucket_of(key) * NODE_KEYS;

        for i in 0..NODE_KEYS {
            let slot = self.nodes[base + i];
            if !slot.is_occupied() {
                self.nodes[base + i] = Slot::key(key);
                self.len += 1;
                return true;
            }
            if !slot.is_link() && slot.payload() == key {
                return false;
            }
        }

        // Node is full; continue down the overflow chain, or start one by
        // displacing the key in the last slot.
        let last = base + NODE_KEYS - 1;
        let slot = self.nodes[last];
        let inserted = if slot.is_link() {
            self.overflow.insert(slot.link_index(), key)
        } else {
            let next = self.overflow.push_pair(slot.payload(), key);
            self.nodes[last] = Slot::link(next);
            true
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns `true` if the key is in the set.
    ///
    /// Same traversal as [`insert`](Self::insert), read-only. High bits
    /// beyond the key width are discarded before the lookup.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::PackedSet;
    ///
    /// let mut seen: PackedSet<u32> = PackedSet::with_capacity(16);
    /// seen.insert(5);
    /// assert!(seen.contains(5));
    /// assert!(!seen.contains(6));
    /// ```
    pub fn contains(&self, key: K) -> bool {
        let key = key.to_word() & Slot::<K>::PAYLOAD_MASK;
        let base = self.bucket_of(key) * NODE_KEYS;

        for i in 0..NODE_KEYS {
            let slot = self.nodes[base + i];
            if !slot.is_occupied() {
                return false;
            }
            if !slot.is_link() && slot.payload() == key {
                return true;
            }
        }

        let slot = self.nodes[base + NODE_KEYS - 1];
        if slot.is_link() {
            self.overflow.contains(slot.link_index(), key)
        } else {
            false
        }
    }

    /// Removes all keys in one bulk pass.
    ///
    /// Zeroes the entire node table and empties the overflow list. Cost is
    /// proportional to capacity, independent of how many keys were actually
    /// inserted — the intended regime refills close to capacity each cycle.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::PackedSet;
    ///
    /// let mut seen: PackedSet<u32> = PackedSet::with_capacity(16);
    /// seen.insert(1);
    /// seen.insert(2);
    /// seen.clear();
    /// assert!(seen.is_empty());
    /// assert!(!seen.contains(1));
    /// ```
    pub fn clear(&mut self) {
        self.nodes.fill(Slot::empty());
        self.overflow.clear();
        self.len = 0;
    }

    /// Returns the number of distinct keys currently in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of buckets fixed at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of overflow nodes currently allocated.
    ///
    /// A load diagnostic: it grows as buckets spill past their inline
    /// nodes, never shrinks within a cycle, and resets to zero on
    /// [`clear`](Self::clear).
    pub fn overdrawn_size(&self) -> usize {
        self.overflow.len()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::key::mix32;

    #[test]
    fn insert_reports_first_sighting_only() {
        let mut set: PackedSet<u32> = PackedSet::with_capacity(16);
        assert!(set.insert(1));
        assert!(set.insert(2));
        assert!(!set.insert(1));
        assert!(!set.insert(2));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn contains_reflects_prior_inserts() {
        let mut set: PackedSet<u32> = PackedSet::with_capacity(16);
        for key in 0..10u32 {
            assert!(!set.contains(key));
            set.insert(key);
            assert!(set.contains(key));
        }
    }

    #[test]
    fn matches_reference_set_call_for_call() {
        for count in [1_000usize, 10_000, 50_000] {
            let mut set: PackedSet<u32, 2, 8> = PackedSet::with_capacity(count);
            let mut reference = hashbrown::HashSet::new();
            let mut rng = SmallRng::seed_from_u64(336);
            for _ in 0..count {
                let key = rng.random_range(0..1_000_000u32);
                assert_eq!(set.insert(key), reference.insert(key), "key {key}");
            }
            assert_eq!(set.len(), reference.len());
            for &key in &reference {
                assert!(set.contains(key));
            }
        }
    }

    #[test]
    fn matches_reference_set_for_62_bit_keys() {
        let mut set: PackedSet<u64, 2, 8> = PackedSet::with_capacity(10_000);
        let mut reference = hashbrown::HashSet::new();
        let mut rng = SmallRng::seed_from_u64(336);
        for _ in 0..10_000 {
            let key = rng.random_range(0..100_000_000_000u64);
            assert_eq!(set.insert(key), reference.insert(key), "key {key}");
        }
        assert_eq!(set.len(), reference.len());
    }

    #[test]
    fn clear_resets_everything() {
        let mut set: PackedSet<u32> = PackedSet::with_capacity(64);
        let keys: Vec<u32> = (0..200).collect();
        for &key in &keys {
            set.insert(key);
        }
        assert!(set.overdrawn_size() > 0);

        set.clear();
        assert_eq!(set.len(), 0);
        assert!(set.is_empty());
        assert_eq!(set.overdrawn_size(), 0);
        for &key in &keys {
            assert!(!set.contains(key));
        }
    }

    #[test]
    fn refill_cycles_behave_like_a_fresh_set() {
        let mut set: PackedSet<u32, 3, 4> = PackedSet::with_capacity(1_000);
        for _ in 0..3 {
            let mut reference = hashbrown::HashSet::new();
            let mut rng = SmallRng::seed_from_u64(336);
            for _ in 0..1_000 {
                let key = rng.random_range(0..1_000_000u32);
                assert_eq!(set.insert(key), reference.insert(key));
            }
            set.clear();
        }
    }

    #[test]
    fn colliding_keys_spill_into_one_overflow_node() {
        let capacity = 8usize;
        let mut set: PackedSet<u32, 2, 4> = PackedSet::with_capacity(capacity);

        // Three distinct keys that all land in bucket 0.
        let colliding: Vec<u32> = (0..)
            .filter(|&k| (mix32(k) as usize) % capacity == 0)
            .take(3)
            .collect();

        for &key in &colliding {
            assert!(set.insert(key));
        }
        // Two fill the inline node; the third displaces the second into a
        // fresh overflow node.
        assert_eq!(set.len(), 3);
        assert_eq!(set.overdrawn_size(), 1);
        for &key in &colliding {
            assert!(set.contains(key));
        }
    }

    #[test]
    fn overdrawn_size_is_monotonic_within_a_cycle() {
        let mut set: PackedSet<u32> = PackedSet::with_capacity(16);
        let mut last = 0;
        for key in 0..500u32 {
            set.insert(key);
            let now = set.overdrawn_size();
            assert!(now >= last);
            last = now;
        }
        assert!(last > 0);
    }

    #[test]
    fn overfilling_beyond_capacity_stays_correct() {
        // 100x oversubscribed: long chains, but membership stays exact.
        let mut set: PackedSet<u32> = PackedSet::with_capacity(32);
        for key in 0..3_200u32 {
            assert!(set.insert(key));
        }
        assert_eq!(set.len(), 3_200);
        for key in 0..3_200u32 {
            assert!(set.contains(key));
            assert!(!set.insert(key));
        }
        assert!(!set.contains(3_200));
    }

    #[test]
    fn high_bits_alias_after_truncation() {
        let mut set: PackedSet<u32> = PackedSet::with_capacity(16);
        assert!(set.insert(5));
        // Same low 30 bits as 5; the high bits are a documented caller
        // precondition and get masked off.
        assert!(!set.insert(5 | (1 << 30)));
        assert!(set.contains(5 | (1 << 31)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn full_domain_round_trip_has_no_false_results() {
        let domain = 4_096u32;
        let mut set: PackedSet<u32> = PackedSet::with_capacity(512);
        let mut reference = hashbrown::HashSet::new();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..512 {
            let key = rng.random_range(0..domain);
            set.insert(key);
            reference.insert(key);
        }
        for key in 0..domain {
            assert_eq!(set.contains(key), reference.contains(&key), "key {key}");
        }
    }

    #[test]
    fn try_with_capacity_builds_a_working_set() {
        let mut set: PackedSet<u32> = PackedSet::try_with_capacity(100).unwrap();
        assert!(set.insert(42));
        assert!(set.contains(42));
        assert_eq!(set.capacity(), 100);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn zero_capacity_is_rejected() {
        let _ = PackedSet::<u32>::with_capacity(0);
    }
}
