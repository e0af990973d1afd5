//! Flag-array compact hash set: the primary layout.
//!
//! Same algorithm as [`PackedSet`](crate::PackedSet), but the per-slot
//! occupied and link flags live in two parallel bit-vectors instead of the
//! key word's top bits. Each probe pays one extra indirection, and in
//! exchange `clear` only has to zero the flag bits — a sixteenth (`u32`) or
//! thirty-second (`u64`) of the bytes the packed layout touches. The stale
//! key words left behind are inert because every read is gated on the
//! occupied flag.

use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec;
use alloc::vec::Vec;

use crate::bits::BitVec;
use crate::key::KeyWord;
use crate::key::Slot;
use crate::overflow::OverflowList;

/// A fixed-capacity exact-membership set with parallel flag arrays and
/// overflow chaining, optimized for cheap bulk clears.
///
/// Shares its key model with [`PackedSet`](crate::PackedSet): `K` is `u32`
/// or `u64`, keys are limited to 30 or 62 significant bits, and higher bits
/// are silently masked off. Overflow nodes keep the packed slot layout;
/// only the first-level table splits its flags out, since that is the part
/// `clear` has to touch.
///
/// # Examples
///
/// ```rust
/// use churn_set::FlaggedSet;
///
/// let mut visited: FlaggedSet<u32> = FlaggedSet::with_capacity(1024);
/// assert!(visited.insert(7));
/// assert!(!visited.insert(7));
///
/// visited.clear();
/// assert!(!visited.contains(7));
/// assert!(visited.is_empty());
/// ```
pub struct FlaggedSet<K, const NODE_KEYS: usize = 2, const BIG_NODE_KEYS: usize = 4> {
    keys: Box<[K]>,
    occupied: BitVec,
    links: BitVec,
    overflow: OverflowList<K, BIG_NODE_KEYS>,
    capacity: usize,
    len: usize,
}

impl<K: KeyWord, const NODE_KEYS: usize, const BIG_NODE_KEYS: usize>
    FlaggedSet<K, NODE_KEYS, BIG_NODE_KEYS>
{
    /// Creates a set with `capacity` buckets.
    ///
    /// Aborts on allocation failure like `Vec`; use
    /// [`try_with_capacity`](Self::try_with_capacity) to handle it instead.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::FlaggedSet;
    ///
    /// let visited: FlaggedSet<u32> = FlaggedSet::with_capacity(100);
    /// assert_eq!(visited.capacity(), 100);
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

        let slots = capacity * NODE_KEYS;
        FlaggedSet {
            keys: vec![K::from_word(0); slots].into_boxed_slice(),
            occupied: BitVec::with_len(slots),
            links: BitVec::with_len(slots),
            overflow: OverflowList::for_capacity(capacity),
            capacity,
            len: 0,
        }
    }

    /// Fallible variant of [`with_capacity`](Self::with_capacity).
    ///
    /// Returns an error if any backing buffer cannot be allocated; no
    /// partially built set is observable.
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
        let mut keys = Vec::new();
        keys.try_reserve_exact(slots)?;
        keys.resize(slots, K::from_word(0));

        Ok(FlaggedSet {
            keys: keys.into_boxed_slice(),
            occupied: BitVec::try_with_len(slots)?,
            links: BitVec::try_with_len(slots)?,
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
    /// key width are silently discarded.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::FlaggedSet;
    ///
    /// let mut visited: FlaggedSet<u32> = FlaggedSet::with_capacity(16);
    /// assert!(visited.insert(9));
    /// assert!(!visited.insert(9));
    /// assert_eq!(visited.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K) -> bool {
        let key = key.to_word() & Slot::<K>::PAYLOAD_MASK;
        let base = self.bucket_of(key) * NODE_KEYS;

        for i in 0..NODE_KEYS {
            let slot = base + i;
            if !self.occupied.get(slot) {
                self.keys[slot] = K::from_word(key);
                self.occupied.set(slot);
                self.len += 1;
                return true;
            }
            if !self.links.get(slot) && self.keys[slot].to_word() == key {
                return false;
            }
        }

        let last = base + NODE_KEYS - 1;
        let inserted = if self.links.get(last) {
            self.overflow.insert(self.keys[last].to_word() as usize, key)
        } else {
            let next = self.overflow.push_pair(self.keys[last].to_word(), key);
            self.keys[last] = K::from_word(next as u64);
            self.links.set(last);
            true
        };
        if inserted {
            self.len += 1;
        }
        inserted
    }

    /// Returns `true` if the key is in the set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::FlaggedSet;
    ///
    /// let mut visited: FlaggedSet<u64> = FlaggedSet::with_capacity(16);
    /// visited.insert(1 << 40);
    /// assert!(visited.contains(1 << 40));
    /// assert!(!visited.contains(1));
    /// ```
    pub fn contains(&self, key: K) -> bool {
        let key = key.to_word() & Slot::<K>::PAYLOAD_MASK;
        let base = self.bucket_of(key) * NODE_KEYS;

        for i in 0..NODE_KEYS {
            let slot = base + i;
            if !self.occupied.get(slot) {
                return false;
            }
            if !self.links.get(slot) && self.keys[slot].to_word() == key {
                return true;
            }
        }

        let last = base + NODE_KEYS - 1;
        if self.links.get(last) {
            self.overflow
                .contains(self.keys[last].to_word() as usize, key)
        } else {
            false
        }
    }

    /// Removes all keys by zeroing the flag vectors.
    ///
    /// The key array is left untouched; whatever it still holds is
    /// unreachable once the occupied bits are gone. Both flag vectors must
    /// be zeroed: a stale link bit under a freshly written key would send
    /// lookups into the overflow list with a key value as the index.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::FlaggedSet;
    ///
    /// let mut visited: FlaggedSet<u32> = FlaggedSet::with_capacity(16);
    /// visited.insert(3);
    /// visited.clear();
    /// assert_eq!(visited.len(), 0);
    /// assert!(!visited.contains(3));
    /// ```
    pub fn clear(&mut self) {
        self.occupied.zero_all();
        self.links.zero_all();
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

    /// Returns the number of overflow nodes currently allocated. Resets to
    /// zero on [`clear`](Self::clear).
    pub fn overdrawn_size(&self) -> usize {
        self.overflow.len()
    }
}
