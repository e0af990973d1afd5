//! Dense bitmap over a fixed id range with dirty-page accelerated clears.

use alloc::collections::TryReserveError;

use crate::bits::BitVec;
use crate::bits::WORD_BITS;

/// Bits per page of the main bitmap: one cache line (64 bytes).
const PAGE_BITS: usize = 512;
const PAGE_WORDS: usize = PAGE_BITS / WORD_BITS;

/// A fast-clearing membership bitmap over ids `0..capacity`.
///
/// One bit per id in a main bitmap, plus a coarse dirty-page bitmap with
/// one bit per 512-bit page. While a fill cycle stays sparse — fewer ids
/// inserted than there are pages — the dirty bits record exactly which
/// pages were touched, and [`clear`](Self::clear) zeroes only those instead
/// of the whole range. Past that threshold the dirty record stops being
/// maintained and `clear` falls back to one bulk zero of the full bitmap.
///
/// There is no separate membership query: [`insert`](Self::insert)'s return
/// value is the only read. Callers that need lookups keep their own record
/// or use one of the hash-set variants.
///
/// # Examples
///
/// ```rust
/// use churn_set::BitmapSet;
///
/// let mut seen = BitmapSet::with_capacity(1_000_000);
/// assert!(seen.insert(123_456));
/// assert!(!seen.insert(123_456));
/// assert_eq!(seen.len(), 1);
///
/// // Only the single touched page is zeroed here.
/// seen.clear();
/// assert!(seen.insert(123_456));
/// ```
pub struct BitmapSet {
    bits: BitVec,
    dirty: BitVec,
    /// Page count; doubles as the sparse-usage threshold.
    pages: usize,
    capacity: usize,
    len: usize,
}

impl BitmapSet {
    /// Creates a bitmap covering ids `0..max_capacity`.
    ///
    /// The main bitmap is rounded up to whole 512-bit pages. Aborts on
    /// allocation failure like `Vec`; use
    /// [`try_with_capacity`](Self::try_with_capacity) to handle it instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::BitmapSet;
    ///
    /// let seen = BitmapSet::with_capacity(10_000);
    /// assert_eq!(seen.capacity(), 10_000);
    /// assert_eq!(seen.len(), 0);
    /// ```
    pub fn with_capacity(max_capacity: usize) -> Self {
        let pages = max_capacity.div_ceil(PAGE_BITS);
        BitmapSet {
            bits: BitVec::with_len(pages * PAGE_BITS),
            dirty: BitVec::with_len(pages),
            pages,
            capacity: max_capacity,
            len: 0,
        }
    }

    /// Fallible variant of [`with_capacity`](Self::with_capacity).
    ///
    /// Returns an error if either bitmap cannot be allocated; no partially
    /// built instance is observable.
    pub fn try_with_capacity(max_capacity: usize) -> Result<Self, TryReserveError> {
        let pages = max_capacity.div_ceil(PAGE_BITS);
        Ok(BitmapSet {
            bits: BitVec::try_with_len(pages * PAGE_BITS)?,
            dirty: BitVec::try_with_len(pages)?,
            pages,
            capacity: max_capacity,
            len: 0,
        })
    }

    /// Marks an id as seen.
    ///
    /// Returns `true` iff the id was not already set since the last
    /// [`clear`](Self::clear).
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside the page-rounded range fixed at
    /// construction.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::BitmapSet;
    ///
    /// let mut seen = BitmapSet::with_capacity(1_000);
    /// assert!(seen.insert(7));
    /// assert!(!seen.insert(7));
    /// ```
    pub fn insert(&mut self, id: u32) -> bool {
        let id = id as usize;
        if self.bits.get(id) {
            return false;
        }
        self.bits.set(id);
        // Dirty tracking is only a complete record while the cycle stays
        // sparse; past the threshold further pages go unrecorded and clear
        // must fall back to the full wipe.
        if self.len < self.pages {
            self.dirty.set(id / PAGE_BITS);
        }
        self.len += 1;
        true
    }

    /// Resets the bitmap for the next cycle.
    ///
    /// If fewer ids were inserted than the page count, the dirty-page
    /// bitmap is a complete record of touched pages: each one is zeroed
    /// with a single page-wide fill and the dirty word is consumed in the
    /// same pass. Otherwise the whole main bitmap is zeroed in one bulk
    /// pass. Either way `len` resets to 0.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use churn_set::BitmapSet;
    ///
    /// let mut seen = BitmapSet::with_capacity(100_000);
    /// seen.insert(5);
    /// seen.insert(99_999);
    /// seen.clear();
    /// assert_eq!(seen.len(), 0);
    /// assert!(seen.insert(5));
    /// ```
    pub fn clear(&mut self) {
        if self.len < self.pages {
            for word in 0..self.dirty.word_count() {
                let mut pending = self.dirty.take_word(word);
                while pending != 0 {
                    let page = word * WORD_BITS + pending.trailing_zeros() as usize;
                    self.bits.zero_words(page * PAGE_WORDS, PAGE_WORDS);
                    pending &= pending - 1;
                }
            }
        } else {
            self.bits.zero_all();
            self.dirty.zero_all();
        }
        self.len = 0;
    }

    /// Returns the number of distinct ids set since the last clear.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no id is set.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the id range bound given at construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
