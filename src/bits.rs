//! Fixed-length bit vector over 64-bit words.
//!
//! Backs the flag arrays of `FlaggedSet` and both levels of `BitmapSet`.
//! Length is fixed at construction; the only bulk operations are the
//! word-granular zero fills the containers need for their clear paths.

use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec;
use alloc::vec::Vec;

pub(crate) const WORD_BITS: usize = 64;

#[derive(Clone)]
pub(crate) struct BitVec {
    words: Box<[u64]>,
}

impl BitVec {
    pub(crate) fn with_len(bits: usize) -> Self {
        BitVec {
            words: vec![0u64; bits.div_ceil(WORD_BITS)].into_boxed_slice(),
        }
    }

    pub(crate) fn try_with_len(bits: usize) -> Result<Self, TryReserveError> {
        let len = bits.div_ceil(WORD_BITS);
        let mut words = Vec::new();
        words.try_reserve_exact(len)?;
        words.resize(len, 0u64);
        Ok(BitVec {
            words: words.into_boxed_slice(),
        })
    }

    #[inline(always)]
    pub(crate) fn get(&self, bit: usize) -> bool {
        self.words[bit / WORD_BITS] >> (bit % WORD_BITS) & 1 != 0
    }

    #[inline(always)]
    pub(crate) fn set(&mut self, bit: usize) {
        self.words[bit / WORD_BITS] |= 1 << (bit % WORD_BITS);
    }

    /// Zeroes the whole vector in one bulk pass.
    #[inline]
    pub(crate) fn zero_all(&mut self) {
        self.words.fill(0);
    }

    /// Zeroes `count` words starting at word `start` as one contiguous
    /// fill. Word-aligned so page clears stay a plain memset.
    #[inline(always)]
    pub(crate) fn zero_words(&mut self, start: usize, count: usize) {
        self.words[start..start + count].fill(0);
    }

    #[inline(always)]
    pub(crate) fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Reads word `index` and leaves it zeroed.
    #[inline(always)]
    pub(crate) fn take_word(&mut self, index: usize) -> u64 {
        core::mem::take(&mut self.words[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_rounds_up_to_whole_words() {
        assert_eq!(BitVec::with_len(0).word_count(), 0);
        assert_eq!(BitVec::with_len(1).word_count(), 1);
        assert_eq!(BitVec::with_len(64).word_count(), 1);
        assert_eq!(BitVec::with_len(65).word_count(), 2);
    }

    #[test]
    fn set_and_get_across_word_boundary() {
        let mut bv = BitVec::with_len(130);
        for bit in [0usize, 1, 62, 63, 64, 65, 127, 128, 129] {
            assert!(!bv.get(bit));
            bv.set(bit);
            assert!(bv.get(bit));
        }
        assert!(!bv.get(2));
        assert!(!bv.get(126));
    }

    #[test]
    fn zero_words_clears_only_the_given_range() {
        let mut bv = BitVec::with_len(256);
        for bit in [3usize, 64, 130, 200] {
            bv.set(bit);
        }
        bv.zero_words(1, 2);
        assert!(bv.get(3));
        assert!(!bv.get(64));
        assert!(!bv.get(130));
        assert!(bv.get(200));
    }

    #[test]
    fn take_word_reads_and_zeroes() {
        let mut bv = BitVec::with_len(64);
        bv.set(0);
        bv.set(5);
        assert_eq!(bv.take_word(0), 0b100001);
        assert_eq!(bv.take_word(0), 0);
    }
}
