//! Key mixing and slot packing shared by the hash-set variants.
//!
//! Keys are plain unsigned words with the top two bits reserved for
//! bookkeeping, so a `u32` key carries 30 significant bits and a `u64` key
//! carries 62. The mixers are deterministic and non-cryptographic; bucket
//! selection is `mix(key) % capacity`, so low-bit avalanche quality is what
//! matters.

/// Mixes a 32-bit key for bucket selection.
///
/// # Examples
///
/// ```rust
/// use churn_set::key::mix32;
///
/// assert_ne!(mix32(1), mix32(2));
/// assert_eq!(mix32(7), mix32(7));
/// ```
#[inline(always)]
pub const fn mix32(k: u32) -> u32 {
    4111732u32.wrapping_mul(k).rotate_left(13)
}

/// Mixes a 64-bit key for bucket selection.
///
/// # Examples
///
/// ```rust
/// use churn_set::key::mix64;
///
/// assert_ne!(mix64(1), mix64(1 << 40));
/// ```
#[inline(always)]
pub const fn mix64(k: u64) -> u64 {
    k.rotate_left(29) ^ k
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for u32 {}
    impl Sealed for u64 {}
}

/// An unsigned key word usable with [`PackedSet`](crate::PackedSet) and
/// [`FlaggedSet`](crate::FlaggedSet).
///
/// Implemented for `u32` (30 usable key bits) and `u64` (62 usable key
/// bits). The two high bits of the word are reserved for the occupied and
/// link flags, so keys wider than `KEY_BITS` are silently truncated on
/// insert and lookup. This trait is sealed.
pub trait KeyWord: Copy + Eq + sealed::Sealed {
    /// Number of significant key bits: the word width minus the two flag
    /// bits.
    const KEY_BITS: u32;

    /// Mixes the key into a bucket-selection value.
    #[doc(hidden)]
    fn mix(self) -> Self;

    /// Widens the word to `u64` losslessly.
    #[doc(hidden)]
    fn to_word(self) -> u64;

    /// Narrows a `u64` back to the key word. Callers only pass values that
    /// fit the word width.
    #[doc(hidden)]
    fn from_word(word: u64) -> Self;
}

impl KeyWord for u32 {
    const KEY_BITS: u32 = 30;

    #[inline(always)]
    fn mix(self) -> Self {
        mix32(self)
    }

    #[inline(always)]
    fn to_word(self) -> u64 {
        self as u64
    }

    #[inline(always)]
    fn from_word(word: u64) -> Self {
        word as u32
    }
}

impl KeyWord for u64 {
    const KEY_BITS: u32 = 62;

    #[inline(always)]
    fn mix(self) -> Self {
        mix64(self)
    }

    #[inline(always)]
    fn to_word(self) -> u64 {
        self
    }

    #[inline(always)]
    fn from_word(word: u64) -> Self {
        word
    }
}

/// One key-or-link storage unit, packed into a single key word.
///
/// Layout, from the low bit up: `KEY_BITS` bits of payload (a key value or
/// an overflow-list index), one link flag, one occupied flag. An
/// all-zero word is an empty slot. The link flag is only ever set on the
/// last slot of a node or overflow node.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub(crate) struct Slot<K>(K);

impl<K: KeyWord> Slot<K> {
    const OCCUPIED: u64 = 1 << (K::KEY_BITS + 1);
    const LINK: u64 = 1 << K::KEY_BITS;
    pub(crate) const PAYLOAD_MASK: u64 = (1 << K::KEY_BITS) - 1;

    #[inline(always)]
    pub(crate) fn empty() -> Self {
        Slot(K::from_word(0))
    }

    /// Packs an occupied, non-link slot holding `key`. The key must already
    /// be masked to `KEY_BITS`.
    #[inline(always)]
    pub(crate) fn key(key: u64) -> Self {
        debug_assert_eq!(key & !Self::PAYLOAD_MASK, 0);
        Slot(K::from_word(key | Self::OCCUPIED))
    }

    /// Packs an occupied link slot holding an overflow-list index.
    #[inline(always)]
    pub(crate) fn link(index: usize) -> Self {
        debug_assert_eq!(index as u64 & !Self::PAYLOAD_MASK, 0);
        Slot(K::from_word(index as u64 | Self::OCCUPIED | Self::LINK))
    }

    #[inline(always)]
    pub(crate) fn is_occupied(self) -> bool {
        self.0.to_word() & Self::OCCUPIED != 0
    }

    #[inline(always)]
    pub(crate) fn is_link(self) -> bool {
        self.0.to_word() & Self::LINK != 0
    }

    #[inline(always)]
    pub(crate) fn payload(self) -> u64 {
        self.0.to_word() & Self::PAYLOAD_MASK
    }

    #[inline(always)]
    pub(crate) fn link_index(self) -> usize {
        self.payload() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mix32_matches_reference_constants() {
        assert_eq!(mix32(0), 0);
        assert_eq!(mix32(1), 4111732u32.rotate_left(13));
        assert_eq!(mix32(336), 4111732u32.wrapping_mul(336).rotate_left(13));
    }

    #[test]
    fn mix64_matches_reference_constants() {
        assert_eq!(mix64(0), 0);
        assert_eq!(mix64(1), (1u64 << 29) | 1);
        let k = 0xDEAD_BEEF_CAFE_F00Du64;
        assert_eq!(mix64(k), k.rotate_left(29) ^ k);
    }

    #[test]
    fn mixers_spread_dense_keys() {
        // Dense small ids must not all land in the same low-bit residue.
        let mut seen = [false; 97];
        for k in 0u32..64 {
            seen[(mix32(k) % 97) as usize] = true;
        }
        assert!(seen.iter().filter(|hit| **hit).count() > 32);
    }

    #[test]
    fn key_bits_reserve_two_flag_bits() {
        assert_eq!(<u32 as KeyWord>::KEY_BITS, 30);
        assert_eq!(<u64 as KeyWord>::KEY_BITS, 62);
        assert_eq!(Slot::<u32>::PAYLOAD_MASK, (1 << 30) - 1);
        assert_eq!(Slot::<u64>::PAYLOAD_MASK, (1 << 62) - 1);
    }

    #[test]
    fn empty_slot_is_all_zero() {
        let s = Slot::<u32>::empty();
        assert!(!s.is_occupied());
        assert!(!s.is_link());
        assert_eq!(s.payload(), 0);
    }

    #[test]
    fn key_slot_round_trips_u32() {
        let max = Slot::<u32>::PAYLOAD_MASK;
        for key in [0u64, 1, 42, max - 1, max] {
            let s = Slot::<u32>::key(key);
            assert!(s.is_occupied());
            assert!(!s.is_link());
            assert_eq!(s.payload(), key);
        }
    }

    #[test]
    fn key_slot_round_trips_u64() {
        let max = Slot::<u64>::PAYLOAD_MASK;
        for key in [0u64, u32::MAX as u64 + 1, max] {
            let s = Slot::<u64>::key(key);
            assert!(s.is_occupied());
            assert!(!s.is_link());
            assert_eq!(s.payload(), key);
        }
    }

    #[test]
    fn link_slot_round_trips() {
        let s = Slot::<u32>::link(12345);
        assert!(s.is_occupied());
        assert!(s.is_link());
        assert_eq!(s.link_index(), 12345);
    }

    #[test]
    fn key_and_link_payloads_do_not_collide_in_flags() {
        // A key whose value happens to equal a link index is still
        // distinguished by the link flag.
        let k = Slot::<u64>::key(7);
        let l = Slot::<u64>::link(7);
        assert_ne!(k.is_link(), l.is_link());
        assert_eq!(k.payload(), l.payload());
    }
}
