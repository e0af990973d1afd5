#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A fast-clearing membership bitmap over a fixed id range.
///
/// This module provides `BitmapSet`, a dense bitmap whose `clear` cost is
/// proportional to the pages actually touched while usage stays sparse.
pub mod bitmap;

mod bits;

/// Key mixing and the shared key-word abstraction for the hash-set
/// variants.
pub mod key;

mod overflow;

/// The flag-array compact hash set, the primary layout.
pub mod flagged;

/// The inline-packed compact hash set, the baseline layout.
pub mod packed;

pub use bitmap::BitmapSet;
pub use flagged::FlaggedSet;
pub use key::KeyWord;
pub use packed::PackedSet;
