//! Bit-packed integer arrays with O(1) random access.
//!
//! `kbits` compresses arrays of non-negative 32-bit integers into a
//! compact word-packed form that is losslessly decompressible *and*
//! individually addressable: any element can be read without
//! materialising the rest of the array. It is built as a
//! data-transmission accelerator: small wire payloads whose elements
//! stay reachable in constant time.
//!
//! # Packing Layouts
//!
//! - **NonCross**: `floor(32/k)` slots per word, never straddling a
//!   boundary. One load, one shift, one mask per read; up to 15 wasted
//!   bits per word at the worst alignment.
//! - **Cross**: slots packed back to back in a contiguous bit stream.
//!   Exactly `n*k` bits total; a read may combine two words.
//! - **Overflow**: a narrow flagged main stream for the common case plus
//!   a full-width exception list for outliers, with either inner layout.
//!   Falls back to single-tier packing whenever two tiers would not be
//!   smaller.
//!
//! # Historical Context
//!
//! Fixed-width bit packing is the oldest trick in inverted-index
//! compression; the patched variant here follows the same intuition as
//! PForDelta (Zukowski et al., 2006), which packs a low percentile of
//! the data tightly and patches the exceptions separately.
//!
//! # Example
//!
//! ```rust
//! use kbits::{BitPacking, NonCross};
//!
//! let data = vec![1u32, 5, 3, 7, 2, 8, 4, 6, 9, 10];
//! let mut codec = NonCross::new();
//! let envelope = codec.compress(&data).unwrap();
//!
//! assert_eq!(envelope.k(), 4);
//! assert_eq!(codec.get(3).unwrap(), 7);
//! assert_eq!(codec.decompress().unwrap(), data);
//! ```
//!
//! # References
//!
//! - Zukowski et al. (2006). "Super-Scalar RAM-CPU Cache Compression"
//! - Lemire & Boytsov (2015). "Decoding billions of integers per second
//!   through vectorization"

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bench;
mod cross;
mod envelope;
mod error;
mod factory;
mod geometry;
mod noncross;
mod overflow;
mod traits;
pub mod transmission;

pub use cross::Cross;
pub use envelope::{Envelope, InnerLayout};
pub use error::{PackError, Result};
pub use factory::{from_envelope, get_bitpacking};
pub use noncross::NonCross;
pub use overflow::{Overflow, DEFAULT_OVERFLOW_THRESHOLD};
pub use traits::BitPacking;
