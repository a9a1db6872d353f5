//! The capability set shared by every packing variant.

use crate::envelope::Envelope;
use crate::error::Result;

/// Integer-array compression with O(1) random access.
///
/// A codec starts empty, is populated by one [`compress`](BitPacking::compress)
/// (or [`load`](BitPacking::load) from an envelope), and is read-only after
/// that: `get` and `decompress` never mutate observable state. A second
/// `compress` replaces the prior state entirely. Compression is transactional;
/// on error the previous state is untouched.
pub trait BitPacking {
    /// Compress `values` into this codec's packed layout and return the
    /// envelope describing the new state.
    fn compress(&mut self, values: &[u32]) -> Result<Envelope>;

    /// Reconstruct state from a previously written envelope of the matching
    /// variant.
    fn load(&mut self, envelope: &Envelope) -> Result<()>;

    /// Rebuild the full original array.
    fn decompress(&self) -> Result<Vec<u32>>;

    /// Return the element at `i` without materialising any other element.
    fn get(&self, i: usize) -> Result<u32>;

    /// Element count of the compressed array (0 before any compress/load).
    fn len(&self) -> usize;

    /// Effective bit-width per slot (`k`; `k_main` for the overflow variant).
    fn width(&self) -> u32;

    /// Whether the compressed array has no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
