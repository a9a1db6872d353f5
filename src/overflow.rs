//! Two-tier bit packing: a narrow flagged main stream plus an exception
//! list for outliers.
//!
//! Arrays where a few values need far more bits than the rest waste the
//! whole stream's width on the outliers. Here every slot is `k_main` bits
//! with the top bit as a flag: flag 0 means the low `k_low = k_main - 1`
//! bits are the value itself, flag 1 means they index into a side list of
//! full 32-bit values. The cutoff `T` is the value at zero-based rank
//! `ceil(p * n) - 1` of the sorted input, so ties at the boundary stay in
//! the main stream.
//!
//! Compression falls back to a plain single-tier pack whenever the
//! two-tier form would not be smaller (which covers zero-outlier and
//! all-outlier inputs), and the envelope then carries the single-tier
//! variant tag.

use crate::cross;
use crate::envelope::{Envelope, InnerLayout};
use crate::error::{PackError, Result};
use crate::geometry::{bits_for, WORD_BITS};
use crate::noncross;
use crate::traits::BitPacking;

/// Default percentile cutoff for the exception list.
pub const DEFAULT_OVERFLOW_THRESHOLD: f64 = 0.95;

fn pack_inner(inner: InnerLayout, values: &[u32], k: u32) -> Vec<u32> {
    match inner {
        InnerLayout::NonCross => noncross::pack(values, k),
        InnerLayout::Cross => cross::pack(values, k),
    }
}

fn slot_inner(inner: InnerLayout, words: &[u32], k: u32, i: usize) -> u32 {
    match inner {
        InnerLayout::NonCross => noncross::slot(words, k, i),
        InnerLayout::Cross => cross::slot(words, k, i),
    }
}

#[derive(Debug)]
enum Pack {
    /// Flagged main stream at `k_main` bits per slot plus exception list.
    TwoTier {
        k_main: u32,
        k_low: u32,
        cutoff: u32,
        n: usize,
        words: Vec<u32>,
        overflow: Vec<u32>,
        inner: InnerLayout,
    },
    /// Plain single-tier pack chosen when two tiers would not pay off.
    SingleTier {
        k: u32,
        n: usize,
        words: Vec<u32>,
        inner: InnerLayout,
    },
}

/// Value at zero-based rank `ceil(p * n) - 1` of the sorted input.
fn rank_cutoff(values: &[u32], p: f64) -> u32 {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let rank = ((p * values.len() as f64).ceil() as usize)
        .saturating_sub(1)
        .min(values.len() - 1);
    sorted[rank]
}

impl Pack {
    fn build(values: &[u32], p: f64, inner: InnerLayout) -> Self {
        let n = values.len();
        if n == 0 {
            return Pack::SingleTier {
                k: 0,
                n: 0,
                words: Vec::new(),
                inner,
            };
        }

        let max_v = values.iter().copied().max().unwrap_or(0);
        let k_single = bits_for(max_v).max(1);

        let cutoff = rank_cutoff(values, p);
        let mut k_low = bits_for(cutoff).max(1);
        let outliers = values.iter().filter(|&&v| v > cutoff).count() as u64;

        // Flagged payloads index the exception list, so the list is capped
        // at 2^k_low entries; widen until every index fits.
        while outliers > 1u64 << k_low {
            k_low += 1;
        }
        let k_main = k_low + 1;

        let two_tier_bits = k_main as u64 * n as u64 + WORD_BITS as u64 * outliers;
        let single_bits = k_single as u64 * n as u64;
        if k_main > WORD_BITS || two_tier_bits >= single_bits {
            return Pack::SingleTier {
                k: k_single,
                n,
                words: pack_inner(inner, values, k_single),
                inner,
            };
        }

        let flag = 1u32 << k_low;
        let mut overflow = Vec::with_capacity(outliers as usize);
        let slots: Vec<u32> = values
            .iter()
            .map(|&v| {
                if v <= cutoff {
                    v
                } else {
                    let j = overflow.len() as u32;
                    overflow.push(v);
                    flag | j
                }
            })
            .collect();

        Pack::TwoTier {
            k_main,
            k_low,
            cutoff,
            n,
            words: pack_inner(inner, &slots, k_main),
            overflow,
            inner,
        }
    }

    fn envelope(&self) -> Envelope {
        match self {
            Pack::TwoTier {
                k_main,
                k_low,
                cutoff,
                n,
                words,
                overflow,
                inner,
            } => Envelope::Overflow {
                n: *n,
                k: *k_main,
                words: words.clone(),
                threshold: *cutoff,
                k_low: *k_low,
                overflow: overflow.clone(),
                inner: *inner,
            },
            Pack::SingleTier {
                k, n, words, inner, ..
            } => match inner {
                InnerLayout::NonCross => Envelope::NonCross {
                    n: *n,
                    k: *k,
                    words: words.clone(),
                },
                InnerLayout::Cross => Envelope::Cross {
                    n: *n,
                    k: *k,
                    words: words.clone(),
                },
            },
        }
    }

    fn n(&self) -> usize {
        match self {
            Pack::TwoTier { n, .. } | Pack::SingleTier { n, .. } => *n,
        }
    }

    fn decode(&self, i: usize) -> Result<u32> {
        match self {
            Pack::TwoTier {
                k_main,
                k_low,
                words,
                overflow,
                inner,
                ..
            } => {
                let slot = slot_inner(*inner, words, *k_main, i);
                let flag = 1u32 << k_low;
                if slot & flag == 0 {
                    Ok(slot)
                } else {
                    let j = (slot & (flag - 1)) as usize;
                    overflow.get(j).copied().ok_or_else(|| {
                        PackError::Envelope(format!(
                            "slot {i} references overflow entry {j}, only {} stored",
                            overflow.len()
                        ))
                    })
                }
            }
            Pack::SingleTier {
                k, words, inner, ..
            } => Ok(slot_inner(*inner, words, *k, i)),
        }
    }
}

/// Overflow codec: two-tier packing with a configurable inner layout and
/// percentile cutoff.
#[derive(Debug)]
pub struct Overflow {
    inner: InnerLayout,
    threshold: f64,
    pack: Option<Pack>,
}

impl Overflow {
    /// Create an empty codec using `inner` for the main stream and the
    /// percentile cutoff `threshold` in `(0, 1]`.
    pub fn new(inner: InnerLayout, threshold: f64) -> Self {
        Self {
            inner,
            threshold,
            pack: None,
        }
    }
}

impl Default for Overflow {
    fn default() -> Self {
        Self::new(InnerLayout::Cross, DEFAULT_OVERFLOW_THRESHOLD)
    }
}

impl BitPacking for Overflow {
    fn compress(&mut self, values: &[u32]) -> Result<Envelope> {
        let pack = Pack::build(values, self.threshold, self.inner);
        let env = pack.envelope();
        self.pack = Some(pack);
        Ok(env)
    }

    fn load(&mut self, envelope: &Envelope) -> Result<()> {
        match envelope {
            Envelope::Overflow {
                n,
                k,
                words,
                threshold,
                k_low,
                overflow,
                inner,
            } => {
                envelope.validate()?;
                self.inner = *inner;
                self.pack = Some(Pack::TwoTier {
                    k_main: *k,
                    k_low: *k_low,
                    cutoff: *threshold,
                    n: *n,
                    words: words.clone(),
                    overflow: overflow.clone(),
                    inner: *inner,
                });
                Ok(())
            }
            other => Err(PackError::Envelope(format!(
                "cannot load a '{}' envelope into the overflow codec",
                other.variant_name()
            ))),
        }
    }

    fn decompress(&self) -> Result<Vec<u32>> {
        let pack = self.pack.as_ref().ok_or(PackError::NotCompressed)?;
        (0..pack.n()).map(|i| pack.decode(i)).collect()
    }

    fn get(&self, i: usize) -> Result<u32> {
        let pack = self.pack.as_ref().ok_or(PackError::NotCompressed)?;
        if i >= pack.n() {
            return Err(PackError::IndexOutOfBounds {
                index: i as i64,
                len: pack.n(),
            });
        }
        pack.decode(i)
    }

    fn len(&self) -> usize {
        self.pack.as_ref().map_or(0, |p| p.n())
    }

    fn width(&self) -> u32 {
        match self.pack.as_ref() {
            Some(Pack::TwoTier { k_main, .. }) => *k_main,
            Some(Pack::SingleTier { k, .. }) => *k,
            None => 0,
        }
    }
}
