//! Contiguous bit-stream packing: a value may straddle two words.
//!
//! Slot `i` occupies stream bits `[i*k, i*k + k)`, so the total is exactly
//! `n * k` bits with no alignment padding. A read touches at most two
//! words; the combine runs in 64-bit scratch. The final slot may compute a
//! high-word index one past the end of `words`, which is read as zero.

use crate::envelope::Envelope;
use crate::error::{PackError, Result};
use crate::geometry::{bits_for, mask, WORD_BITS};
use crate::traits::BitPacking;

/// Pack `values` into a contiguous stream of `k`-bit slots, `k` in `[1, 32]`.
pub(crate) fn pack(values: &[u32], k: u32) -> Vec<u32> {
    let total_bits = values.len() * k as usize;
    let mut words = vec![0u32; total_bits.div_ceil(WORD_BITS as usize)];
    let mut bit = 0usize;
    for &v in values {
        let w = bit / WORD_BITS as usize;
        let off = (bit % WORD_BITS as usize) as u32;
        // Up to off + k <= 63 significant bits; low half lands in words[w],
        // any spill lands at the bottom of words[w + 1].
        let span = ((v as u64) & mask(k)) << off;
        words[w] |= span as u32;
        if off + k > WORD_BITS {
            words[w + 1] |= (span >> WORD_BITS) as u32;
        }
        bit += k as usize;
    }
    words
}

/// Read slot `i` from a contiguous stream of `k`-bit slots.
#[inline]
pub(crate) fn slot(words: &[u32], k: u32, i: usize) -> u32 {
    let bit = i * k as usize;
    let w = bit / WORD_BITS as usize;
    let off = (bit % WORD_BITS as usize) as u32;
    let lo = (words[w] as u64) >> off;
    let hi = if off + k > WORD_BITS {
        (words.get(w + 1).copied().unwrap_or(0) as u64) << (WORD_BITS - off)
    } else {
        0
    };
    ((lo | hi) & mask(k)) as u32
}

/// Expand `n` stream slots back into values.
pub(crate) fn unpack(words: &[u32], k: u32, n: usize) -> Vec<u32> {
    (0..n).map(|i| slot(words, k, i)).collect()
}

#[derive(Debug)]
struct Pack {
    k: u32,
    n: usize,
    words: Vec<u32>,
}

impl Pack {
    fn build(values: &[u32]) -> Self {
        if values.is_empty() {
            return Pack {
                k: 0,
                n: 0,
                words: Vec::new(),
            };
        }
        let max_v = values.iter().copied().max().unwrap_or(0);
        let k = bits_for(max_v).max(1);
        Pack {
            k,
            n: values.len(),
            words: pack(values, k),
        }
    }
}

/// Crossing codec: `k`-bit slots packed back to back across word boundaries.
#[derive(Debug, Default)]
pub struct Cross {
    pack: Option<Pack>,
}

impl Cross {
    /// Create an empty codec; populate it with `compress` or `load`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BitPacking for Cross {
    fn compress(&mut self, values: &[u32]) -> Result<Envelope> {
        let pack = Pack::build(values);
        let env = Envelope::Cross {
            n: pack.n,
            k: pack.k,
            words: pack.words.clone(),
        };
        self.pack = Some(pack);
        Ok(env)
    }

    fn load(&mut self, envelope: &Envelope) -> Result<()> {
        match envelope {
            Envelope::Cross { n, k, words } => {
                envelope.validate()?;
                self.pack = Some(Pack {
                    k: *k,
                    n: *n,
                    words: words.clone(),
                });
                Ok(())
            }
            other => Err(PackError::Envelope(format!(
                "cannot load a '{}' envelope into the cross codec",
                other.variant_name()
            ))),
        }
    }

    fn decompress(&self) -> Result<Vec<u32>> {
        let pack = self.pack.as_ref().ok_or(PackError::NotCompressed)?;
        if pack.n == 0 {
            return Ok(Vec::new());
        }
        Ok(unpack(&pack.words, pack.k, pack.n))
    }

    fn get(&self, i: usize) -> Result<u32> {
        let pack = self.pack.as_ref().ok_or(PackError::NotCompressed)?;
        if i >= pack.n {
            return Err(PackError::IndexOutOfBounds {
                index: i as i64,
                len: pack.n,
            });
        }
        Ok(slot(&pack.words, pack.k, i))
    }

    fn len(&self) -> usize {
        self.pack.as_ref().map_or(0, |p| p.n)
    }

    fn width(&self) -> u32 {
        self.pack.as_ref().map_or(0, |p| p.k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_ten_small_values() {
        let data = vec![1, 5, 3, 7, 2, 8, 4, 6, 9, 10];
        let mut bp = Cross::new();
        let env = bp.compress(&data).unwrap();

        // 10 slots of 4 bits = 40 bits = 2 words.
        assert_eq!(bp.width(), 4);
        assert_eq!(env.words().len(), 2);
        assert_eq!(bp.get(9).unwrap(), 10);
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn straddling_values_round_trip() {
        // k = 20: every second slot spans a word boundary.
        let data = vec![0xF_FFFF, 0x1_2345, 0xA_BCDE, 0x5_4321, 0xF_0F0F];
        let mut bp = Cross::new();
        let env = bp.compress(&data).unwrap();
        assert_eq!(bp.width(), 20);
        assert_eq!(env.words().len(), 4); // ceil(100 / 32)
        for (i, &v) in data.iter().enumerate() {
            assert_eq!(bp.get(i).unwrap(), v);
        }
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn final_slot_straddles_into_the_last_word() {
        // k = 17, n = 2: the stream ends at bit 34, so the second slot
        // straddles into word 1 and the read must stop there.
        let data = vec![0x1_FFFF, 0x1_0001];
        let mut bp = Cross::new();
        let env = bp.compress(&data).unwrap();
        assert_eq!(bp.width(), 17);
        assert_eq!(env.words().len(), 2);
        assert_eq!(bp.get(1).unwrap(), 0x1_0001);
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn stream_ending_on_a_word_boundary() {
        // 8 slots of 4 bits fill exactly one word; get(7) must not read a
        // second word that does not exist.
        let data: Vec<u32> = (1..=8).collect();
        let mut bp = Cross::new();
        let env = bp.compress(&data).unwrap();
        assert_eq!(env.words().len(), 1);
        assert_eq!(bp.get(7).unwrap(), 8);
    }

    #[test]
    fn full_width_values() {
        let data = vec![u32::MAX, 0, u32::MAX - 1];
        let mut bp = Cross::new();
        let env = bp.compress(&data).unwrap();
        assert_eq!(bp.width(), 32);
        assert_eq!(env.words().len(), 3);
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn all_zeros_pack_at_one_bit() {
        let mut bp = Cross::new();
        let env = bp.compress(&[0; 40]).unwrap();
        assert_eq!(bp.width(), 1);
        assert_eq!(env.words().len(), 2); // ceil(40 / 32)
        assert_eq!(bp.get(39).unwrap(), 0);
    }

    #[test]
    fn empty_array_round_trips() {
        let mut bp = Cross::new();
        let env = bp.compress(&[]).unwrap();
        assert_eq!((env.n(), env.k()), (0, 0));
        assert!(env.words().is_empty());
        assert_eq!(bp.decompress().unwrap(), Vec::<u32>::new());
        assert!(matches!(bp.get(5), Err(PackError::IndexOutOfBounds { .. })));
    }

    #[test]
    fn get_before_compress_is_an_error() {
        let bp = Cross::new();
        assert!(matches!(bp.get(0), Err(PackError::NotCompressed)));
    }

    #[test]
    fn matches_noncross_when_k_divides_word_width() {
        // With k = 4 both layouts produce identical words.
        let data = vec![1, 5, 3, 7, 2, 8, 4, 6, 9, 10];
        let cross_words = pack(&data, 4);
        let noncross_words = crate::noncross::pack(&data, 4);
        assert_eq!(cross_words, noncross_words);
    }

    #[test]
    fn load_restores_random_access() {
        let data = vec![100_000u32, 1, 99_999, 2];
        let mut writer = Cross::new();
        let env = writer.compress(&data).unwrap();

        let mut reader = Cross::new();
        reader.load(&env).unwrap();
        assert_eq!(reader.get(2).unwrap(), 99_999);
        assert_eq!(reader.decompress().unwrap(), data);
    }
}
