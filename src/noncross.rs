//! Word-aligned bit packing: no value straddles a word boundary.
//!
//! Each 32-bit word holds `cap = 32 / k` slots, so a read is one word load,
//! a shift, and a mask. The price is `32 - cap * k` wasted bits per word;
//! zero for `k` in {1, 2, 4, 8, 16, 32}, worst at `k = 17` (15 bits).

use crate::envelope::Envelope;
use crate::error::{PackError, Result};
use crate::geometry::{bits_for, capacity, mask};
use crate::traits::BitPacking;

/// Pack `values` into word-aligned `k`-bit slots, `k` in `[1, 32]`.
pub(crate) fn pack(values: &[u32], k: u32) -> Vec<u32> {
    let cap = capacity(k) as usize;
    let mut words = vec![0u32; values.len().div_ceil(cap)];
    for (i, &v) in values.iter().enumerate() {
        let off = ((i % cap) as u32) * k;
        words[i / cap] |= (((v as u64) & mask(k)) << off) as u32;
    }
    words
}

/// Read slot `i` from word-aligned `k`-bit slots.
#[inline]
pub(crate) fn slot(words: &[u32], k: u32, i: usize) -> u32 {
    let cap = capacity(k) as usize;
    let off = ((i % cap) as u32) * k;
    (((words[i / cap] as u64) >> off) & mask(k)) as u32
}

/// Expand `n` word-aligned slots back into values.
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
        // An all-zero array still packs at one bit per slot so get stays
        // well-defined from the words alone.
        let k = bits_for(max_v).max(1);
        Pack {
            k,
            n: values.len(),
            words: pack(values, k),
        }
    }
}

/// Non-crossing codec: fixed `k`-bit slots that never straddle words.
#[derive(Debug, Default)]
pub struct NonCross {
    pack: Option<Pack>,
}

impl NonCross {
    /// Create an empty codec; populate it with `compress` or `load`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl BitPacking for NonCross {
    fn compress(&mut self, values: &[u32]) -> Result<Envelope> {
        let pack = Pack::build(values);
        let env = Envelope::NonCross {
            n: pack.n,
            k: pack.k,
            words: pack.words.clone(),
        };
        self.pack = Some(pack);
        Ok(env)
    }

    fn load(&mut self, envelope: &Envelope) -> Result<()> {
        match envelope {
            Envelope::NonCross { n, k, words } => {
                envelope.validate()?;
                self.pack = Some(Pack {
                    k: *k,
                    n: *n,
                    words: words.clone(),
                });
                Ok(())
            }
            other => Err(PackError::Envelope(format!(
                "cannot load a '{}' envelope into the noncross codec",
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
        let mut bp = NonCross::new();
        let env = bp.compress(&data).unwrap();

        // max = 10 needs 4 bits; 8 slots per word; 10 slots need 2 words.
        assert_eq!(bp.width(), 4);
        assert_eq!(bp.len(), 10);
        match &env {
            Envelope::NonCross { words, .. } => {
                assert_eq!(words, &vec![0x6482_7351, 0xA9]);
            }
            _ => panic!("wrong variant"),
        }
        assert_eq!(bp.get(3).unwrap(), 7);
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn all_zeros_pack_at_one_bit() {
        let mut bp = NonCross::new();
        let env = bp.compress(&[0, 0, 0, 0]).unwrap();
        assert_eq!(bp.width(), 1);
        assert_eq!(env.words(), &[0]);
        for i in 0..4 {
            assert_eq!(bp.get(i).unwrap(), 0);
        }
        assert_eq!(bp.decompress().unwrap(), vec![0; 4]);
    }

    #[test]
    fn full_width_value_occupies_one_word() {
        let mut bp = NonCross::new();
        let env = bp.compress(&[u32::MAX]).unwrap();
        assert_eq!(bp.width(), 32);
        assert_eq!(env.words(), &[u32::MAX]);
        assert_eq!(bp.get(0).unwrap(), u32::MAX);
    }

    #[test]
    fn length_exactly_a_multiple_of_capacity() {
        // k = 4 gives cap = 8; 16 values fill two words with no spare slots.
        let data: Vec<u32> = (0..16).map(|i| (i % 15) as u32).collect();
        let mut bp = NonCross::new();
        let env = bp.compress(&data).unwrap();
        assert_eq!(env.words().len(), 2);
        assert_eq!(bp.decompress().unwrap(), data);
    }

    #[test]
    fn empty_array_round_trips() {
        let mut bp = NonCross::new();
        let env = bp.compress(&[]).unwrap();
        assert_eq!(env.n(), 0);
        assert_eq!(env.k(), 0);
        assert!(env.words().is_empty());
        assert_eq!(bp.decompress().unwrap(), Vec::<u32>::new());
        assert!(matches!(
            bp.get(0),
            Err(PackError::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn get_out_of_bounds() {
        let mut bp = NonCross::new();
        bp.compress(&[1, 2, 3]).unwrap();
        assert!(matches!(
            bp.get(3),
            Err(PackError::IndexOutOfBounds { index: 3, len: 3 })
        ));
    }

    #[test]
    fn get_before_compress_is_an_error() {
        let bp = NonCross::new();
        assert!(matches!(bp.get(0), Err(PackError::NotCompressed)));
        assert!(matches!(bp.decompress(), Err(PackError::NotCompressed)));
    }

    #[test]
    fn second_compress_replaces_state() {
        let mut bp = NonCross::new();
        bp.compress(&[1, 2, 3, 1000]).unwrap();
        assert_eq!(bp.get(3).unwrap(), 1000);

        bp.compress(&[10, 20, 30, 40]).unwrap();
        assert_eq!(bp.len(), 4);
        assert_eq!(bp.get(0).unwrap(), 10);
        assert_eq!(bp.get(3).unwrap(), 40);
    }

    #[test]
    fn load_restores_random_access() {
        let data = vec![9u32, 8, 7, 6, 5];
        let mut writer = NonCross::new();
        let env = writer.compress(&data).unwrap();

        let mut reader = NonCross::new();
        reader.load(&env).unwrap();
        for (i, &v) in data.iter().enumerate() {
            assert_eq!(reader.get(i).unwrap(), v);
        }
    }

    #[test]
    fn load_rejects_other_variants() {
        let env = Envelope::Cross {
            n: 1,
            k: 1,
            words: vec![1],
        };
        let mut bp = NonCross::new();
        assert!(matches!(bp.load(&env), Err(PackError::Envelope(_))));
    }
}
