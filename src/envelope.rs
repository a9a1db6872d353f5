//! The on-disk/wire JSON envelope pairing codec metadata with packed words.
//!
//! The `variant` tag selects which codec a reader instantiates. Required
//! fields for the tagged variant must be present; unknown fields are
//! ignored. An overflow compress that fell back to single-tier packing
//! writes the single-tier tag, so readers never need fallback awareness.

use serde::{Deserialize, Serialize};

use crate::error::{PackError, Result};
use crate::geometry::{capacity, WORD_BITS};

/// Inner slot layout used by the overflow variant's main stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InnerLayout {
    /// Word-aligned slots, no straddling.
    NonCross,
    /// Contiguous bit stream, slots may straddle words.
    #[default]
    Cross,
}

impl InnerLayout {
    /// The variant tag this layout writes when used as a single-tier pack.
    pub fn tag(&self) -> &'static str {
        match self {
            InnerLayout::NonCross => "noncross",
            InnerLayout::Cross => "cross",
        }
    }
}

/// Serialised codec state.
///
/// All integers are non-negative; `words` holds logical 32-bit cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant")]
pub enum Envelope {
    /// Word-aligned single-tier pack.
    #[serde(rename = "noncross")]
    NonCross {
        /// Element count.
        n: usize,
        /// Bit-width per slot.
        k: u32,
        /// Packed words, `ceil(n / (32 / k))` of them.
        words: Vec<u32>,
    },
    /// Contiguous-bit-stream single-tier pack.
    #[serde(rename = "cross")]
    Cross {
        /// Element count.
        n: usize,
        /// Bit-width per slot.
        k: u32,
        /// Packed words, `ceil(n * k / 32)` of them.
        words: Vec<u32>,
    },
    /// Two-tier pack: flagged main stream plus exception list.
    #[serde(rename = "overflow")]
    Overflow {
        /// Element count.
        n: usize,
        /// Main-stream slot width including the flag bit (`k_main`).
        k: u32,
        /// Main-stream words in the `inner` layout at width `k`.
        words: Vec<u32>,
        /// The percentile cutoff value `T`; every element `<= threshold`
        /// is stored literally.
        threshold: u32,
        /// Payload bits under the flag (`k - 1`).
        k_low: u32,
        /// Full-width exception values referenced by flagged slots.
        overflow: Vec<u32>,
        /// Slot layout of the main stream.
        #[serde(default)]
        inner: InnerLayout,
    },
}

/// Words required by `layout` to hold `n` slots of `k` bits, `n > 0`.
pub(crate) fn expected_words(layout: InnerLayout, n: usize, k: u32) -> usize {
    match layout {
        InnerLayout::NonCross => n.div_ceil(capacity(k) as usize),
        InnerLayout::Cross => (n * k as usize).div_ceil(WORD_BITS as usize),
    }
}

fn check_single(n: usize, k: u32, words: &[u32], layout: InnerLayout) -> Result<()> {
    if n == 0 {
        if k != 0 || !words.is_empty() {
            return Err(PackError::Envelope(format!(
                "empty pack must have k = 0 and no words, got k = {k}, {} words",
                words.len()
            )));
        }
        return Ok(());
    }
    if k == 0 {
        return Err(PackError::Envelope(format!("k = 0 with n = {n}")));
    }
    if k > WORD_BITS {
        return Err(PackError::Envelope(format!("k = {k} exceeds the word width")));
    }
    let expected = expected_words(layout, n, k);
    if words.len() != expected {
        return Err(PackError::Envelope(format!(
            "{} layout with n = {n}, k = {k} requires {expected} words, got {}",
            layout.tag(),
            words.len()
        )));
    }
    Ok(())
}

impl Envelope {
    /// Check the structural invariants of this envelope.
    ///
    /// Codec `load` implementations call this before adopting the state.
    pub fn validate(&self) -> Result<()> {
        match self {
            Envelope::NonCross { n, k, words } => {
                check_single(*n, *k, words, InnerLayout::NonCross)
            }
            Envelope::Cross { n, k, words } => check_single(*n, *k, words, InnerLayout::Cross),
            Envelope::Overflow {
                n,
                k,
                words,
                k_low,
                overflow,
                inner,
                ..
            } => {
                if k_low + 1 != *k {
                    return Err(PackError::Envelope(format!(
                        "overflow widths inconsistent: k = {k}, k_low = {k_low}"
                    )));
                }
                if *k_low == 0 || *k > WORD_BITS {
                    return Err(PackError::Envelope(format!(
                        "overflow slot width {k} outside [2, 32]"
                    )));
                }
                if (overflow.len() as u64) > (1u64 << k_low) {
                    return Err(PackError::Envelope(format!(
                        "{} overflow entries exceed what {k_low} payload bits can index",
                        overflow.len()
                    )));
                }
                check_single(*n, *k, words, *inner)
            }
        }
    }

    /// Variant tag as written on the wire.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Envelope::NonCross { .. } => "noncross",
            Envelope::Cross { .. } => "cross",
            Envelope::Overflow { .. } => "overflow",
        }
    }

    /// Element count.
    pub fn n(&self) -> usize {
        match self {
            Envelope::NonCross { n, .. }
            | Envelope::Cross { n, .. }
            | Envelope::Overflow { n, .. } => *n,
        }
    }

    /// Effective bit-width per slot.
    pub fn k(&self) -> u32 {
        match self {
            Envelope::NonCross { k, .. }
            | Envelope::Cross { k, .. }
            | Envelope::Overflow { k, .. } => *k,
        }
    }

    /// Packed main-stream words.
    pub fn words(&self) -> &[u32] {
        match self {
            Envelope::NonCross { words, .. }
            | Envelope::Cross { words, .. }
            | Envelope::Overflow { words, .. } => words,
        }
    }

    /// Total stored payload in bits: the words plus, for overflow, the
    /// full-width exception list.
    pub fn stored_bits(&self) -> u64 {
        let word_bits = self.words().len() as u64 * WORD_BITS as u64;
        match self {
            Envelope::Overflow { overflow, .. } => {
                word_bits + overflow.len() as u64 * WORD_BITS as u64
            }
            _ => word_bits,
        }
    }

    /// Size of the array as raw 32-bit integers, in bits.
    pub fn raw_bits(&self) -> u64 {
        self.n() as u64 * WORD_BITS as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_single_tier() {
        let env = Envelope::NonCross {
            n: 10,
            k: 4,
            words: vec![0x6482_7351, 0xA9],
        };
        let text = serde_json::to_string(&env).unwrap();
        assert!(text.contains("\"variant\":\"noncross\""));
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, env);
        back.validate().unwrap();
    }

    #[test]
    fn json_round_trip_overflow() {
        let env = Envelope::Overflow {
            n: 3,
            k: 5,
            words: vec![0b10000_00010_00001],
            threshold: 10,
            k_low: 4,
            overflow: vec![70_000],
            inner: InnerLayout::Cross,
        };
        let text = serde_json::to_string(&env).unwrap();
        let back: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(back, env);
        back.validate().unwrap();
    }

    #[test]
    fn extra_fields_are_ignored() {
        let text = r#"{"variant":"cross","n":1,"k":3,"words":[5],"comment":"hi"}"#;
        let env: Envelope = serde_json::from_str(text).unwrap();
        assert_eq!(env.n(), 1);
        env.validate().unwrap();
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let text = r#"{"variant":"cross","n":1,"words":[5]}"#;
        assert!(serde_json::from_str::<Envelope>(text).is_err());
    }

    #[test]
    fn inner_defaults_to_cross() {
        let text = r#"{"variant":"overflow","n":3,"k":5,"words":[1],
                       "threshold":10,"k_low":4,"overflow":[]}"#;
        let env: Envelope = serde_json::from_str(text).unwrap();
        match env {
            Envelope::Overflow { inner, .. } => assert_eq!(inner, InnerLayout::Cross),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn zero_width_with_elements_is_rejected() {
        let env = Envelope::Cross {
            n: 4,
            k: 0,
            words: vec![],
        };
        assert!(env.validate().is_err());
    }

    #[test]
    fn word_count_mismatch_is_rejected() {
        let env = Envelope::NonCross {
            n: 10,
            k: 4,
            words: vec![0x6482_7351],
        };
        assert!(env.validate().is_err());
        let env = Envelope::Cross {
            n: 10,
            k: 4,
            words: vec![1, 2, 3],
        };
        assert!(env.validate().is_err());
    }

    #[test]
    fn oversized_width_is_rejected() {
        let env = Envelope::Cross {
            n: 1,
            k: 33,
            words: vec![0, 0],
        };
        assert!(env.validate().is_err());
    }

    #[test]
    fn overflow_list_beyond_index_range_is_rejected() {
        let env = Envelope::Overflow {
            n: 4,
            k: 2,
            words: vec![0],
            threshold: 1,
            k_low: 1,
            overflow: vec![100, 200, 300],
            inner: InnerLayout::Cross,
        };
        assert!(env.validate().is_err());
    }

    #[test]
    fn empty_pack_shape_is_enforced() {
        let env = Envelope::NonCross {
            n: 0,
            k: 0,
            words: vec![],
        };
        env.validate().unwrap();
        let env = Envelope::NonCross {
            n: 0,
            k: 3,
            words: vec![],
        };
        assert!(env.validate().is_err());
    }
}
