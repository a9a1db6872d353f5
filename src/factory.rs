//! Codec construction by name or from a stored envelope.

use crate::cross::Cross;
use crate::envelope::{Envelope, InnerLayout};
use crate::error::{PackError, Result};
use crate::noncross::NonCross;
use crate::overflow::{Overflow, DEFAULT_OVERFLOW_THRESHOLD};
use crate::traits::BitPacking;

/// Construct a codec from the closed name set.
///
/// Accepted names are `noncross`, `cross`, `overflow` (cross inner),
/// `overflow-cross` (alias of `overflow`), and `overflow-noncross`.
/// `overflow_threshold` applies to the overflow variants only and must be
/// in `(0, 1]`.
pub fn get_bitpacking(name: &str, overflow_threshold: f64) -> Result<Box<dyn BitPacking>> {
    if !(overflow_threshold > 0.0 && overflow_threshold <= 1.0) {
        return Err(PackError::Usage(format!(
            "overflow threshold {overflow_threshold} outside (0, 1]"
        )));
    }
    match name {
        "noncross" => Ok(Box::new(NonCross::new())),
        "cross" => Ok(Box::new(Cross::new())),
        "overflow" | "overflow-cross" => Ok(Box::new(Overflow::new(
            InnerLayout::Cross,
            overflow_threshold,
        ))),
        "overflow-noncross" => Ok(Box::new(Overflow::new(
            InnerLayout::NonCross,
            overflow_threshold,
        ))),
        other => Err(PackError::UnknownCodec(other.to_string())),
    }
}

/// Construct a codec of the envelope's tagged variant and load the state
/// into it.
pub fn from_envelope(envelope: &Envelope) -> Result<Box<dyn BitPacking>> {
    let mut codec: Box<dyn BitPacking> = match envelope {
        Envelope::NonCross { .. } => Box::new(NonCross::new()),
        Envelope::Cross { .. } => Box::new(Cross::new()),
        Envelope::Overflow { inner, .. } => {
            Box::new(Overflow::new(*inner, DEFAULT_OVERFLOW_THRESHOLD))
        }
    };
    codec.load(envelope)?;
    Ok(codec)
}
