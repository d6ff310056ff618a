//! Phred+33 quality codec.

/// A decoded Phred quality score.
///
/// Signed, because bytes below `!` decode to negative values that are
/// reported as out of range rather than rejected.
pub type Quality = i32;

/// Offset of the Sanger/Illumina 1.8+ encoding.
pub const PHRED_OFFSET: Quality = 33;

/// Highest quality considered in range.
pub const MAX_VALID_QUALITY: Quality = 99;

/// Decode one encoded quality byte.
#[inline]
pub fn decode_quality(byte: u8) -> Quality {
    Quality::from(byte) - PHRED_OFFSET
}

/// Decode a whole quality string.
pub fn decode_qualities(encoded: &[u8]) -> Vec<Quality> {
    encoded.iter().map(|&b| decode_quality(b)).collect()
}

/// Probability that a call with this quality is wrong: `10^(-q/10)`.
#[inline]
pub fn error_probability(quality: Quality) -> f64 {
    10f64.powf(-f64::from(quality) / 10.0)
}

#[inline]
pub fn is_valid_quality(quality: Quality) -> bool {
    (0..=MAX_VALID_QUALITY).contains(&quality)
}
