//! Removal of read-segment and indel markup from a pileup base string.
//!
//! The base column of a pileup line interleaves base calls with markup:
//!
//! - `^X` starts a read segment; `X` encodes the mapping quality.
//! - `$` ends a read segment.
//! - `+n<seq>` / `-n<seq>` report an insertion / deletion of `n` bases
//!   following this position.
//! - `*` is a placeholder for a base deleted in this read.
//!
//! Only base calls and `*` placeholders own a slot in the quality string.
//! [`strip_markup`] walks the string once, keeps the base calls together with
//! their qualities, drops everything else and counts what it dropped.

use crate::core::error::FormatError;

use super::base::Base;
use super::quality::Quality;

/// Counts of the markup removed from one base string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkupCounts {
    pub num_read_starts: u32,
    pub num_read_ends: u32,
    pub num_ins_events: u32,
    pub num_del_events: u32,
    /// `*` symbols removed together with their qualities.
    pub num_del_placeholders: u32,
}

/// Base calls and their qualities after markup removal. Both have equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedBases {
    pub bases: Vec<u8>,
    pub qualities: Vec<Quality>,
    pub counts: MarkupCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    AfterCaret,
    InIndelLength {
        insertion: bool,
        length: usize,
        digits: usize,
    },
    InIndelSequence {
        remaining: usize,
    },
}

/// Replace `.` with the upper-case and `,` with the lower-case reference base.
pub fn expand_reference_matches(raw: &[u8], ref_base: Base) -> Vec<u8> {
    let upper = ref_base.to_ascii();
    let lower = upper.to_ascii_lowercase();
    raw.iter()
        .map(|&b| match b {
            b'.' => upper,
            b',' => lower,
            other => other,
        })
        .collect()
}

/// Strip start/end, indel and placeholder markup from `raw`.
///
/// `qualities` must hold one entry per base call and per `*` placeholder, in
/// order. Fails when the markup is malformed or when the number of
/// quality-bearing symbols differs from `qualities.len()`.
pub fn strip_markup(raw: &[u8], qualities: &[Quality]) -> Result<StrippedBases, FormatError> {
    let mut bases = Vec::with_capacity(raw.len());
    let mut kept = Vec::with_capacity(qualities.len());
    let mut counts = MarkupCounts::default();
    // quality slots consumed so far
    let mut slot = 0usize;
    let mut state = ScanState::Normal;
    let mut i = 0usize;

    while i < raw.len() {
        let byte = raw[i];
        match state {
            ScanState::Normal => {
                match byte {
                    b'$' => counts.num_read_ends += 1,
                    b'^' => state = ScanState::AfterCaret,
                    b'+' | b'-' => {
                        state = ScanState::InIndelLength {
                            insertion: byte == b'+',
                            length: 0,
                            digits: 0,
                        }
                    }
                    b'*' => {
                        counts.num_del_placeholders += 1;
                        slot += 1;
                    }
                    _ => {
                        bases.push(byte);
                        if let Some(&q) = qualities.get(slot) {
                            kept.push(q);
                        }
                        slot += 1;
                    }
                }
                i += 1;
            }
            ScanState::AfterCaret => {
                counts.num_read_starts += 1;
                state = ScanState::Normal;
                i += 1;
            }
            ScanState::InIndelLength {
                insertion,
                length,
                digits,
            } => {
                if byte.is_ascii_digit() {
                    let length = length
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                        .ok_or(FormatError::IndelMarkup {
                            offset: i,
                            reason: "indel length overflows",
                        })?;
                    state = ScanState::InIndelLength {
                        insertion,
                        length,
                        digits: digits + 1,
                    };
                    i += 1;
                } else {
                    if digits == 0 {
                        return Err(FormatError::IndelMarkup {
                            offset: i,
                            reason: "indel sign without length",
                        });
                    }
                    count_indel(&mut counts, insertion);
                    // reprocess this byte as part of the sequence
                    state = ScanState::InIndelSequence { remaining: length };
                }
            }
            ScanState::InIndelSequence { remaining } => {
                if remaining == 0 {
                    state = ScanState::Normal;
                } else {
                    state = ScanState::InIndelSequence {
                        remaining: remaining - 1,
                    };
                    i += 1;
                }
            }
        }
    }

    match state {
        ScanState::Normal | ScanState::InIndelSequence { remaining: 0 } => {}
        ScanState::AfterCaret => {
            return Err(FormatError::DanglingReadStart { offset: raw.len() - 1 })
        }
        ScanState::InIndelLength {
            insertion,
            length: 0,
            digits,
        } if digits > 0 => count_indel(&mut counts, insertion),
        ScanState::InIndelLength { digits: 0, .. } => {
            return Err(FormatError::IndelMarkup {
                offset: raw.len(),
                reason: "indel sign without length",
            })
        }
        ScanState::InIndelLength { .. } | ScanState::InIndelSequence { .. } => {
            return Err(FormatError::IndelMarkup {
                offset: raw.len(),
                reason: "indel sequence truncated",
            })
        }
    }

    if slot != qualities.len() {
        return Err(FormatError::LengthMismatch {
            bases: slot,
            qualities: qualities.len(),
        });
    }

    Ok(StrippedBases {
        bases,
        qualities: kept,
        counts,
    })
}

#[inline]
fn count_indel(counts: &mut MarkupCounts, insertion: bool) {
    if insertion {
        counts.num_ins_events += 1;
    } else {
        counts.num_del_events += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn quals(n: usize) -> Vec<Quality> {
        (0..n as Quality).map(|q| q + 10).collect()
    }

    #[test]
    fn expands_reference_matches_by_strand() {
        assert_eq!(expand_reference_matches(b".,A,.", Base::G), b"GgAgG".to_vec());
        assert_eq!(expand_reference_matches(b"^.,", Base::T), b"^Tt".to_vec());
    }

    #[test]
    fn strips_start_and_end_markers() {
        let stripped = strip_markup(b"^~A$c^!G$$", &quals(3)).unwrap();
        assert_eq!(stripped.bases, b"AcG".to_vec());
        assert_eq!(stripped.qualities, quals(3));
        assert_eq!(stripped.counts.num_read_starts, 2);
        assert_eq!(stripped.counts.num_read_ends, 3);
    }

    #[test]
    fn mapping_quality_character_is_never_markup() {
        // '$', '+', '*' and digits are valid mapping-quality characters
        let stripped = strip_markup(b"^$A^+C^*g^5t", &quals(4)).unwrap();
        assert_eq!(stripped.bases, b"ACgt".to_vec());
        assert_eq!(stripped.counts.num_read_starts, 4);
        assert_eq!(stripped.counts.num_read_ends, 0);
        assert_eq!(stripped.counts.num_ins_events, 0);
        assert_eq!(stripped.counts.num_del_placeholders, 0);
    }

    #[test]
    fn removes_indel_sequences() {
        let raw = expand_reference_matches(b".,.,+2AG.,-1A", Base::G);
        let stripped = strip_markup(&raw, &quals(6)).unwrap();
        assert_eq!(stripped.bases, b"GgGgGg".to_vec());
        assert_eq!(stripped.counts.num_ins_events, 1);
        assert_eq!(stripped.counts.num_del_events, 1);
    }

    #[test]
    fn handles_multi_digit_indel_lengths() {
        let stripped = strip_markup(b"A+12ACGTACGTACGTc-10aaaaaaaaaaG", &quals(3)).unwrap();
        assert_eq!(stripped.bases, b"AcG".to_vec());
        assert_eq!(stripped.counts.num_ins_events, 1);
        assert_eq!(stripped.counts.num_del_events, 1);
    }

    #[test]
    fn placeholders_drop_their_quality() {
        let stripped = strip_markup(b"A*c*G", &[30, 5, 31, 6, 32]).unwrap();
        assert_eq!(stripped.bases, b"AcG".to_vec());
        assert_eq!(stripped.qualities, vec![30, 31, 32]);
        assert_eq!(stripped.counts.num_del_placeholders, 2);
        assert_eq!(stripped.counts.num_del_events, 0);
    }

    #[test]
    fn samtools_documentation_example() {
        let raw = expand_reference_matches(b",,,,,..,.-4CACC.-4CACC....,.,,.^~.", Base::A);
        let stripped = strip_markup(&raw, &quals(20)).unwrap();
        assert_eq!(stripped.bases.len(), 20);
        assert_eq!(stripped.counts.num_del_events, 2);
        assert_eq!(stripped.counts.num_read_starts, 1);
        assert!(stripped.bases.iter().all(|b| b.eq_ignore_ascii_case(&b'A')));
    }

    #[test]
    fn trailing_indel_at_end_of_string() {
        let stripped = strip_markup(b"A+2CT", &quals(1)).unwrap();
        assert_eq!(stripped.bases, b"A".to_vec());
        assert_eq!(stripped.counts.num_ins_events, 1);
    }

    #[test]
    fn rejects_malformed_markup() {
        assert!(matches!(
            strip_markup(b"A+C", &quals(2)),
            Err(FormatError::IndelMarkup { .. })
        ));
        assert!(matches!(
            strip_markup(b"A-", &quals(1)),
            Err(FormatError::IndelMarkup { .. })
        ));
        assert!(matches!(
            strip_markup(b"A+3CG", &quals(1)),
            Err(FormatError::IndelMarkup { .. })
        ));
        assert!(matches!(
            strip_markup(b"A^", &quals(1)),
            Err(FormatError::DanglingReadStart { .. })
        ));
    }

    #[test]
    fn rejects_quality_length_mismatch() {
        assert_eq!(
            strip_markup(b"ACGT", &quals(3)),
            Err(FormatError::LengthMismatch {
                bases: 4,
                qualities: 3
            })
        );
        assert!(matches!(
            strip_markup(b"A*", &quals(1)),
            Err(FormatError::LengthMismatch { .. })
        ));
    }

    proptest! {
        #[test]
        fn plain_strings_pass_through(raw in "[ACGTNacgtn]{0,64}") {
            let qualities = quals(raw.len());
            let stripped = strip_markup(raw.as_bytes(), &qualities).unwrap();
            prop_assert_eq!(stripped.bases, raw.as_bytes().to_vec());
            prop_assert_eq!(stripped.qualities, qualities);
            prop_assert_eq!(stripped.counts, MarkupCounts::default());
        }

        #[test]
        fn markup_never_leaks_into_bases(
            calls in prop::collection::vec(
                ("[ACGTacgt]", any::<bool>(), any::<bool>(), prop::option::of("[+-][1-3]")),
                0..32,
            )
        ) {
            let mut raw = String::new();
            let mut n = 0usize;
            for (base, start, end, indel) in &calls {
                if *start {
                    raw.push_str("^I");
                }
                raw.push_str(base);
                n += 1;
                if let Some(indel) = indel {
                    let len: usize = indel[1..].parse().unwrap();
                    raw.push_str(indel);
                    raw.push_str(&"N".repeat(len));
                }
                if *end {
                    raw.push('$');
                }
            }
            let stripped = strip_markup(raw.as_bytes(), &quals(n)).unwrap();
            prop_assert_eq!(stripped.bases.len(), n);
            prop_assert!(stripped.bases.iter().all(|b| b"ACGTacgt".contains(b)));
        }
    }
}
