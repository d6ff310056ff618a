//! The decoded pileup column and the dispatch between the two line formats.

use log::warn;
use smartstring::{LazyCompact, SmartString};
use std::fmt;
use std::str::FromStr;

use crate::core::error::FormatError;

use super::base::Base;
use super::consensus::{call_consensus, resolve_consensus};
use super::evidence::{BaseCount, BaseCounts, Evidence, HistogramSnapshot};
use super::markup::MarkupCounts;
use super::quality::{is_valid_quality, Quality};
use super::{compact, generic};

/// Number of tab-separated fields both line formats are built around.
pub const PILEUP_FIELDS: usize = 6;

/// One genomic position of a pileup, fully decoded.
///
/// Columns are only created by decoding a line, so every instance has its
/// evidence populated and its consensus set.
#[derive(Debug, Clone, PartialEq)]
pub struct PileupColumn {
    chrom: SmartString<LazyCompact>,
    coord: u64,
    ref_base: Base,
    cons_base: Base,
    coverage: u32,
    evidence: Evidence,
    counts: MarkupCounts,
    avg_ins_len: f64,
    avg_del_len: f64,
}

impl PileupColumn {
    /// Decode one line in the given format.
    pub fn parse<L: AsRef<[u8]> + ?Sized>(line: &L, kind: DecoderKind) -> Result<Self, FormatError> {
        kind.decode(line)
    }

    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    /// Zero-based coordinate.
    pub fn coord(&self) -> u64 {
        self.coord
    }

    pub fn ref_base(&self) -> Base {
        self.ref_base
    }

    /// Consensus base; the reference base when the vote was undetermined.
    pub fn cons_base(&self) -> Base {
        self.cons_base
    }

    /// Raw depth reported on the line.
    pub fn coverage(&self) -> u32 {
        self.coverage
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }

    pub fn markup_counts(&self) -> &MarkupCounts {
        &self.counts
    }

    pub fn num_read_starts(&self) -> u32 {
        self.counts.num_read_starts
    }

    pub fn num_read_ends(&self) -> u32 {
        self.counts.num_read_ends
    }

    pub fn num_ins_events(&self) -> u32 {
        self.counts.num_ins_events
    }

    pub fn num_del_events(&self) -> u32 {
        self.counts.num_del_events
    }

    pub fn num_del_placeholders(&self) -> u32 {
        self.counts.num_del_placeholders
    }

    /// Average insertion length; only reported by the compact format.
    pub fn avg_ins_len(&self) -> f64 {
        self.avg_ins_len
    }

    /// Average deletion length; only reported by the compact format.
    pub fn avg_del_len(&self) -> f64 {
        self.avg_del_len
    }

    pub fn count_for_base(&self, letter: u8, min_quality: Quality, split_by_strand: bool) -> BaseCount {
        self.evidence.count_for_base(letter, min_quality, split_by_strand)
    }

    pub fn all_base_counts(&self, min_quality: Quality, split_by_strand: bool) -> BaseCounts {
        self.evidence.all_base_counts(min_quality, split_by_strand)
    }

    pub fn histogram_snapshot(&self, split_by_strand: bool) -> HistogramSnapshot {
        self.evidence.histogram_snapshot(split_by_strand)
    }
}

/// Line format of a pileup stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecoderKind {
    /// `samtools mpileup` style: reference-relative `.`/`,` calls with inline markup.
    #[default]
    Generic,
    /// Pre-paired base/quality bytes followed by a `key=value` indel summary.
    Compact,
}

impl DecoderKind {
    /// Decode a raw line. Quality bytes may lie outside ASCII; only the
    /// locus fields and the compact indel summary must be UTF-8.
    pub fn decode<L: AsRef<[u8]> + ?Sized>(self, line: &L) -> Result<PileupColumn, FormatError> {
        match self {
            DecoderKind::Generic => generic::decode(line.as_ref()),
            DecoderKind::Compact => compact::decode(line.as_ref()),
        }
    }
}

impl FromStr for DecoderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "mpileup" => Ok(DecoderKind::Generic),
            "compact" | "lofreq" => Ok(DecoderKind::Compact),
            other => Err(format!("Unknown pileup format '{}' (expected generic or compact)", other)),
        }
    }
}

impl fmt::Display for DecoderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecoderKind::Generic => write!(f, "generic"),
            DecoderKind::Compact => write!(f, "compact"),
        }
    }
}

/// The four fields shared by both formats.
#[derive(Debug)]
pub(crate) struct Locus<'a> {
    pub chrom: &'a str,
    pub coord: u64,
    pub ref_base: Base,
    pub coverage: u32,
}

impl<'a> Locus<'a> {
    /// Parse chromosome, 1-based coordinate, reference base and coverage.
    pub(crate) fn parse(
        chrom: &'a [u8],
        pos: &[u8],
        ref_field: &[u8],
        coverage: &[u8],
    ) -> Result<Self, FormatError> {
        let chrom = text_field(chrom, "chromosome")?;
        let pos = text_field(pos, "coordinate")?;
        let ref_field = text_field(ref_field, "reference base")?;
        let coverage = text_field(coverage, "coverage")?;
        if chrom.is_empty() {
            return Err(FormatError::InvalidField {
                field: "chromosome",
                value: chrom.to_string(),
            });
        }
        let coord = match pos.parse::<u64>() {
            Ok(pos) if pos >= 1 => pos - 1,
            _ => {
                return Err(FormatError::InvalidField {
                    field: "coordinate",
                    value: pos.to_string(),
                })
            }
        };
        let coverage = coverage.parse::<u32>().map_err(|_| FormatError::InvalidField {
            field: "coverage",
            value: coverage.to_string(),
        })?;
        let ref_base = parse_ref_base(ref_field, chrom, coord)?;

        Ok(Locus {
            chrom,
            coord,
            ref_base,
            coverage,
        })
    }
}

/// Split a line on tabs without requiring it to be UTF-8.
pub(crate) fn split_fields(line: &[u8]) -> Vec<&[u8]> {
    line.split(|&b| b == b'\t').collect()
}

/// View a field as text; `field` names it in the error.
pub(crate) fn text_field<'a>(bytes: &'a [u8], field: &'static str) -> Result<&'a str, FormatError> {
    std::str::from_utf8(bytes).map_err(|_| FormatError::InvalidField {
        field,
        value: String::from_utf8_lossy(bytes).into_owned(),
    })
}

fn parse_ref_base(field: &str, chrom: &str, coord: u64) -> Result<Base, FormatError> {
    let letter = match field.as_bytes() {
        [letter] => *letter,
        _ => {
            return Err(FormatError::InvalidField {
                field: "reference base",
                value: field.to_string(),
            })
        }
    };
    Ok(Base::from_ascii(letter).unwrap_or_else(|| {
        warn!(
            "Reference base '{}' at {}:{} is not one of ACGTN; using N",
            letter as char,
            chrom,
            coord + 1
        );
        Base::N
    }))
}

/// Warn once per line when decoded qualities fall outside 0..=99.
pub(crate) fn warn_on_invalid_qualities(qualities: &[Quality], chrom: &str, coord: u64) {
    let invalid: Vec<Quality> = qualities
        .iter()
        .copied()
        .filter(|&q| !is_valid_quality(q))
        .collect();
    if !invalid.is_empty() {
        warn!(
            "Some base qualities out of valid range for {}:{}: {:?}",
            chrom,
            coord + 1,
            invalid
        );
    }
}

/// Collects a column's contents before the consensus is computed.
#[derive(Debug)]
pub(crate) struct ColumnBuilder {
    chrom: SmartString<LazyCompact>,
    coord: u64,
    ref_base: Base,
    coverage: u32,
    pub evidence: Evidence,
    pub counts: MarkupCounts,
    pub avg_ins_len: f64,
    pub avg_del_len: f64,
}

impl ColumnBuilder {
    pub(crate) fn new(locus: &Locus<'_>) -> Self {
        Self {
            chrom: SmartString::from(locus.chrom),
            coord: locus.coord,
            ref_base: locus.ref_base,
            coverage: locus.coverage,
            evidence: Evidence::new(),
            counts: MarkupCounts::default(),
            avg_ins_len: 0.0,
            avg_del_len: 0.0,
        }
    }

    pub(crate) fn finish(self) -> PileupColumn {
        let cons_base = resolve_consensus(call_consensus(&self.evidence), self.ref_base);
        PileupColumn {
            chrom: self.chrom,
            coord: self.coord,
            ref_base: self.ref_base,
            cons_base,
            coverage: self.coverage,
            evidence: self.evidence,
            counts: self.counts,
            avg_ins_len: self.avg_ins_len,
            avg_del_len: self.avg_del_len,
        }
    }
}
