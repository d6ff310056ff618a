//! Decoder for the compact pileup format.
//!
//! Field 5 holds (base, quality) byte pairs that are already free of markup,
//! field 6 a space separated indel summary such as
//! `#heads=0 #tails=13 #ins=0 ins_len=0.0 #del=0 del_len=0.0`.

use log::warn;
use std::str::FromStr;

use crate::core::error::FormatError;

use super::base::StrandedBase;
use super::column::{
    split_fields, text_field, warn_on_invalid_qualities, ColumnBuilder, Locus, PileupColumn, PILEUP_FIELDS,
};
use super::markup::MarkupCounts;
use super::quality::{decode_quality, Quality};

pub(crate) fn decode(line: &[u8]) -> Result<PileupColumn, FormatError> {
    // the line ends in the text summary, so all trailing whitespace can go
    let end = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    let line = &line[..end];
    if line.is_empty() {
        return Err(FormatError::EmptyLine);
    }

    let fields = split_fields(line);
    if fields.len() < PILEUP_FIELDS {
        return Err(FormatError::FieldCount {
            expected: PILEUP_FIELDS,
            found: fields.len(),
        });
    }
    if fields.len() > PILEUP_FIELDS {
        warn!(
            "More fields than expected in pileup line. Will try to continue anyway. Line was '{}'",
            String::from_utf8_lossy(line)
        );
    }

    let locus = Locus::parse(fields[0], fields[1], fields[2], fields[3])?;
    let mut builder = ColumnBuilder::new(&locus);

    let pairs = fields[4];
    if pairs.len() % 2 != 0 {
        return Err(FormatError::UnpairedBaseQuality(pairs.len()));
    }
    let mut qualities: Vec<Quality> = Vec::with_capacity(pairs.len() / 2);
    let mut seen: u64 = 0;
    for pair in pairs.chunks_exact(2) {
        let base = StrandedBase::from_ascii(pair[0]).ok_or(FormatError::InvalidBase(pair[0] as char))?;
        let quality = decode_quality(pair[1]);
        builder.evidence.record(base, quality);
        qualities.push(quality);
        seen += 1;
    }
    // no pileup-level filtering happens upstream of this format
    if seen > u64::from(locus.coverage) {
        return Err(FormatError::CoverageExceeded {
            count: seen,
            coverage: locus.coverage,
        });
    }
    warn_on_invalid_qualities(&qualities, locus.chrom, locus.coord);

    let summary = IndelSummary::parse(text_field(fields[5], "indel summary")?)?;
    builder.counts = MarkupCounts {
        num_read_starts: summary.heads,
        num_read_ends: summary.tails,
        num_ins_events: summary.ins,
        num_del_events: summary.del,
        num_del_placeholders: 0,
    };
    builder.avg_ins_len = summary.ins_len;
    builder.avg_del_len = summary.del_len;

    Ok(builder.finish())
}

/// Parsed field 6 of a compact line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct IndelSummary {
    heads: u32,
    tails: u32,
    ins: u32,
    ins_len: f64,
    del: u32,
    del_len: f64,
}

impl IndelSummary {
    fn parse(field: &str) -> Result<Self, FormatError> {
        let mut pairs: Vec<(&str, &str)> = Vec::with_capacity(6);
        for token in field.split(' ').filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some(pair) => pairs.push(pair),
                None => {
                    return Err(FormatError::InvalidField {
                        field: "indel summary",
                        value: field.to_string(),
                    })
                }
            }
        }

        Ok(IndelSummary {
            heads: summary_value(&pairs, "#heads", field)?,
            tails: summary_value(&pairs, "#tails", field)?,
            ins: summary_value(&pairs, "#ins", field)?,
            ins_len: summary_value(&pairs, "ins_len", field)?,
            del: summary_value(&pairs, "#del", field)?,
            del_len: summary_value(&pairs, "del_len", field)?,
        })
    }
}

/// Look up `key` (the last occurrence wins) and parse its value.
fn summary_value<T: FromStr>(pairs: &[(&str, &str)], key: &'static str, field: &str) -> Result<T, FormatError> {
    let value = pairs
        .iter()
        .rev()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| FormatError::MissingSummaryKey {
            key,
            summary: field.to_string(),
        })?;
    value.parse::<T>().map_err(|_| FormatError::InvalidField {
        field: key,
        value: value.to_string(),
    })
}
