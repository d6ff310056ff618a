//! Decoder for generic `samtools mpileup` lines.
//!
//! `chrom  pos  ref  coverage  bases  qualities`, with `.`/`,` standing for
//! the reference base on either strand and indel/segment markup inline.

use log::warn;

use crate::core::error::FormatError;

use super::base::StrandedBase;
use super::column::{split_fields, warn_on_invalid_qualities, ColumnBuilder, Locus, PileupColumn, PILEUP_FIELDS};
use super::markup::{expand_reference_matches, strip_markup};
use super::quality::decode_qualities;

pub(crate) fn decode(line: &[u8]) -> Result<PileupColumn, FormatError> {
    // strip the line terminator only
    let end = line
        .iter()
        .rposition(|&b| b != b'\n' && b != b'\r')
        .map_or(0, |i| i + 1);
    let line = &line[..end];
    if line.is_empty() {
        return Err(FormatError::EmptyLine);
    }

    let fields = split_fields(line);
    let [chrom, pos, ref_field, coverage, bases, quals] = fields.as_slice() else {
        return Err(FormatError::FieldCount {
            expected: PILEUP_FIELDS,
            found: fields.len(),
        });
    };

    let locus = Locus::parse(chrom, pos, ref_field, coverage)?;
    let qualities = decode_qualities(quals);
    warn_on_invalid_qualities(&qualities, locus.chrom, locus.coord);

    let expanded = expand_reference_matches(bases, locus.ref_base);
    let stripped = strip_markup(&expanded, &qualities)?;

    let mut builder = ColumnBuilder::new(&locus);
    builder.counts = stripped.counts;
    let mut retained: u64 = 0;
    for (&letter, &quality) in stripped.bases.iter().zip(&stripped.qualities) {
        // stray gap characters are not evidence
        if let Some(base) = StrandedBase::from_ascii(letter) {
            builder.evidence.record(base, quality);
            retained += 1;
        }
    }

    let expected = u64::from(locus.coverage).saturating_sub(u64::from(stripped.counts.num_del_placeholders));
    if retained != expected {
        warn!(
            "Mismatch between number of bases (= {}) and coverage minus deletions (= {}) at {}:{}",
            retained,
            expected,
            locus.chrom,
            locus.coord + 1
        );
    }

    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pileup::base::Base;
    use crate::pileup::evidence::{BaseCount, QualityHistogram, StrandCounts, DEFAULT_MIN_QUALITY};
    use proptest::prelude::*;

    #[test]
    fn decodes_reference_relative_calls() {
        let column = decode(b"chr1\t100\tG\t6\t.,.,+2AG.,-1A\tIIIIII\n").unwrap();

        assert_eq!(column.chrom(), "chr1");
        assert_eq!(column.coord(), 99);
        assert_eq!(column.ref_base(), Base::G);
        assert_eq!(column.num_ins_events(), 1);
        assert_eq!(column.num_del_events(), 1);
        assert_eq!(
            column.count_for_base(b'G', DEFAULT_MIN_QUALITY, true),
            BaseCount::Stranded(StrandCounts {
                forward: 3,
                reverse: 3
            })
        );
        assert_eq!(column.count_for_base(b'A', 0, false), BaseCount::Combined(0));
        assert_eq!(column.evidence().total(), 6);
        assert_eq!(column.cons_base(), Base::G);
    }

    #[test]
    fn four_fields_is_a_field_count_error() {
        assert_eq!(
            decode(b"chr1\t100\tA\t5"),
            Err(FormatError::FieldCount {
                expected: 6,
                found: 4
            })
        );
    }

    #[test]
    fn empty_line_is_an_error() {
        assert_eq!(decode(b""), Err(FormatError::EmptyLine));
        assert_eq!(decode(b"\r\n"), Err(FormatError::EmptyLine));
    }

    #[test]
    fn consensus_can_differ_from_reference() {
        let column = decode(b"chr2\t7\tA\t5\tTTtt.\tIIIII").unwrap();
        assert_eq!(column.cons_base(), Base::T);
        assert_eq!(column.coverage(), 5);
    }

    #[test]
    fn placeholders_keep_coverage_consistent() {
        let column = decode(b"chr1\t3\tC\t4\t.*,*\tI#I#").unwrap();
        assert_eq!(column.num_del_placeholders(), 2);
        assert_eq!(column.num_del_events(), 0);
        assert_eq!(column.evidence().total(), 2);
    }

    #[test]
    fn unknown_symbols_are_skipped() {
        let column = decode(b"chr1\t3\tC\t3\t.>,\tIII").unwrap();
        assert_eq!(column.evidence().total(), 2);
    }

    #[test]
    fn length_mismatch_aborts_the_line() {
        assert_eq!(
            decode(b"chr1\t3\tC\t3\t...\tII"),
            Err(FormatError::LengthMismatch {
                bases: 3,
                qualities: 2
            })
        );
    }

    #[test]
    fn zero_coverage_line() {
        let column = decode(b"chrX\t1\tn\t0\t\t").unwrap();
        assert_eq!(column.evidence().total(), 0);
        assert_eq!(column.cons_base(), Base::N);

        let column = decode(b"chrX\t1\tN\t1\t*\t*").unwrap();
        assert_eq!(column.evidence().total(), 0);
        assert_eq!(column.num_del_placeholders(), 1);
    }

    #[test]
    fn calls_beyond_coverage_warn_but_still_decode() {
        let column = decode(b"chr1\t1\tA\t1\t...\tIII").unwrap();
        assert_eq!(column.coverage(), 1);
        assert_eq!(column.evidence().total(), 3);
        assert_eq!(column.cons_base(), Base::A);
    }

    #[test]
    fn high_qualities_outside_ascii_are_decoded() {
        let column = decode(b"chr1\t5\tA\t2\t.,\t\x84\x80").unwrap();
        assert_eq!(
            column.histogram_snapshot(true)[&'A'],
            QualityHistogram::from([(99, 1)])
        );
        assert_eq!(
            column.histogram_snapshot(true)[&'a'],
            QualityHistogram::from([(95, 1)])
        );
    }

    #[test]
    fn low_quality_calls_are_counted_but_filtered_by_queries() {
        // '"' decodes to 1, '$' to 3
        let column = decode(b"chr1\t9\tT\t2\t.,\t\"$").unwrap();
        assert_eq!(column.count_for_base(b'T', DEFAULT_MIN_QUALITY, false), BaseCount::Combined(1));
        assert_eq!(column.count_for_base(b'T', 0, false), BaseCount::Combined(2));
    }

    proptest! {
        #[test]
        fn coordinate_is_zero_based(pos in 1u64..u64::MAX) {
            let line = format!("chr1\t{}\tA\t1\t.\tI", pos);
            let column = decode(line.as_bytes()).unwrap();
            prop_assert_eq!(column.coord(), pos - 1);
        }

        #[test]
        fn counts_stay_within_consistent_coverage(bases in "[.,ACGTNacgtn*]{0,40}") {
            let quals = "5".repeat(bases.len());
            let line = format!("chr1\t10\tA\t{}\t{}\t{}", bases.len(), bases, quals);
            let column = decode(line.as_bytes()).unwrap();
            let placeholders = bases.matches('*').count() as u64;
            prop_assert_eq!(column.evidence().total() + placeholders, u64::from(column.coverage()));
        }
    }
}
