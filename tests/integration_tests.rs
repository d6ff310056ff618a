//! Integration tests for pilecons.
//!
//! The library tests stream whole files through the public API; the command
//! tests run the built binary on temporary inputs.

use noodles::bam;
use noodles::core::Position;
use noodles::sam;
use noodles::sam::alignment::io::Write as AlignmentWrite;
use noodles::sam::alignment::record::cigar::op::{Kind, Op};
use noodles::sam::alignment::record::{Flags, MappingQuality};
use noodles::sam::alignment::record_buf::{Cigar, QualityScores, Sequence};
use noodles::sam::alignment::RecordBuf;
use pilecons_lib::prelude::*;
use pilecons_lib::pileup::StrandCounts;
use pilecons_lib::stats::read_exclusion_list;
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const GENERIC_PILEUP: &str = "\
chr1\t100\tG\t6\t.,.,+2AG.,-1A\tIIIIII
chr1\t101\tA\t5\tTtTt,\tIIIII
chr1\t102\tC\t3\t^!.*$,\tI5#
chr2\t7\tn\t0\t\t
";

const SUMMARY: &str = "#heads=1 #tails=2 #ins=1 ins_len=3.0 #del=0 del_len=0.0";

fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn header_lines() -> &'static str {
    "@HD\tVN:1.6\tSO:coordinate\n@SQ\tSN:chr1\tLN:1000\n@SQ\tSN:chr2\tLN:250\n@PG\tID:aligner\n"
}

fn aligned_read(start: usize, len: usize, quality: u8) -> RecordBuf {
    RecordBuf::builder()
        .set_flags(Flags::empty())
        .set_reference_sequence_id(0)
        .set_alignment_start(Position::try_from(start).unwrap())
        .set_mapping_quality(MappingQuality::new(60).unwrap())
        .set_cigar(Cigar::from(vec![Op::new(Kind::Match, len)]))
        .set_sequence(Sequence::from(vec![b'C'; len]))
        .set_quality_scores(QualityScores::from(vec![quality; len]))
        .build()
}

fn write_bam(path: &Path, records: &[RecordBuf]) {
    let sequence = sam::header::record::value::Map::<sam::header::record::value::map::ReferenceSequence>::new(
        NonZeroUsize::new(50).unwrap(),
    );
    let header = sam::Header::builder()
        .add_reference_sequence("chrT", sequence)
        .build();
    let mut writer = bam::io::Writer::new(File::create(path).unwrap());
    writer.write_header(&header).unwrap();
    for record in records {
        writer.write_alignment_record(&header, record).unwrap();
    }
    writer.try_finish().unwrap();
}

#[test]
fn test_streaming_generic_pileup() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "sample.pileup", GENERIC_PILEUP);

    let reader = PileupReader::new(get_line_reader(Some(&path)).unwrap(), DecoderKind::Generic);
    let columns: Vec<PileupColumn> = reader.collect::<Result<_>>().unwrap();
    assert_eq!(columns.len(), 4);

    assert_eq!(columns[0].coord(), 99);
    assert_eq!(columns[0].cons_base(), Base::G);
    assert_eq!(columns[0].num_ins_events(), 1);
    assert_eq!(columns[0].num_del_events(), 1);

    // four T calls outvote the single reference call
    assert_eq!(columns[1].cons_base(), Base::T);
    assert_eq!(columns[1].count_for_base(b'T', 0, false), BaseCount::Combined(4));

    assert_eq!(columns[2].num_read_starts(), 1);
    assert_eq!(columns[2].num_read_ends(), 1);
    assert_eq!(columns[2].num_del_placeholders(), 1);
    // the placeholder takes the '5'; '#' is quality 2, below the default threshold
    assert_eq!(
        columns[2].count_for_base(b'C', DEFAULT_MIN_QUALITY, false),
        BaseCount::Combined(1)
    );
    assert_eq!(columns[2].count_for_base(b'C', 0, false), BaseCount::Combined(2));

    assert_eq!(columns[3].chrom(), "chr2");
    assert_eq!(columns[3].ref_base(), Base::N);
    assert_eq!(columns[3].cons_base(), Base::N);
    assert_eq!(columns[3].evidence().total(), 0);
}

#[test]
fn test_bgzf_pileup_input() {
    use gzp::{deflate::Bgzf, Compression, ZBuilder, ZWriter};

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sample.pileup.gz");
    let mut writer = ZBuilder::<Bgzf, _>::new()
        .num_threads(0)
        .compression_level(Compression::new(6))
        .from_writer(File::create(&path).unwrap());
    writer.write_all(GENERIC_PILEUP.as_bytes()).unwrap();
    writer.finish().unwrap();

    let reader = PileupReader::new(get_line_reader(Some(&path)).unwrap(), DecoderKind::Generic);
    let bases: Vec<Base> = reader.map(|column| column.unwrap().cons_base()).collect();
    assert_eq!(bases, vec![Base::G, Base::T, Base::C, Base::N]);
}

#[test]
fn test_malformed_line_reports_line_number_and_continues() {
    let input = "chr1\t1\tA\t2\t.,\tII\nchr1\t2\tA\t3\t...\tII\nchr1\t3\tA\t1\t.\tI\n";
    let mut reader = PileupReader::new(input.as_bytes(), DecoderKind::Generic);

    assert!(reader.next().unwrap().is_ok());
    let err = reader.next().unwrap().unwrap_err();
    assert!(err.is_format_error());
    assert!(matches!(err, PileconsError::AtLine { line: 2, .. }));
    let column = reader.next().unwrap().unwrap();
    assert_eq!(column.coord(), 2);
    assert!(reader.next().is_none());
    assert_eq!(reader.line_number(), 3);
}

#[test]
fn test_compact_pileup_stream() {
    let input = format!(
        "chr1\t10\tA\t4\tAIaIcIT#\t{s}\nchr1\t11\tC\t1\tAIAI\t{s}\n",
        s = SUMMARY
    );
    let mut reader = PileupReader::new(input.as_bytes(), DecoderKind::Compact);

    let column = reader.next().unwrap().unwrap();
    assert_eq!(column.coord(), 9);
    assert_eq!(column.cons_base(), Base::A);
    assert_eq!(column.num_read_starts(), 1);
    assert_eq!(column.num_read_ends(), 2);
    assert_eq!(column.num_ins_events(), 1);
    assert!((column.avg_ins_len() - 3.0).abs() < 1e-12);
    assert_eq!(
        column.count_for_base(b'A', 0, true),
        BaseCount::Stranded(StrandCounts {
            forward: 1,
            reverse: 1
        })
    );
    // '#' is quality 2
    assert_eq!(column.count_for_base(b'T', DEFAULT_MIN_QUALITY, false), BaseCount::Combined(0));

    let err = reader.next().unwrap().unwrap_err();
    assert!(matches!(
        err.format_error(),
        Some(FormatError::CoverageExceeded { count: 2, coverage: 1 })
    ));
}

#[test]
fn test_bonferroni_from_header_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "header.sam", header_lines());
    let lines: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    let dict = SequenceDictionary::from_header_lines(&lines);
    assert_eq!(dict.len(), 2);

    assert_eq!(auto_bonferroni_factor(&dict, &BonferroniScope::WholeGenome).unwrap(), 3750);
    assert_eq!(
        auto_bonferroni_factor(&dict, &BonferroniScope::Chromosomes(vec!["chr2".to_string()])).unwrap(),
        750
    );

    let excluded = read_exclusion_list(Some(write_file(&dir, "excluded.txt", "10\n11\n10\n"))).unwrap();
    assert_eq!(excluded, 2);
    let scope = BonferroniScope::ChromosomeExcluding {
        chrom: "chr1".to_string(),
        excluded_positions: excluded,
    };
    assert_eq!(auto_bonferroni_factor(&dict, &scope).unwrap(), 998 * 3);

    let bed = write_file(&dir, "targets.bed", "chr1\t0\t100\nchr2\t50\t60\n");
    let regions = TargetRegions::from_bed(&bed).unwrap();
    assert_eq!(
        auto_bonferroni_factor(&dict, &BonferroniScope::Regions(regions.total_length())).unwrap(),
        330
    );
}

#[test]
fn test_depth_factor_from_bam() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("reads.bam");
    write_bam(
        &path,
        &[
            aligned_read(1, 10, 30),
            aligned_read(6, 10, 30),
            aligned_read(30, 5, 1),
        ],
    );

    let dict = SequenceDictionary::from_bam_path(&path).unwrap();
    assert_eq!(dict.length("chrT").unwrap(), 50);

    let mut source = BamDepth::new(&path);
    let stats = source.depth_stats(&DepthParams::default()).unwrap();
    // positions 0..15, five of them covered twice; the low quality read adds nothing
    assert_eq!(stats.non_zero_columns, 15);
    assert!((stats.mean_depth - 20.0 / 15.0).abs() < 1e-12);
    assert_eq!(
        auto_bonferroni_factor_from_depth(&mut source, &DepthParams::default()).unwrap(),
        45
    );
}

#[test]
fn test_decode_command_writes_tsv() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "sample.pileup", GENERIC_PILEUP);
    let output = dir.path().join("out").join("columns.tsv");

    let status = Command::new(env!("CARGO_BIN_EXE_pilecons"))
        .args(["decode", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .expect("Failed to run decode command");
    assert!(status.success(), "decode command failed");

    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("CHR\tPOS\tREF\tCONS\tCOVERAGE\tA_FWD"));
    assert!(lines[1].starts_with("chr1\t100\tG\tG\t6\t"));
    assert!(lines[2].starts_with("chr1\t101\tA\tT\t5\t"));
}

#[test]
fn test_decode_command_malformed_input() {
    let dir = TempDir::new().unwrap();
    let input = write_file(&dir, "bad.pileup", "chr1\t1\tA\t2\t.,\tII\nchr1\t2\tA\n");
    let output = dir.path().join("columns.tsv");

    let status = Command::new(env!("CARGO_BIN_EXE_pilecons"))
        .args(["decode", input.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .status()
        .expect("Failed to run decode command");
    assert!(!status.success(), "malformed input should fail without --skip-malformed");

    let status = Command::new(env!("CARGO_BIN_EXE_pilecons"))
        .args([
            "decode",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--skip-malformed",
        ])
        .status()
        .expect("Failed to run decode command");
    assert!(status.success());
    assert_eq!(fs::read_to_string(&output).unwrap().lines().count(), 2);
}

#[test]
fn test_bonferroni_command_prints_factor() {
    let dir = TempDir::new().unwrap();
    let header = write_file(&dir, "header.sam", header_lines());

    let output = Command::new(env!("CARGO_BIN_EXE_pilecons"))
        .args(["bonferroni", "--header", header.to_str().unwrap(), "--chrom", "chr1"])
        .output()
        .expect("Failed to run bonferroni command");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "3000");

    let output = Command::new(env!("CARGO_BIN_EXE_pilecons"))
        .args(["bonferroni", "--header", header.to_str().unwrap(), "--chrom", "chrX"])
        .output()
        .expect("Failed to run bonferroni command");
    assert!(!output.status.success(), "unknown chromosome should be fatal");
}
