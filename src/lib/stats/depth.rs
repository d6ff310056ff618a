//! Per-position read depth summarised over an alignment file.
//!
//! [`BamDepth`] streams a coordinate-sorted BAM once. Every aligned base that
//! passes the read filter and the base-quality threshold adds one to its
//! reference position; deletions, skips, insertions and clips add nothing.
//! Positions are finalised as soon as no later read can reach them, so only
//! the span of currently overlapping reads is held in memory.

use lazy_static::lazy_static;
use log::{debug, info};
use noodles::bam;
use noodles::sam::alignment::record::cigar::op::Kind;
use rustc_hash::FxHashSet;
use smartstring::{LazyCompact, SmartString};
use std::collections::BTreeMap;
use std::mem;
use std::path::{Path, PathBuf};

use crate::core::error::{PileconsError, Result};
use crate::core::read_filter::{DefaultReadFilter, ReadFilter};

use super::bonferroni::bonferroni_factor_by_depth;
use super::regions::TargetRegions;

/// Bases below this quality do not add depth by default.
pub const DEFAULT_MIN_BASEQ: u8 = 3;

/// Reads below this mapping quality are ignored by default.
pub const DEFAULT_MIN_MAPQ: u8 = 0;

lazy_static! {
    /// DEFAULT_MIN_BASEQ as a str
    pub static ref DEFAULT_MIN_BASEQ_STR: String = DEFAULT_MIN_BASEQ.to_string();

    /// DEFAULT_MIN_MAPQ as a str
    pub static ref DEFAULT_MIN_MAPQ_STR: String = DEFAULT_MIN_MAPQ.to_string();
}

/// Depth summary of an alignment file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DepthStats {
    /// Mean depth over the columns with non-zero depth; 0 when there are none.
    pub mean_depth: f64,
    pub non_zero_columns: u64,
}

/// Thresholds and restriction for a depth computation.
#[derive(Debug, Clone)]
pub struct DepthParams {
    pub min_baseq: u8,
    pub min_mapq: u8,
    pub regions: Option<TargetRegions>,
}

impl Default for DepthParams {
    fn default() -> Self {
        Self {
            min_baseq: DEFAULT_MIN_BASEQ,
            min_mapq: DEFAULT_MIN_MAPQ,
            regions: None,
        }
    }
}

/// Anything that can summarise depth for a set of parameters.
pub trait DepthSource {
    fn depth_stats(&mut self, params: &DepthParams) -> Result<DepthStats>;
}

/// Depth-based Bonferroni factor: three tests per covered column.
pub fn auto_bonferroni_factor_from_depth<S: DepthSource + ?Sized>(
    source: &mut S,
    params: &DepthParams,
) -> Result<u64> {
    let stats = source.depth_stats(params)?;
    info!(
        "{} columns with non-zero depth (mean depth {:.2})",
        stats.non_zero_columns, stats.mean_depth
    );
    Ok(bonferroni_factor_by_depth(stats.non_zero_columns))
}

/// Depth computed from a coordinate-sorted BAM file.
#[derive(Debug, Clone)]
pub struct BamDepth {
    path: PathBuf,
}

impl BamDepth {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DepthSource for BamDepth {
    fn depth_stats(&mut self, params: &DepthParams) -> Result<DepthStats> {
        let mut reader = bam::io::reader::Builder::default().build_from_path(&self.path)?;
        let header = reader.read_header()?;
        let filter = DefaultReadFilter::new(params.min_mapq);
        let mut acc = DepthAccumulator::new(params.regions.as_ref());
        let mut skipped = 0u64;

        for result in reader.records() {
            let record = result?;
            let tid = match record.reference_sequence_id().transpose()? {
                Some(tid) => tid,
                None => continue,
            };
            let start = match record.alignment_start().transpose()? {
                Some(pos) => usize::from(pos) as u64 - 1,
                None => continue,
            };
            let chrom = header
                .reference_sequences()
                .get_index(tid)
                .map(|(name, _)| String::from_utf8_lossy(name.as_ref()).into_owned())
                .ok_or_else(|| PileconsError::InvalidInput(format!("Reference id {} missing from header", tid)))?;
            acc.advance_to(&chrom, start)?;

            if !filter.filter_read(&record) {
                skipped += 1;
                continue;
            }

            let qualities = record.quality_scores();
            let qualities = qualities.as_ref();
            let mut ref_pos = start;
            let mut read_pos = 0usize;
            for op in record.cigar().iter() {
                let op = op?;
                let len = op.len();
                match op.kind() {
                    Kind::Match | Kind::SequenceMatch | Kind::SequenceMismatch => {
                        for i in 0..len {
                            // a missing quality string (0xff) passes any threshold
                            let passes = qualities
                                .get(read_pos + i)
                                .map_or(true, |&q| q >= params.min_baseq);
                            if passes {
                                acc.add(ref_pos + i as u64);
                            }
                        }
                        ref_pos += len as u64;
                        read_pos += len;
                    }
                    Kind::Deletion | Kind::Skip => ref_pos += len as u64,
                    Kind::Insertion | Kind::SoftClip => read_pos += len,
                    Kind::HardClip | Kind::Pad => {}
                }
            }
        }

        debug!("{} reads failed the read filter", skipped);
        Ok(acc.finish())
    }
}

/// Running depth totals for a position-sorted stream of reads.
struct DepthAccumulator<'a> {
    regions: Option<&'a TargetRegions>,
    chrom: Option<SmartString<LazyCompact>>,
    finished_chroms: FxHashSet<SmartString<LazyCompact>>,
    last_start: u64,
    pending: BTreeMap<u64, u32>,
    total_depth: u64,
    non_zero_columns: u64,
}

impl<'a> DepthAccumulator<'a> {
    fn new(regions: Option<&'a TargetRegions>) -> Self {
        Self {
            regions,
            chrom: None,
            finished_chroms: FxHashSet::default(),
            last_start: 0,
            pending: BTreeMap::new(),
            total_depth: 0,
            non_zero_columns: 0,
        }
    }

    /// Move to the next read start, finalising every position before it.
    fn advance_to(&mut self, chrom: &str, start: u64) -> Result<()> {
        if self.chrom.as_deref() != Some(chrom) {
            self.flush_all();
            if let Some(previous) = self.chrom.take() {
                self.finished_chroms.insert(previous);
            }
            if self.finished_chroms.contains(chrom) {
                return Err(PileconsError::InvalidInput(format!(
                    "Alignments are not coordinate-sorted: '{}' appears twice",
                    chrom
                )));
            }
            self.chrom = Some(SmartString::from(chrom));
        } else if start < self.last_start {
            return Err(PileconsError::InvalidInput(format!(
                "Alignments are not coordinate-sorted at {}:{}",
                chrom,
                start + 1
            )));
        }
        self.last_start = start;

        let still_open = self.pending.split_off(&start);
        let done = mem::replace(&mut self.pending, still_open);
        for (pos, depth) in done {
            self.commit(pos, depth);
        }
        Ok(())
    }

    #[inline]
    fn add(&mut self, pos: u64) {
        *self.pending.entry(pos).or_insert(0) += 1;
    }

    fn flush_all(&mut self) {
        for (pos, depth) in mem::take(&mut self.pending) {
            self.commit(pos, depth);
        }
    }

    fn commit(&mut self, pos: u64, depth: u32) {
        if let (Some(regions), Some(chrom)) = (self.regions, self.chrom.as_deref()) {
            if !regions.contains(chrom, pos) {
                return;
            }
        }
        self.total_depth += u64::from(depth);
        self.non_zero_columns += 1;
    }

    fn finish(mut self) -> DepthStats {
        self.flush_all();
        let mean_depth = if self.non_zero_columns == 0 {
            0.0
        } else {
            self.total_depth as f64 / self.non_zero_columns as f64
        };
        DepthStats {
            mean_depth,
            non_zero_columns: self.non_zero_columns,
        }
    }
}
