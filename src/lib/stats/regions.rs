//! Target regions (BED) and excluded-position lists.

use bio::io::bed;
use log::debug;
use rust_lapper::{Interval, Lapper};
use rustc_hash::{FxHashMap, FxHashSet};
use smartstring::{LazyCompact, SmartString};
use std::fs::File;
use std::io::BufRead;
use std::path::Path;

use crate::core::error::{FormatError, PileconsError, Result};
use crate::core::io::get_line_reader;

type Name = SmartString<LazyCompact>;

/// Regions of interest, per chromosome, with overlapping intervals merged.
///
/// `total_length` is the plain sum of `end - start` over the input records,
/// overlaps included.
#[derive(Debug, Clone)]
pub struct TargetRegions {
    lappers: FxHashMap<Name, Lapper<u64, ()>>,
    total_length: u64,
}

impl TargetRegions {
    /// Read a BED file (0-based, half-open).
    pub fn from_bed<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = bed::Reader::new(File::open(path.as_ref())?);
        let mut records = Vec::new();
        for record in reader.records() {
            let record = record?;
            records.push((record.chrom().to_string(), record.start(), record.end()));
        }
        Self::from_intervals(records)
    }

    /// Build from `(chrom, start, end)` triples; every interval must be non-empty.
    pub fn from_intervals<I, S>(intervals: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u64, u64)>,
        S: AsRef<str>,
    {
        let mut grouped: FxHashMap<Name, Vec<Interval<u64, ()>>> = FxHashMap::default();
        let mut total_length = 0u64;
        for (chrom, start, end) in intervals {
            let chrom = chrom.as_ref();
            if end <= start {
                return Err(FormatError::EmptyRegion {
                    chrom: chrom.to_string(),
                    start,
                    end,
                }
                .into());
            }
            debug!("Adding region {}:{}-{} ({} bp)", chrom, start, end, end - start);
            total_length += end - start;
            grouped.entry(Name::from(chrom)).or_default().push(Interval {
                start,
                stop: end,
                val: (),
            });
        }

        let lappers = grouped
            .into_iter()
            .map(|(chrom, ivs)| {
                let mut lapper = Lapper::new(ivs);
                lapper.merge_overlaps();
                (chrom, lapper)
            })
            .collect();
        Ok(Self {
            lappers,
            total_length,
        })
    }

    pub fn total_length(&self) -> u64 {
        self.total_length
    }

    /// Whether the 0-based `pos` on `chrom` falls inside a region.
    pub fn contains(&self, chrom: &str, pos: u64) -> bool {
        self.lappers
            .get(chrom)
            .map_or(false, |lapper| lapper.find(pos, pos + 1).next().is_some())
    }

    /// Whether any region lies on `chrom`.
    pub fn has_chrom(&self, chrom: &str) -> bool {
        self.lappers.contains_key(chrom)
    }

    /// Number of distinct positions covered after merging.
    pub fn covered_positions(&self) -> u64 {
        self.lappers.values().map(|lapper| lapper.cov()).sum()
    }
}

/// Count the distinct positions listed in an exclusion file (or stdin).
pub fn read_exclusion_list<P: AsRef<Path>>(path: Option<P>) -> Result<u64> {
    count_excluded_positions(get_line_reader(path)?)
}

/// One position per line, first whitespace-separated token; blank lines and
/// `#` comments are skipped.
pub fn count_excluded_positions<R: BufRead>(reader: R) -> Result<u64> {
    let mut positions: FxHashSet<u64> = FxHashSet::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };
        if token.starts_with('#') {
            continue;
        }
        let pos = token.parse::<u64>().map_err(|_| PileconsError::AtLine {
            line: i as u64 + 1,
            source: FormatError::InvalidField {
                field: "excluded position",
                value: token.to_string(),
            },
        })?;
        positions.insert(pos);
    }
    Ok(positions.len() as u64)
}
