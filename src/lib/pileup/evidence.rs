//! Per-column evidence: a quality histogram for each of the ten base/strand symbols.
//!
//! Every symbol always owns a histogram (possibly empty), so lookups never
//! miss. Queries summarise the histograms above a quality threshold, either
//! per strand or with both strands collapsed.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Index;

use super::base::{Base, Strand, StrandedBase};
use super::quality::Quality;

/// Quality score -> number of calls with that quality.
pub type QualityHistogram = BTreeMap<Quality, u32>;

/// Base letter -> quality histogram, as returned by [`Evidence::histogram_snapshot`].
pub type HistogramSnapshot = BTreeMap<char, QualityHistogram>;

/// Calls below this quality are ignored by the count queries by default.
pub const DEFAULT_MIN_QUALITY: Quality = 3;

lazy_static! {
    /// DEFAULT_MIN_QUALITY as a str
    pub static ref DEFAULT_MIN_QUALITY_STR: String = DEFAULT_MIN_QUALITY.to_string();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StrandCounts {
    pub forward: u32,
    pub reverse: u32,
}

impl StrandCounts {
    #[inline]
    pub fn total(&self) -> u32 {
        self.forward + self.reverse
    }
}

/// Result of a single-base count query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseCount {
    Stranded(StrandCounts),
    Combined(u32),
}

impl BaseCount {
    /// Forward plus reverse, whatever the shape.
    pub fn total(&self) -> u32 {
        match self {
            BaseCount::Stranded(counts) => counts.total(),
            BaseCount::Combined(total) => *total,
        }
    }
}

/// Counts for the five canonical bases, indexable by [`Base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseCounts([BaseCount; 5]);

impl BaseCounts {
    pub fn iter(&self) -> impl Iterator<Item = (Base, BaseCount)> + '_ {
        Base::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl Index<Base> for BaseCounts {
    type Output = BaseCount;

    fn index(&self, base: Base) -> &BaseCount {
        &self.0[base.index()]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Evidence {
    histograms: [QualityHistogram; StrandedBase::COUNT],
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call of `base` with `quality`.
    #[inline]
    pub(crate) fn record(&mut self, base: StrandedBase, quality: Quality) {
        *self.histograms[base.index()].entry(quality).or_insert(0) += 1;
    }

    #[inline]
    pub fn histogram(&self, base: StrandedBase) -> &QualityHistogram {
        &self.histograms[base.index()]
    }

    /// Number of recorded calls over all symbols and qualities.
    pub fn total(&self) -> u64 {
        self.histograms
            .iter()
            .flat_map(|hist| hist.values())
            .map(|&count| u64::from(count))
            .sum()
    }

    /// Forward and reverse counts for `base` at or above `min_quality`.
    pub fn strand_counts(&self, base: Base, min_quality: Quality) -> StrandCounts {
        let count = |strand: Strand| -> u32 {
            self.histogram(base.on(strand))
                .range(min_quality..)
                .map(|(_, &count)| count)
                .sum()
        };
        StrandCounts {
            forward: count(Strand::Forward),
            reverse: count(Strand::Reverse),
        }
    }

    /// Count calls of the base named by `letter` at or above `min_quality`.
    ///
    /// The letter's case is irrelevant: forward counts always come from the
    /// upper-case symbol and reverse counts from the lower-case one. Letters
    /// outside the alphabet count as zero.
    pub fn count_for_base(&self, letter: u8, min_quality: Quality, split_by_strand: bool) -> BaseCount {
        let counts = Base::from_ascii(letter)
            .map(|base| self.strand_counts(base, min_quality))
            .unwrap_or_default();
        if split_by_strand {
            BaseCount::Stranded(counts)
        } else {
            BaseCount::Combined(counts.total())
        }
    }

    /// [`Evidence::count_for_base`] over the five canonical bases.
    pub fn all_base_counts(&self, min_quality: Quality, split_by_strand: bool) -> BaseCounts {
        BaseCounts(
            Base::ALL.map(|base| self.count_for_base(base.to_ascii(), min_quality, split_by_strand)),
        )
    }

    /// Histogram of `base` with both strands merged by quality.
    pub fn collapsed_histogram(&self, base: Base) -> QualityHistogram {
        let mut merged = self.histogram(base.on(Strand::Forward)).clone();
        for (&quality, &count) in self.histogram(base.on(Strand::Reverse)) {
            *merged.entry(quality).or_insert(0) += count;
        }
        merged
    }

    /// Independent copy of the histograms keyed by base letter.
    ///
    /// With `split_by_strand` all ten symbols are returned; otherwise the five
    /// upper-case letters, each holding the merged forward and reverse counts.
    pub fn histogram_snapshot(&self, split_by_strand: bool) -> HistogramSnapshot {
        if split_by_strand {
            StrandedBase::all()
                .map(|sb| (sb.to_ascii() as char, self.histogram(sb).clone()))
                .collect()
        } else {
            Base::ALL
                .iter()
                .map(|&base| (base.to_ascii() as char, self.collapsed_histogram(base)))
                .collect()
        }
    }
}
