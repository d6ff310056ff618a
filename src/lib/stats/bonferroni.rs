//! Bonferroni multiple-testing factors.
//!
//! Every tested site may carry any of three alternative alleles, so the number
//! of tests is three times the number of sites considered. Sites are counted
//! either from reference lengths or from positions with read coverage.

use log::info;

use crate::core::error::Result;

use super::header::SequenceDictionary;

/// Possible alternative alleles at a site.
pub const ALT_ALLELES_PER_SITE: u64 = 3;

/// Factor for `total_length` reference positions, less `excluded_positions`.
#[inline]
pub fn bonferroni_factor_by_length(total_length: u64, excluded_positions: u64) -> u64 {
    total_length
        .saturating_sub(excluded_positions)
        .saturating_mul(ALT_ALLELES_PER_SITE)
}

/// Factor for the number of columns with non-zero coverage.
#[inline]
pub fn bonferroni_factor_by_depth(non_zero_columns: u64) -> u64 {
    non_zero_columns.saturating_mul(ALT_ALLELES_PER_SITE)
}

/// Which reference positions a length-based factor counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BonferroniScope {
    /// Every sequence in the header.
    WholeGenome,
    /// The named sequences only.
    Chromosomes(Vec<String>),
    /// One sequence minus a number of explicitly excluded positions.
    ChromosomeExcluding { chrom: String, excluded_positions: u64 },
    /// Target regions of the given total length.
    Regions(u64),
}

/// Length-based factor for `scope`; unknown sequence names are a `NotFound` error.
pub fn auto_bonferroni_factor(dictionary: &SequenceDictionary, scope: &BonferroniScope) -> Result<u64> {
    let (total, excluded) = match scope {
        BonferroniScope::WholeGenome => (dictionary.total_length()?, 0),
        BonferroniScope::Chromosomes(names) => (dictionary.subset_length(names)?, 0),
        BonferroniScope::ChromosomeExcluding {
            chrom,
            excluded_positions,
        } => (dictionary.length(chrom)?, *excluded_positions),
        BonferroniScope::Regions(total) => (*total, 0),
    };
    info!(
        "Bonferroni scope {:?}: {} positions, {} excluded",
        scope, total, excluded
    );
    Ok(bonferroni_factor_by_length(total, excluded))
}
