//! Genome-wide statistics: sequence lengths, target regions, depth and the
//! Bonferroni factors derived from them.

pub mod bonferroni;
pub mod depth;
pub mod header;
pub mod regions;

pub use bonferroni::{
    auto_bonferroni_factor, bonferroni_factor_by_depth, bonferroni_factor_by_length, BonferroniScope,
};
pub use depth::{auto_bonferroni_factor_from_depth, BamDepth, DepthParams, DepthSource, DepthStats};
pub use header::SequenceDictionary;
pub use regions::{count_excluded_positions, read_exclusion_list, TargetRegions};
