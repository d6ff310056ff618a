//! PILECONS: pileup column decoding and quality-aware consensus
//!
//! The library turns textual pileup lines into per-position evidence and
//! summary statistics used for low-frequency variant detection:
//! 1. Decoding of generic `mpileup` lines and of a compact pre-paired format
//! 2. Per-base, per-strand quality histograms with filtered count queries
//! 3. A quality-weighted consensus base for every column
//! 4. Bonferroni factors from header lengths, target regions or read depth
//!
//! # Modules
//!
//! The main modules are:
//! - [`pileup`]: Line decoders, evidence store, consensus and the streaming reader
//! - [`stats`]: Sequence dictionary, target regions, depth and Bonferroni factors
//! - [`diagnostics`]: Checks on the stderr output of the pileup producer
//! - [`core`]: Errors, I/O helpers and read filtering shared by the other modules

pub mod core;
pub mod diagnostics;
pub mod pileup;
pub mod stats;

pub mod prelude {
    pub use crate::core::prelude::*;
    pub use crate::pileup::{
        Base, BaseCount, DecoderKind, Evidence, PileupColumn, PileupReader, Strand, StrandedBase,
        DEFAULT_MIN_QUALITY,
    };
    pub use crate::stats::{
        auto_bonferroni_factor, auto_bonferroni_factor_from_depth, bonferroni_factor_by_depth,
        bonferroni_factor_by_length, BamDepth, BonferroniScope, DepthParams, DepthSource, DepthStats,
        SequenceDictionary, TargetRegions,
    };
}
