//! Pileup line decoding and per-column consensus.
//!
//! A line is decoded into a [`PileupColumn`] by one of two decoders selected
//! with [`DecoderKind`]. Both fill the same [`Evidence`] store (a quality
//! histogram per base and strand) and finish by computing the
//! quality-weighted consensus base. [`PileupReader`] applies a decoder lazily
//! to every line of a stream.

pub mod base;
pub mod column;
mod compact;
pub mod consensus;
pub mod evidence;
mod generic;
pub mod markup;
pub mod quality;
pub mod reader;

pub use base::{Base, Strand, StrandedBase};
pub use column::{DecoderKind, PileupColumn};
pub use consensus::{call_consensus, resolve_consensus, TIE_EPSILON};
pub use evidence::{BaseCount, BaseCounts, Evidence, QualityHistogram, StrandCounts, DEFAULT_MIN_QUALITY};
pub use markup::{expand_reference_matches, strip_markup, MarkupCounts, StrippedBases};
pub use quality::{decode_quality, error_probability, Quality};
pub use reader::PileupReader;
