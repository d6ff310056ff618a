//! Error types for the pilecons library

use thiserror::Error;

/// Structural problems with a single pileup line or metadata record.
///
/// A `FormatError` is always fatal to the line being decoded: acting on
/// misaligned bases and qualities would corrupt every downstream statistic.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    #[error("Empty pileup line")]
    EmptyLine,

    #[error("Expected {expected} tab-separated fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("Invalid {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    #[error("Mismatch between number of parsed bases ({bases}) and quality values ({qualities})")]
    LengthMismatch { bases: usize, qualities: usize },

    #[error("Malformed indel markup at offset {offset}: {reason}")]
    IndelMarkup { offset: usize, reason: &'static str },

    #[error("Read start marker at offset {offset} has no mapping quality")]
    DanglingReadStart { offset: usize },

    #[error("Base/quality field has odd length {0}")]
    UnpairedBaseQuality(usize),

    #[error("Invalid base '{0}'")]
    InvalidBase(char),

    #[error("Raw coverage ({coverage}) smaller than number of bases ({count})")]
    CoverageExceeded { count: u64, coverage: u32 },

    #[error("Missing key '{key}' in indel summary '{summary}'")]
    MissingSummaryKey { key: &'static str, summary: String },

    #[error("Sequence '{0}' has no usable LN tag")]
    MissingSequenceLength(String),

    #[error("Region {chrom}:{start}-{end} has non-positive length")]
    EmptyRegion { chrom: String, start: u64, end: u64 },
}

#[derive(Error, Debug)]
pub enum PileconsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Format error on line {line}: {source}")]
    AtLine {
        line: u64,
        #[source]
        source: FormatError,
    },

    #[error("Sequence '{0}' not found in header")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PileconsError {
    /// Returns `true` for structurally invalid input, with or without line context.
    pub fn is_format_error(&self) -> bool {
        matches!(self, PileconsError::Format(_) | PileconsError::AtLine { .. })
    }

    /// The underlying [`FormatError`], if this is one.
    pub fn format_error(&self) -> Option<&FormatError> {
        match self {
            PileconsError::Format(err) | PileconsError::AtLine { source: err, .. } => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PileconsError>;
