use pilecons_lib::pileup::evidence::DEFAULT_MIN_QUALITY_STR;
use pilecons_lib::pileup::{DecoderKind, Quality};
use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `decode` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "decode")]
pub struct DecodeArgs {
    /// Pileup input (plain or BGZF). Reads stdin when omitted or `-`.
    pub input: Option<PathBuf>,

    /// Output TSV path; stdout when omitted. A `.gz` suffix enables BGZF compression.
    #[structopt(long, short = "o")]
    pub output: Option<PathBuf>,

    /// Line format: `generic` (mpileup) or `compact`.
    #[structopt(long, short = "f", default_value = "generic")]
    pub format: DecoderKind,

    /// Minimum base quality for a call to be counted.
    #[structopt(long, short = "Q", default_value = DEFAULT_MIN_QUALITY_STR.as_str())]
    pub min_qual: Quality,

    /// Output positions as 0-based instead of 1-based.
    #[structopt(long, short = "z")]
    pub zero_base: bool,

    /// Warn about malformed lines and keep going instead of aborting.
    #[structopt(long)]
    pub skip_malformed: bool,

    /// Captured stderr of the pileup producer, checked for version and unexpected messages.
    #[structopt(long)]
    pub tool_log: Option<PathBuf>,
}

/// Normalised configuration derived from [`DecodeArgs`].
#[derive(Debug, Clone)]
pub struct DecodeConfig {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub kind: DecoderKind,
    pub min_quality: Quality,
    pub coord_offset: u64,
    pub skip_malformed: bool,
    pub tool_log: Option<PathBuf>,
}

impl From<DecodeArgs> for DecodeConfig {
    fn from(args: DecodeArgs) -> DecodeConfig {
        DecodeConfig {
            input: args.input,
            output: args.output,
            kind: args.format,
            min_quality: args.min_qual,
            coord_offset: if args.zero_base { 0 } else { 1 },
            skip_malformed: args.skip_malformed,
            tool_log: args.tool_log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = DecodeArgs::from_iter_safe(["decode"]).unwrap();
        let config: DecodeConfig = args.into();
        assert_eq!(config.kind, DecoderKind::Generic);
        assert_eq!(config.min_quality, 3);
        assert_eq!(config.coord_offset, 1);
        assert!(config.input.is_none());
        assert!(!config.skip_malformed);
    }

    #[test]
    fn explicit_options() {
        let args = DecodeArgs::from_iter_safe([
            "decode", "in.pileup", "-o", "out.tsv.gz", "--format", "compact", "-Q", "20", "-z",
            "--skip-malformed",
        ])
        .unwrap();
        let config: DecodeConfig = args.into();
        assert_eq!(config.kind, DecoderKind::Compact);
        assert_eq!(config.min_quality, 20);
        assert_eq!(config.coord_offset, 0);
        assert_eq!(config.input, Some(PathBuf::from("in.pileup")));
        assert!(config.skip_malformed);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(DecodeArgs::from_iter_safe(["decode", "--format", "vcf"]).is_err());
    }
}
