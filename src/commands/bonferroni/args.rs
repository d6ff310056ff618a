use pilecons_lib::stats::depth::{DEFAULT_MIN_BASEQ_STR, DEFAULT_MIN_MAPQ_STR};
use std::path::PathBuf;
use structopt::StructOpt;

/// CLI arguments for the `bonferroni` subcommand.
#[derive(Debug, Clone, StructOpt)]
#[structopt(author, name = "bonferroni")]
pub struct BonferroniArgs {
    /// SAM header text (e.g. `samtools view -H` output) providing sequence lengths.
    #[structopt(long, conflicts_with = "bam", required_unless = "bam")]
    pub header: Option<PathBuf>,

    /// BAM file providing the header, and the reads for `--from-depth`.
    #[structopt(long)]
    pub bam: Option<PathBuf>,

    /// Restrict to this chromosome. May be repeated.
    #[structopt(long = "chrom", number_of_values = 1)]
    pub chroms: Vec<String>,

    /// Count only positions inside these BED regions.
    #[structopt(long, conflicts_with = "exclude")]
    pub bed: Option<PathBuf>,

    /// Positions (one per line) to subtract from the single `--chrom`.
    #[structopt(long, requires = "chroms")]
    pub exclude: Option<PathBuf>,

    /// Count covered columns in the BAM instead of reference lengths.
    #[structopt(long, requires = "bam")]
    pub from_depth: bool,

    /// Minimum base quality for depth counting.
    #[structopt(long, default_value = DEFAULT_MIN_BASEQ_STR.as_str())]
    pub min_baseq: u8,

    /// Minimum mapping quality for depth counting.
    #[structopt(long, default_value = DEFAULT_MIN_MAPQ_STR.as_str())]
    pub min_mapq: u8,
}

/// Where sequence lengths come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderSource {
    Text(PathBuf),
    Bam(PathBuf),
}

/// Normalised configuration derived from [`BonferroniArgs`].
#[derive(Debug, Clone)]
pub struct BonferroniConfig {
    pub source: HeaderSource,
    pub chroms: Vec<String>,
    pub bed: Option<PathBuf>,
    pub exclude: Option<PathBuf>,
    pub from_depth: bool,
    pub min_baseq: u8,
    pub min_mapq: u8,
}

impl From<BonferroniArgs> for BonferroniConfig {
    fn from(args: BonferroniArgs) -> BonferroniConfig {
        // structopt guarantees exactly one of the two
        let source = match (args.bam, args.header) {
            (Some(bam), _) => HeaderSource::Bam(bam),
            (None, Some(header)) => HeaderSource::Text(header),
            (None, None) => HeaderSource::Text(PathBuf::from("-")),
        };
        BonferroniConfig {
            source,
            chroms: args.chroms,
            bed: args.bed,
            exclude: args.exclude,
            from_depth: args.from_depth,
            min_baseq: args.min_baseq,
            min_mapq: args.min_mapq,
        }
    }
}
