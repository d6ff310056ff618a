//! PILECONS - pileup column decoding and quality-aware consensus
//!
//! PILECONS reads the per-position pileup text produced by an alignment
//! pileup tool, rebuilds per-base, per-strand quality evidence for every
//! column, and calls a quality-weighted consensus base. It also derives the
//! Bonferroni factor used to correct per-site significance thresholds.
//!
//! # Tools
//!
//! - `decode`: Decode pileup lines into a per-column TSV of counts and consensus
//! - `bonferroni`: Compute a Bonferroni factor from header lengths, regions or depth
//!
//! # Usage
//!
//! ```bash
//! # Decode an mpileup stream
//! samtools mpileup -f ref.fa sample.bam | pilecons decode -o columns.tsv.gz
//!
//! # Decode the compact format, keeping going past malformed lines
//! pilecons decode calls.pileup --format compact --skip-malformed
//!
//! # Bonferroni factor for two chromosomes
//! pilecons bonferroni --bam sample.bam --chrom chr1 --chrom chr2
//!
//! # Bonferroni factor from covered columns within target regions
//! pilecons bonferroni --bam sample.bam --from-depth --bed targets.bed
//! ```

extern crate pilecons_lib;
pub mod commands;
use anyhow::Result;
use env_logger::Env;
use log::*;
use pilecons_lib::core::errors;
use structopt::StructOpt;

#[derive(StructOpt)]
#[structopt(rename_all = "kebab-case", author, about)]
/// Pileup decoding and consensus calling with PILECONS
struct Args {
    #[structopt(subcommand)]
    subcommand: Subcommand,
}

#[derive(StructOpt)]
enum Subcommand {
    /// Decode pileup lines into per-column counts and consensus
    Decode(commands::DecodeArgs),
    /// Compute the Bonferroni factor for a genome, chromosomes, regions or covered columns
    Bonferroni(commands::BonferroniArgs),
}

impl Subcommand {
    fn run(self) -> Result<()> {
        match self {
            Subcommand::Decode(args) => commands::run_decode(args)?,
            Subcommand::Bonferroni(args) => commands::run_bonferroni(args)?,
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    if let Err(err) = Args::from_args().subcommand.run() {
        if errors::is_broken_pipe(&err) {
            std::process::exit(0);
        }
        error!("{:#}", err);
        std::process::exit(1);
    }
    Ok(())
}
