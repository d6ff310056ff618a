mod args;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use pilecons_lib::stats::{
    auto_bonferroni_factor, auto_bonferroni_factor_from_depth, read_exclusion_list, BamDepth,
    BonferroniScope, DepthParams, SequenceDictionary, TargetRegions,
};
use std::io::{self, Write};

use crate::commands::common::read_lines;

pub use args::{BonferroniArgs, BonferroniConfig, HeaderSource};

/// Execute the `bonferroni` command and print the factor to stdout.
pub fn run_bonferroni(args: BonferroniArgs) -> Result<()> {
    let config: BonferroniConfig = args.into();
    let factor = compute_factor(&config)?;
    info!("Bonferroni factor: {}", factor);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", factor)?;
    handle.flush()?;
    Ok(())
}

pub fn compute_factor(config: &BonferroniConfig) -> Result<u64> {
    if config.from_depth {
        return depth_factor(config);
    }
    let dictionary = load_dictionary(&config.source)?;
    let scope = resolve_scope(config)?;
    Ok(auto_bonferroni_factor(&dictionary, &scope)?)
}

fn depth_factor(config: &BonferroniConfig) -> Result<u64> {
    let HeaderSource::Bam(bam) = &config.source else {
        bail!("--from-depth needs reads from --bam");
    };
    if config.exclude.is_some() || !config.chroms.is_empty() {
        bail!("--from-depth can only be restricted with --bed");
    }
    let regions = config
        .bed
        .as_ref()
        .map(TargetRegions::from_bed)
        .transpose()
        .context("Failed to read BED regions")?;
    let params = DepthParams {
        min_baseq: config.min_baseq,
        min_mapq: config.min_mapq,
        regions,
    };
    let mut source = BamDepth::new(bam);
    auto_bonferroni_factor_from_depth(&mut source, &params)
        .with_context(|| format!("Failed to compute depth for {}", bam.display()))
}

fn load_dictionary(source: &HeaderSource) -> Result<SequenceDictionary> {
    let dictionary = match source {
        HeaderSource::Text(path) => SequenceDictionary::from_header_lines(read_lines(path)?),
        HeaderSource::Bam(path) => SequenceDictionary::from_bam_path(path)
            .with_context(|| format!("Failed to read header of {}", path.display()))?,
    };
    if dictionary.is_empty() {
        return Err(anyhow!("No @SQ sequences found in header"));
    }
    Ok(dictionary)
}

fn resolve_scope(config: &BonferroniConfig) -> Result<BonferroniScope> {
    if let Some(exclude) = &config.exclude {
        let [chrom] = config.chroms.as_slice() else {
            bail!("--exclude needs exactly one --chrom");
        };
        let excluded_positions = read_exclusion_list(Some(exclude))
            .with_context(|| format!("Failed to read exclusion list {}", exclude.display()))?;
        info!("Parsed {} positions from {}", excluded_positions, exclude.display());
        return Ok(BonferroniScope::ChromosomeExcluding {
            chrom: chrom.clone(),
            excluded_positions,
        });
    }
    if let Some(bed) = &config.bed {
        if !config.chroms.is_empty() {
            bail!("--bed cannot be combined with --chrom");
        }
        let regions = TargetRegions::from_bed(bed).with_context(|| format!("Failed to read {}", bed.display()))?;
        return Ok(BonferroniScope::Regions(regions.total_length()));
    }
    if config.chroms.is_empty() {
        Ok(BonferroniScope::WholeGenome)
    } else {
        Ok(BonferroniScope::Chromosomes(config.chroms.clone()))
    }
}
