mod args;
mod processor;

use anyhow::{Context, Result};
use log::{info, warn};
use pilecons_lib::core::prelude::{get_line_reader, get_writer, is_stdio, make_parent_dirs};
use pilecons_lib::diagnostics::{check_tool_version, report_stderr_lines};
use pilecons_lib::pileup::PileupReader;
use std::path::Path;

use crate::commands::common::{read_lines, COMPRESSION_LEVEL};

pub use args::{DecodeArgs, DecodeConfig};
use processor::ColumnRow;

/// Execute the `decode` command end-to-end.
pub fn run_decode(args: DecodeArgs) -> Result<()> {
    let config: DecodeConfig = args.into();
    info!(
        "Decoding {} pileup from {}",
        config.kind,
        config
            .input
            .as_ref()
            .map_or_else(|| "stdin".to_string(), |p| p.display().to_string())
    );

    if let Some(log_path) = &config.tool_log {
        scan_tool_log(log_path)?;
    }

    if let Some(output) = &config.output {
        if !is_stdio(output) {
            make_parent_dirs(output)?;
        }
    }
    let mut writer = get_writer(config.output.as_ref(), true, COMPRESSION_LEVEL)?;
    let input = get_line_reader(config.input.as_ref()).context("Failed to open pileup input")?;

    let mut decoded = 0u64;
    let mut skipped = 0u64;
    for result in PileupReader::new(input, config.kind) {
        match result {
            Ok(column) => {
                writer.serialize(ColumnRow::new(&column, config.min_quality, config.coord_offset))?;
                decoded += 1;
            }
            Err(err) if config.skip_malformed && err.is_format_error() => {
                warn!("Skipping malformed pileup line: {}", err);
                skipped += 1;
            }
            Err(err) => return Err(err).context("Failed to decode pileup"),
        }
    }

    writer.flush()?;
    info!("Decoded {} columns ({} malformed lines skipped)", decoded, skipped);
    Ok(())
}

/// Check the producer's captured stderr before trusting its output.
fn scan_tool_log(path: &Path) -> Result<()> {
    let lines = read_lines(path)?;
    if let Some(version) = check_tool_version(&lines) {
        info!("Pileup produced by version {}", version);
    }
    let unhandled = report_stderr_lines(
        lines
            .iter()
            .filter(|l| !l.starts_with("Program:") && !l.contains("Version:")),
    );
    if unhandled > 0 {
        warn!("{} unexpected lines in {}", unhandled, path.display());
    }
    Ok(())
}
