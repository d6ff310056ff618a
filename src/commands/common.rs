use anyhow::{Context, Result};
use pilecons_lib::core::io::get_line_reader;
use std::io::BufRead;
use std::path::Path;

/// BGZF compression level for gzipped outputs.
pub const COMPRESSION_LEVEL: u32 = 6;

/// Read a small text file (plain or BGZF) fully into memory.
pub fn read_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    get_line_reader(Some(path))
        .with_context(|| format!("Failed to open {}", path.display()))?
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("Failed to read {}", path.display()))
}
