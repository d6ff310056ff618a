use grep_cli::stdout;
use gzp::{deflate::Bgzf, BgzfSyncReader, Compression, ZBuilder};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use termcolor::ColorChoice;

use super::error::Result;
use super::fs::{is_bgzipped, is_stdio};

/// Open a line-oriented source: a file, or stdin for `None`/`-`.
///
/// BGZF/gzip input is decompressed on the fly when the path carries a gzip
/// extension. Lines are consumed incrementally; nothing is buffered beyond the
/// reader's block.
pub fn get_line_reader<P: AsRef<Path>>(path: Option<P>) -> Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = match path {
        Some(path) if !is_stdio(&path) => {
            let file = BufReader::new(File::open(path.as_ref())?);
            if is_bgzipped(&path) {
                Box::new(BufReader::new(BgzfSyncReader::new(file)))
            } else {
                Box::new(file)
            }
        }
        _ => Box::new(BufReader::new(io::stdin())),
    };
    Ok(reader)
}

/// Build a TSV writer targeting a file or stdout with optional BGZF compression.
pub fn get_writer<P: AsRef<Path>>(
    path: Option<P>,
    write_headers: bool,
    compression_level: u32,
) -> Result<csv::Writer<Box<dyn Write>>> {
    let raw_writer: Box<dyn Write> = match path {
        Some(path) if !is_stdio(&path) => {
            let gzipped = is_bgzipped(&path);
            let writer = BufWriter::new(File::create(path.as_ref())?);
            if gzipped {
                Box::new(
                    ZBuilder::<Bgzf, _>::new()
                        .num_threads(0)
                        .compression_level(Compression::new(compression_level))
                        .from_writer(writer),
                )
            } else {
                Box::new(writer)
            }
        }
        _ => Box::new(stdout(ColorChoice::Never)),
    };

    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(write_headers)
        .from_writer(raw_writer))
}
