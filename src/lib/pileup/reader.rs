//! Lazy line-by-line decoding of a pileup stream.

use std::io::BufRead;

use crate::core::error::{PileconsError, Result};

use super::column::{DecoderKind, PileupColumn};

/// Iterator over the columns of a pileup stream.
///
/// Holds a single byte buffer; nothing beyond the current line is kept.
/// Lines are read as bytes, so quality characters above 0x7f never fail the
/// stream.
/// Format errors are tagged with the 1-based line number and do not end the
/// iteration, so a caller may log them and keep going. I/O errors are
/// yielded once, after which iteration stops.
pub struct PileupReader<R> {
    inner: R,
    kind: DecoderKind,
    buffer: Vec<u8>,
    line_number: u64,
    done: bool,
}

impl<R: BufRead> PileupReader<R> {
    pub fn new(inner: R, kind: DecoderKind) -> Self {
        Self {
            inner,
            kind,
            buffer: Vec::new(),
            line_number: 0,
            done: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn kind(&self) -> DecoderKind {
        self.kind
    }
}

impl<R: BufRead> Iterator for PileupReader<R> {
    type Item = Result<PileupColumn>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        self.buffer.clear();
        match self.inner.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.line_number += 1;
                Some(
                    self.kind
                        .decode(&self.buffer)
                        .map_err(|source| PileconsError::AtLine {
                            line: self.line_number,
                            source,
                        }),
                )
            }
            Err(err) => {
                self.done = true;
                Some(Err(PileconsError::Io(err)))
            }
        }
    }
}
