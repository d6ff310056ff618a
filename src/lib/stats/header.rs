//! Sequence names and lengths from alignment header metadata.

use log::{info, warn};
use noodles::{bam, sam};
use rustc_hash::FxHashMap;
use smartstring::{LazyCompact, SmartString};
use std::path::Path;

use crate::core::error::{FormatError, PileconsError, Result};

type Name = SmartString<LazyCompact>;

/// Ordered `@SQ` entries of a header. A length is `None` when the entry had
/// no usable `LN:` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceDictionary {
    names: Vec<Name>,
    lengths: FxHashMap<Name, Option<u64>>,
}

impl SequenceDictionary {
    /// Build from raw SAM header lines such as `@SQ\tSN:chr1\tLN:248956422`.
    ///
    /// Lines that are not `@SQ` records, or have fewer than two fields, are ignored.
    pub fn from_header_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dict = Self::default();
        for line in lines {
            let fields: Vec<&str> = line.as_ref().split_whitespace().collect();
            if fields.len() < 2 || fields[0] != "@SQ" {
                continue;
            }
            let Some(name) = fields[1..].iter().find_map(|f| f.strip_prefix("SN:")) else {
                warn!("Ignoring @SQ header line without SN tag: {}", line.as_ref());
                continue;
            };
            let length = fields[1..]
                .iter()
                .find_map(|f| f.strip_prefix("LN:"))
                .and_then(|ln| ln.parse::<u64>().ok());
            dict.insert(name, length);
        }
        dict
    }

    /// Build from a parsed SAM/BAM header.
    pub fn from_sam_header(header: &sam::Header) -> Self {
        let mut dict = Self::default();
        for (name, sequence) in header.reference_sequences() {
            let name = String::from_utf8_lossy(name.as_ref());
            dict.insert(&name, Some(sequence.length().get() as u64));
        }
        dict
    }

    /// Read the header of a BAM file.
    pub fn from_bam_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = bam::io::reader::Builder::default().build_from_path(path.as_ref())?;
        let header = reader.read_header()?;
        Ok(Self::from_sam_header(&header))
    }

    fn insert(&mut self, name: &str, length: Option<u64>) {
        let name = Name::from(name);
        if self.lengths.contains_key(&name) {
            warn!("Duplicate sequence '{}' in header; keeping the first entry", name);
            return;
        }
        self.names.push(name.clone());
        self.lengths.insert(name, length);
    }

    /// Sequence names in header order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|n| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lengths.contains_key(name)
    }

    /// Length of `name`.
    pub fn length(&self, name: &str) -> Result<u64> {
        match self.lengths.get(name) {
            Some(Some(length)) => Ok(*length),
            Some(None) => Err(FormatError::MissingSequenceLength(name.to_string()).into()),
            None => Err(PileconsError::NotFound(name.to_string())),
        }
    }

    /// Summed length of all sequences.
    pub fn total_length(&self) -> Result<u64> {
        self.sum_lengths(self.names.iter().map(|n| n.as_str()))
    }

    /// Summed length of the named sequences.
    pub fn subset_length<S: AsRef<str>>(&self, names: &[S]) -> Result<u64> {
        self.sum_lengths(names.iter().map(|n| n.as_ref()))
    }

    fn sum_lengths<'a>(&self, names: impl Iterator<Item = &'a str>) -> Result<u64> {
        let mut total = 0u64;
        for name in names {
            let length = self.length(name)?;
            info!("Adding length {} of sequence {}", length, name);
            total += length;
        }
        Ok(total)
    }
}
