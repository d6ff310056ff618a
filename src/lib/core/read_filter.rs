//! Read filtering primitives used by the depth statistics.
//!
//! This module exposes the [`ReadFilter`] trait along with the default filter,
//! which mirrors the read selection of `samtools depth`: unmapped, secondary,
//! QC-failed and duplicate reads are dropped, as are reads below a mapping
//! quality threshold.

use noodles::sam::alignment::record::Flags;
use noodles::sam::alignment::Record;

/// A trait for filtering reads based on various criteria.
///
/// Implementations should return `true` if the read passes the filter and
/// `false` otherwise.
pub trait ReadFilter {
    /// Filter a read based on various criteria.
    fn filter_read<R: Record + ?Sized>(&self, read: &R) -> bool;
}

/// Flag bits that always exclude a read from depth counting.
pub const EXCLUDED_FLAGS: Flags = Flags::UNMAPPED
    .union(Flags::SECONDARY)
    .union(Flags::QC_FAIL)
    .union(Flags::DUPLICATE);

/// Flag and mapping-quality based read filter.
#[derive(Debug, Clone, Copy)]
pub struct DefaultReadFilter {
    /// The read's mapping quality must be greater than or equal to this value to pass.
    min_mapq: u8,
}

impl DefaultReadFilter {
    /// Create a new [`DefaultReadFilter`] with the specified criteria.
    pub fn new(min_mapq: u8) -> Self {
        Self { min_mapq }
    }
}

impl ReadFilter for DefaultReadFilter {
    #[inline(always)]
    fn filter_read<R: Record + ?Sized>(&self, read: &R) -> bool {
        let flags = match read.flags() {
            Ok(flags) => flags,
            Err(_) => return false,
        };
        if flags.intersects(EXCLUDED_FLAGS) {
            return false;
        }

        // A missing mapping quality (255) only passes an unrestricted filter.
        match read.mapping_quality().transpose() {
            Ok(Some(mapq)) => mapq.get() >= self.min_mapq,
            Ok(None) => self.min_mapq == 0,
            Err(_) => false,
        }
    }
}
