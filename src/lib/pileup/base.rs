//! The ten-symbol base/strand alphabet of a pileup column.
//!
//! Upper-case letters are calls on the forward strand, lower-case letters calls
//! on the reverse strand. [`StrandedBase::index`] maps the ten symbols onto a
//! dense `0..10` range so per-symbol data can live in fixed-size arrays.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Base {
    A,
    C,
    G,
    T,
    N,
}

impl Base {
    /// All five canonical bases.
    pub const ALL: [Base; 5] = [Base::A, Base::C, Base::G, Base::T, Base::N];

    /// Bases that take part in the consensus vote.
    pub const CALLABLE: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

    /// Case-insensitive parse of a base letter.
    #[inline]
    pub fn from_ascii(byte: u8) -> Option<Base> {
        match byte.to_ascii_uppercase() {
            b'A' => Some(Base::A),
            b'C' => Some(Base::C),
            b'G' => Some(Base::G),
            b'T' => Some(Base::T),
            b'N' => Some(Base::N),
            _ => None,
        }
    }

    /// Upper-case ASCII letter.
    #[inline]
    pub fn to_ascii(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
            Base::N => b'N',
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn on(self, strand: Strand) -> StrandedBase {
        StrandedBase { base: self, strand }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

/// A base call together with the strand it was observed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StrandedBase {
    pub base: Base,
    pub strand: Strand,
}

impl StrandedBase {
    pub const COUNT: usize = 10;

    /// Parse a base letter; its case selects the strand.
    #[inline]
    pub fn from_ascii(byte: u8) -> Option<StrandedBase> {
        let base = Base::from_ascii(byte)?;
        let strand = if byte.is_ascii_uppercase() {
            Strand::Forward
        } else {
            Strand::Reverse
        };
        Some(StrandedBase { base, strand })
    }

    #[inline]
    pub fn to_ascii(self) -> u8 {
        match self.strand {
            Strand::Forward => self.base.to_ascii(),
            Strand::Reverse => self.base.to_ascii().to_ascii_lowercase(),
        }
    }

    /// Dense index in `0..StrandedBase::COUNT`.
    #[inline]
    pub fn index(self) -> usize {
        self.base.index() * 2
            + match self.strand {
                Strand::Forward => 0,
                Strand::Reverse => 1,
            }
    }

    /// Inverse of [`StrandedBase::index`].
    pub fn from_index(index: usize) -> Option<StrandedBase> {
        let base = *Base::ALL.get(index / 2)?;
        let strand = if index % 2 == 0 {
            Strand::Forward
        } else {
            Strand::Reverse
        };
        Some(StrandedBase { base, strand })
    }

    /// All ten symbols in index order.
    pub fn all() -> impl Iterator<Item = StrandedBase> {
        (0..Self::COUNT).filter_map(StrandedBase::from_index)
    }
}
