use pilecons_lib::pileup::{Base, PileupColumn, Quality};
use serde::Serialize;

/// One output row per decoded column.
#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ColumnRow<'a> {
    pub chr: &'a str,
    pub pos: u64,
    #[serde(rename = "REF")]
    pub ref_base: Base,
    pub cons: Base,
    pub coverage: u32,
    pub a_fwd: u32,
    pub a_rev: u32,
    pub c_fwd: u32,
    pub c_rev: u32,
    pub g_fwd: u32,
    pub g_rev: u32,
    pub t_fwd: u32,
    pub t_rev: u32,
    pub n_fwd: u32,
    pub n_rev: u32,
    pub ins: u32,
    pub del: u32,
    pub del_placeholders: u32,
    pub read_starts: u32,
    pub read_ends: u32,
    pub avg_ins_len: f64,
    pub avg_del_len: f64,
}

impl<'a> ColumnRow<'a> {
    pub fn new(column: &'a PileupColumn, min_quality: Quality, coord_offset: u64) -> Self {
        let counts = |base: Base| column.evidence().strand_counts(base, min_quality);
        let (a, c, g, t, n) = (
            counts(Base::A),
            counts(Base::C),
            counts(Base::G),
            counts(Base::T),
            counts(Base::N),
        );
        ColumnRow {
            chr: column.chrom(),
            pos: column.coord() + coord_offset,
            ref_base: column.ref_base(),
            cons: column.cons_base(),
            coverage: column.coverage(),
            a_fwd: a.forward,
            a_rev: a.reverse,
            c_fwd: c.forward,
            c_rev: c.reverse,
            g_fwd: g.forward,
            g_rev: g.reverse,
            t_fwd: t.forward,
            t_rev: t.reverse,
            n_fwd: n.forward,
            n_rev: n.reverse,
            ins: column.num_ins_events(),
            del: column.num_del_events(),
            del_placeholders: column.num_del_placeholders(),
            read_starts: column.num_read_starts(),
            read_ends: column.num_read_ends(),
            avg_ins_len: column.avg_ins_len(),
            avg_del_len: column.avg_del_len(),
        }
    }
}
