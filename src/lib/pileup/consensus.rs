//! Quality-weighted consensus calling.
//!
//! Each of A, C, G and T receives the probability mass of its calls,
//! `sum(count * (1 - 10^(-q/10)))`, over both strands. Many low-quality calls
//! therefore do not automatically out-vote fewer high-quality ones. The base
//! with the largest mass wins unless the runner-up is within [`TIE_EPSILON`],
//! in which case the call is undetermined (`N`).

use super::base::Base;
use super::evidence::{Evidence, QualityHistogram};
use super::quality::{error_probability, Quality};

/// Phred 2 is the "quality not available" sentinel; calls at or below it do not vote.
pub const QUALITY_NOT_AVAILABLE: Quality = 2;

/// Scores closer than this are a tie.
///
/// Kept for compatibility with existing call sets. The threshold is arbitrary,
/// not a statistical boundary.
pub const TIE_EPSILON: f64 = 1e-6;

/// Probability mass of one collapsed histogram.
pub fn probability_mass(histogram: &QualityHistogram) -> f64 {
    histogram
        .range(QUALITY_NOT_AVAILABLE + 1..)
        .map(|(&quality, &count)| f64::from(count) * (1.0 - error_probability(quality)))
        .sum()
}

/// Reference-independent consensus; `N` when the vote is undetermined.
pub fn call_consensus(evidence: &Evidence) -> Base {
    let mut scores: Vec<(Base, f64)> = Base::CALLABLE
        .iter()
        .map(|&base| (base, probability_mass(&evidence.collapsed_histogram(base))))
        .collect();
    scores.sort_by(|a, b| a.1.total_cmp(&b.1));

    match scores.as_slice() {
        [.., (_, runner_up), (best, top)] if top - runner_up >= TIE_EPSILON => *best,
        _ => Base::N,
    }
}

/// Map an undetermined consensus onto the reference base.
#[inline]
pub fn resolve_consensus(consensus: Base, ref_base: Base) -> Base {
    match consensus {
        Base::N => ref_base,
        called => called,
    }
}
