//! Jaccard Error Rate.
//!
//! Each reference speaker is matched to at most one hypothesis speaker
//! by a dedicated optimal assignment maximizing the Jaccard index of
//! their active-time supports. This mapping is independent of the one
//! DER uses.

use crate::assignment::max_weight_assignment;
use diabench_timeline::{Interval, Timeline};

/// `1 - mean Jaccard index` over the union of reference and hypothesis
/// speaker identities, each counted once; speakers left unmatched
/// score zero. Returns 0.0 when both timelines are empty.
pub fn jaccard_error_rate(reference: &Timeline, hypothesis: &Timeline) -> f64 {
    let ref_speakers = reference.speakers();
    let hyp_speakers = hypothesis.speakers();
    if ref_speakers.is_empty() && hyp_speakers.is_empty() {
        return 0.0;
    }

    let ref_supports: Vec<Vec<Interval>> = ref_speakers
        .iter()
        .map(|s| reference.support_of(s))
        .collect();
    let hyp_supports: Vec<Vec<Interval>> = hyp_speakers
        .iter()
        .map(|s| hypothesis.support_of(s))
        .collect();

    let mut jaccard = vec![vec![0.0; hyp_supports.len()]; ref_supports.len()];
    for (r, ref_support) in ref_supports.iter().enumerate() {
        for (h, hyp_support) in hyp_supports.iter().enumerate() {
            jaccard[r][h] = jaccard_index(ref_support, hyp_support);
        }
    }

    let pairs = max_weight_assignment(&jaccard);
    let matched_sum: f64 = pairs.iter().map(|&(r, h)| jaccard[r][h]).sum();

    // Matched pairs count as one identity; every unmatched speaker on
    // either side counts once with index 0.
    let identities =
        pairs.len() + (ref_speakers.len() - pairs.len()) + (hyp_speakers.len() - pairs.len());

    1.0 - matched_sum / identities as f64
}

/// Intersection over union of two merged interval sets.
fn jaccard_index(a: &[Interval], b: &[Interval]) -> f64 {
    let intersection: f64 = a
        .iter()
        .map(|ia| b.iter().map(|ib| ia.overlap(ib)).sum::<f64>())
        .sum();
    let union = support_duration(a) + support_duration(b) - intersection;
    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

fn support_duration(support: &[Interval]) -> f64 {
    support.iter().map(Interval::duration).sum()
}
