//! Diarization Error Rate under an optimal global speaker mapping.
//!
//! The time axis is partitioned at every segment boundary of either
//! timeline, refining the reference's uniform segments (maximal spans
//! with a constant set of active reference speakers). Collar windows
//! around reference turn boundaries and, optionally, overlapping
//! reference speech are excluded from scoring. A single Hungarian
//! assignment over co-occurrence durations maps hypothesis labels to
//! reference labels for the whole file, then miss, false alarm and
//! confusion are accumulated per scored span.

use crate::assignment::max_weight_assignment;
use diabench_timeline::Timeline;
use serde::Serialize;

/// DER scoring parameters, passed explicitly to every call.
#[derive(Debug, Clone, Copy)]
pub struct DerScorer {
    /// Seconds excluded on each side of every reference turn boundary.
    pub collar: f64,
    /// Exclude spans where two or more reference speakers overlap.
    pub skip_overlap: bool,
}

impl Default for DerScorer {
    fn default() -> Self {
        Self {
            collar: 0.25,
            skip_overlap: false,
        }
    }
}

/// Error-duration components of one DER computation, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DerComponents {
    pub miss: f64,
    pub false_alarm: f64,
    pub confusion: f64,
    /// Scored reference speaker-time. Overlapping reference speech
    /// counts once per active speaker.
    pub total: f64,
}

impl DerComponents {
    /// `(miss + false_alarm + confusion) / total`, or `None` when no
    /// reference speech was scored (DER undefined).
    pub fn rate(&self) -> Option<f64> {
        if self.total > 0.0 {
            Some((self.miss + self.false_alarm + self.confusion) / self.total)
        } else {
            None
        }
    }
}

/// One scored span with the speaker sets active during it, as indices
/// into the per-timeline label tables.
struct Slice {
    duration: f64,
    reference: Vec<usize>,
    hypothesis: Vec<usize>,
}

impl DerScorer {
    pub fn new(collar: f64, skip_overlap: bool) -> Self {
        Self {
            collar,
            skip_overlap,
        }
    }

    pub fn score(&self, reference: &Timeline, hypothesis: &Timeline) -> DerComponents {
        let ref_labels = reference.speakers();
        let hyp_labels = hypothesis.speakers();
        let slices = self.scored_slices(reference, hypothesis, &ref_labels, &hyp_labels);

        // Co-occurrence duration summed per (hypothesis, reference)
        // label pair across all scored spans; the optimal one-to-one
        // mapping maximizes total co-occurrence, which minimizes
        // confusion globally.
        let mut co_occurrence = vec![vec![0.0; ref_labels.len()]; hyp_labels.len()];
        for slice in &slices {
            for &h in &slice.hypothesis {
                for &r in &slice.reference {
                    co_occurrence[h][r] += slice.duration;
                }
            }
        }
        let mut mapped_ref: Vec<Option<usize>> = vec![None; hyp_labels.len()];
        for (h, r) in max_weight_assignment(&co_occurrence) {
            mapped_ref[h] = Some(r);
        }

        let mut components = DerComponents::default();
        for slice in &slices {
            let n_ref = slice.reference.len();
            let n_hyp = slice.hypothesis.len();
            let correct = slice
                .hypothesis
                .iter()
                .filter(|&&h| mapped_ref[h].is_some_and(|r| slice.reference.contains(&r)))
                .count();

            components.total += slice.duration * n_ref as f64;
            components.miss += slice.duration * n_ref.saturating_sub(n_hyp) as f64;
            components.false_alarm += slice.duration * n_hyp.saturating_sub(n_ref) as f64;
            components.confusion += slice.duration * (n_ref.min(n_hyp) - correct) as f64;
        }
        components
    }

    fn scored_slices(
        &self,
        reference: &Timeline,
        hypothesis: &Timeline,
        ref_labels: &[&str],
        hyp_labels: &[&str],
    ) -> Vec<Slice> {
        let ref_bounds = reference.boundaries();

        let mut cuts = ref_bounds.clone();
        cuts.extend(hypothesis.boundaries());
        if self.collar > 0.0 {
            for &b in &ref_bounds {
                cuts.push(b - self.collar);
                cuts.push(b + self.collar);
            }
        }
        cuts.sort_by(f64::total_cmp);
        cuts.dedup();

        let mut slices = Vec::new();
        for pair in cuts.windows(2) {
            let (t0, t1) = (pair[0], pair[1]);
            if t1 <= t0 {
                continue;
            }
            // Speaker sets are constant within a cut pair, so the
            // midpoint decides membership for the whole span.
            let mid = 0.5 * (t0 + t1);

            if self.collar > 0.0 && ref_bounds.iter().any(|&b| (mid - b).abs() < self.collar) {
                continue;
            }

            let ref_active = active_labels(reference, ref_labels, mid);
            if self.skip_overlap && ref_active.len() > 1 {
                continue;
            }
            let hyp_active = active_labels(hypothesis, hyp_labels, mid);
            if ref_active.is_empty() && hyp_active.is_empty() {
                continue;
            }

            slices.push(Slice {
                duration: t1 - t0,
                reference: ref_active,
                hypothesis: hyp_active,
            });
        }
        slices
    }
}

/// Indices of the labels with at least one segment covering `t`.
fn active_labels(timeline: &Timeline, labels: &[&str], t: f64) -> Vec<usize> {
    let mut active = Vec::new();
    for (idx, label) in labels.iter().enumerate() {
        let speaks = timeline
            .iter()
            .any(|s| s.speaker == *label && s.interval.contains(t));
        if speaks {
            active.push(idx);
        }
    }
    active
}
