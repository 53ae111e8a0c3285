//! One-file scoring: DER components plus JER, flattened for the
//! aggregator.

use crate::der::{DerComponents, DerScorer};
use crate::jer::jaccard_error_rate;
use diabench_timeline::Timeline;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Scores for one reference/hypothesis pair.
#[derive(Debug, Clone, Serialize)]
pub struct FileScore {
    /// `None` when no reference speech was scored (DER undefined).
    pub der: Option<f64>,
    pub components: DerComponents,
    pub jer: f64,
}

impl FileScore {
    /// Flat metric map in the shape the aggregator consumes. An
    /// undefined DER is recorded as 0.0; callers that need to
    /// distinguish check [`FileScore::der`] first.
    pub fn to_metrics(&self) -> BTreeMap<String, f64> {
        BTreeMap::from([
            ("DER".to_string(), self.der.unwrap_or(0.0)),
            ("miss".to_string(), self.components.miss),
            ("false_alarm".to_string(), self.components.false_alarm),
            ("confusion".to_string(), self.components.confusion),
            ("total".to_string(), self.components.total),
            ("JER".to_string(), self.jer),
        ])
    }
}

/// Score one file: DER under the given scorer, JER unconditioned.
pub fn score_pair(reference: &Timeline, hypothesis: &Timeline, scorer: &DerScorer) -> FileScore {
    let components = scorer.score(reference, hypothesis);
    let jer = jaccard_error_rate(reference, hypothesis);
    let score = FileScore {
        der: components.rate(),
        components,
        jer,
    };
    debug!(
        der = score.der.unwrap_or(0.0),
        jer = score.jer,
        miss = components.miss,
        false_alarm = components.false_alarm,
        confusion = components.confusion,
        total = components.total,
        "scored file"
    );
    score
}
