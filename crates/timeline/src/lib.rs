//! Segment-timeline representation shared by reference annotations and
//! diarization hypotheses.
//!
//! A [`Timeline`] is a plain ordered collection of `(interval, speaker)`
//! assignments. It never merges or reorders what the caller inserts, so
//! overlapping speech (several speakers active at once) and duplicate
//! insertions are both representable.

use serde::{Deserialize, Serialize};

/// Half-open time range `[start, end)` in seconds.
///
/// Zero-length intervals are allowed; they contribute no duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether instant `t` falls inside the half-open range.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Duration shared with another interval, 0 when disjoint.
    pub fn overlap(&self, other: &Interval) -> f64 {
        (self.end.min(other.end) - self.start.max(other.start)).max(0.0)
    }
}

/// One `(interval, speaker)` assignment, the atomic timeline entry.
///
/// The label is an opaque string; equality is the only semantics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSegment {
    pub interval: Interval,
    pub speaker: String,
}

/// Ordered collection of labeled segments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    segments: Vec<LabeledSegment>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interval: Interval, speaker: impl Into<String>) {
        self.segments.push(LabeledSegment {
            interval,
            speaker: speaker.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[LabeledSegment] {
        &self.segments
    }

    pub fn iter(&self) -> impl Iterator<Item = &LabeledSegment> {
        self.segments.iter()
    }

    /// Distinct speaker labels, in first-appearance order.
    pub fn speakers(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if !out.contains(&seg.speaker.as_str()) {
                out.push(&seg.speaker);
            }
        }
        out
    }

    /// `[earliest start, latest end)` across all segments.
    pub fn extent(&self) -> Option<Interval> {
        let first = self.segments.first()?;
        let mut extent = first.interval;
        for seg in &self.segments[1..] {
            extent.start = extent.start.min(seg.interval.start);
            extent.end = extent.end.max(seg.interval.end);
        }
        Some(extent)
    }

    /// All segment boundary timestamps, sorted and deduplicated.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut out: Vec<f64> = Vec::with_capacity(self.segments.len() * 2);
        for seg in &self.segments {
            out.push(seg.interval.start);
            out.push(seg.interval.end);
        }
        out.sort_by(f64::total_cmp);
        out.dedup();
        out
    }

    /// Merged, non-overlapping support of one speaker's segments.
    pub fn support_of(&self, speaker: &str) -> Vec<Interval> {
        let mut intervals: Vec<Interval> = self
            .segments
            .iter()
            .filter(|s| s.speaker == speaker && !s.interval.is_empty())
            .map(|s| s.interval)
            .collect();
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut merged: Vec<Interval> = Vec::new();
        for iv in intervals {
            match merged.last_mut() {
                Some(last) if iv.start <= last.end => {
                    if iv.end > last.end {
                        last.end = iv.end;
                    }
                }
                _ => merged.push(iv),
            }
        }
        merged
    }

    /// Total speech duration: the union of all intervals across all
    /// speakers, with overlapping speech counted once.
    pub fn speech_duration(&self) -> f64 {
        let mut intervals: Vec<Interval> = self
            .segments
            .iter()
            .filter(|s| !s.interval.is_empty())
            .map(|s| s.interval)
            .collect();
        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));

        let mut total = 0.0;
        let mut covered_until = f64::NEG_INFINITY;
        for iv in intervals {
            let start = iv.start.max(covered_until);
            if iv.end > start {
                total += iv.end - start;
                covered_until = iv.end;
            }
        }
        total
    }
}
