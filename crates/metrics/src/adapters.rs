//! Adapters turning RTTM text and diarizer output into [`Timeline`]s.

use crate::{MetricsError, Result};
use diabench_diarizer::DiarizationOutput;
use diabench_timeline::{Interval, Timeline};

/// Parse RTTM text into a timeline.
///
/// The parser is deliberately lenient: blank lines, `#` comments,
/// lines with fewer than 8 whitespace-separated fields and records
/// whose first field is not `SPEAKER` are all skipped, not rejected.
/// Third-party corpora routinely contain such rows, so leniency here
/// is contractual. A numeric field that fails to parse on an otherwise
/// well-formed line is still an error: that would silently corrupt
/// timings.
pub fn rttm_to_timeline(text: &str) -> Result<Timeline> {
    let mut timeline = Timeline::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 8 || fields[0] != "SPEAKER" {
            continue;
        }

        // SPEAKER <file> <channel> <start> <duration> <NA> <NA> <speaker> <NA>
        let start = parse_seconds(fields[3], idx + 1)?;
        let duration = parse_seconds(fields[4], idx + 1)?;
        timeline.add(Interval::new(start, start + duration), fields[7]);
    }

    Ok(timeline)
}

fn parse_seconds(value: &str, line: usize) -> Result<f64> {
    value.parse().map_err(|_| MetricsError::InvalidRttmNumber {
        line,
        value: value.to_string(),
    })
}

/// Convert a diarizer's output record into a timeline, one labeled
/// segment per hypothesized segment.
pub fn hypothesis_to_timeline(output: &DiarizationOutput) -> Timeline {
    let mut timeline = Timeline::new();
    for seg in &output.segments {
        timeline.add(Interval::new(seg.start, seg.end), seg.speaker.as_str());
    }
    timeline
}
