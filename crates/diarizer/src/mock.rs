//! Mock diarizer generating plausible two-speaker hypotheses.
//!
//! Stands in for a real engine in demos and tests: the segment layout
//! is fixed relative to the audio duration, so results are stable
//! across runs.

use crate::{DiarizationOutput, Diarizer, DiarizerError, HypothesisSegment, Result};
use std::path::Path;
use tracing::debug;

const FALLBACK_DURATION: f64 = 30.0;

#[derive(Debug, Default)]
pub struct MockDiarizer;

impl MockDiarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Diarizer for MockDiarizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn diarize(&self, audio: &Path) -> Result<DiarizationOutput> {
        if !audio.exists() {
            return Err(DiarizerError::AudioNotFound(audio.to_path_buf()));
        }

        let duration = wav_duration(audio).unwrap_or(FALLBACK_DURATION);
        debug!(path = %audio.display(), duration, "mock diarization");

        // Two speakers alternating, with a short labeled overlap at the
        // turn change.
        let segments = vec![
            HypothesisSegment {
                start: 0.0,
                end: duration * 0.45,
                speaker: "SPEAKER_00".to_string(),
                confidence: Some(0.92),
            },
            HypothesisSegment {
                start: duration * 0.45,
                end: duration * 0.48,
                speaker: "OVERLAP".to_string(),
                confidence: Some(0.78),
            },
            HypothesisSegment {
                start: duration * 0.48,
                end: duration,
                speaker: "SPEAKER_01".to_string(),
                confidence: Some(0.89),
            },
        ];

        Ok(DiarizationOutput {
            segments,
            num_speakers: Some(2),
            duration: Some(duration),
            model: Some("mock-demo".to_string()),
        })
    }
}

fn wav_duration(path: &Path) -> Option<f64> {
    let reader = hound::WavReader::open(path).ok()?;
    let spec = reader.spec();
    Some(reader.duration() as f64 / spec.sample_rate as f64)
}
