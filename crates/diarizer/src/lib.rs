//! Diarization engine seam.
//!
//! The benchmark is agnostic to how hypotheses are produced; anything
//! implementing [`Diarizer`] can be scored. Only a mock engine ships
//! with the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod mock;

pub use mock::MockDiarizer;

#[derive(Debug, thiserror::Error)]
pub enum DiarizerError {
    #[error("audio file not found: {0}")]
    AudioNotFound(PathBuf),
    #[error("engine error: {0}")]
    Engine(String),
}

pub type Result<T> = std::result::Result<T, DiarizerError>;

/// One hypothesized speaker segment, with absolute start/end seconds.
///
/// `start`, `end` and `speaker` are required; a record missing any of
/// them is a caller bug and fails at deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HypothesisSegment {
    pub start: f64,
    pub end: f64,
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// A diarization engine's output for one audio file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiarizationOutput {
    /// Hypothesized segments; an absent key deserializes to empty.
    #[serde(default)]
    pub segments: Vec<HypothesisSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_speakers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

pub trait Diarizer: Send + Sync {
    fn name(&self) -> &'static str;
    fn diarize(&self, audio: &Path) -> Result<DiarizationOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_segments_key_deserializes_to_empty() {
        let output: DiarizationOutput =
            serde_json::from_str(r#"{"model": "x"}"#).expect("valid record");
        assert!(output.segments.is_empty());
        assert_eq!(output.model.as_deref(), Some("x"));
    }

    #[test]
    fn segment_missing_required_field_is_an_error() {
        let result: std::result::Result<DiarizationOutput, _> =
            serde_json::from_str(r#"{"segments": [{"start": 0.0, "end": 1.0}]}"#);
        assert!(result.is_err(), "segment without speaker must not parse");
    }
}
