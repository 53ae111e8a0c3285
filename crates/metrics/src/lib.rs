//! Diarization evaluation: format adapters, DER/JER scoring under
//! optimal speaker assignment, and batch aggregation.

mod adapters;
mod aggregate;
mod assignment;
mod der;
mod jer;
mod score;

pub use adapters::{hypothesis_to_timeline, rttm_to_timeline};
pub use aggregate::{FileMetrics, MetricAggregator};
pub use der::{DerComponents, DerScorer};
pub use jer::jaccard_error_rate;
pub use score::{score_pair, FileScore};

#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("RTTM line {line}: invalid number {value:?}")]
    InvalidRttmNumber { line: usize, value: String },
}

pub type Result<T> = std::result::Result<T, MetricsError>;
