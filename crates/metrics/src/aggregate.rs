//! Batch aggregation of per-file metrics.

use serde::Serialize;
use std::collections::BTreeMap;

/// One file's metrics as recorded by the aggregator.
#[derive(Debug, Clone, Serialize)]
pub struct FileMetrics {
    pub file_id: Option<String>,
    pub metrics: BTreeMap<String, f64>,
}

/// Accumulates per-file metric maps and summarizes them.
///
/// Created fresh per batch. Not designed for concurrent mutation;
/// parallel drivers keep one aggregator per worker and merge, or guard
/// a single one.
#[derive(Debug, Default)]
pub struct MetricAggregator {
    files: Vec<FileMetrics>,
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one file's metrics. O(1), insertion order kept.
    pub fn add(&mut self, metrics: BTreeMap<String, f64>, file_id: Option<&str>) {
        self.files.push(FileMetrics {
            file_id: file_id.map(str::to_string),
            metrics,
        });
    }

    /// Summary statistics per metric key seen across all files:
    /// `<key>_mean`, `<key>_std` (sample standard deviation, 0.0 for
    /// fewer than 2 samples), `<key>_min`, `<key>_max`, `<key>_median`,
    /// plus `num_files`. Returns a fresh map; accumulated state is
    /// untouched.
    pub fn aggregate(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        if self.files.is_empty() {
            return out;
        }

        let mut by_metric: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
        for file in &self.files {
            for (name, value) in &file.metrics {
                by_metric.entry(name.as_str()).or_default().push(*value);
            }
        }

        for (name, values) in by_metric {
            out.insert(format!("{name}_mean"), mean(&values));
            out.insert(format!("{name}_std"), sample_std(&values));
            out.insert(
                format!("{name}_min"),
                values.iter().copied().fold(f64::INFINITY, f64::min),
            );
            out.insert(
                format!("{name}_max"),
                values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            );
            out.insert(format!("{name}_median"), median(&values));
        }

        out.insert("num_files".to_string(), self.files.len() as f64);
        out
    }

    /// Accumulated records, unmodified, in insertion order.
    pub fn per_file_metrics(&self) -> &[FileMetrics] {
        &self.files
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        0.5 * (sorted[mid - 1] + sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn der_map(value: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([("DER".to_string(), value)])
    }

    const EPS: f64 = 1e-9;

    #[test]
    fn empty_aggregator_yields_empty_summary() {
        let agg = MetricAggregator::new();
        assert!(agg.aggregate().is_empty());
        assert!(agg.per_file_metrics().is_empty());
    }

    #[test]
    fn summary_statistics_are_deterministic() {
        let mut agg = MetricAggregator::new();
        agg.add(der_map(0.10), Some("f1"));
        agg.add(der_map(0.20), Some("f2"));
        agg.add(der_map(0.30), Some("f3"));

        let summary = agg.aggregate();
        assert!((summary["DER_mean"] - 0.20).abs() < EPS);
        assert!((summary["DER_min"] - 0.10).abs() < EPS);
        assert!((summary["DER_max"] - 0.30).abs() < EPS);
        assert!((summary["DER_median"] - 0.20).abs() < EPS);
        assert!((summary["DER_std"] - 0.10).abs() < EPS);
        assert_eq!(summary["num_files"], 3.0);
    }

    #[test]
    fn std_is_zero_for_a_single_sample() {
        let mut agg = MetricAggregator::new();
        agg.add(der_map(0.42), None);

        let summary = agg.aggregate();
        assert_eq!(summary["DER_std"], 0.0);
        assert!((summary["DER_mean"] - 0.42).abs() < EPS);
    }

    #[test]
    fn median_of_even_count_averages_the_middle_two() {
        let mut agg = MetricAggregator::new();
        for v in [0.4, 0.1, 0.3, 0.2] {
            agg.add(der_map(v), None);
        }
        let summary = agg.aggregate();
        assert!((summary["DER_median"] - 0.25).abs() < EPS);
    }

    #[test]
    fn aggregate_does_not_consume_state() {
        let mut agg = MetricAggregator::new();
        agg.add(der_map(0.5), Some("f1"));

        let first = agg.aggregate();
        let second = agg.aggregate();
        assert_eq!(first, second);
        assert_eq!(agg.per_file_metrics().len(), 1);
    }

    #[test]
    fn keys_missing_from_some_files_are_summarized_over_present_ones() {
        let mut agg = MetricAggregator::new();
        agg.add(der_map(0.2), Some("f1"));
        agg.add(
            BTreeMap::from([("DER".to_string(), 0.4), ("JER".to_string(), 0.6)]),
            Some("f2"),
        );

        let summary = agg.aggregate();
        assert!((summary["DER_mean"] - 0.3).abs() < EPS);
        assert!((summary["JER_mean"] - 0.6).abs() < EPS);
        assert_eq!(summary["num_files"], 2.0);
    }

    #[test]
    fn per_file_metrics_keeps_insertion_order() {
        let mut agg = MetricAggregator::new();
        agg.add(der_map(0.3), Some("b"));
        agg.add(der_map(0.1), Some("a"));

        let files = agg.per_file_metrics();
        assert_eq!(files[0].file_id.as_deref(), Some("b"));
        assert_eq!(files[1].file_id.as_deref(), Some("a"));
    }
}
