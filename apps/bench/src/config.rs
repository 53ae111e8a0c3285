//! Explicit benchmark configuration, assembled from CLI arguments and
//! the datasets config file. Passed by reference to the runner; there
//! is no global settings object.

use anyhow::{bail, Context};
use diabench_metrics::DerScorer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One dataset entry from `config/datasets.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    pub display_name: String,
    pub audio_dir: PathBuf,
    pub annotation_dir: PathBuf,
}

#[derive(Debug)]
pub struct BenchConfig {
    pub dataset_name: String,
    pub dataset: DatasetConfig,
    pub model: String,
    pub scorer: DerScorer,
    pub db_path: PathBuf,
}

impl BenchConfig {
    pub fn load(
        config_path: &Path,
        dataset_name: &str,
        model: &str,
        collar: f64,
        skip_overlap: bool,
        db_path: PathBuf,
    ) -> anyhow::Result<Self> {
        let dataset = load_dataset_config(config_path, dataset_name)?;
        Ok(Self {
            dataset_name: dataset_name.to_string(),
            dataset,
            model: model.to_string(),
            scorer: DerScorer::new(collar, skip_overlap),
            db_path,
        })
    }
}

fn load_dataset_config(path: &Path, name: &str) -> anyhow::Result<DatasetConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("dataset config not found: {}", path.display()))?;
    let mut datasets: BTreeMap<String, DatasetConfig> =
        serde_yml::from_str(&text).with_context(|| format!("invalid config: {}", path.display()))?;

    match datasets.remove(name) {
        Some(dataset) => Ok(dataset),
        None => {
            let available: Vec<_> = datasets.keys().cloned().collect();
            bail!(
                "unknown dataset: {name}. Available datasets: {}",
                available.join(", ")
            );
        }
    }
}
