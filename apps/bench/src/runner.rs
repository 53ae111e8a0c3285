//! Batch loop: diarize each file, score it against its RTTM ground
//! truth, aggregate, persist.

use crate::config::BenchConfig;
use anyhow::{bail, Context};
use diabench_diarizer::{Diarizer, MockDiarizer};
use diabench_metrics::{hypothesis_to_timeline, rttm_to_timeline, score_pair, MetricAggregator};
use diabench_storage::Database;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub fn run(config: &BenchConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let db = Database::open(&config.db_path)?;
    let diarizer = build_diarizer(&config.model)?;

    let run_id = db.create_run(&config.dataset.display_name, &config.model)?;
    db.mark_running(run_id)?;
    info!(
        run_id,
        dataset = %config.dataset.display_name,
        model = %config.model,
        collar = config.scorer.collar,
        skip_overlap = config.scorer.skip_overlap,
        "benchmark started"
    );

    match score_dataset(config, diarizer.as_ref(), &db, run_id) {
        Ok(()) => {
            db.mark_completed(run_id)?;
            Ok(())
        }
        Err(e) => {
            db.mark_failed(run_id, &e.to_string())?;
            Err(e)
        }
    }
}

fn build_diarizer(model: &str) -> anyhow::Result<Box<dyn Diarizer>> {
    match model {
        "mock" => Ok(Box::new(MockDiarizer::new())),
        other => bail!("unknown model: {other}"),
    }
}

fn score_dataset(
    config: &BenchConfig,
    diarizer: &dyn Diarizer,
    db: &Database,
    run_id: i64,
) -> anyhow::Result<()> {
    let rttm_files = discover_rttm_files(&config.dataset.annotation_dir)?;
    if rttm_files.is_empty() {
        bail!(
            "no RTTM files in {}",
            config.dataset.annotation_dir.display()
        );
    }

    let mut aggregator = MetricAggregator::new();
    for rttm_path in &rttm_files {
        let file_id = rttm_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let audio_path = config.dataset.audio_dir.join(format!("{file_id}.wav"));

        let text = std::fs::read_to_string(rttm_path)
            .with_context(|| format!("reading {}", rttm_path.display()))?;
        let reference = rttm_to_timeline(&text)?;

        let output = match diarizer.diarize(&audio_path) {
            Ok(output) => output,
            Err(e) => {
                warn!(file = %file_id, error = %e, "diarization failed; skipping file");
                continue;
            }
        };
        let hypothesis = hypothesis_to_timeline(&output);

        let score = score_pair(&reference, &hypothesis, &config.scorer);
        if score.der.is_none() {
            warn!(file = %file_id, "no scored reference speech; DER undefined");
        }

        let metrics = score.to_metrics();
        let details = serde_json::to_value(score.components)?;
        db.insert_result(run_id, Some(&file_id), "DER", metrics["DER"], Some(&details))?;
        db.insert_result(run_id, Some(&file_id), "JER", score.jer, None)?;
        info!(file = %file_id, der = metrics["DER"], jer = score.jer, "file scored");

        aggregator.add(metrics, Some(&file_id));
    }

    if aggregator.per_file_metrics().is_empty() {
        bail!("no files were scored");
    }

    let summary = aggregator.aggregate();
    for (name, value) in &summary {
        db.insert_result(run_id, None, name, *value, None)?;
    }
    info!(
        files = aggregator.per_file_metrics().len(),
        der_mean = summary["DER_mean"],
        jer_mean = summary["JER_mean"],
        "benchmark complete"
    );
    Ok(())
}

fn discover_rttm_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("annotation directory not found: {}", dir.display()))?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "rttm"))
        .collect();
    files.sort();
    Ok(files)
}
