//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use diabench_storage::{Database, ResultRecord, RunStatus, StorageError};
use serde_json::json;

fn create_test_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

// =============================================================================
// Database Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("bench.db");

        let db = Database::open(&db_path);
        assert!(db.is_ok(), "Should create file-based database");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_reopen_existing_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("bench.db");

        // Create a run and close the database
        {
            let db = Database::open(&db_path).unwrap();
            db.create_run("ami", "mock").unwrap();
        }

        // Reopen and verify the run persists
        {
            let db = Database::open(&db_path).unwrap();
            let runs = db.list_runs().unwrap();
            assert_eq!(runs.len(), 1, "Run should persist after reopen");
            assert_eq!(runs[0].dataset, "ami");
        }
    }

    #[test]
    fn test_invalid_path_fails() {
        let result = Database::open(&PathBuf::from("/nonexistent/path/bench.db"));
        assert!(result.is_err(), "Should fail with invalid path");
    }
}

// =============================================================================
// Run Lifecycle Tests
// =============================================================================

mod runs {
    use super::*;

    #[test]
    fn test_create_run_starts_pending() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        let run = db.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Pending);
        assert_eq!(run.model_name, "mock");
        assert!(run.started_at.is_none());
        assert!(run.completed_at.is_none());
        assert!(run.created_at > 0);
    }

    #[test]
    fn test_status_transitions() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        db.mark_running(run_id).unwrap();
        let run = db.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.started_at.is_some());

        db.mark_completed(run_id).unwrap();
        let run = db.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.completed_at.is_some());
    }

    #[test]
    fn test_mark_failed_records_message() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        db.mark_failed(run_id, "no RTTM files found").unwrap();
        let run = db.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error_message.as_deref(), Some("no RTTM files found"));
        assert!(run.completed_at.is_some());
    }

    #[test]
    fn test_missing_run_is_not_found() {
        let db = create_test_db();
        assert!(matches!(db.get_run(999), Err(StorageError::NotFound(_))));
        assert!(matches!(
            db.mark_running(999),
            Err(StorageError::NotFound(_))
        ));
        assert!(matches!(
            db.mark_failed(999, "x"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn test_list_runs_returns_all() {
        let db = create_test_db();
        db.create_run("ami", "mock").unwrap();
        db.create_run("sequestered", "mock").unwrap();

        let runs = db.list_runs().unwrap();
        assert_eq!(runs.len(), 2);
    }
}

// =============================================================================
// Result Tests
// =============================================================================

mod results {
    use super::*;

    #[test]
    fn test_insert_and_read_per_file_result() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        let details = json!({
            "miss": 1.5,
            "false_alarm": 0.25,
            "confusion": 0.75,
            "total": 10.0
        });
        db.insert_result(run_id, Some("ES2002a"), "DER", 0.25, Some(&details))
            .unwrap();
        db.insert_result(run_id, Some("ES2002a"), "JER", 0.31, None)
            .unwrap();

        let results = db.results_for_run(run_id).unwrap();
        assert_eq!(results.len(), 2);

        let der: &ResultRecord = &results[0];
        assert_eq!(der.metric_name, "DER");
        assert_eq!(der.file_id.as_deref(), Some("ES2002a"));
        assert!(!der.is_aggregate());
        assert_eq!(der.details.as_ref().unwrap()["total"], 10.0);

        assert!(results[1].details.is_none());
    }

    #[test]
    fn test_aggregate_rows_have_null_file_id() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        db.insert_result(run_id, None, "DER_mean", 0.2, None).unwrap();

        let results = db.results_for_run(run_id).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_aggregate());
    }

    #[test]
    fn test_results_are_scoped_to_their_run() {
        let db = create_test_db();
        let run_a = db.create_run("ami", "mock").unwrap();
        let run_b = db.create_run("ami", "mock").unwrap();

        db.insert_result(run_a, Some("f1"), "DER", 0.1, None).unwrap();
        db.insert_result(run_b, Some("f1"), "DER", 0.9, None).unwrap();

        let results = db.results_for_run(run_a).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].value, 0.1);
    }

    #[test]
    fn test_results_keep_insertion_order() {
        let db = create_test_db();
        let run_id = db.create_run("ami", "mock").unwrap();

        for (file, value) in [("f1", 0.1), ("f2", 0.2), ("f3", 0.3)] {
            db.insert_result(run_id, Some(file), "DER", value, None)
                .unwrap();
        }

        let results = db.results_for_run(run_id).unwrap();
        let files: Vec<_> = results.iter().filter_map(|r| r.file_id.as_deref()).collect();
        assert_eq!(files, vec!["f1", "f2", "f3"]);
    }
}
