//! SQLite persistence for benchmark runs and their results.
//!
//! One `runs` row per benchmark invocation, one `results` row per
//! (file, metric) pair; aggregate metrics are stored with a NULL
//! `file_id`.

use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unknown run status: {0}")]
    UnknownStatus(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Pending => "pending",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(RunStatus::Pending),
            "running" => Ok(RunStatus::Running),
            "completed" => Ok(RunStatus::Completed),
            "failed" => Ok(RunStatus::Failed),
            other => Err(StorageError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub dataset: String,
    pub model_name: String,
    pub status: RunStatus,
    pub error_message: Option<String>,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
}

#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub id: i64,
    pub run_id: i64,
    /// NULL for aggregate metrics.
    pub file_id: Option<String>,
    pub metric_name: String,
    pub value: f64,
    pub details: Option<serde_json::Value>,
    pub created_at: i64,
}

impl ResultRecord {
    pub fn is_aggregate(&self) -> bool {
        self.file_id.is_none()
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                dataset TEXT NOT NULL,
                model_name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT,
                started_at INTEGER,
                completed_at INTEGER,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                run_id INTEGER NOT NULL,
                file_id TEXT,
                metric_name TEXT NOT NULL,
                value REAL NOT NULL,
                details_json TEXT,
                created_at INTEGER NOT NULL,
                FOREIGN KEY (run_id) REFERENCES runs(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_runs_status ON runs(status);
            CREATE INDEX IF NOT EXISTS idx_runs_created_at ON runs(created_at);
            CREATE INDEX IF NOT EXISTS idx_results_run_id ON results(run_id);
            CREATE INDEX IF NOT EXISTS idx_results_metric_name ON results(metric_name);
            "#,
        )?;
        Ok(())
    }

    pub fn create_run(&self, dataset: &str, model_name: &str) -> Result<i64> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO runs (dataset, model_name, status, created_at) VALUES (?1, ?2, ?3, ?4)",
            (
                dataset,
                model_name,
                RunStatus::Pending.as_str(),
                Utc::now().timestamp(),
            ),
        )?;
        let id = conn.last_insert_rowid();
        debug!(run_id = id, dataset, model_name, "created run");
        Ok(id)
    }

    pub fn mark_running(&self, run_id: i64) -> Result<()> {
        self.update_status(
            run_id,
            "UPDATE runs SET status = 'running', started_at = ?1 WHERE id = ?2",
        )
    }

    pub fn mark_completed(&self, run_id: i64) -> Result<()> {
        self.update_status(
            run_id,
            "UPDATE runs SET status = 'completed', completed_at = ?1 WHERE id = ?2",
        )
    }

    pub fn mark_failed(&self, run_id: i64, message: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute(
            "UPDATE runs SET status = 'failed', error_message = ?1, completed_at = ?2 WHERE id = ?3",
            (message, Utc::now().timestamp(), run_id),
        )?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("run {run_id}")));
        }
        Ok(())
    }

    fn update_status(&self, run_id: i64, sql: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute(sql, (Utc::now().timestamp(), run_id))?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("run {run_id}")));
        }
        Ok(())
    }

    pub fn get_run(&self, run_id: i64) -> Result<RunRecord> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let row = conn
            .query_row(
                "SELECT id, dataset, model_name, status, error_message, started_at, completed_at, created_at
                 FROM runs WHERE id = ?1",
                [run_id],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<i64>>(5)?,
                        row.get::<_, Option<i64>>(6)?,
                        row.get::<_, i64>(7)?,
                    ))
                },
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StorageError::NotFound(format!("run {run_id}"))
                }
                other => StorageError::DatabaseError(other),
            })?;

        Ok(RunRecord {
            id: row.0,
            dataset: row.1,
            model_name: row.2,
            status: RunStatus::parse(&row.3)?,
            error_message: row.4,
            started_at: row.5,
            completed_at: row.6,
            created_at: row.7,
        })
    }

    pub fn list_runs(&self) -> Result<Vec<RunRecord>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, dataset, model_name, status, error_message, started_at, completed_at, created_at
             FROM runs ORDER BY created_at DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<i64>>(5)?,
                row.get::<_, Option<i64>>(6)?,
                row.get::<_, i64>(7)?,
            ))
        })?;

        let mut runs = Vec::new();
        for row in rows {
            let row = row?;
            runs.push(RunRecord {
                id: row.0,
                dataset: row.1,
                model_name: row.2,
                status: RunStatus::parse(&row.3)?,
                error_message: row.4,
                started_at: row.5,
                completed_at: row.6,
                created_at: row.7,
            });
        }
        Ok(runs)
    }

    /// Insert one per-file metric row. `details` carries the component
    /// breakdown (miss, false alarm, confusion, total) as JSON.
    pub fn insert_result(
        &self,
        run_id: i64,
        file_id: Option<&str>,
        metric_name: &str,
        value: f64,
        details: Option<&serde_json::Value>,
    ) -> Result<i64> {
        let details_json = details.map(serde_json::to_string).transpose()?;
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT INTO results (run_id, file_id, metric_name, value, details_json, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                run_id,
                file_id,
                metric_name,
                value,
                details_json,
                Utc::now().timestamp(),
            ),
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn results_for_run(&self, run_id: i64) -> Result<Vec<ResultRecord>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT id, run_id, file_id, metric_name, value, details_json, created_at
             FROM results WHERE run_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map([run_id], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, f64>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, i64>(6)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let row = row?;
            let details = match row.5 {
                Some(json) => Some(serde_json::from_str(&json)?),
                None => None,
            };
            results.push(ResultRecord {
                id: row.0,
                run_id: row.1,
                file_id: row.2,
                metric_name: row.3,
                value: row.4,
                details,
                created_at: row.6,
            });
        }
        Ok(results)
    }
}
