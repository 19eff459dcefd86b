use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::testing::RunReport;

const DATA_DIR: &str = ".petcheck";
const DB_FILE: &str = "petcheck.db";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create data directory `{}`: {source}", .path.display())]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report `{}`: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One row of the `runs` table without the full report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRun {
    pub id: i64,
    pub started_at: u64,
    pub environment: Option<String>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
}

pub fn default_data_dir() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(DATA_DIR)
}

pub fn open_db(data_dir: &Path) -> Result<Connection, StoreError> {
    fs::create_dir_all(data_dir).map_err(|source| StoreError::DataDir {
        path: data_dir.to_path_buf(),
        source,
    })?;

    let conn = Connection::open(data_dir.join(DB_FILE))?;
    conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS runs (
         id INTEGER PRIMARY KEY AUTOINCREMENT,
         started_at INTEGER NOT NULL,
         environment TEXT,
         total INTEGER NOT NULL,
         passed INTEGER NOT NULL,
         failed INTEGER NOT NULL,
         duration_ms INTEGER NOT NULL,
         report_json TEXT NOT NULL
       );",
    )?;

    Ok(conn)
}

pub fn insert_run(conn: &Connection, report: &RunReport) -> Result<i64, StoreError> {
    let report_json = serde_json::to_string(report)?;
    conn.execute(
        "INSERT INTO runs (started_at, environment, total, passed, failed, duration_ms, report_json)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
        params![
            report.started_at as i64,
            report.environment,
            report.total as i64,
            report.passed as i64,
            report.failed as i64,
            report.duration_ms as i64,
            report_json,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Most recent runs first.
pub fn recent_runs(conn: &Connection, limit: usize) -> Result<Vec<StoredRun>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id, started_at, environment, total, passed, failed, duration_ms
       FROM runs ORDER BY id DESC LIMIT ?1;",
    )?;
    let rows = stmt.query_map(params![limit as i64], |row| {
        Ok(StoredRun {
            id: row.get(0)?,
            started_at: row.get::<_, i64>(1)? as u64,
            environment: row.get(2)?,
            total: row.get::<_, i64>(3)? as usize,
            passed: row.get::<_, i64>(4)? as usize,
            failed: row.get::<_, i64>(5)? as usize,
            duration_ms: row.get::<_, i64>(6)? as u64,
        })
    })?;

    let mut runs = Vec::new();
    for row in rows {
        runs.push(row?);
    }
    Ok(runs)
}

pub fn load_report(conn: &Connection, id: i64) -> Result<Option<RunReport>, StoreError> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT report_json FROM runs WHERE id = ?1 LIMIT 1;",
            params![id],
            |row| row.get(0),
        )
        .optional()?;

    match raw {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub fn write_report(path: &Path, contents: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StoreError::DataDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, contents).map_err(|source| StoreError::WriteReport {
        path: path.to_path_buf(),
        source,
    })
}
