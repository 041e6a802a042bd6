//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The pipeline hands complete values to store methods; stages never
//! execute SQL.

use crate::{
    error::{PipelineError, PipelineResult},
    event::EventLogEntry,
};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

mod report;
mod snapshot;

pub use report::NewRun;

pub struct CollectionStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

/// A persisted pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: String,
    pub seed: Option<u64>,
    pub version: String,
    pub fingerprint: String,
    pub eligible_customers: Option<u64>,
    pub created_at: String,
}

impl CollectionStore {
    pub fn open(path: &str) -> PipelineResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PipelineResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    /// Reopen a new connection to the same database.
    /// For in-memory databases, this returns a new in-memory database (isolated).
    pub fn reopen(&self) -> PipelineResult<Self> {
        match &self.path {
            Some(p) => Self::open(p),
            None => Self::in_memory(),
        }
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PipelineResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_snapshot.sql"))?;
        self.conn
            .execute_batch(include_str!("../../../migrations/002_runs.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(
        &self,
        run_id: &str,
        seed: Option<u64>,
        version: &str,
        fingerprint: &str,
    ) -> PipelineResult<()> {
        insert_run_row(&self.conn, run_id, seed, version, fingerprint)
    }

    pub fn run(&self, run_id: &str) -> PipelineResult<RunRecord> {
        self.conn
            .query_row(
                "SELECT run_id, seed, version, fingerprint, eligible_customers, created_at
                 FROM pipeline_run WHERE run_id = ?1",
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or_else(|| PipelineError::RunNotFound {
                run_id: run_id.to_string(),
            })
    }

    /// All runs, oldest first.
    pub fn runs(&self) -> PipelineResult<Vec<RunRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id, seed, version, fingerprint, eligible_customers, created_at
             FROM pipeline_run ORDER BY created_at ASC, run_id ASC",
        )?;
        let rows = stmt
            .query_map([], run_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> PipelineResult<()> {
        insert_event_row(&self.conn, entry)
    }

    pub fn events_for_run(&self, run_id: &str) -> PipelineResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, run_id, seq, event_type, payload
             FROM run_event WHERE run_id = ?1
             ORDER BY seq ASC",
        )?;
        let entries = stmt
            .query_map(params![run_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    run_id: row.get(1)?,
                    seq: row.get::<_, i64>(2)? as u64,
                    event_type: row.get(3)?,
                    payload: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn insert_run_row(
    conn: &Connection,
    run_id: &str,
    seed: Option<u64>,
    version: &str,
    fingerprint: &str,
) -> PipelineResult<()> {
    conn.execute(
        "INSERT INTO pipeline_run (run_id, seed, version, fingerprint, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            run_id,
            seed.map(|s| s as i64),
            version,
            fingerprint,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn insert_event_row(conn: &Connection, entry: &EventLogEntry) -> PipelineResult<()> {
    conn.execute(
        "INSERT INTO run_event (run_id, seq, event_type, payload)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            entry.run_id,
            entry.seq as i64,
            entry.event_type,
            entry.payload,
        ],
    )?;
    Ok(())
}

fn run_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        run_id: row.get(0)?,
        seed: row.get::<_, Option<i64>>(1)?.map(|s| s as u64),
        version: row.get(2)?,
        fingerprint: row.get(3)?,
        eligible_customers: row.get::<_, Option<i64>>(4)?.map(|n| n as u64),
        created_at: row.get(5)?,
    })
}

/// Parse a stored label back into its serde-named enum.
fn from_label<T: DeserializeOwned>(table: &str, row: usize, label: String) -> PipelineResult<T> {
    serde_json::from_value(serde_json::Value::String(label)).map_err(|e| {
        PipelineError::MalformedRecord {
            table: table.to_string(),
            row,
            reason: e.to_string(),
        }
    })
}
