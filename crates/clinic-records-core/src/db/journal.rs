//! Sync journal operations.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};

use super::{Database, DbError, DbResult};
use crate::sync::SyncStrategy;

const REMOTE_FINGERPRINT: &str = "remote_fingerprint";
const REMOTE_LAST_READ: &str = "remote_last_read";
const REMOTE_LAST_WRITE: &str = "remote_last_write";
const LAST_PATIENT_NUMBER: &str = "last_patient_number";

/// What triggered a sync attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Load,
    Add,
    Update,
    /// Pending rows pushed after the remote came back
    Replay,
}

impl SyncOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncOperation::Load => "load",
            SyncOperation::Add => "add",
            SyncOperation::Update => "update",
            SyncOperation::Replay => "replay",
        }
    }

    pub(crate) fn parse(s: &str) -> DbResult<Self> {
        match s {
            "load" => Ok(SyncOperation::Load),
            "add" => Ok(SyncOperation::Add),
            "update" => Ok(SyncOperation::Update),
            "replay" => Ok(SyncOperation::Replay),
            other => Err(DbError::Invalid(format!("unknown operation '{}'", other))),
        }
    }
}

/// How a sync attempt ended.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Synced,
    Skipped,
    Failed,
    Conflict,
}

impl AttemptOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptOutcome::Synced => "synced",
            AttemptOutcome::Skipped => "skipped",
            AttemptOutcome::Failed => "failed",
            AttemptOutcome::Conflict => "conflict",
        }
    }

    fn parse(s: &str) -> DbResult<Self> {
        match s {
            "synced" => Ok(AttemptOutcome::Synced),
            "skipped" => Ok(AttemptOutcome::Skipped),
            "failed" => Ok(AttemptOutcome::Failed),
            "conflict" => Ok(AttemptOutcome::Conflict),
            other => Err(DbError::Invalid(format!("unknown outcome '{}'", other))),
        }
    }
}

/// One row of the sync log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncAttempt {
    pub attempt_id: String,
    pub attempted_at: String,
    pub operation: SyncOperation,
    pub strategy: Option<SyncStrategy>,
    pub outcome: AttemptOutcome,
    pub rows_written: u32,
    pub detail: Option<String>,
}

impl SyncAttempt {
    pub fn new(operation: SyncOperation, strategy: Option<SyncStrategy>, outcome: AttemptOutcome) -> Self {
        Self {
            attempt_id: uuid::Uuid::new_v4().to_string(),
            attempted_at: chrono::Utc::now().to_rfc3339(),
            operation,
            strategy,
            outcome,
            rows_written: 0,
            detail: None,
        }
    }

    pub fn with_rows(mut self, rows_written: u32) -> Self {
        self.rows_written = rows_written;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Database {
    /// Record a sync attempt.
    pub fn record_sync_attempt(&self, attempt: &SyncAttempt) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO sync_log (
                attempt_id, attempted_at, operation, strategy, outcome, rows_written, detail
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                attempt.attempt_id,
                attempt.attempted_at,
                attempt.operation.as_str(),
                attempt.strategy.map(|s| s.as_str()),
                attempt.outcome.as_str(),
                attempt.rows_written,
                attempt.detail,
            ],
        )?;
        Ok(())
    }

    /// Most recent attempts first.
    pub fn recent_sync_attempts(&self, limit: usize) -> DbResult<Vec<SyncAttempt>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT attempt_id, attempted_at, operation, strategy, outcome, rows_written, detail
            FROM sync_log
            ORDER BY rowid DESC
            LIMIT ?
            "#,
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?;

        let mut attempts = Vec::new();
        for row in rows {
            let (attempt_id, attempted_at, operation, strategy, outcome, rows_written, detail) = row?;
            let strategy = match strategy {
                Some(s) => Some(
                    s.parse::<SyncStrategy>()
                        .map_err(DbError::Invalid)?,
                ),
                None => None,
            };
            attempts.push(SyncAttempt {
                attempt_id,
                attempted_at,
                operation: SyncOperation::parse(&operation)?,
                strategy,
                outcome: AttemptOutcome::parse(&outcome)?,
                rows_written,
                detail,
            });
        }
        Ok(attempts)
    }

    /// Get sync state value.
    pub fn get_sync_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM sync_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set sync state value.
    pub fn set_sync_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO sync_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Fingerprint of the remote grid as last seen by this journal.
    pub fn last_remote_fingerprint(&self) -> DbResult<Option<String>> {
        let value = self.get_sync_state(REMOTE_FINGERPRINT)?;
        Ok(value.filter(|s| !s.is_empty()))
    }

    pub fn set_remote_fingerprint(&self, fingerprint: &str) -> DbResult<()> {
        self.set_sync_state(REMOTE_FINGERPRINT, fingerprint)
    }

    /// Record a successful full read of the remote.
    pub fn note_remote_read(&self, fingerprint: &str) -> DbResult<()> {
        self.set_remote_fingerprint(fingerprint)?;
        self.set_sync_state(REMOTE_LAST_READ, &chrono::Utc::now().to_rfc3339())
    }

    /// Record a successful write to the remote.
    pub fn note_remote_write(&self, fingerprint: &str) -> DbResult<()> {
        self.set_remote_fingerprint(fingerprint)?;
        self.set_sync_state(REMOTE_LAST_WRITE, &chrono::Utc::now().to_rfc3339())
    }

    /// Highest patient number this journal has seen issued.
    pub fn last_patient_number(&self) -> DbResult<Option<u64>> {
        let value = self.get_sync_state(LAST_PATIENT_NUMBER)?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    /// Remember an issued patient number; lower numbers never replace it.
    pub fn note_patient_number(&self, number: u64) -> DbResult<()> {
        if self.last_patient_number()?.is_some_and(|last| last >= number) {
            return Ok(());
        }
        self.set_sync_state(LAST_PATIENT_NUMBER, &number.to_string())
    }
}
