//! SQLite schema definition.

/// Sync journal schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Sync State (key/value)
-- ============================================================================

CREATE TABLE IF NOT EXISTS sync_state (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL DEFAULT '',
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

INSERT OR IGNORE INTO sync_state (key, value) VALUES ('remote_fingerprint', '');
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('remote_last_read', '');
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('remote_last_write', '');
INSERT OR IGNORE INTO sync_state (key, value) VALUES ('last_patient_number', '');

-- ============================================================================
-- Sync Log (append-only)
-- ============================================================================

CREATE TABLE IF NOT EXISTS sync_log (
    attempt_id TEXT PRIMARY KEY,
    attempted_at TEXT NOT NULL,
    operation TEXT NOT NULL,                     -- load, add, update, replay
    strategy TEXT,                               -- append, overwrite; NULL for reads
    outcome TEXT NOT NULL CHECK (outcome IN ('synced', 'skipped', 'failed', 'conflict')),
    rows_written INTEGER NOT NULL DEFAULT 0,
    detail TEXT
);

CREATE INDEX IF NOT EXISTS idx_sync_log_attempted_at ON sync_log(attempted_at);

-- ============================================================================
-- Pending Rows (local writes the remote has not accepted yet)
-- ============================================================================

CREATE TABLE IF NOT EXISTS pending_rows (
    pending_id INTEGER PRIMARY KEY AUTOINCREMENT,
    queued_at TEXT NOT NULL,
    operation TEXT NOT NULL,                     -- add, update
    record_json TEXT NOT NULL
);
"#;
