//! Rows written locally that the remote mirror has not accepted yet.

use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::{Database, DbResult, SyncOperation};
use crate::models::Record;

/// One queued row, replayed to the remote on the next successful load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PendingRow {
    pub pending_id: i64,
    pub queued_at: String,
    pub operation: SyncOperation,
    /// The full row as written locally
    pub record: Record,
}

impl Database {
    /// Queue a row whose push to the remote failed.
    pub fn queue_pending_row(&self, operation: SyncOperation, record: &Record) -> DbResult<()> {
        let record_json = serde_json::to_string(record)?;
        self.conn.execute(
            "INSERT INTO pending_rows (queued_at, operation, record_json) VALUES (?1, ?2, ?3)",
            params![chrono::Utc::now().to_rfc3339(), operation.as_str(), record_json],
        )?;
        Ok(())
    }

    /// Queued rows, oldest first.
    pub fn pending_rows(&self) -> DbResult<Vec<PendingRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT pending_id, queued_at, operation, record_json FROM pending_rows ORDER BY pending_id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut pending = Vec::new();
        for row in rows {
            let (pending_id, queued_at, operation, record_json) = row?;
            pending.push(PendingRow {
                pending_id,
                queued_at,
                operation: SyncOperation::parse(&operation)?,
                record: serde_json::from_str(&record_json)?,
            });
        }
        Ok(pending)
    }

    /// Drop queued rows up to and including `pending_id`.
    pub fn clear_pending_rows(&self, up_to: i64) -> DbResult<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM pending_rows WHERE pending_id <= ?", [up_to])?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    #[test]
    fn test_queue_and_clear() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.pending_rows().unwrap().is_empty());

        let sara = Record::new().with(Field::PatientId, "0001").with(Field::FullName, "Sara");
        let omar = Record::new().with(Field::PatientId, "0002").with(Field::FullName, "Omar");
        db.queue_pending_row(SyncOperation::Add, &sara).unwrap();
        db.queue_pending_row(SyncOperation::Update, &omar).unwrap();

        let pending = db.pending_rows().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].record, sara);
        assert_eq!(pending[0].operation, SyncOperation::Add);
        assert_eq!(pending[1].record, omar);

        assert_eq!(db.clear_pending_rows(pending[0].pending_id).unwrap(), 1);
        let left = db.pending_rows().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].record.get(Field::FullName), "Omar");
    }
}
