//! The record store: one table, a local file and an optional remote mirror.
//!
//! Writes always land in the local file first. The remote mirror is synced
//! afterwards on a best-effort basis; a remote failure is reported back to the
//! caller but never undoes the local write.

mod ids;
mod search;

pub use ids::*;
pub use search::*;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StoreConfig;
use crate::db::{AttemptOutcome, Database, DbError, DbResult, PendingRow, SyncAttempt, SyncOperation};
use crate::local::{LocalError, LocalFile};
use crate::models::{
    AppointmentPartition, Field, Record, RecordStatus, Schema, Table, IDENTITY_FIELDS,
};
use crate::remote::{RemoteError, RemoteSheet};
use crate::sync::{self, SyncStrategy};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write local file: {0}")]
    LocalWrite(#[source] LocalError),

    #[error("Failed to read local file: {0}")]
    LocalRead(#[source] LocalError),

    #[error("Expected exactly one record with patient id '{patient_id}', found {matches}")]
    DuplicateOrMissingId { patient_id: String, matches: usize },

    #[error("Missing required field: {0}")]
    MissingField(Field),

    #[error("{0} identifies the record and cannot be changed by an update")]
    IdentityChange(Field),

    #[error("Journal error: {0}")]
    Journal(#[from] DbError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Where a loaded table came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSource {
    Remote,
    Local,
    Empty,
}

/// Result of [`RecordStore::load`].
#[derive(Debug, Clone)]
pub struct Loaded {
    pub table: Table,
    pub source: LoadSource,
    /// Soft failures to show the user
    pub warnings: Vec<String>,
}

/// What happened to the remote mirror after a local write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Synced {
        strategy: SyncStrategy,
        rows_written: usize,
    },
    /// No remote mirror is configured
    Skipped,
    Failed(String),
    Conflict(String),
}

impl SyncStatus {
    pub fn is_synced(&self) -> bool {
        matches!(self, SyncStatus::Synced { .. })
    }

    /// Message to surface to the user, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            SyncStatus::Failed(msg) => Some(format!("Saved locally; remote sync failed: {}", msg)),
            SyncStatus::Conflict(msg) => Some(format!("Saved locally; remote not updated: {}", msg)),
            SyncStatus::Synced { .. } | SyncStatus::Skipped => None,
        }
    }
}

/// Result of a successful add or update.
#[derive(Debug, Clone)]
pub struct Saved {
    /// The table as now stored locally
    pub table: Table,
    /// Id of the added or updated record, when the schema has ids
    pub patient_id: Option<String>,
    pub sync: SyncStatus,
    /// The updated record was removed from the local file after syncing
    pub pruned: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    pub prune_after_update: bool,
}

struct Mirror {
    sheet: Box<dyn RemoteSheet>,
    strategy: SyncStrategy,
}

/// Mediates every read and write of the record table.
pub struct RecordStore {
    schema: Schema,
    local: LocalFile,
    journal: Database,
    mirror: Option<Mirror>,
    options: StoreOptions,
}

impl RecordStore {
    pub fn new(schema: Schema, local: LocalFile, journal: Database) -> Self {
        Self {
            schema,
            local,
            journal,
            mirror: None,
            options: StoreOptions::default(),
        }
    }

    /// Open the store described by a config, with an already connected remote.
    pub fn open(config: &StoreConfig, remote: Option<Box<dyn RemoteSheet>>) -> StoreResult<Self> {
        let journal_path = config.journal_path();
        if let Some(parent) = journal_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::LocalWrite(e.into()))?;
        }
        let journal = Database::open(journal_path)?;
        let mut store = Self::new(
            Schema::for_kind(config.schema),
            LocalFile::new(&config.local_path),
            journal,
        )
        .with_options(StoreOptions {
            prune_after_update: config.prune_after_update,
        });

        if let Some(remote) = remote {
            let strategy = config
                .active_remote()
                .map(|r| r.strategy)
                .unwrap_or_default();
            store = store.with_remote(remote, strategy);
        }
        Ok(store)
    }

    pub fn with_remote(mut self, sheet: Box<dyn RemoteSheet>, strategy: SyncStrategy) -> Self {
        self.mirror = Some(Mirror { sheet, strategy });
        self
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn local(&self) -> &LocalFile {
        &self.local
    }

    pub fn journal(&self) -> &Database {
        &self.journal
    }

    pub fn has_remote(&self) -> bool {
        self.mirror.is_some()
    }

    /// Load the table, preferring the remote mirror.
    ///
    /// A successful remote read refreshes the local file. Rows still queued
    /// from earlier failed syncs are merged in and replayed to the remote
    /// first, so they survive the refresh. Any remote failure becomes a
    /// warning and the local file is used instead; it is created with the
    /// full header if missing.
    pub fn load(&self) -> StoreResult<Loaded> {
        let mut warnings = Vec::new();

        if let Some(mirror) = &self.mirror {
            match sync::read_snapshot(mirror.sheet.as_ref()) {
                Ok(snapshot) => {
                    self.note(self.journal.note_remote_read(&snapshot.fingerprint));

                    let mut table = Table::from_grid(self.schema.clone(), &snapshot.grid);
                    let pending = self.pending_rows();
                    for row in &pending {
                        table.push(row.record.clone());
                    }
                    let table = table.fold_versions();

                    self.note(self.journal.record_sync_attempt(
                        &SyncAttempt::new(SyncOperation::Load, None, AttemptOutcome::Synced)
                            .with_detail(format!("{} rows", table.len())),
                    ));
                    if !pending.is_empty() {
                        if let Err(warning) = self.replay(mirror, &table, &pending, &snapshot.fingerprint) {
                            warnings.push(warning);
                        }
                    }

                    if let Err(e) = self.local.write(&table) {
                        tracing::warn!(error = %e, "failed to refresh local cache");
                        warnings.push(format!("Could not refresh local copy: {}", e));
                    }
                    tracing::debug!(rows = table.len(), remote = %mirror.sheet.describe(), "loaded from remote");

                    warnings.extend(collision_warnings(&table));
                    return Ok(Loaded {
                        table,
                        source: LoadSource::Remote,
                        warnings,
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, remote = %mirror.sheet.describe(), "remote load failed, using local file");
                    warnings.push(format!("Failed to load from {}: {}", mirror.sheet.describe(), e));
                    self.note(self.journal.record_sync_attempt(
                        &SyncAttempt::new(SyncOperation::Load, None, AttemptOutcome::Failed)
                            .with_detail(e.to_string()),
                    ));
                }
            }
        }

        let created = match self.local.ensure_exists(&self.schema) {
            Ok(created) => created,
            Err(e) => {
                tracing::warn!(error = %e, path = %self.local.path().display(), "cannot create local file");
                warnings.push(format!("Could not create local file: {}", e));
                false
            }
        };

        let table = self
            .local
            .read(&self.schema)
            .map_err(StoreError::LocalRead)?
            .unwrap_or_else(|| Table::empty(self.schema.clone()));

        let source = if created || table.is_empty() {
            LoadSource::Empty
        } else {
            LoadSource::Local
        };

        warnings.extend(collision_warnings(&table));
        Ok(Loaded {
            table,
            source,
            warnings,
        })
    }

    /// Add one record.
    ///
    /// Unsupplied columns are stored empty. In schemas with patient ids a
    /// missing id is assigned with [`next_patient_id`]; a supplied id must not
    /// exist yet. `table` itself is never modified.
    pub fn add_record(&self, table: &Table, fields: Record) -> StoreResult<Saved> {
        let mut record = fields;
        record.restrict_to(&self.schema);

        if let Some(field) = self
            .schema
            .required()
            .iter()
            .find(|f| record.is_blank(**f))
        {
            return Err(StoreError::MissingField(*field));
        }

        let patient_id = if self.schema.has(Field::PatientId) {
            if record.is_blank(Field::PatientId) {
                record.set(Field::PatientId, self.allocate_patient_id(table));
            } else {
                let id = record.get(Field::PatientId);
                let matches = table.positions_of(id).len();
                if matches > 0 {
                    return Err(StoreError::DuplicateOrMissingId {
                        patient_id: id.to_string(),
                        matches,
                    });
                }
            }
            Some(record.get(Field::PatientId).to_string())
        } else {
            None
        };

        if self.schema.has(Field::Date) && record.is_blank(Field::Date) {
            record.set(Field::Date, today().format("%Y-%m-%d").to_string());
        }

        let mut next = table.clone();
        next.push(record.clone());
        self.local.write(&next).map_err(StoreError::LocalWrite)?;
        tracing::info!(patient_id = ?patient_id, rows = next.len(), "record added");

        if let Some(number) = patient_id.as_deref().and_then(parse_patient_number) {
            self.note(self.journal.note_patient_number(number));
        }

        let sync = self.sync(SyncOperation::Add, &next, &record);
        Ok(Saved {
            table: next,
            patient_id,
            sync,
            pruned: false,
        })
    }

    /// Overwrite the supplied fields of the record with `patient_id`.
    ///
    /// Exactly one row must match. The id itself is never changed, and a
    /// different name or visit date is refused: those fields decide which
    /// remote rows are versions of this record.
    pub fn update_record(&self, table: &Table, patient_id: &str, fields: &Record) -> StoreResult<Saved> {
        let positions = table.positions_of(patient_id);
        let &[index] = positions.as_slice() else {
            return Err(StoreError::DuplicateOrMissingId {
                patient_id: patient_id.trim().to_string(),
                matches: positions.len(),
            });
        };

        let mut changes = fields.clone();
        changes.set(Field::PatientId, "");

        if let Some(current) = table.get(index) {
            if let Some(field) = IDENTITY_FIELDS
                .iter()
                .filter(|f| self.schema.has(**f))
                .find(|f| !changes.is_blank(**f) && changes.get(**f) != current.get(**f))
            {
                return Err(StoreError::IdentityChange(*field));
            }
        }

        let mut next = table.clone();
        next.apply(index, &changes);
        self.local.write(&next).map_err(StoreError::LocalWrite)?;
        tracing::info!(patient_id = %patient_id, fields = changes.fields().count(), "record updated");

        let updated = next.get(index).cloned().unwrap_or_default();
        let sync = self.sync(SyncOperation::Update, &next, &updated);

        let mut pruned = false;
        if self.options.prune_after_update && sync.is_synced() {
            let mut kept = next.clone();
            kept.remove(index);
            match self.local.write(&kept) {
                Ok(()) => {
                    tracing::info!(patient_id = %patient_id, "pruned updated record from local file");
                    next = kept;
                    pruned = true;
                }
                Err(e) => tracing::warn!(error = %e, "failed to prune updated record"),
            }
        }

        Ok(Saved {
            table: next,
            patient_id: Some(patient_id.trim().to_string()),
            sync,
            pruned,
        })
    }

    /// Push `table` to the remote mirror, if one is configured.
    ///
    /// When the push does not go through, `written` is queued for replay on
    /// the next successful load.
    fn sync(&self, operation: SyncOperation, table: &Table, written: &Record) -> SyncStatus {
        let Some(mirror) = &self.mirror else {
            return SyncStatus::Skipped;
        };

        let last_known = match self.journal.last_remote_fingerprint() {
            Ok(fp) => fp,
            Err(e) => {
                tracing::warn!(error = %e, "cannot read last remote fingerprint");
                None
            }
        };

        let attempt = |outcome| SyncAttempt::new(operation, Some(mirror.strategy), outcome);

        match sync::push(mirror.sheet.as_ref(), table, mirror.strategy, last_known.as_deref()) {
            Ok(outcome) => {
                self.note(self.journal.note_remote_write(&outcome.fingerprint));
                self.note(self.journal.record_sync_attempt(
                    &attempt(AttemptOutcome::Synced).with_rows(outcome.rows_written as u32),
                ));
                tracing::info!(
                    strategy = %mirror.strategy,
                    rows = outcome.rows_written,
                    remote = %mirror.sheet.describe(),
                    "remote synced"
                );
                SyncStatus::Synced {
                    strategy: mirror.strategy,
                    rows_written: outcome.rows_written,
                }
            }
            Err(RemoteError::Conflict(msg)) => {
                tracing::warn!(remote = %mirror.sheet.describe(), "{}", msg);
                self.note(self.journal.record_sync_attempt(
                    &attempt(AttemptOutcome::Conflict).with_detail(msg.clone()),
                ));
                self.note(self.journal.queue_pending_row(operation, written));
                SyncStatus::Conflict(msg)
            }
            Err(e) => {
                tracing::warn!(error = %e, remote = %mirror.sheet.describe(), "remote sync failed");
                self.note(self.journal.record_sync_attempt(
                    &attempt(AttemptOutcome::Failed).with_detail(e.to_string()),
                ));
                self.note(self.journal.queue_pending_row(operation, written));
                SyncStatus::Failed(e.to_string())
            }
        }
    }

    /// Push a table that includes queued rows; the queue is cleared on success.
    ///
    /// Returns the warning to show when the rows are still waiting.
    fn replay(
        &self,
        mirror: &Mirror,
        table: &Table,
        pending: &[PendingRow],
        fingerprint: &str,
    ) -> Result<(), String> {
        let attempt = |outcome| SyncAttempt::new(SyncOperation::Replay, Some(mirror.strategy), outcome);

        match sync::push(mirror.sheet.as_ref(), table, mirror.strategy, Some(fingerprint)) {
            Ok(outcome) => {
                self.note(self.journal.note_remote_write(&outcome.fingerprint));
                self.note(self.journal.record_sync_attempt(
                    &attempt(AttemptOutcome::Synced).with_rows(outcome.rows_written as u32),
                ));
                if let Some(last) = pending.last() {
                    if let Err(e) = self.journal.clear_pending_rows(last.pending_id) {
                        tracing::warn!(error = %e, "failed to clear replayed rows");
                    }
                }
                tracing::info!(
                    pending = pending.len(),
                    rows = outcome.rows_written,
                    remote = %mirror.sheet.describe(),
                    "replayed pending rows"
                );
                Ok(())
            }
            Err(e) => {
                let outcome = match &e {
                    RemoteError::Conflict(_) => AttemptOutcome::Conflict,
                    _ => AttemptOutcome::Failed,
                };
                tracing::warn!(error = %e, remote = %mirror.sheet.describe(), "replay of pending rows failed");
                self.note(self.journal.record_sync_attempt(&attempt(outcome).with_detail(e.to_string())));
                Err(format!(
                    "{} local change(s) not yet on {}: {}",
                    pending.len(),
                    mirror.sheet.describe(),
                    e
                ))
            }
        }
    }

    fn pending_rows(&self) -> Vec<PendingRow> {
        self.journal.pending_rows().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot read pending rows");
            Vec::new()
        })
    }

    /// Next id from the table, never below one this journal already issued.
    fn allocate_patient_id(&self, table: &Table) -> String {
        let from_table = next_patient_id(table);
        let issued = self.journal.last_patient_number().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "cannot read last issued patient number");
            None
        });
        match (issued, parse_patient_number(&from_table)) {
            (Some(last), Some(next)) if last >= next => format_patient_id(last.saturating_add(1)),
            _ => from_table,
        }
    }

    /// Journal writes never fail an operation.
    fn note(&self, result: DbResult<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "sync journal write failed");
        }
    }
}

/// Split records into (waiting, seen), preserving order.
pub fn partition_waiting(table: &Table) -> (Table, Table) {
    let waiting = table.filtered(|_, status| status == RecordStatus::Waiting);
    let seen = table.filtered(|_, status| status == RecordStatus::Seen);
    (waiting, seen)
}

/// Split appointments around the day before `today`.
pub fn partition_appointments(table: &Table, today: NaiveDate) -> AppointmentPartition {
    AppointmentPartition::split(table, today)
}

fn collision_warnings(table: &Table) -> Vec<String> {
    table
        .colliding_ids()
        .into_iter()
        .map(|id| {
            tracing::warn!(patient_id = %id, "patient id shared by different records");
            format!(
                "Patient id {} is shared by {} different records; updates to it are refused until one is renumbered",
                id,
                table.positions_of(&id).len()
            )
        })
        .collect()
}

/// The record with `patient_id`, if exactly one exists.
pub fn find<'a>(table: &'a Table, patient_id: &str) -> Option<&'a Record> {
    match table.positions_of(patient_id).as_slice() {
        &[index] => table.get(index),
        _ => None,
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemorySheet;

    fn local_store(dir: &tempfile::TempDir, schema: Schema) -> RecordStore {
        RecordStore::new(
            schema,
            LocalFile::new(dir.path().join("records.csv")),
            Database::open_in_memory().unwrap(),
        )
    }

    fn intake(name: &str) -> Record {
        Record::new()
            .with(Field::FullName, name)
            .with(Field::Age, "54")
            .with(Field::Date, "2024-06-10")
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let table = store.load().unwrap().table;

        let first = store.add_record(&table, intake("Sara")).unwrap();
        assert_eq!(first.patient_id.as_deref(), Some("0001"));
        assert_eq!(first.sync, SyncStatus::Skipped);

        let second = store.add_record(&first.table, intake("Omar")).unwrap();
        assert_eq!(second.patient_id.as_deref(), Some("0002"));
        assert_eq!(second.table.len(), 2);
    }

    #[test]
    fn test_add_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let table = Table::empty(Schema::patients());

        let err = store
            .add_record(&table, Record::new().with(Field::Age, "40"))
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField(Field::FullName)));
        assert!(!store.local().exists());
    }

    #[test]
    fn test_add_rejects_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();

        let err = store
            .add_record(&saved.table, intake("Omar").with(Field::PatientId, "0001"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrMissingId { matches: 1, .. }));
    }

    #[test]
    fn test_add_defaults_date_to_today() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let saved = store
            .add_record(&Table::empty(Schema::patients()), Record::new().with(Field::FullName, "Sara"))
            .unwrap();
        assert_eq!(
            saved.table.get(0).unwrap().get(Field::Date),
            today().format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn test_update_moves_record_to_seen() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();

        let (waiting, seen) = partition_waiting(&saved.table);
        assert_eq!((waiting.len(), seen.len()), (1, 0));

        let updated = store
            .update_record(
                &saved.table,
                "0001",
                &Record::new()
                    .with(Field::Diagnosis, "Cataract")
                    .with(Field::PatientId, "9999"),
            )
            .unwrap();

        let record = find(&updated.table, "0001").unwrap();
        assert_eq!(record.get(Field::Diagnosis), "Cataract");
        assert_eq!(record.get(Field::Age), "54");

        let (waiting, seen) = partition_waiting(&updated.table);
        assert_eq!((waiting.len(), seen.len()), (0, 1));

        let reloaded = store.load().unwrap().table;
        assert_eq!(reloaded, updated.table);
    }

    #[test]
    fn test_update_duplicate_ids_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let table = Table::from_records(
            Schema::patients(),
            vec![
                intake("Sara").with(Field::PatientId, "0001"),
                intake("Sara B").with(Field::PatientId, "0001"),
            ],
        );

        let err = store
            .update_record(&table, "0001", &Record::new().with(Field::Plan, "x"))
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateOrMissingId { matches: 2, .. }));
    }

    #[test]
    fn test_local_write_failure_leaves_table() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes the rename fail.
        std::fs::create_dir(dir.path().join("records.csv")).unwrap();
        let store = local_store(&dir, Schema::patients());
        let table = Table::empty(Schema::patients());

        let err = store.add_record(&table, intake("Sara")).unwrap_err();
        assert!(matches!(err, StoreError::LocalWrite(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_sync_failure_keeps_local_write() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = MemorySheet::new();
        sheet.set_available(false);
        let store = local_store(&dir, Schema::patients())
            .with_remote(Box::new(sheet.clone()), SyncStrategy::Append);

        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();
        assert!(matches!(saved.sync, SyncStatus::Failed(_)));
        assert!(saved.sync.warning().is_some());
        assert_eq!(
            store.local().read(&Schema::patients()).unwrap().unwrap().len(),
            1
        );

        let attempts = store.journal().recent_sync_attempts(5).unwrap();
        assert_eq!(attempts[0].outcome, AttemptOutcome::Failed);

        let pending = store.journal().pending_rows().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].record.get(Field::FullName), "Sara");
    }

    #[test]
    fn test_update_refuses_identity_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = local_store(&dir, Schema::patients());
        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();

        let err = store
            .update_record(&saved.table, "0001", &Record::new().with(Field::FullName, "Sarah"))
            .unwrap_err();
        assert!(matches!(err, StoreError::IdentityChange(Field::FullName)));

        // Restating the current value is not a change.
        let same = Record::new()
            .with(Field::Date, "2024-06-10")
            .with(Field::Plan, "Review");
        assert!(store.update_record(&saved.table, "0001", &same).is_ok());
    }

    #[test]
    fn test_pruned_id_is_not_reused() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = MemorySheet::new();
        let store = local_store(&dir, Schema::patients())
            .with_remote(Box::new(sheet.clone()), SyncStrategy::Append)
            .with_options(StoreOptions {
                prune_after_update: true,
            });

        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();
        let updated = store
            .update_record(&saved.table, "0001", &Record::new().with(Field::Plan, "Surgery"))
            .unwrap();
        assert!(updated.table.is_empty());

        let next = store.add_record(&updated.table, intake("Omar")).unwrap();
        assert_eq!(next.patient_id.as_deref(), Some("0002"));
    }

    #[test]
    fn test_prune_after_synced_update() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = MemorySheet::new();
        let store = local_store(&dir, Schema::patients())
            .with_remote(Box::new(sheet.clone()), SyncStrategy::Overwrite)
            .with_options(StoreOptions {
                prune_after_update: true,
            });

        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();
        let updated = store
            .update_record(&saved.table, "0001", &Record::new().with(Field::Plan, "Surgery"))
            .unwrap();

        assert!(updated.pruned);
        assert!(updated.table.is_empty());
        assert!(store.local().read(&Schema::patients()).unwrap().unwrap().is_empty());
        // The mirror keeps the completed record.
        assert_eq!(sheet.grid()[1][0], "0001");
    }

    #[test]
    fn test_no_prune_when_sync_fails() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = MemorySheet::new();
        let store = local_store(&dir, Schema::patients())
            .with_remote(Box::new(sheet.clone()), SyncStrategy::Append)
            .with_options(StoreOptions {
                prune_after_update: true,
            });

        let saved = store
            .add_record(&Table::empty(Schema::patients()), intake("Sara"))
            .unwrap();
        sheet.set_available(false);
        let updated = store
            .update_record(&saved.table, "0001", &Record::new().with(Field::Plan, "Surgery"))
            .unwrap();

        assert!(!updated.pruned);
        assert_eq!(updated.table.len(), 1);
    }
}
