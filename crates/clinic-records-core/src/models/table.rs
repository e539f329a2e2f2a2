//! The in-memory record table.

use serde::{Deserialize, Serialize};

use std::collections::HashMap;

use super::{Field, Record, RecordStatus, Schema};

/// Fields that tell two records apart. Rows agreeing on all of them are
/// versions of one record.
pub const IDENTITY_FIELDS: [Field; 3] = [Field::PatientId, Field::FullName, Field::Date];

fn identity_key(record: &Record) -> Vec<String> {
    IDENTITY_FIELDS
        .iter()
        .map(|f| record.get(*f).to_string())
        .collect()
}

/// A table of records carrying every declared column.
///
/// Each row's [`RecordStatus`] is derived once when the row enters the table
/// and refreshed whenever the row is mutated through the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    schema: Schema,
    rows: Vec<Record>,
    statuses: Vec<RecordStatus>,
}

impl Table {
    /// Create an empty table with the full declared column set.
    pub fn empty(schema: Schema) -> Self {
        Self {
            schema,
            rows: Vec::new(),
            statuses: Vec::new(),
        }
    }

    /// Build a table from records, dropping undeclared fields.
    pub fn from_records(schema: Schema, records: impl IntoIterator<Item = Record>) -> Self {
        let mut table = Self::empty(schema);
        for record in records {
            table.push(record);
        }
        table
    }

    /// Build a table from a grid whose first row is the header.
    ///
    /// Headers are resolved through [`Field::from_header`], so legacy column
    /// names are migrated here. Unknown columns are ignored and declared
    /// columns missing from the grid read as empty.
    pub fn from_grid(schema: Schema, grid: &[Vec<String>]) -> Self {
        let Some((header, body)) = grid.split_first() else {
            return Self::empty(schema);
        };

        let mapping: Vec<Option<Field>> = header
            .iter()
            .map(|h| Field::from_header(h).filter(|f| schema.has(*f)))
            .collect();

        let records = body
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
            .map(|row| {
                let mut record = Record::new();
                for (cell, field) in row.iter().zip(&mapping) {
                    // First occurrence of a column wins over renamed duplicates.
                    if let Some(field) = field {
                        if record.is_blank(*field) {
                            record.set(*field, cell);
                        }
                    }
                }
                record
            })
            .collect::<Vec<_>>();

        Self::from_records(schema, records)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.rows.get(index)
    }

    pub fn status_of(&self, index: usize) -> Option<RecordStatus> {
        self.statuses.get(index).copied()
    }

    /// Rows paired with their cached status.
    pub fn iter_with_status(&self) -> impl Iterator<Item = (&Record, RecordStatus)> {
        self.rows.iter().zip(self.statuses.iter().copied())
    }

    pub fn push(&mut self, mut record: Record) {
        record.restrict_to(&self.schema);
        self.statuses.push(record.status(&self.schema));
        self.rows.push(record);
    }

    pub fn remove(&mut self, index: usize) -> Record {
        self.statuses.remove(index);
        self.rows.remove(index)
    }

    /// Overwrite the supplied fields of one row and refresh its status.
    pub fn apply(&mut self, index: usize, fields: &Record) {
        let schema = &self.schema;
        if let Some(row) = self.rows.get_mut(index) {
            for (field, value) in fields.fields() {
                if schema.has(field) {
                    row.set(field, value);
                }
            }
            self.statuses[index] = row.status(schema);
        }
    }

    /// Indices of rows whose patient id equals `patient_id`.
    pub fn positions_of(&self, patient_id: &str) -> Vec<usize> {
        let wanted = patient_id.trim();
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| !wanted.is_empty() && r.get(Field::PatientId) == wanted)
            .map(|(i, _)| i)
            .collect()
    }

    /// Keep the rows matching a predicate, in order.
    pub fn filtered(&self, mut keep: impl FnMut(&Record, RecordStatus) -> bool) -> Table {
        let mut out = Table::empty(self.schema.clone());
        for (record, status) in self.iter_with_status() {
            if keep(record, status) {
                out.rows.push(record.clone());
                out.statuses.push(status);
            }
        }
        out
    }

    /// Collapse rows that are versions of the same record.
    ///
    /// Two rows are versions of one record when they agree on every
    /// [`IDENTITY_FIELDS`] value. The surviving row keeps the position of the
    /// first occurrence and the values of the last one. Rows without an id
    /// are kept as they are, and so are rows that share an id but not the
    /// rest of the identity; see [`Table::colliding_ids`].
    pub fn fold_versions(self) -> Table {
        if !self.schema.has(Field::PatientId) {
            return self;
        }

        let mut folded = Table::empty(self.schema.clone());
        let mut seen: HashMap<Vec<String>, usize> = HashMap::new();

        for record in self.rows {
            if record.is_blank(Field::PatientId) {
                folded.push(record);
                continue;
            }
            let key = identity_key(&record);
            match seen.get(&key) {
                Some(&index) => {
                    folded.statuses[index] = record.status(&folded.schema);
                    folded.rows[index] = record;
                }
                None => {
                    seen.insert(key, folded.rows.len());
                    folded.push(record);
                }
            }
        }
        folded
    }

    /// Patient ids held by more than one row, in order of first appearance.
    pub fn colliding_ids(&self) -> Vec<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order = Vec::new();
        for record in &self.rows {
            let id = record.get(Field::PatientId);
            if id.is_empty() {
                continue;
            }
            let count = counts.entry(id).or_insert(0);
            if *count == 0 {
                order.push(id);
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter(|id| counts.get(id).is_some_and(|c| *c > 1))
            .map(str::to_string)
            .collect()
    }

    /// Header followed by every row, in declared column order.
    pub fn to_grid(&self) -> Vec<Vec<String>> {
        let mut grid = Vec::with_capacity(self.rows.len() + 1);
        grid.push(self.schema.header());
        grid.extend(self.rows.iter().map(|r| r.values_for(&self.schema)));
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_from_grid_renames_and_fills_columns() {
        let table = Table::from_grid(
            Schema::appointments(),
            &grid(&[
                &["Appt_Name", "Appt_Date", "Extra"],
                &["Omar", "2024-06-10", "ignored"],
            ]),
        );

        assert_eq!(table.len(), 1);
        assert_eq!(
            table.to_grid(),
            grid(&[
                &["Patient Name", "Appointment Date", "Appointment Time (manual)", "Payment"],
                &["Omar", "2024-06-10", "", ""],
            ])
        );
    }

    #[test]
    fn test_from_grid_skips_blank_rows() {
        let table = Table::from_grid(
            Schema::appointments(),
            &grid(&[&["Patient Name"], &["", ], &["Omar"]]),
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_apply_refreshes_status() {
        let mut table = Table::empty(Schema::patients());
        table.push(Record::new().with(Field::PatientId, "0001").with(Field::FullName, "Sara"));
        assert_eq!(table.status_of(0), Some(RecordStatus::Waiting));

        table.apply(0, &Record::new().with(Field::Diagnosis, "Cataract"));
        assert_eq!(table.status_of(0), Some(RecordStatus::Seen));
        assert_eq!(table.get(0).unwrap().get(Field::FullName), "Sara");
    }

    #[test]
    fn test_push_drops_undeclared_fields() {
        let mut table = Table::empty(Schema::appointments());
        table.push(Record::new().with(Field::ApptName, "Omar").with(Field::Diagnosis, "x"));
        assert!(table.get(0).unwrap().is_blank(Field::Diagnosis));
    }

    #[test]
    fn test_fold_versions() {
        let table = Table::from_records(
            Schema::patients(),
            vec![
                Record::new().with(Field::PatientId, "0001").with(Field::FullName, "Sara"),
                Record::new().with(Field::PatientId, "0002").with(Field::FullName, "Omar"),
                Record::new()
                    .with(Field::PatientId, "0001")
                    .with(Field::FullName, "Sara")
                    .with(Field::Diagnosis, "Glaucoma"),
            ],
        );

        let folded = table.fold_versions();
        assert_eq!(folded.len(), 2);
        assert_eq!(folded.get(0).unwrap().get(Field::Diagnosis), "Glaucoma");
        assert_eq!(folded.status_of(0), Some(RecordStatus::Seen));
        assert_eq!(folded.get(1).unwrap().get(Field::FullName), "Omar");
        assert!(folded.colliding_ids().is_empty());
    }

    #[test]
    fn test_shared_id_with_different_patients_is_not_folded() {
        let table = Table::from_records(
            Schema::patients(),
            vec![
                Record::new()
                    .with(Field::PatientId, "0001")
                    .with(Field::FullName, "Sara")
                    .with(Field::Date, "2024-06-10"),
                Record::new()
                    .with(Field::PatientId, "0001")
                    .with(Field::FullName, "Omar")
                    .with(Field::Date, "2024-06-10"),
                Record::new()
                    .with(Field::PatientId, "0001")
                    .with(Field::FullName, "Sara")
                    .with(Field::Date, "2024-07-01"),
                Record::new().with(Field::FullName, "No id"),
            ],
        );

        let folded = table.fold_versions();
        assert_eq!(folded.len(), 4);
        assert_eq!(folded.colliding_ids(), vec!["0001".to_string()]);
        assert_eq!(folded.positions_of("0001").len(), 3);
    }
}
