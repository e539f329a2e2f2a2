//! Record models.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Field, Schema};

/// Whether the doctor has seen a patient yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RecordStatus {
    /// All doctor-authored status fields are empty
    Waiting,
    /// At least one status field has been filled in
    Seen,
}

/// One row of the record table.
///
/// Values are trimmed on the way in, and an absent field reads as the empty
/// string, so "not yet filled" has exactly one representation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<Field, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: Field, value: impl AsRef<str>) -> Self {
        self.set(field, value);
        self
    }

    /// Set a field. Empty values are stored as absent.
    pub fn set(&mut self, field: Field, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if value.is_empty() {
            self.values.remove(&field);
        } else {
            self.values.insert(field, value.to_string());
        }
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self, field: Field) -> bool {
        self.get(field).is_empty()
    }

    /// Fields that carry a value, in field order.
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> {
        self.values.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop fields that are not part of the schema.
    pub fn restrict_to(&mut self, schema: &Schema) {
        self.values.retain(|field, _| schema.has(*field));
    }

    /// Values in declared column order, empty string for absent fields.
    pub fn values_for(&self, schema: &Schema) -> Vec<String> {
        schema
            .columns()
            .iter()
            .map(|f| self.get(*f).to_string())
            .collect()
    }

    /// Display name, whichever form captured it.
    pub fn display_name(&self) -> &str {
        match self.get(Field::FullName) {
            "" => self.get(Field::ApptName),
            name => name,
        }
    }

    /// Derive the waiting/seen state for a schema.
    pub fn status(&self, schema: &Schema) -> RecordStatus {
        if schema.status_fields().iter().all(|f| self.is_blank(*f)) {
            RecordStatus::Waiting
        } else {
            RecordStatus::Seen
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_trims_and_blanks() {
        let mut record = Record::new().with(Field::FullName, "  Sara Ali ");
        assert_eq!(record.get(Field::FullName), "Sara Ali");

        record.set(Field::FullName, "   ");
        assert!(record.is_blank(Field::FullName));
        assert!(record.is_empty());
    }

    #[test]
    fn test_status_follows_doctor_fields() {
        let schema = Schema::patients();
        let mut record = Record::new().with(Field::FullName, "Sara Ali");
        assert_eq!(record.status(&schema), RecordStatus::Waiting);

        record.set(Field::Plan, "Review in 2 weeks");
        assert_eq!(record.status(&schema), RecordStatus::Seen);
    }

    #[test]
    fn test_appointment_counts_as_progress_in_combined() {
        let record = Record::new()
            .with(Field::FullName, "Sara Ali")
            .with(Field::ApptName, "Sara Ali");
        assert_eq!(record.status(&Schema::patients()), RecordStatus::Waiting);
        assert_eq!(record.status(&Schema::combined()), RecordStatus::Seen);
    }

    #[test]
    fn test_values_for_schema_order() {
        let record = Record::new()
            .with(Field::ApptPayment, "Cash")
            .with(Field::ApptName, "Omar");
        assert_eq!(
            record.values_for(&Schema::appointments()),
            vec!["Omar", "", "", "Cash"]
        );
    }

    #[test]
    fn test_display_name() {
        let record = Record::new().with(Field::ApptName, "Omar");
        assert_eq!(record.display_name(), "Omar");

        let record = record.with(Field::FullName, "Omar Aziz");
        assert_eq!(record.display_name(), "Omar Aziz");
        assert_eq!(record.get(Field::ApptName), "Omar");
    }
}
