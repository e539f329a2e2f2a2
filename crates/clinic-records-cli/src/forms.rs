//! Turning command-line form input into records.

use anyhow::{bail, Context, Result};
use clinic_records_core::models::{compose_eye_pair, Field, Record, Schema};

/// Parse a `key=value` assignment.
///
/// The key may be a canonical header ("Full Name"), a snake_case key
/// ("full_name") or a legacy header ("Appt_Name").
pub fn parse_assignment(raw: &str) -> Result<(Field, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected key=value, got '{}'", raw))?;
    let field = Field::from_header(key).with_context(|| format!("unknown field '{}'", key.trim()))?;
    Ok((field, value.trim().to_string()))
}

/// Fields collected from a form.
#[derive(Debug, Clone, Default)]
pub struct FormInput {
    record: Record,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field when a value was given.
    pub fn field(mut self, field: Field, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.record.set(field, value);
        }
        self
    }

    /// Store a right/left reading, when either side was given.
    pub fn eye_pair(mut self, field: Field, right: Option<&str>, left: Option<&str>) -> Self {
        if right.is_some() || left.is_some() {
            self.record
                .set(field, compose_eye_pair(right.unwrap_or(""), left.unwrap_or("")));
        }
        self
    }

    /// Apply raw `key=value` assignments. They win over dedicated flags.
    pub fn assignments(mut self, raw: &[String]) -> Result<Self> {
        for entry in raw {
            let (field, value) = parse_assignment(entry)?;
            self.record.set(field, value);
        }
        Ok(self)
    }

    /// The finished record, checked against the schema's columns.
    pub fn into_record(self, schema: &Schema) -> Result<Record> {
        if let Some((field, _)) = self.record.fields().find(|(f, _)| !schema.has(*f)) {
            bail!("field '{}' is not part of the {:?} schema", field, schema.kind());
        }
        Ok(self.record)
    }

    /// The finished record for a doctor update: doctor-authored fields only.
    pub fn into_doctor_update(self, schema: &Schema) -> Result<Record> {
        if let Some((field, _)) = self.record.fields().find(|(f, _)| !f.is_doctor_authored()) {
            bail!("field '{}' is recorded at intake, not by the doctor", field);
        }
        let record = self.into_record(schema)?;
        if record.is_empty() {
            bail!("no fields to update");
        }
        Ok(record)
    }
}
