//! Single-record summary documents.

use serde::{Deserialize, Serialize};

use crate::models::{split_eye_pair, Record, Schema};

/// A printable summary of one record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryDocument {
    pub title: String,
    pub generated_at: String,
    /// (header, value) pairs in declared column order
    pub lines: Vec<(String, String)>,
}

impl SummaryDocument {
    /// Build a summary for one record. The record is not modified.
    pub fn from_record(record: &Record, schema: &Schema, clinic_name: &str) -> Self {
        Self {
            title: format!("{} Patient Record Summary", clinic_name.trim()),
            generated_at: chrono::Utc::now().to_rfc3339(),
            lines: schema
                .columns()
                .iter()
                .map(|f| (f.header().to_string(), record.get(*f).to_string()))
                .collect(),
        }
    }

    /// Plain-text rendering: title, blank line, one "Header: value" per line.
    ///
    /// Per-eye values are spelled out as "right ..., left ...".
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        text.push_str(&self.title);
        text.push_str("\n\n");
        for (header, value) in &self.lines {
            match split_eye_pair(value) {
                Some((right, left)) => {
                    text.push_str(&format!("{}: right {}, left {}\n", header, right, left))
                }
                None => text.push_str(&format!("{}: {}\n", header, value)),
            }
        }
        text
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Summary of one record for the given clinic.
pub fn generate_summary(record: &Record, schema: &Schema, clinic_name: &str) -> SummaryDocument {
    SummaryDocument::from_record(record, schema, clinic_name)
}
