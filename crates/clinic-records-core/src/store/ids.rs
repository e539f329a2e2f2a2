//! Sequential patient identifiers.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{Field, Table};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digit pattern"));

/// Numeric part of an identifier: the first run of ASCII digits.
pub fn parse_patient_number(id: &str) -> Option<u64> {
    DIGITS.find(id.trim()).and_then(|m| m.as_str().parse().ok())
}

/// Format a patient number, zero-padded to four digits.
pub fn format_patient_id(number: u64) -> String {
    format!("{:04}", number)
}

/// Next free patient id: highest existing number plus one.
///
/// Entries without digits are ignored. Returns "0001" when the table has no
/// patient id column or no parseable id. Pure; calling it twice without an
/// insert in between gives the same answer.
pub fn next_patient_id(table: &Table) -> String {
    if !table.schema().has(Field::PatientId) {
        return format_patient_id(1);
    }

    let highest = table
        .rows()
        .iter()
        .map(|r| r.get(Field::PatientId))
        .filter(|id| !id.is_empty())
        .filter_map(parse_patient_number)
        .max();

    format_patient_id(highest.map_or(1, |n| n.saturating_add(1)))
}
