//! Plain-text list views.

use clinic_records_core::db::SyncAttempt;
use clinic_records_core::models::{AppointmentPartition, Field, Schema, Table};
use clinic_records_core::store::NameMatch;

/// Columns shown in list views, limited to what the schema declares.
pub fn list_columns(schema: &Schema) -> Vec<Field> {
    const PREFERRED: &[Field] = &[
        Field::PatientId,
        Field::FullName,
        Field::Date,
        Field::Age,
        Field::Diagnosis,
        Field::ApptName,
        Field::ApptDate,
        Field::ApptTime,
        Field::ApptPayment,
    ];
    PREFERRED.iter().copied().filter(|f| schema.has(*f)).collect()
}

/// Render rows as left-aligned columns under a header line.
pub fn render_table(table: &Table, columns: &[Field]) -> String {
    if table.is_empty() {
        return "(no records)\n".to_string();
    }

    let cells: Vec<Vec<&str>> = table
        .rows()
        .iter()
        .map(|r| columns.iter().map(|f| r.get(*f)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, f)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(std::iter::once(f.header().chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        let padded: Vec<String> = values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(columns.iter().map(|f| f.header()).collect());
    for row in cells {
        out.push_str(&line(row));
    }
    out
}

/// Upcoming appointments grouped under day headings.
pub fn render_upcoming(partition: &AppointmentPartition, columns: &[Field]) -> String {
    if partition.upcoming.is_empty() {
        return "No upcoming appointments.\n".to_string();
    }

    let mut out = String::new();
    for day in &partition.upcoming {
        out.push_str(&format!("== {} ==\n", day.heading()));
        let table = Table::from_records(partition.archive.schema().clone(), day.rows.iter().cloned());
        out.push_str(&render_table(&table, columns));
        out.push('\n');
    }
    out
}

pub fn render_matches(matches: &[NameMatch]) -> String {
    if matches.is_empty() {
        return "No matching patients.\n".to_string();
    }
    matches
        .iter()
        .map(|m| format!("{:<8} {:<30} {:.2}\n", m.patient_id, m.name, m.score))
        .collect()
}

pub fn render_sync_log(attempts: &[SyncAttempt]) -> String {
    if attempts.is_empty() {
        return "No sync attempts recorded.\n".to_string();
    }
    attempts
        .iter()
        .map(|a| {
            format!(
                "{}  {:<6} {:<9} {:<8} rows={} {}\n",
                a.attempted_at,
                a.operation.as_str(),
                a.strategy.map(|s| s.as_str()).unwrap_or("-"),
                a.outcome.as_str(),
                a.rows_written,
                a.detail.as_deref().unwrap_or(""),
            )
        })
        .collect()
}
