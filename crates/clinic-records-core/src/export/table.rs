//! CSV export of a table or any filtered view of it.

use std::fs::File;
use std::path::Path;

use crate::local::{csv, LocalResult};
use crate::models::Table;

/// Export to CSV format, header first.
pub fn table_to_csv(table: &Table) -> LocalResult<String> {
    csv::encode(&table.to_grid())
}

/// Write a CSV export to a file.
pub fn write_csv<P: AsRef<Path>>(table: &Table, path: P) -> LocalResult<()> {
    let file = File::create(path)?;
    csv::write_grid(file, &table.to_grid())
}
