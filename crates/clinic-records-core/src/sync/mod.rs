//! Propagating the local table to the remote mirror.
//!
//! Two strategies:
//! 1. Append: rows not already present on the remote are appended. Updated
//!    rows are appended as new versions; [`Table::fold_versions`] on
//!    load derives the current table from that log.
//! 2. Overwrite: the remote is cleared and rewritten, but only when its
//!    fingerprint still matches the one recorded at the last sync. Otherwise
//!    another session has written to it and the push is refused.

mod fingerprint;

pub use fingerprint::*;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Field, Table};
use crate::remote::{repair_header, RemoteError, RemoteResult, RemoteSheet};

/// How local changes reach the remote mirror.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    #[default]
    Append,
    Overwrite,
}

impl SyncStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncStrategy::Append => "append",
            SyncStrategy::Overwrite => "overwrite",
        }
    }
}

impl std::str::FromStr for SyncStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(SyncStrategy::Append),
            "overwrite" => Ok(SyncStrategy::Overwrite),
            other => Err(format!("unknown sync strategy '{}'", other)),
        }
    }
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote grid as read, after header repair.
#[derive(Debug, Clone)]
pub struct RemoteSnapshot {
    pub grid: Vec<Vec<String>>,
    pub fingerprint: String,
}

impl RemoteSnapshot {
    pub fn header(&self) -> &[String] {
        self.grid.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_blank(&self) -> bool {
        self.header().iter().all(|h| h.trim().is_empty())
    }
}

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOutcome {
    pub rows_written: usize,
    /// Fingerprint of the grid now on the remote
    pub fingerprint: String,
}

/// Repair the header, then read the whole sheet.
pub fn read_snapshot(remote: &dyn RemoteSheet) -> RemoteResult<RemoteSnapshot> {
    repair_header(remote)?;
    let grid = remote.read_all()?;
    let fingerprint = fingerprint(&grid);
    Ok(RemoteSnapshot { grid, fingerprint })
}

/// Push the table using `strategy`.
///
/// `last_known` is the fingerprint recorded at the previous successful read
/// or write; only the overwrite strategy consults it.
pub fn push(
    remote: &dyn RemoteSheet,
    table: &Table,
    strategy: SyncStrategy,
    last_known: Option<&str>,
) -> RemoteResult<PushOutcome> {
    match strategy {
        SyncStrategy::Append => push_append(remote, table),
        SyncStrategy::Overwrite => push_overwrite(remote, table, last_known),
    }
}

fn push_append(remote: &dyn RemoteSheet, table: &Table) -> RemoteResult<PushOutcome> {
    let schema = table.schema();
    let mut snapshot = read_snapshot(remote)?;

    // Make sure the remote header carries every declared column.
    let mut header: Vec<String> = if snapshot.is_blank() {
        Vec::new()
    } else {
        snapshot.header().to_vec()
    };
    let present: HashSet<Field> = header.iter().filter_map(|h| Field::from_header(h)).collect();
    let missing: Vec<String> = schema
        .columns()
        .iter()
        .filter(|f| !present.contains(f))
        .map(|f| f.header().to_string())
        .collect();
    if !missing.is_empty() {
        header.extend(missing);
        remote.write_header(&header)?;
        if snapshot.grid.is_empty() {
            snapshot.grid.push(header.clone());
        } else {
            snapshot.grid[0] = header.clone();
        }
    }

    // Remote column index for each declared field (first occurrence).
    let positions: Vec<Option<usize>> = header
        .iter()
        .enumerate()
        .map(|(i, h)| match Field::from_header(h) {
            Some(field) if header[..i].iter().all(|prev| Field::from_header(prev) != Some(field)) => {
                schema.position(field)
            }
            _ => None,
        })
        .collect();

    let remote_table = Table::from_grid(schema.clone(), &snapshot.grid);
    let mut existing: HashSet<Vec<String>> = remote_table
        .rows()
        .iter()
        .map(|r| r.values_for(schema))
        .collect();

    let mut to_append = Vec::new();
    for record in table.rows() {
        let values = record.values_for(schema);
        if existing.insert(values.clone()) {
            let aligned: Vec<String> = positions
                .iter()
                .map(|pos| pos.map(|p| values[p].clone()).unwrap_or_default())
                .collect();
            to_append.push(aligned);
        }
    }

    if !to_append.is_empty() {
        remote.append_rows(&to_append)?;
    }

    let rows_written = to_append.len();
    snapshot.grid.extend(to_append);
    Ok(PushOutcome {
        rows_written,
        fingerprint: fingerprint(&snapshot.grid),
    })
}

fn push_overwrite(
    remote: &dyn RemoteSheet,
    table: &Table,
    last_known: Option<&str>,
) -> RemoteResult<PushOutcome> {
    let snapshot = read_snapshot(remote)?;

    if let Some(known) = last_known {
        if !snapshot.is_blank() && snapshot.fingerprint != known {
            return Err(RemoteError::Conflict(format!(
                "{} changed since the last sync; reload before overwriting",
                remote.describe()
            )));
        }
    }

    let grid = table.to_grid();
    remote.clear()?;
    remote.overwrite_all(&grid)?;

    Ok(PushOutcome {
        rows_written: table.len(),
        fingerprint: fingerprint(&grid),
    })
}
