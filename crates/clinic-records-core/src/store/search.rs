//! Name lookup for the doctor-update flow.

use serde::{Deserialize, Serialize};
use strsim::jaro_winkler;

use crate::models::{Field, Table};

/// Minimum Jaro-Winkler similarity for a fuzzy hit.
const FUZZY_THRESHOLD: f64 = 0.80;

/// A row whose name resembles the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    /// Row index in the searched table
    pub index: usize,
    pub patient_id: String,
    pub name: String,
    pub score: f64,
}

/// Find rows by patient name.
///
/// Exact, prefix and substring matches (case-insensitive) score 1.0, 0.95
/// and 0.9; anything else falls back to Jaro-Winkler similarity. Results are
/// ordered by score, then by row order.
pub fn search(table: &Table, query: &str, limit: usize) -> Vec<NameMatch> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<NameMatch> = table
        .rows()
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let name = record.display_name();
            let score = score_name(&query, &name.to_lowercase())?;
            Some(NameMatch {
                index,
                patient_id: record.get(Field::PatientId).to_string(),
                name: name.to_string(),
                score,
            })
        })
        .collect();

    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.index.cmp(&b.index))
    });
    matches.truncate(limit);
    matches
}

fn score_name(query: &str, name: &str) -> Option<f64> {
    if name.is_empty() {
        return None;
    }
    if name == query {
        return Some(1.0);
    }
    if name.starts_with(query) {
        return Some(0.95);
    }
    if name.contains(query) {
        return Some(0.9);
    }

    // Compare against the whole name and each word, keep the best.
    let best = std::iter::once(name)
        .chain(name.split_whitespace())
        .map(|candidate| jaro_winkler(query, candidate))
        .fold(0.0_f64, f64::max);

    (best >= FUZZY_THRESHOLD).then_some(best.min(0.89))
}
