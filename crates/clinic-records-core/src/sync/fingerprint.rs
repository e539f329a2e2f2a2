//! Content fingerprints for optimistic overwrite checks.

use sha2::{Digest, Sha256};

/// SHA-256 over a grid, hex encoded.
///
/// Trailing empty cells and trailing empty rows are ignored, since the
/// spreadsheet service drops them on read.
pub fn fingerprint(grid: &[Vec<String>]) -> String {
    let mut rows: Vec<&[String]> = grid
        .iter()
        .map(|row| {
            let len = row
                .iter()
                .rposition(|cell| !cell.is_empty())
                .map_or(0, |i| i + 1);
            &row[..len]
        })
        .collect();
    while rows.last().is_some_and(|row| row.is_empty()) {
        rows.pop();
    }

    let mut hasher = Sha256::new();
    for row in rows {
        for cell in row {
            hasher.update(cell.as_bytes());
            hasher.update([0x1f]);
        }
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
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
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint(&grid(&[&["A"], &["1"]]));
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_ignores_trailing_blanks() {
        assert_eq!(
            fingerprint(&grid(&[&["A", "B"], &["1", ""], &[]])),
            fingerprint(&grid(&[&["A", "B"], &["1"]]))
        );
    }

    #[test]
    fn test_cell_boundaries_matter() {
        assert_ne!(
            fingerprint(&grid(&[&["ab", "c"]])),
            fingerprint(&grid(&[&["a", "bc"]]))
        );
        assert_ne!(
            fingerprint(&grid(&[&["a"], &["b"]])),
            fingerprint(&grid(&[&["a", "b"]]))
        );
    }
}
