//! Header row repair.

use std::collections::{HashMap, HashSet};

use super::{RemoteResult, RemoteSheet};

/// Make header names unique.
///
/// Repeated names get `_1`, `_2`, … in first-seen order. A suffix that would
/// collide with a name already present is skipped. Blank cells are left as
/// they are.
pub fn dedupe_header(header: &[String]) -> Vec<String> {
    let original: HashSet<&str> = header.iter().map(String::as_str).collect();
    let mut used: HashSet<String> = HashSet::new();
    let mut counters: HashMap<&str, usize> = HashMap::new();

    header
        .iter()
        .map(|name| {
            if name.trim().is_empty() || used.insert(name.clone()) {
                return name.clone();
            }

            let counter = counters.entry(name.as_str()).or_insert(0);
            loop {
                *counter += 1;
                let candidate = format!("{}_{}", name, counter);
                if !original.contains(candidate.as_str()) && used.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

/// Read the remote header and write back a de-duplicated one if needed.
///
/// Returns the header now on the remote.
pub fn repair_header(remote: &dyn RemoteSheet) -> RemoteResult<Vec<String>> {
    let header = remote.read_header()?;
    let repaired = dedupe_header(&header);
    if repaired != header {
        tracing::warn!(
            remote = %remote.describe(),
            before = ?header,
            after = ?repaired,
            "renaming duplicate header columns"
        );
        remote.write_header(&repaired)?;
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemorySheet;
    use proptest::prelude::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_simple() {
        assert_eq!(
            dedupe_header(&names(&["Name", "Date", "Name"])),
            names(&["Name", "Date", "Name_1"])
        );
    }

    #[test]
    fn test_dedupe_counts_in_first_seen_order() {
        assert_eq!(
            dedupe_header(&names(&["A", "B", "A", "B", "A"])),
            names(&["A", "B", "A_1", "B_1", "A_2"])
        );
    }

    #[test]
    fn test_dedupe_skips_existing_suffix() {
        assert_eq!(
            dedupe_header(&names(&["A", "A", "A_1"])),
            names(&["A", "A_2", "A_1"])
        );
    }

    #[test]
    fn test_dedupe_leaves_blanks() {
        assert_eq!(dedupe_header(&names(&["A", "", ""])), names(&["A", "", ""]));
    }

    #[test]
    fn test_repair_writes_back() {
        let sheet = MemorySheet::with_grid(vec![
            names(&["Name", "Date", "Name"]),
            names(&["x", "2024-06-10", "y"]),
        ]);

        let header = repair_header(&sheet).unwrap();
        assert_eq!(header, names(&["Name", "Date", "Name_1"]));
        assert_eq!(sheet.grid()[0], header);
        assert_eq!(sheet.grid()[1], names(&["x", "2024-06-10", "y"]));
    }

    proptest! {
        #[test]
        fn prop_dedupe_output_is_unique(raw in proptest::collection::vec("[ab]{1,2}", 0..12)) {
            let out = dedupe_header(&raw);
            prop_assert_eq!(out.len(), raw.len());
            let unique: HashSet<_> = out.iter().collect();
            prop_assert_eq!(unique.len(), out.len());
        }

        #[test]
        fn prop_dedupe_is_idempotent(raw in proptest::collection::vec("[ab]{1,2}", 0..12)) {
            let once = dedupe_header(&raw);
            prop_assert_eq!(dedupe_header(&once), once.clone());
        }
    }
}
