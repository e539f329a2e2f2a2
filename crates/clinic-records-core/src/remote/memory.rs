//! In-process spreadsheet, used for tests and offline demos.

use std::sync::{Arc, Mutex, MutexGuard};

use super::{RemoteError, RemoteResult, RemoteSheet};

#[derive(Debug, Default)]
struct MemoryState {
    grid: Vec<Vec<String>>,
    available: bool,
    writes: usize,
}

/// Shared in-memory grid.
///
/// Clones share the same grid, so a test can keep a handle while the store
/// owns another. [`set_available`](Self::set_available) simulates outages.
#[derive(Debug, Clone)]
pub struct MemorySheet {
    state: Arc<Mutex<MemoryState>>,
}

impl Default for MemorySheet {
    fn default() -> Self {
        Self::with_grid(Vec::new())
    }
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_grid(grid: Vec<Vec<String>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState {
                grid,
                available: true,
                writes: 0,
            })),
        }
    }

    pub fn set_available(&self, available: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.available = available;
        }
    }

    /// Snapshot of the current grid.
    pub fn grid(&self) -> Vec<Vec<String>> {
        self.state
            .lock()
            .map(|s| s.grid.clone())
            .unwrap_or_default()
    }

    /// Replace the grid directly, as another session editing the sheet would.
    pub fn replace_grid(&self, grid: Vec<Vec<String>>) {
        if let Ok(mut state) = self.state.lock() {
            state.grid = grid;
        }
    }

    /// Number of mutating calls that reached the sheet.
    pub fn write_count(&self) -> usize {
        self.state.lock().map(|s| s.writes).unwrap_or(0)
    }

    fn open(&self) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let state = self
            .state
            .lock()
            .map_err(|e| RemoteError::Unavailable(format!("Lock poisoned: {}", e)))?;
        if !state.available {
            return Err(RemoteError::Unavailable("memory sheet is offline".into()));
        }
        Ok(state)
    }
}

impl RemoteSheet for MemorySheet {
    fn read_header(&self) -> RemoteResult<Vec<String>> {
        Ok(self.open()?.grid.first().cloned().unwrap_or_default())
    }

    fn write_header(&self, header: &[String]) -> RemoteResult<()> {
        let mut state = self.open()?;
        state.writes += 1;
        if state.grid.is_empty() {
            state.grid.push(header.to_vec());
        } else {
            state.grid[0] = header.to_vec();
        }
        Ok(())
    }

    fn read_all(&self) -> RemoteResult<Vec<Vec<String>>> {
        Ok(self.open()?.grid.clone())
    }

    fn append_rows(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        let mut state = self.open()?;
        state.writes += 1;
        state.grid.extend(rows.iter().cloned());
        Ok(())
    }

    fn clear(&self) -> RemoteResult<()> {
        let mut state = self.open()?;
        state.writes += 1;
        state.grid.clear();
        Ok(())
    }

    fn overwrite_all(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        let mut state = self.open()?;
        state.writes += 1;
        state.grid = rows.to_vec();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory sheet".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_clones_share_grid() {
        let sheet = MemorySheet::new();
        let handle = sheet.clone();

        sheet.overwrite_all(&[row(&["A"]), row(&["1"])]).unwrap();
        handle.append_rows(&[row(&["2"])]).unwrap();

        assert_eq!(sheet.read_all().unwrap().len(), 3);
        assert_eq!(sheet.write_count(), 2);
    }

    #[test]
    fn test_offline_sheet_fails() {
        let sheet = MemorySheet::with_grid(vec![row(&["A"])]);
        sheet.set_available(false);

        assert!(matches!(sheet.read_all(), Err(RemoteError::Unavailable(_))));
        assert!(sheet.append_rows(&[row(&["1"])]).is_err());
        assert_eq!(sheet.grid().len(), 1);
    }

    #[test]
    fn test_write_header_on_blank_sheet() {
        let sheet = MemorySheet::new();
        assert!(sheet.read_header().unwrap().is_empty());
        sheet.write_header(&row(&["A", "B"])).unwrap();
        assert_eq!(sheet.read_header().unwrap(), row(&["A", "B"]));
    }
}
