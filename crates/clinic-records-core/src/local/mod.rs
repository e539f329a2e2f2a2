//! Local CSV file used as the authoritative offline copy of the table.

pub mod csv;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::{Schema, Table};

/// Local file errors.
#[derive(Error, Debug)]
pub enum LocalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

pub type LocalResult<T> = Result<T, LocalError>;

/// A CSV file holding one table.
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the file with the declared header if it does not exist yet.
    ///
    /// Returns `true` when a new file was written.
    pub fn ensure_exists(&self, schema: &Schema) -> LocalResult<bool> {
        if self.exists() {
            return Ok(false);
        }
        self.write(&Table::empty(schema.clone()))?;
        tracing::debug!(path = %self.path.display(), "created local record file");
        Ok(true)
    }

    /// Read the table, or `None` if the file is absent.
    pub fn read(&self, schema: &Schema) -> LocalResult<Option<Table>> {
        if !self.exists() {
            return Ok(None);
        }
        let grid = csv::read_grid(fs::File::open(&self.path)?)?;
        Ok(Some(Table::from_grid(schema.clone(), &grid)))
    }

    /// Replace the file contents with the full table.
    ///
    /// Writes a sibling temp file first and renames it over the target, so a
    /// failed write leaves the previous file intact.
    pub fn write(&self, table: &Table) -> LocalResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.temp_path();
        {
            let mut file = fs::File::create(&tmp)?;
            csv::write_grid(&mut file, &table.to_grid())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
