//! Remote spreadsheet mirror.
//!
//! The mirror is a grid whose first row is the header. Every call may fail;
//! the store treats any [`RemoteError`] as a soft failure and carries on with
//! the local copy.

mod header;
mod memory;
mod sheets;
mod unreachable;

pub use header::*;
pub use memory::*;
pub use sheets::*;
pub use unreachable::*;

use thiserror::Error;

/// Remote mirror errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Remote unavailable: {0}")]
    Unavailable(String),

    #[error("Remote rejected credentials: {0}")]
    Auth(String),

    #[error("Remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected remote response: {0}")]
    Decode(String),

    #[error("Remote changed since last sync: {0}")]
    Conflict(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Operations the store needs from a spreadsheet service.
pub trait RemoteSheet {
    /// First row of the sheet; empty when the sheet is blank.
    fn read_header(&self) -> RemoteResult<Vec<String>>;

    /// Replace the first row.
    fn write_header(&self, header: &[String]) -> RemoteResult<()>;

    /// Every non-empty row, header first.
    fn read_all(&self) -> RemoteResult<Vec<Vec<String>>>;

    /// Append rows after the last non-empty row.
    fn append_rows(&self, rows: &[Vec<String>]) -> RemoteResult<()>;

    /// Remove every value from the sheet.
    fn clear(&self) -> RemoteResult<()>;

    /// Write a full grid (header included) starting at the first cell.
    fn overwrite_all(&self, rows: &[Vec<String>]) -> RemoteResult<()>;

    /// Human-readable target, for logs.
    fn describe(&self) -> String;
}

impl<T: RemoteSheet + ?Sized> RemoteSheet for Box<T> {
    fn read_header(&self) -> RemoteResult<Vec<String>> {
        (**self).read_header()
    }

    fn write_header(&self, header: &[String]) -> RemoteResult<()> {
        (**self).write_header(header)
    }

    fn read_all(&self) -> RemoteResult<Vec<Vec<String>>> {
        (**self).read_all()
    }

    fn append_rows(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        (**self).append_rows(rows)
    }

    fn clear(&self) -> RemoteResult<()> {
        (**self).clear()
    }

    fn overwrite_all(&self, rows: &[Vec<String>]) -> RemoteResult<()> {
        (**self).overwrite_all(rows)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
