//! Stand-in for a configured remote that could not be connected.

use super::{RemoteError, RemoteResult, RemoteSheet};

/// Fails every call with the reason the connection was refused.
///
/// Keeps the store in "remote configured" mode, so writes are reported as
/// failed syncs and queued for replay instead of being silently skipped.
#[derive(Debug, Clone)]
pub struct UnreachableSheet {
    target: String,
    reason: String,
}

impl UnreachableSheet {
    pub fn new(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> RemoteResult<T> {
        Err(RemoteError::Unavailable(self.reason.clone()))
    }
}

impl RemoteSheet for UnreachableSheet {
    fn read_header(&self) -> RemoteResult<Vec<String>> {
        self.fail()
    }

    fn write_header(&self, _header: &[String]) -> RemoteResult<()> {
        self.fail()
    }

    fn read_all(&self) -> RemoteResult<Vec<Vec<String>>> {
        self.fail()
    }

    fn append_rows(&self, _rows: &[Vec<String>]) -> RemoteResult<()> {
        self.fail()
    }

    fn clear(&self) -> RemoteResult<()> {
        self.fail()
    }

    fn overwrite_all(&self, _rows: &[Vec<String>]) -> RemoteResult<()> {
        self.fail()
    }

    fn describe(&self) -> String {
        self.target.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_call_fails_with_reason() {
        let sheet = UnreachableSheet::new("spreadsheet abc", "missing token");
        assert_eq!(
            sheet.read_all(),
            Err(RemoteError::Unavailable("missing token".into()))
        );
        assert!(sheet.append_rows(&[]).is_err());
        assert_eq!(sheet.describe(), "spreadsheet abc");
    }
}
