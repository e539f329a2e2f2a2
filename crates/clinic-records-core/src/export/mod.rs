//! Export functionality for tables and single-record summaries.

mod summary;
mod table;

pub use summary::*;
pub use table::*;
