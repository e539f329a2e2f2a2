//! Command-line front end for the clinic record store.
//!
//! The binary wires these pieces to `clinic-records-core`: a password gate
//! for the session, form parsing for intake, doctor updates and bookings, and
//! plain-text list views.

pub mod forms;
pub mod gate;
pub mod render;

pub use forms::*;
pub use gate::*;
pub use render::*;

/// `RUST_LOG` fallback: info for the binary, this library and the core.
pub const DEFAULT_LOG_FILTER: &str =
    "clinic_records=info,clinic_records_cli=info,clinic_records_core=info";
