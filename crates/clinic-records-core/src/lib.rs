//! Clinic Records Core Library
//!
//! Local-first patient intake, doctor notes and appointment records, mirrored
//! to a shared spreadsheet when one is reachable.
//!
//! # Architecture
//!
//! ```text
//!   Intake form      Doctor update      Appointment booking
//!        │                 │                    │
//!        └─────────────────┼────────────────────┘
//!                          ▼
//!                    RecordStore
//!                          │
//!            ┌─────────────┴──────────────┐
//!            ▼                            ▼
//!     Local CSV file              Remote spreadsheet
//!   (always written first)     (append or overwrite, best effort)
//!            │                            │
//!            └──────────┬─────────────────┘
//!                       ▼
//!              Sync journal (SQLite)
//!                       │
//!        ┌──────────────┼───────────────┐
//!        ▼              ▼               ▼
//!    Waiting/Seen   Upcoming/Archive   Summaries
//!     partition       partition        and CSV export
//! ```
//!
//! # Core Principle
//!
//! **A local write is never lost to a remote failure.** Remote problems are
//! reported as warnings, the row is queued in the journal, and the next
//! successful load replays it before refreshing the local file.
//!
//! # Modules
//!
//! - [`models`]: Fields, schemas, records, tables and appointment dates
//! - [`store`]: The record store, patient ids and name search
//! - [`local`]: CSV file storage
//! - [`remote`]: Spreadsheet mirror and header repair
//! - [`sync`]: Push strategies and remote fingerprints
//! - [`db`]: SQLite sync journal and pending-row queue
//! - [`export`]: CSV views and record summaries
//! - [`config`]: TOML configuration

pub mod config;
pub mod db;
pub mod export;
pub mod local;
pub mod models;
pub mod remote;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::{ConfigError, StoreConfig};
pub use db::Database;
pub use export::{generate_summary, SummaryDocument};
pub use local::LocalFile;
pub use models::{
    AppointmentPartition, Field, Record, RecordStatus, Schema, SchemaKind, Table,
};
pub use remote::{MemorySheet, RemoteError, RemoteSheet, SheetsClient, UnreachableSheet};
pub use store::{
    next_patient_id, partition_appointments, partition_waiting, LoadSource, Loaded, RecordStore,
    Saved, StoreError, SyncStatus,
};
pub use sync::SyncStrategy;
