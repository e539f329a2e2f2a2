//! Domain models for clinic records.

mod appointment;
mod field;
mod record;
mod schema;
mod table;

pub use appointment::*;
pub use field::*;
pub use record::*;
pub use schema::*;
pub use table::*;
