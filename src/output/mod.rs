//! Report output.
//!
//! - [`csv`] - CSV output
//! - [`terminal`] - aligned table for the terminal

mod csv;
mod terminal;

pub use csv::write_csv;
pub use terminal::write_table;
