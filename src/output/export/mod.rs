//! Export of sweep results for external analysis
//!
//! | Format | Module    | Functions                                  |
//! |--------|-----------|--------------------------------------------|
//! | CSV    | [`csv`]   | `export_sweep_csv`, `export_profiles_csv`  |
//!
//! Both functions take a [`SweepReport`](crate::sweep::SweepReport) and an
//! optional [`CsvConfig`]; `None` writes plain comma-separated output.

pub mod csv;

pub use csv::{export_profiles_csv, export_sweep_csv, CsvConfig, CsvMetadata};
