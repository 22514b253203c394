//! Output of sweep results
//!
//! - **Visualization**: PNG/SVG plots using plotters
//! - **Export**: CSV tables for external analysis
//!
//! ```text
//! output/
//! ├── mod.rs
//! ├── visualization/
//! │   ├── config.rs    ← PlotConfig
//! │   ├── steady.rs    ← plot_profiles
//! │   └── cost.rs      ← plot_sweep_cost
//! └── export/
//!     └── csv.rs       ← export_sweep_csv, export_profiles_csv
//! ```
//!
//! All functions take a [`SweepReport`](crate::sweep::SweepReport) and return
//! `Result<(), Box<dyn Error>>`.

pub mod export;
pub mod visualization;

pub use export::{export_profiles_csv, export_sweep_csv, CsvConfig, CsvMetadata};
pub use visualization::{plot_profiles, plot_sweep_cost, PlotConfig};
