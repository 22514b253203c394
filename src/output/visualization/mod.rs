//! Visualization of sweep results with `plotters`
//!
//! # Organization
//!
//! - **config**: Shared plot configuration (`PlotConfig`)
//! - **steady**: CO2 profiles at cyclic steady state, one curve per grid size
//! - **cost**: Calculation time against grid size
//!
//! The backend follows the file extension: `.svg` writes SVG. `.png`, `.bmp`
//! and `.jpg` write a bitmap when the `bitmap` feature is enabled and are an
//! error otherwise.
//!
//! ```rust,ignore
//! use vpsa_rs::output::visualization::{plot_profiles, plot_sweep_cost, PlotConfig};
//!
//! plot_profiles(&report, "profiles.svg", None)?;
//! plot_sweep_cost(&report, "cost.svg", Some(&PlotConfig::sweep_cost("Grid study")))?;
//! ```

pub mod config;
pub mod cost;
pub mod steady;

pub use config::{IntoOptionalTitle, PlotConfig, NO_TITLE};
pub use cost::plot_sweep_cost;
pub use steady::plot_profiles;
