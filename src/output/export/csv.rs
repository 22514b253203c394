//! CSV export of sweep results
//!
//! Two tables are written:
//!
//! - **Sweep table** ([`export_sweep_csv`]): one row per resolution with the
//!   number of cycles, wall time, final cyclic error and status.
//! - **Profiles** ([`export_profiles_csv`]): the final CO2 gas mole fraction of
//!   every successful resolution in long format, on the normalised axis z/L so
//!   grids of different size can be overlaid.
//!
//! # Example
//!
//! ```rust,ignore
//! use vpsa_rs::output::export::{export_sweep_csv, CsvConfig, CsvMetadata};
//!
//! let metadata = CsvMetadata::from_simulation("VPSA column", "BDF (diffsol)");
//! export_sweep_csv(&report, "sweep.csv", Some(&CsvConfig::default().with_metadata(metadata)))?;
//! ```
//!
//! **Output** (`sweep.csv`):
//! ```csv
//! # VPSA Simulation Data
//! # Generated: 2026-10-19T09:12:44+00:00
//! # Model: VPSA column
//! # Solver: BDF (diffsol)
//! #
//! N,Cycles,Time (s),Final Error,Status
//! 15,212,48.121000,9.981432e-4,converged
//! 20,240,81.504000,9.870112e-4,converged
//! ```

use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::sweep::SweepReport;

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// ```rust,ignore
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    pub metadata: Option<CsvMetadata>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
        }
    }
}

impl CsvConfig {
    /// European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    fn number(&self, value: f64) -> String {
        self.localize(format!("{:.prec$}", value, prec = self.precision))
    }

    fn scientific(&self, value: f64) -> String {
        self.localize(format!("{:.prec$e}", value, prec = self.precision))
    }

    fn localize(&self, formatted: String) -> String {
        if self.decimal_separator != '.' {
            formatted.replace('.', &self.decimal_separator.to_string())
        } else {
            formatted
        }
    }
}

/// Metadata for CSV header comments
///
/// Only the fields that are set appear in the header.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    pub model_name: Option<String>,

    pub solver_name: Option<String>,

    /// Cycle time (s)
    pub cycle_time: Option<f64>,

    /// Convergence tolerance on the relative cycle change
    pub tolerance: Option<f64>,

    /// Additional key/value lines
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    pub fn from_simulation(model: &str, solver: &str) -> Self {
        Self {
            model_name: Some(model.to_string()),
            solver_name: Some(solver.to_string()),
            ..Default::default()
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: String, value: String) {
        self.custom.push((key, value));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn write_metadata_header<W: Write>(out: &mut W, metadata: &CsvMetadata) -> Result<(), Box<dyn Error>> {
    writeln!(out, "# VPSA Simulation Data")?;
    writeln!(out, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(model) = &metadata.model_name {
        writeln!(out, "# Model: {}", model)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(out, "# Solver: {}", solver)?;
    }
    if let Some(cycle_time) = metadata.cycle_time {
        writeln!(out, "# Cycle Time: {} s", cycle_time)?;
    }
    if let Some(tolerance) = metadata.tolerance {
        writeln!(out, "# Tolerance: {:e}", tolerance)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(out, "# {}: {}", key, value)?;
    }
    writeln!(out, "#")?;

    Ok(())
}

fn create<P: AsRef<Path>>(output_path: P, config: &CsvConfig) -> Result<BufWriter<File>, Box<dyn Error>> {
    let mut out = BufWriter::new(File::create(output_path)?);
    if config.include_metadata
        && let Some(metadata) = &config.metadata
    {
        write_metadata_header(&mut out, metadata)?;
    }
    Ok(out)
}

// =============================================================================
// Export Functions
// =============================================================================

/// Export the sweep table, one row per resolution
///
/// Failed resolutions are written with empty numeric fields and status
/// `failed`.
///
/// # Errors
///
/// - Empty report
/// - Non-finite time or error in a successful entry
/// - File creation errors
pub fn export_sweep_csv<P: AsRef<Path>>(
    report: &SweepReport,
    output_path: P,
    configuration: Option<&CsvConfig>,
) -> Result<(), Box<dyn Error>> {
    if report.is_empty() {
        return Err("Empty data: sweep report has no entries".into());
    }
    for (points, run) in report.successful() {
        if !run.elapsed.as_secs_f64().is_finite() || !run.final_error().is_finite() {
            return Err(format!("Invalid data: NaN or Inf detected for N = {}", points).into());
        }
    }

    let binding = CsvConfig::default();
    let config = configuration.unwrap_or(&binding);
    let d = config.delimiter;

    let mut out = create(output_path, config)?;
    writeln!(out, "N{d}Cycles{d}Time (s){d}Final Error{d}Status")?;

    for entry in &report.entries {
        match &entry.outcome {
            Ok(run) => writeln!(
                out,
                "{}{d}{}{d}{}{d}{}{d}{}",
                entry.points,
                run.cycles,
                config.number(run.elapsed.as_secs_f64()),
                config.scientific(run.final_error()),
                if run.converged { "converged" } else { "not_converged" },
            )?,
            Err(_) => writeln!(out, "{}{d}{d}{d}{d}failed", entry.points)?,
        }
    }

    out.flush()?;
    Ok(())
}

/// Export the final CO2 profiles of every successful resolution
///
/// Long format: columns `N`, `z/L`, `y_CO2`.
///
/// # Errors
///
/// - No successful entry
/// - Position and profile length mismatch
/// - NaN or Inf in a profile
/// - File creation errors
pub fn export_profiles_csv<P: AsRef<Path>>(
    report: &SweepReport,
    output_path: P,
    configuration: Option<&CsvConfig>,
) -> Result<(), Box<dyn Error>> {
    if report.successful().next().is_none() {
        return Err("Empty data: no successful sweep entry to export".into());
    }
    for (points, run) in report.successful() {
        if run.positions.len() != run.co2_profile.len() {
            return Err(format!(
                "Data length mismatch for N = {}: {} positions versus {} values",
                points,
                run.positions.len(),
                run.co2_profile.len()
            )
            .into());
        }
        if run.co2_profile.iter().any(|y| !y.is_finite()) {
            return Err(format!("Invalid data: NaN or Inf detected in profile N = {}", points).into());
        }
    }

    let binding = CsvConfig::default();
    let config = configuration.unwrap_or(&binding);
    let d = config.delimiter;

    let mut out = create(output_path, config)?;
    writeln!(out, "N{d}z/L{d}y_CO2")?;

    for (points, run) in report.successful() {
        for (z, y) in run.positions.iter().zip(&run.co2_profile) {
            writeln!(out, "{}{d}{}{d}{}", points, config.number(*z), config.number(*y))?;
        }
    }

    out.flush()?;
    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
