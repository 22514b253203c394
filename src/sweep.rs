//! Mesh-resolution sweep
//!
//! Runs the same cycle to cyclic steady state on several grid sizes and
//! records how many cycles and how much wall time each one needed, together
//! with the final CO2 gas profile on the normalised axis z/L.
//!
//! A failing resolution is recorded in its [`SweepEntry`] and the sweep moves
//! on. With the `parallel` feature the resolutions run on rayon's pool; the
//! report keeps the requested order either way.

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::cycle::{CycleDesign, CycleDriver, IntegratorSettings, StateValidation};
use crate::error::{SimulationError, VpsaResult};
use crate::models::{ColumnModel, ColumnParameters, InitialCondition, IsothermParameters};
use crate::physics::PhysicalQuantity;

// =================================================================================================
// Settings
// =================================================================================================

/// Grid sizes and convergence budget of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Numbers of control volumes to run
    pub resolutions: Vec<usize>,

    /// Cycle budget per resolution
    pub max_cycles: usize,

    /// Relative cycle change accepted as cyclic steady state
    pub tolerance: f64,

    pub validation: StateValidation,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            resolutions: vec![15, 20, 25, 30, 35, 40],
            max_cycles: 1000,
            tolerance: CycleDriver::DEFAULT_TOLERANCE,
            validation: StateValidation::default(),
        }
    }
}

impl SweepSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.resolutions.is_empty() {
            return Err("Sweep needs at least one resolution".to_string());
        }
        if let Some(&n) = self.resolutions.iter().find(|&&n| n < 2) {
            return Err(format!("Resolution must be at least 2 control volumes, got {n}"));
        }
        if self.max_cycles == 0 {
            return Err("Cycle budget must be positive".to_string());
        }
        if !(self.tolerance > 0.0) {
            return Err(format!("Convergence tolerance must be positive, got {}", self.tolerance));
        }
        Ok(())
    }
}

// =================================================================================================
// Results
// =================================================================================================

/// Successful run at one resolution
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub cycles: usize,
    pub elapsed: Duration,
    pub errors: Vec<f64>,
    pub converged: bool,

    /// Cell-centre positions z/L
    pub positions: Vec<f64>,

    /// Final CO2 gas mole fraction per cell
    pub co2_profile: Vec<f64>,
}

impl SweepRun {
    pub fn final_error(&self) -> f64 {
        self.errors.last().copied().unwrap_or(f64::NAN)
    }
}

/// One resolution of the sweep
#[derive(Debug)]
pub struct SweepEntry {
    pub points: usize,
    pub outcome: Result<SweepRun, SimulationError>,
}

/// All entries of a sweep, in the requested order
#[derive(Debug, Default)]
pub struct SweepReport {
    pub entries: Vec<SweepEntry>,
}

impl SweepReport {
    /// Entries that reached the end of their run, with their grid size
    pub fn successful(&self) -> impl Iterator<Item = (usize, &SweepRun)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().ok().map(|run| (entry.points, run)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &SimulationError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().err().map(|err| (entry.points, err)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>4} | {:>6} | {:>9} | {:>11}", "N", "Cycles", "Time (s)", "Final Error")?;
        writeln!(f, "{}", "-".repeat(39))?;
        for entry in &self.entries {
            match &entry.outcome {
                Ok(run) => writeln!(
                    f,
                    "{:>4} | {:>6} | {:>9.2} | {:>11.2e}{}",
                    entry.points,
                    run.cycles,
                    run.elapsed.as_secs_f64(),
                    run.final_error(),
                    if run.converged { "" } else { " (not converged)" }
                )?,
                Err(err) => writeln!(f, "{:>4} | failed: {}", entry.points, err)?,
            }
        }
        Ok(())
    }
}

// =================================================================================================
// Driver
// =================================================================================================

/// Builds a [`CycleDriver`] per resolution and runs it to cyclic steady state
#[derive(Debug, Clone, Default)]
pub struct SweepDriver {
    pub column: ColumnParameters,
    pub isotherm: IsothermParameters,
    pub initial: InitialCondition,
    pub design: CycleDesign,
    pub integrator: IntegratorSettings,
    pub settings: SweepSettings,
}

impl SweepDriver {
    /// Cycle driver on `points` control volumes
    pub fn driver(&self, points: usize) -> VpsaResult<CycleDriver> {
        let column = ColumnModel::new(self.column, self.isotherm, points)?
            .with_initial_condition(self.initial);
        Ok(CycleDriver::new(column, self.design, self.integrator)?
            .with_tolerance(self.settings.tolerance)
            .with_validation(self.settings.validation))
    }

    /// Run one resolution to cyclic steady state
    pub fn run_single(&self, points: usize) -> VpsaResult<SweepRun> {
        let driver = self.driver(points)?;

        let started = Instant::now();
        let report = driver.run_to_steady_state(&driver.initial_state(), self.settings.max_cycles)?;
        let elapsed = started.elapsed();

        let co2_profile = report
            .final_state
            .profile(PhysicalQuantity::MoleFraction)?
            .iter()
            .copied()
            .collect();

        Ok(SweepRun {
            cycles: report.cycles(),
            elapsed,
            errors: report.errors,
            converged: report.converged,
            positions: driver.column().normalized_positions(),
            co2_profile,
        })
    }

    /// Run every resolution of the settings
    pub fn run_all(&self) -> SweepReport {
        self.run(&self.settings.resolutions)
    }

    /// Run the given resolutions; failures are kept per entry
    pub fn run(&self, resolutions: &[usize]) -> SweepReport {
        let entry = |&points: &usize| {
            info!("Sweep: starting N={points}");
            let outcome = self.run_single(points);
            match &outcome {
                Ok(run) => info!(
                    "Sweep: N={} done in {:.2} s, {} cycles",
                    points,
                    run.elapsed.as_secs_f64(),
                    run.cycles
                ),
                Err(err) => error!("Sweep: N={points} failed: {err}"),
            }
            SweepEntry { points, outcome }
        };

        #[cfg(feature = "parallel")]
        let entries = {
            use rayon::prelude::*;
            resolutions.par_iter().map(entry).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let entries = resolutions.iter().map(entry).collect();

        SweepReport { entries }
    }
}

// =================================================================================================
// Tests
// =================================================================================================
