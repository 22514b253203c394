//! Cycle driver: four-step cycles to cyclic steady state
//!
//! # Algorithm
//!
//! One cycle runs Pressurization, Feed, Blowdown and Evacuation in order.
//! Each step is a [`Scenario`] built from a [`StepModel`] and the state left
//! by the previous step, integrated over τ ∈ [0, 1] by the configured solver.
//!
//! After every cycle the relative change of the flat state is measured:
//!
//! ```text
//! err = ‖x_end − x_start‖₂ / (‖x_start‖₂ + 10⁻⁸)
//! ```
//!
//! The driver stops once `err < tolerance` or the cycle budget is spent.
//! Running out of cycles is not an error: [`CycleReport::converged`] is false
//! and the error history tells the caller how far the run got.
//!
//! # Example
//!
//! ```rust,ignore
//! use vpsa_rs::cycle::{CycleDesign, CycleDriver, IntegratorSettings};
//! use vpsa_rs::models::{ColumnModel, ColumnParameters, IsothermParameters};
//!
//! let column = ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), 20)?;
//! let driver = CycleDriver::new(column, CycleDesign::default(), IntegratorSettings::default())?;
//!
//! let report = driver.run_to_steady_state(&driver.initial_state(), 1000)?;
//! println!("{} cycles, final error {:.2e}", report.cycles(), report.final_error().unwrap_or(f64::NAN));
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{SimulationError, VpsaResult};
use crate::models::{
    BoundaryProfile, ColumnModel, PressureBounds, ProcessStep, StepKind, StepModel,
};
use crate::physics::{PhysicalQuantity, PhysicalState};
use crate::solver::{BdfSolver, Scenario, Solver, SolverConfiguration};

/// Tolerance on mole fraction excursions outside [0, 1]
const MOLE_FRACTION_SLACK: f64 = 1e-3;

// =================================================================================================
// Settings
// =================================================================================================

/// Durations and pressures of the four-step cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleDesign {
    /// Pressurization, Feed, Blowdown and Evacuation durations (s)
    pub durations: [f64; 4],

    pub bounds: PressureBounds,

    pub profile: BoundaryProfile,
}

impl Default for CycleDesign {
    fn default() -> Self {
        Self {
            durations: [20.0, 15.0, 30.0, 40.0],
            bounds: PressureBounds::default(),
            profile: BoundaryProfile::default(),
        }
    }
}

impl CycleDesign {
    /// The four process steps in cycle order
    pub fn steps(&self) -> Vec<ProcessStep> {
        StepKind::CYCLE
            .iter()
            .zip(self.durations)
            .map(|(&kind, duration)| ProcessStep::with_profile(kind, duration, self.bounds, self.profile))
            .collect()
    }

    /// Cycle time (s)
    pub fn cycle_time(&self) -> f64 {
        self.durations.iter().sum()
    }

    pub fn validate(&self) -> Result<(), String> {
        self.steps().iter().try_for_each(ProcessStep::validate)
    }
}

/// Tolerances and step budget of each step integration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegratorSettings {
    pub abs_tolerance: f64,
    pub rel_tolerance: f64,
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            abs_tolerance: 1e-4,
            rel_tolerance: 1e-4,
            max_steps: 20_000,
        }
    }
}

impl IntegratorSettings {
    /// Solver configuration over the unit step interval
    pub fn configuration(&self) -> SolverConfiguration {
        SolverConfiguration::adaptive(1.0, self.abs_tolerance, self.rel_tolerance, self.max_steps)
    }
}

/// What to do when a step leaves the physical domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateValidation {
    /// No check
    Off,

    /// Log a warning and continue
    #[default]
    Warn,

    /// Fail the step with [`SimulationError::PhysicsViolation`]
    Strict,
}

// =================================================================================================
// Report
// =================================================================================================

/// Outcome of [`CycleDriver::run_to_steady_state`]
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Relative state change after each cycle
    pub errors: Vec<f64>,

    /// State at the end of the last cycle
    pub final_state: PhysicalState,

    /// True when the last error fell below the tolerance
    pub converged: bool,
}

impl CycleReport {
    /// Number of cycles run
    pub fn cycles(&self) -> usize {
        self.errors.len()
    }

    pub fn final_error(&self) -> Option<f64> {
        self.errors.last().copied()
    }
}

// =================================================================================================
// Driver
// =================================================================================================

/// Runs process steps and cycles on one column
#[derive(Clone)]
pub struct CycleDriver {
    column: Arc<ColumnModel>,
    design: CycleDesign,
    integrator: IntegratorSettings,
    tolerance: f64,
    validation: StateValidation,
    solver: Arc<dyn Solver>,
}

impl std::fmt::Debug for CycleDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleDriver")
            .field("points", &self.column.points())
            .field("design", &self.design)
            .field("integrator", &self.integrator)
            .field("tolerance", &self.tolerance)
            .field("validation", &self.validation)
            .field("solver", &self.solver.name())
            .finish()
    }
}

impl CycleDriver {
    /// Default convergence tolerance on the relative cycle change
    pub const DEFAULT_TOLERANCE: f64 = 1e-3;

    pub fn new(
        column: ColumnModel,
        design: CycleDesign,
        integrator: IntegratorSettings,
    ) -> VpsaResult<Self> {
        design.validate().map_err(SimulationError::InvalidConfiguration)?;
        integrator
            .configuration()
            .validate()
            .map_err(SimulationError::InvalidConfiguration)?;

        Ok(Self {
            column: Arc::new(column),
            design,
            integrator,
            tolerance: Self::DEFAULT_TOLERANCE,
            validation: StateValidation::default(),
            solver: Arc::new(BdfSolver::new().with_trajectory(false)),
        })
    }

    /// Builder: convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Builder: state validation policy
    pub fn with_validation(mut self, validation: StateValidation) -> Self {
        self.validation = validation;
        self
    }

    /// Builder: replace the step integrator
    pub fn with_solver(mut self, solver: Arc<dyn Solver>) -> Self {
        self.solver = solver;
        self
    }

    pub fn column(&self) -> &ColumnModel {
        &self.column
    }

    pub fn design(&self) -> &CycleDesign {
        &self.design
    }

    /// Fresh bed at the column's initial condition
    pub fn initial_state(&self) -> PhysicalState {
        self.column.initial_state()
    }

    /// Integrate one process step from `state`
    ///
    /// # Errors
    ///
    /// Propagates integrator failures unchanged; returns
    /// [`SimulationError::PhysicsViolation`] under [`StateValidation::Strict`].
    pub fn advance(&self, state: &PhysicalState, step: &ProcessStep) -> VpsaResult<PhysicalState> {
        let model = StepModel::new(Arc::clone(&self.column), step.clone());
        let scenario = Scenario::new(Box::new(model), state.clone());

        let result = self.solver.solve(&scenario, &self.integrator.configuration())?;
        self.check_physical(&result.final_state, step)?;

        Ok(result.final_state)
    }

    /// Run one full cycle from `state`
    pub fn run_cycle(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
        self.run_numbered_cycle(state, 1)
    }

    fn run_numbered_cycle(&self, state: &PhysicalState, cycle: usize) -> VpsaResult<PhysicalState> {
        let mut current = state.clone();
        for step in self.design.steps() {
            current = self.advance(&current, &step).map_err(|source| SimulationError::StepFailed {
                cycle,
                step: step.kind.to_string(),
                source: Box::new(source),
            })?;
        }
        current.set_metadata("cycle".to_string(), cycle as f64);
        Ok(current)
    }

    /// Repeat cycles until the relative change drops below the tolerance
    ///
    /// # Errors
    ///
    /// Any failed step aborts the run with [`SimulationError::StepFailed`].
    pub fn run_to_steady_state(
        &self,
        initial: &PhysicalState,
        max_cycles: usize,
    ) -> VpsaResult<CycleReport> {
        if max_cycles == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "Cycle budget must be positive".to_string(),
            ));
        }

        let mut state = initial.clone();
        let mut errors = Vec::new();
        let mut converged = false;

        for cycle in 1..=max_cycles {
            let start = self.column.flatten(&state)?;
            state = self.run_numbered_cycle(&state, cycle)?;
            let end = self.column.flatten(&state)?;

            let error = (&end - &start).norm() / (start.norm() + 1e-8);
            errors.push(error);
            debug!("N={} cycle {}: relative change {:.3e}", self.column.points(), cycle, error);

            if error < self.tolerance {
                converged = true;
                info!(
                    "N={}: cyclic steady state after {} cycles (error {:.3e})",
                    self.column.points(),
                    cycle,
                    error
                );
                break;
            }
        }

        if !converged {
            warn!(
                "N={}: no cyclic steady state within {} cycles (last error {:.3e})",
                self.column.points(),
                max_cycles,
                errors.last().copied().unwrap_or(f64::NAN)
            );
        }

        Ok(CycleReport {
            errors,
            final_state: state,
            converged,
        })
    }

    fn check_physical(&self, state: &PhysicalState, step: &ProcessStep) -> VpsaResult<()> {
        if self.validation == StateValidation::Off {
            return Ok(());
        }

        let y = state.profile(PhysicalQuantity::MoleFraction)?;
        let p = state.profile(PhysicalQuantity::Pressure)?;
        let t = state.profile(PhysicalQuantity::Temperature)?;

        let y_min = y.min();
        let y_max = y.max();
        let mut problems = Vec::new();
        if y_min < -MOLE_FRACTION_SLACK || y_max > 1.0 + MOLE_FRACTION_SLACK {
            problems.push(format!("mole fraction in [{y_min:.4}, {y_max:.4}]"));
        }
        if p.min() <= 0.0 {
            problems.push(format!("pressure minimum {:.3e} Pa", p.min() * self.column.params().pressure_scale));
        }
        if t.min() <= 0.0 {
            problems.push(format!("temperature minimum {:.2} K", t.min()));
        }

        if problems.is_empty() {
            return Ok(());
        }

        let message = format!("after {}: {}", step.kind, problems.join(", "));
        match self.validation {
            StateValidation::Strict => Err(SimulationError::PhysicsViolation(message)),
            _ => {
                warn!("N={} {}", self.column.points(), message);
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnParameters, IsothermParameters};
    use crate::physics::PhysicalData;

    fn driver(points: usize) -> CycleDriver {
        let column = ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), points).unwrap();
        CycleDriver::new(column, CycleDesign::default(), IntegratorSettings::default()).unwrap()
    }

    #[test]
    fn test_design_steps_in_order() {
        let steps = CycleDesign::default().steps();
        let kinds: Vec<StepKind> = steps.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, StepKind::CYCLE.to_vec());
        assert_eq!(steps[3].duration, 40.0);
        assert_eq!(CycleDesign::default().cycle_time(), 105.0);
    }

    #[test]
    fn test_rejects_invalid_design() {
        let column = ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), 5).unwrap();
        let mut design = CycleDesign::default();
        design.durations[2] = -1.0;
        assert!(CycleDriver::new(column, design, IntegratorSettings::default()).is_err());
    }

    #[test]
    fn test_single_cycle_stays_physical() {
        let driver = driver(6).with_validation(StateValidation::Strict);
        let state = driver.run_cycle(&driver.initial_state()).unwrap();

        let p = state.profile(PhysicalQuantity::Pressure).unwrap();
        assert!(p.iter().all(|&v| v > 0.02 && v < 0.2), "pressure after evacuation: {p}");
        assert_eq!(state.get_metadata("cycle"), Some(1.0));
    }

    #[test]
    fn test_error_history_when_budget_is_short() {
        let driver = driver(5).with_tolerance(1e-12);
        let report = driver.run_to_steady_state(&driver.initial_state(), 2).unwrap();

        assert_eq!(report.cycles(), 2);
        assert!(!report.converged);
        assert!(report.final_error().unwrap() > 0.0);
    }

    #[test]
    fn test_integrator_failure_propagates() {
        let column = ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), 5).unwrap();
        let settings = IntegratorSettings { max_steps: 1, ..Default::default() };
        let driver = CycleDriver::new(column, CycleDesign::default(), settings).unwrap();

        let error = driver.run_to_steady_state(&driver.initial_state(), 3).unwrap_err();
        match &error {
            SimulationError::StepFailed { cycle, step, .. } => {
                assert_eq!(*cycle, 1);
                assert_eq!(step, "Pressurization");
            }
            other => panic!("expected StepFailed, got {other:?}"),
        }
        assert!(error.is_integrator_failure());
    }

    #[test]
    fn test_strict_validation_rejects_bad_mole_fraction() {
        let driver = driver(4).with_validation(StateValidation::Strict);
        let step = driver.design().steps()[0].clone();

        let mut state = driver.initial_state();
        state.set(PhysicalQuantity::MoleFraction, PhysicalData::from_vec(vec![0.1, 1.2, 0.1, 0.1]));

        let error = driver.check_physical(&state, &step).unwrap_err();
        assert!(matches!(error, SimulationError::PhysicsViolation(_)));

        let lenient = driver.clone().with_validation(StateValidation::Warn);
        assert!(lenient.check_physical(&state, &step).is_ok());
    }

    #[test]
    fn test_zero_cycle_budget_is_rejected() {
        let driver = driver(4);
        assert!(driver.run_to_steady_state(&driver.initial_state(), 0).is_err());
    }
}
