//! Numerical solver traits and types
//!
//! # Design Philosophy
//!
//! - Central enum `SolverType` defines the type of numerical solution
//! - `SolverConfiguration` carries a `SolverType` and validates it
//! - `SimulationResult` holds the trajectory plus string metadata
//!
//! # Stability Guarantee
//!
//! - `Solver` trait: stable interface for every method
//! - `SolverType` enum: extensible (new variants can be added)

use std::collections::HashMap;

use crate::error::VpsaResult;
use crate::physics::PhysicalState;
use crate::solver::Scenario;

// ============================================================================
// Central Solver Type Enumeration
// ============================================================================

/// Type of numerical solution method
///
/// Each variant carries the data specific to that solution type.
///
/// # Examples
///
/// ```rust
/// use vpsa_rs::solver::SolverType;
///
/// // Adaptive integration over the unit interval
/// let solver_type = SolverType::Adaptive {
///     total_time: 1.0,
///     abs_tolerance: 1e-4,
///     rel_tolerance: 1e-4,
///     max_steps: 20_000,
/// };
/// assert!(solver_type.validate().is_ok());
/// assert_eq!(solver_type.name(), "Adaptive");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum SolverType {

    /// Error-controlled time integration from 0 to `total_time`
    ///
    /// Used by: BdfSolver
    ///
    /// # Parameters
    /// - `total_time`: end of the integration interval
    /// - `abs_tolerance`, `rel_tolerance`: local error tolerances
    /// - `max_steps`: budget of integrator steps
    Adaptive {
        total_time: f64,
        abs_tolerance: f64,
        rel_tolerance: f64,
        max_steps: usize,
    },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::Adaptive { .. } => "Adaptive",
        }
    }

    /// Validate that parameters are meaningful
    pub fn validate(&self) -> Result<(), String> {
        match self {
            SolverType::Adaptive { total_time, abs_tolerance, rel_tolerance, max_steps } => {
                if !(*total_time > 0.0) {
                    return Err("Total time must be positive".to_string());
                }
                if !(*abs_tolerance > 0.0) || !(*rel_tolerance > 0.0) {
                    return Err(format!(
                        "Tolerances must be positive, got atol = {} rtol = {}",
                        abs_tolerance, rel_tolerance
                    ));
                }
                if *max_steps == 0 {
                    return Err("Maximum steps must be greater than 0".to_string());
                }
                Ok(())
            }
        }
    }
}

// =================================================================================================
// Solver configuration
// =================================================================================================

/// Configuration for numerical solver
#[derive(Clone, Debug, PartialEq)]
pub struct SolverConfiguration {
    /// Type of solver and its parameters
    pub solver_type: SolverType,
}

impl SolverConfiguration {
    /// Create a new configuration with a given solver type
    pub fn new(solver_type: SolverType) -> Self {
        Self { solver_type }
    }

    /// Create an adaptive integration configuration
    pub fn adaptive(total_time: f64, abs_tolerance: f64, rel_tolerance: f64, max_steps: usize) -> Self {
        Self::new(SolverType::Adaptive { total_time, abs_tolerance, rel_tolerance, max_steps })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.solver_type.validate()
    }
}

// =================================================================================================
// Simulation result
// =================================================================================================

/// Output of a solver run
#[derive(Clone, Debug)]
pub struct SimulationResult {
    /// Accepted time points, starting with the initial time
    pub time_points: Vec<f64>,

    /// State at every accepted time point
    pub state_trajectory: Vec<PhysicalState>,

    /// State at the end of the interval
    pub final_state: PhysicalState,

    /// Diagnostics (solver name, step counts, ...)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    pub fn new(
        time_points: Vec<f64>,
        state_trajectory: Vec<PhysicalState>,
        final_state: PhysicalState,
    ) -> Self {
        Self {
            time_points,
            state_trajectory,
            final_state,
            metadata: HashMap::new(),
        }
    }

    /// Number of stored trajectory points
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

// =================================================================================================
// Solver trait
// =================================================================================================

/// A numerical method applied to a [`Scenario`]
pub trait Solver: Send + Sync {
    /// Solve the scenario with the given configuration
    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> VpsaResult<SimulationResult>;

    /// Name of the method
    fn name(&self) -> &str;
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_validation() {
        assert!(SolverConfiguration::adaptive(1.0, 1e-4, 1e-4, 100).validate().is_ok());
        assert!(SolverConfiguration::adaptive(0.0, 1e-4, 1e-4, 100).validate().is_err());
        assert!(SolverConfiguration::adaptive(1.0, -1e-4, 1e-4, 100).validate().is_err());
        assert!(SolverConfiguration::adaptive(1.0, 1e-4, f64::NAN, 100).validate().is_err());
        assert!(SolverConfiguration::adaptive(1.0, 1e-4, 1e-4, 0).validate().is_err());
    }

    #[test]
    fn test_result_metadata() {
        let mut result = SimulationResult::new(vec![0.0], vec![PhysicalState::empty()], PhysicalState::empty());
        result.add_metadata("solver", "BDF (diffsol)");

        assert_eq!(result.len(), 1);
        assert_eq!(result.get_metadata("solver"), Some("BDF (diffsol)"));
        assert!(result.get_metadata("missing").is_none());
    }
}
