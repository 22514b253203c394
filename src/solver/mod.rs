//! Numerical solvers
//!
//! This module provides traits and implementations for numerical solvers.
//! A numerical solver applies a numerical method to solve the equations
//! provided by a physical model within a specific scenario.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical model (equations)
//!    - Initial state
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW to solve
//!    - Solver type (adaptive integration)
//!    - Numerical parameters (tolerances, budgets)
//!
//! 3. **Solver** (`Solver` trait) - The numerical method
//!    - Applies the numerical scheme
//!    - Returns the solution
//!    - Independent of physics
//!
//! # Module Organization
//!
//! - **`traits`**: `Solver`, `SolverType`, `SolverConfiguration`, `SimulationResult`
//! - **`scenario`**: `Scenario`, a model plus its initial state
//! - **`methods`**: `BdfSolver` (adapter over `diffsol`)
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────┐
//! │  Physical Model │  (equations)
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ Scenario        │ ← WHAT to solve
//! │ (model + state) │
//! └────────┬────────┘
//!          │
//! ┌────────▼─────────────┐
//! │ Solver Configuration │ ← HOW to solve
//! └────────┬─────────────┘
//!          │
//! ┌────────▼────────┐
//! │ Numerical Solver│ ← The method
//! └────────┬────────┘
//!          │
//! ┌────────▼────────────┐
//! │ Simulation Result   │ ← The solution
//! │ (trajectory + meta) │
//! └─────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Solvers return [`VpsaResult`](crate::error::VpsaResult). Integrator
//! failures (step budget, step-size underflow, non-finite values) are
//! distinguishable through
//! [`SimulationError::is_integrator_failure`](crate::error::SimulationError::is_integrator_failure).

// =================================================================================================
// Module Declarations
// =================================================================================================
mod traits;
mod scenario;
mod methods;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{
    SimulationResult,
    Solver,
    SolverConfiguration,
    SolverType,
};

pub use scenario::Scenario;

pub use methods::BdfSolver;

// =================================================================================================
// Helper Functions
// =================================================================================================

use crate::error::{SimulationError, VpsaResult};
use crate::physics::PhysicalState;

/// Validate physical state for numerical issues
///
/// Checks that the state does not contain NaN or Inf values, which would
/// indicate numerical instability or errors in the physics computation.
///
/// # Arguments
///
/// * `state` - Physical state to validate
/// * `step` - Current step (for error reporting)
pub(crate) fn validate_state(state: &PhysicalState, step: usize) -> VpsaResult<()> {
    for (quantity, data) in state.iter() {
        if !data.is_finite() {
            return Err(SimulationError::NonFinite {
                quantity: quantity.to_string(),
                step,
            });
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalQuantity};

    #[test]
    fn test_validate_finite_state() {
        let state = PhysicalState::new(PhysicalQuantity::Pressure, PhysicalData::uniform_vector(4, 0.1));
        assert!(validate_state(&state, 3).is_ok());
    }

    #[test]
    fn test_validate_detects_nan() {
        let mut state = PhysicalState::new(PhysicalQuantity::Pressure, PhysicalData::uniform_vector(4, 0.1));
        state.set(PhysicalQuantity::Temperature, PhysicalData::from_vec(vec![300.0, f64::NAN]));

        match validate_state(&state, 7) {
            Err(SimulationError::NonFinite { quantity, step }) => {
                assert_eq!(quantity, "temperature");
                assert_eq!(step, 7);
            }
            other => panic!("expected NonFinite, got {other:?}"),
        }
    }
}
