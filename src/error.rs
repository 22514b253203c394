//! Error taxonomy for the VPSA simulator
//!
//! Integrator failures, invalid configurations and physically inconsistent
//! states are all reported through [`SimulationError`]. Cycle
//! non-convergence is *not* an error: it is reported by
//! [`crate::cycle::CycleReport::converged`] together with the error history.

use thiserror::Error;

/// Errors raised by the column model, the integrator and the drivers
#[derive(Debug, Error)]
pub enum SimulationError {
    /// A parameter set or solver configuration is not usable
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A state does not match the layout the model expects
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The integrator took more steps than allowed
    #[error("step budget of {max_steps} exhausted at tau = {time:.6} (h = {step_size:.3e})")]
    StepBudgetExhausted {
        max_steps: usize,
        time: f64,
        step_size: f64,
    },

    /// The adaptive step shrank below the representable resolution
    #[error("step size underflow at tau = {time:.6} (h = {step_size:.3e})")]
    StepSizeUnderflow { time: f64, step_size: f64 },

    /// Any other failure reported by the integrator backend
    #[error("integrator failure: {0}")]
    Integrator(String),

    /// NaN or infinity detected in a state quantity
    #[error("non-finite value in {quantity} at step {step}")]
    NonFinite { quantity: String, step: usize },

    /// A state left its physical domain (mole fraction, pressure)
    #[error("physics violation: {0}")]
    PhysicsViolation(String),

    /// A process step failed inside a cycle
    #[error("cycle {cycle}, step {step} failed: {source}")]
    StepFailed {
        cycle: usize,
        step: String,
        #[source]
        source: Box<SimulationError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("configuration parse error: {0}")]
    Config(#[from] toml::de::Error),
}

impl SimulationError {
    /// True for failures that originate in the time integrator
    pub fn is_integrator_failure(&self) -> bool {
        match self {
            SimulationError::StepBudgetExhausted { .. }
            | SimulationError::StepSizeUnderflow { .. }
            | SimulationError::Integrator(_)
            | SimulationError::NonFinite { .. } => true,
            SimulationError::StepFailed { source, .. } => source.is_integrator_failure(),
            _ => false,
        }
    }
}

/// Result alias used across the crate
pub type VpsaResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrator_failure_classification() {
        let budget = SimulationError::StepBudgetExhausted {
            max_steps: 10,
            time: 0.5,
            step_size: 1e-3,
        };
        assert!(budget.is_integrator_failure());

        let wrapped = SimulationError::StepFailed {
            cycle: 3,
            step: "Feed".to_string(),
            source: Box::new(budget),
        };
        assert!(wrapped.is_integrator_failure());
        assert!(wrapped.to_string().contains("cycle 3"));

        assert!(SimulationError::Integrator("newton failed".to_string()).is_integrator_failure());

        let config = SimulationError::InvalidConfiguration("bad".to_string());
        assert!(!config.is_integrator_failure());
    }
}
