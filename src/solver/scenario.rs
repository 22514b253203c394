//! Simulation scenario definition
//!
//! A scenario combines a physical model with the state it starts from.
use crate::error::{SimulationError, VpsaResult};
use crate::physics::{PhysicalModel, PhysicalState};

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Physical model (equations)
/// - Initial state
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve").
pub struct Scenario {
    /// Physical model (equations)
    pub model: Box<dyn PhysicalModel>,

    /// State at the start of the interval
    pub initial_state: PhysicalState,
}

impl Scenario {

    /// Create a scenario
    pub fn new(model: Box<dyn PhysicalModel>, initial_state: PhysicalState) -> Self {
        Self { model, initial_state }
    }

    /// Scenario starting from the model's own initial state
    pub fn from_model(model: Box<dyn PhysicalModel>) -> Self {
        let initial_state = model.setup_initial_state();
        Self { model, initial_state }
    }

    /// Check that the initial state carries every quantity of the layout
    pub fn validate(&self) -> VpsaResult<()> {
        let points = self.model.points();
        for &quantity in self.model.layout() {
            let data = self.initial_state.get(quantity).ok_or_else(|| {
                SimulationError::InvalidState(format!(
                    "initial state of {} lacks {}",
                    self.get_model_name(),
                    quantity
                ))
            })?;
            if data.len() != points {
                return Err(SimulationError::InvalidState(format!(
                    "{} has {} values, model {} expects {}",
                    quantity,
                    data.len(),
                    self.get_model_name(),
                    points
                )));
            }
        }
        Ok(())
    }

    /// Get model name
    pub fn get_model_name(&self) -> &str {
        self.model.name()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.get_model_name())
            .field("points", &self.model.points())
            .field("layout", &self.model.layout())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalQuantity};

    struct MockModel;

    impl PhysicalModel for MockModel {
        fn points(&self) -> usize {
            3
        }

        fn layout(&self) -> &[PhysicalQuantity] {
            &[PhysicalQuantity::Temperature]
        }

        fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
            Ok(state.clone())
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::uniform_vector(3, 300.0))
        }

        fn name(&self) -> &str {
            "MockModel"
        }
    }

    #[test]
    fn test_scenario_creation() {
        let scenario = Scenario::from_model(Box::new(MockModel));
        assert_eq!(scenario.get_model_name(), "MockModel");
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn test_scenario_rejects_wrong_size() {
        let state = PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::uniform_vector(4, 300.0));
        let scenario = Scenario::new(Box::new(MockModel), state);
        assert!(scenario.validate().is_err());
    }

    #[test]
    fn test_scenario_rejects_missing_quantity() {
        let state = PhysicalState::new(PhysicalQuantity::Pressure, PhysicalData::uniform_vector(3, 1.0));
        let scenario = Scenario::new(Box::new(MockModel), state);
        assert!(matches!(scenario.validate(), Err(SimulationError::InvalidState(_))));
    }
}
