//! Helper functions for integration tests

use std::sync::Arc;

use nalgebra::DVector;
use vpsa_rs::models::{
    ColumnModel, ColumnParameters, EndCondition, IsothermParameters, PressureBounds, ProcessStep,
    StepKind, StepModel,
};
use vpsa_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
use vpsa_rs::solver::Scenario;

/// Column with default parameters on `points` volumes
pub fn column(points: usize) -> ColumnModel {
    ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), points)
        .expect("default column is valid")
}

/// Column with adsorption switched off
pub fn inert_column(points: usize) -> ColumnModel {
    let params = ColumnParameters::default().with_ldf_coefficient(0.0);
    ColumnModel::new(params, IsothermParameters::default(), points).expect("inert column is valid")
}

/// Step of the given kind with both ends closed
pub fn closed_step(kind: StepKind, duration: f64) -> ProcessStep {
    ProcessStep::new(kind, duration, PressureBounds::default())
        .with_ends(EndCondition::Closed, EndCondition::Closed)
}

/// Initial state with a linear scaled-pressure ramp from `p_first` to `p_last`
pub fn pressure_ramp(column: &ColumnModel, p_first: f64, p_last: f64) -> PhysicalState {
    let n = column.points();
    let mut state = column.initial_state();
    let ramp = DVector::from_fn(n, |i, _| p_first + (p_last - p_first) * i as f64 / (n - 1) as f64);
    state.set(PhysicalQuantity::Pressure, PhysicalData::Vector(ramp));
    state
}

/// Scenario for `step` on a shared column starting from `state`
pub fn step_scenario(column: &Arc<ColumnModel>, step: ProcessStep, state: PhysicalState) -> Scenario {
    Scenario::new(Box::new(StepModel::new(Arc::clone(column), step)), state)
}

/// Scenario starting from the model's own initial state
pub fn create_simple_scenario(model: Box<dyn PhysicalModel>) -> Scenario {
    Scenario::from_model(model)
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }
}
