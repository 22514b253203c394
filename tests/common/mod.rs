//! Common utilities for integration tests
#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items; each test binary uses a subset
#[allow(unused_imports)]
pub use mock_models::{mock_quantity, DiscreteDiffusion, ExponentialDecay, ForcedRelaxation};
#[allow(unused_imports)]
pub use test_helpers::{
    closed_step,
    column,
    create_simple_scenario,
    inert_column,
    pressure_ramp,
    relative_error,
    step_scenario,
};
