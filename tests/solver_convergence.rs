//! Accuracy and error-control tests for the BDF solver
//!
//! These tests verify that the adaptive integrator tracks analytical
//! solutions, tightens its error with the tolerance and stays cheap on
//! stiff problems. Tolerances bound the local error per step; the global
//! error at the end of the interval is allowed to be a couple of orders of
//! magnitude larger.

use approx::assert_relative_eq;
use vpsa_rs::error::SimulationError;
use vpsa_rs::physics::PhysicalModel;
use vpsa_rs::solver::{BdfSolver, Solver, SolverConfiguration};

mod common;
use common::{create_simple_scenario, mock_quantity, relative_error, DiscreteDiffusion, ExponentialDecay, ForcedRelaxation};

#[test]
fn test_decay_error_follows_tolerance() {
    let solver = BdfSolver::new().with_trajectory(false);
    let total_time = 5.0;
    let tolerances = [1e-3, 1e-5, 1e-7];
    let mut errors = Vec::new();

    for tolerance in tolerances {
        let model = ExponentialDecay::new(3, 0.8);
        let exact = model.analytical_solution(total_time, 1.0);
        let scenario = create_simple_scenario(Box::new(model));

        let config = SolverConfiguration::adaptive(total_time, tolerance, tolerance, 100_000);
        let result = solver.solve(&scenario, &config).unwrap();
        let y = result.final_state.profile(mock_quantity()).unwrap()[2];

        errors.push(relative_error(y, exact));
    }

    println!("decay errors by tolerance: {errors:?}");
    assert!(errors[1] < errors[0]);
    assert!(errors[2] < errors[1]);
    // Global error within 1000 x the requested tolerance
    for (error, tolerance) in errors.iter().zip(tolerances) {
        assert!(*error < 1e3 * tolerance, "error {error:.3e} at tolerance {tolerance:e}");
    }
}

#[test]
fn test_stiff_forced_relaxation() {
    let model = ForcedRelaxation { stiffness: 1.0e4, y0: 3.0 };
    let exact = model.analytical_solution(2.0);
    let scenario = create_simple_scenario(Box::new(model));

    let config = SolverConfiguration::adaptive(2.0, 1e-6, 1e-6, 20_000);
    let result = BdfSolver::new().solve(&scenario, &config).unwrap();

    let y = result.final_state.profile(mock_quantity()).unwrap()[0];
    assert_relative_eq!(y, exact, max_relative = 1e-3);

    // An explicit method would need about λ·T = 2e4 steps
    let steps: usize = result.get_metadata("steps").unwrap().parse().unwrap();
    assert!(steps < 2_000, "took {steps} steps on a stiff problem");
}

#[test]
fn test_trajectory_is_monotonic_in_time() {
    let scenario = create_simple_scenario(Box::new(ExponentialDecay::new(1, 2.0)));
    let config = SolverConfiguration::adaptive(1.0, 1e-6, 1e-6, 10_000);
    let result = BdfSolver::new().solve(&scenario, &config).unwrap();

    assert_eq!(result.time_points.len(), result.state_trajectory.len());
    assert_eq!(result.time_points[0], 0.0);
    assert_eq!(*result.time_points.last().unwrap(), 1.0);
    assert!(result.time_points.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn test_diffusion_conserves_sum() {
    let model = DiscreteDiffusion { points: 40, diffusivity: 2000.0 };
    let initial_sum: f64 = model.setup_initial_state().profile(mock_quantity()).unwrap().sum();
    let scenario = create_simple_scenario(Box::new(model));

    let config = SolverConfiguration::adaptive(1.0, 1e-6, 1e-6, 10_000);
    let result = BdfSolver::new().with_trajectory(false).solve(&scenario, &config).unwrap();
    let y = result.final_state.profile(mock_quantity()).unwrap();

    assert_relative_eq!(y.sum(), initial_sum, max_relative = 1e-4);
    assert!(y.max() - y.min() < 0.1, "profile should flatten, spread {}", y.max() - y.min());

    let products: usize = result.get_metadata("jacobian products").unwrap().parse().unwrap();
    assert!(products > 0);
}

#[test]
fn test_budget_exhaustion_is_typed() {
    let scenario = create_simple_scenario(Box::new(ForcedRelaxation { stiffness: 10.0, y0: 0.0 }));
    let config = SolverConfiguration::adaptive(100.0, 1e-10, 1e-10, 3);

    let error = BdfSolver::new().solve(&scenario, &config).unwrap_err();
    assert!(matches!(error, SimulationError::StepBudgetExhausted { max_steps: 3, .. }));
    assert!(error.is_integrator_failure());
}
