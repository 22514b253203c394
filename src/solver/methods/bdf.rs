//! Variable-order BDF solver backed by `diffsol`
//!
//! # Mathematical Background
//!
//! Pressure equalisation in a packed bed is stiff: the Darcy time scale of a
//! single control volume is orders of magnitude shorter than the adsorption
//! and thermal time scales. Explicit schemes are limited by the former. The
//! backward differentiation formulae (orders 1 to 5) stay stable on the stiff
//! modes and let the step grow with the slow dynamics.
//!
//! The integration itself is done by [`diffsol::Bdf`] with a dense
//! [`NalgebraLU`] linear solver. This module only adapts a
//! [`PhysicalModel`] to diffsol's closure interface:
//!
//! ```text
//! rhs:      (x, p, t, y)    → y = f(t, x)                    model.rhs_flat
//! jac·v:    (x, p, t, v, y) → y ≈ (f(t, x + εv) − f(t, x)) / ε
//! init:     (p, t, y)       → y = x₀                         scenario state
//! ```
//!
//! The directional difference uses ε = √eps · max(1, ‖x‖) / ‖v‖, and f(t, x)
//! is cached between the products of one Jacobian assembly.
//!
//! # Failures
//!
//! - more integrator steps than `max_steps`: [`SimulationError::StepBudgetExhausted`]
//! - diffsol gives up on the step size: [`SimulationError::StepSizeUnderflow`]
//! - non-finite state after a step: [`SimulationError::NonFinite`]
//! - an error raised by the model aborts the run unchanged

use diffsol::error::{DiffsolError, OdeSolverError};
use diffsol::{
    NalgebraLU, NalgebraMat, NalgebraVec, OdeBuilder, OdeSolverMethod, OdeSolverStopReason,
};
use log::{debug, trace};
use nalgebra::DVector;
use std::cell::{Cell, RefCell};

use crate::error::{SimulationError, VpsaResult};
use crate::physics::{PhysicalModel, PhysicalState};
use crate::solver;
use crate::solver::{Scenario, SimulationResult, Solver, SolverConfiguration, SolverType};

type M = NalgebraMat<f64>;
type V = NalgebraVec<f64>;
type LS = NalgebraLU<f64>;

// =================================================================================================
// BDF Solver
// =================================================================================================

/// Adaptive BDF solver for stiff systems
///
/// Requires a [`SolverType::Adaptive`] configuration.
///
/// # Example
///
/// ```rust,ignore
/// use vpsa_rs::solver::{BdfSolver, Solver, SolverConfiguration};
///
/// let solver = BdfSolver::new();
/// let config = SolverConfiguration::adaptive(1.0, 1e-4, 1e-4, 20_000);
/// let result = solver.solve(&scenario, &config)?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BdfSolver {
    record_trajectory: bool,
}

impl Default for BdfSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Counters reported in the result metadata
#[derive(Debug, Default, Clone, Copy)]
struct Statistics {
    steps: usize,
    rhs_evaluations: usize,
    jacobian_products: usize,
}

/// Flat integration output: times, states and counters
type Integration = (Vec<f64>, Vec<DVector<f64>>, Statistics);

fn copy_in(v: &V, size: usize) -> DVector<f64> {
    DVector::from_iterator(size, (0..size).map(|i| v[i]))
}

fn copy_out(src: &DVector<f64>, dst: &mut V) {
    for (i, value) in src.iter().enumerate() {
        dst[i] = *value;
    }
}

/// Translate a diffsol failure at `(time, step_size)`
fn integrator_failure(error: DiffsolError, time: f64, step_size: f64) -> SimulationError {
    match error {
        DiffsolError::OdeSolverError(OdeSolverError::StepSizeTooSmall { .. }) => {
            SimulationError::StepSizeUnderflow { time, step_size }
        }
        other => SimulationError::Integrator(other.to_string()),
    }
}

impl BdfSolver {
    /// Create a solver that stores every integrator step
    pub fn new() -> Self {
        Self { record_trajectory: true }
    }

    /// Builder: keep only the initial and final states in the result
    pub fn with_trajectory(mut self, record: bool) -> Self {
        self.record_trajectory = record;
        self
    }

    fn integrate(
        &self,
        model: &dyn PhysicalModel,
        x0: DVector<f64>,
        total_time: f64,
        atol: f64,
        rtol: f64,
        max_steps: usize,
    ) -> VpsaResult<Integration> {
        let size = x0.len();

        let evaluations = Cell::new(0usize);
        let products = Cell::new(0usize);
        // First model error; diffsol closures cannot return one
        let failure: RefCell<Option<SimulationError>> = RefCell::new(None);
        // f(t, x) at the last linearisation point
        let base: RefCell<Option<(f64, DVector<f64>, DVector<f64>)>> = RefCell::new(None);

        let eval = |t: f64, x: &DVector<f64>| -> Option<DVector<f64>> {
            evaluations.set(evaluations.get() + 1);
            match model.rhs_flat(t, x) {
                Ok(f) => Some(f),
                Err(err) => {
                    failure.borrow_mut().get_or_insert(err);
                    None
                }
            }
        };

        let rhs = |x: &V, _p: &V, t: f64, y: &mut V| {
            let x = copy_in(x, size);
            match eval(t, &x) {
                Some(f) => copy_out(&f, y),
                None => copy_out(&DVector::from_element(size, f64::NAN), y),
            }
        };

        let jac_mul = |x: &V, _p: &V, t: f64, v: &V, y: &mut V| {
            products.set(products.get() + 1);
            let x = copy_in(x, size);
            let v = copy_in(v, size);

            let v_norm = v.norm();
            if v_norm == 0.0 {
                copy_out(&DVector::zeros(size), y);
                return;
            }
            let eps = f64::EPSILON.sqrt() * x.norm().max(1.0) / v_norm;

            let cached = base
                .borrow()
                .as_ref()
                .filter(|(t_base, x_base, _)| *t_base == t && *x_base == x)
                .map(|(_, _, f0)| f0.clone());
            let f0 = match cached.or_else(|| eval(t, &x)) {
                Some(f0) => f0,
                None => return copy_out(&DVector::from_element(size, f64::NAN), y),
            };
            *base.borrow_mut() = Some((t, x.clone(), f0.clone()));

            match eval(t, &(&x + &v * eps)) {
                Some(f1) => copy_out(&((f1 - f0) / eps), y),
                None => copy_out(&DVector::from_element(size, f64::NAN), y),
            }
        };

        let start = x0.clone();
        let init = move |_p: &V, _t: f64, y: &mut V| copy_out(&start, y);

        let problem = OdeBuilder::<M>::new()
            .t0(0.0)
            .rtol(rtol)
            .atol(vec![atol; size])
            .rhs_implicit(rhs, jac_mul)
            .init(init, size)
            .build()
            .map_err(|err| SimulationError::Integrator(err.to_string()))?;

        let created = problem.bdf::<LS>();
        if let Some(err) = failure.borrow_mut().take() {
            return Err(err);
        }
        let mut bdf = created.map_err(|err| integrator_failure(err, 0.0, 0.0))?;
        bdf.set_stop_time(total_time).map_err(|err| integrator_failure(err, 0.0, 0.0))?;

        let mut times = vec![0.0];
        let mut states = vec![x0];
        let mut steps = 0usize;

        loop {
            let (time, step_size) = {
                let state = bdf.state();
                (state.t, state.h)
            };
            if steps >= max_steps {
                return Err(SimulationError::StepBudgetExhausted { max_steps, time, step_size });
            }

            let outcome = bdf.step();
            steps += 1;
            if let Some(err) = failure.borrow_mut().take() {
                return Err(err);
            }
            let reason = outcome.map_err(|err| integrator_failure(err, time, step_size))?;

            let state = bdf.state();
            let y = copy_in(state.y, size);
            if y.iter().any(|v| !v.is_finite()) {
                return Err(SimulationError::NonFinite {
                    quantity: "state".to_string(),
                    step: steps,
                });
            }
            trace!("{}: step {steps} to tau = {:.6}, h = {:.3e}", model.name(), state.t, state.h);

            match reason {
                OdeSolverStopReason::TstopReached => {
                    times.push(total_time);
                    states.push(y);
                    break;
                }
                _ => {
                    if self.record_trajectory {
                        times.push(state.t);
                        states.push(y);
                    }
                }
            }
        }

        let stats = Statistics {
            steps,
            rhs_evaluations: evaluations.get(),
            jacobian_products: products.get(),
        };
        Ok((times, states, stats))
    }
}

impl Solver for BdfSolver {

    fn solve(&self, scenario: &Scenario, config: &SolverConfiguration) -> VpsaResult<SimulationResult> {

        // ====== Step 1: Validation ======

        config.validate().map_err(SimulationError::InvalidConfiguration)?;
        scenario.validate()?;

        let SolverType::Adaptive { total_time, abs_tolerance, rel_tolerance, max_steps } = config.solver_type;

        // ====== Step 2: Integration ======

        let model = scenario.model.as_ref();
        let layout = model.layout();
        let x0 = scenario.initial_state.to_flat(layout)?;

        let (time_points, flats, stats) =
            self.integrate(model, x0, total_time, abs_tolerance, rel_tolerance, max_steps)?;

        // ====== Step 3: Build Result ======

        let mut state_trajectory = Vec::with_capacity(flats.len());
        for (x, &t) in flats.iter().zip(&time_points) {
            let mut state = PhysicalState::from_flat(layout, model.points(), x)?;
            state.set_metadata("time".to_string(), t);
            state_trajectory.push(state);
        }

        let final_state = state_trajectory
            .last()
            .cloned()
            .ok_or_else(|| SimulationError::InvalidState("empty trajectory".to_string()))?;
        solver::validate_state(&final_state, stats.steps)?;

        debug!(
            "{}: {} steps, {} rhs evaluations, {} jacobian products",
            model.name(),
            stats.steps,
            stats.rhs_evaluations,
            stats.jacobian_products
        );

        let mut result = SimulationResult::new(time_points, state_trajectory, final_state);

        result.add_metadata("solver", self.name());
        result.add_metadata("steps", &stats.steps.to_string());
        result.add_metadata("function evaluations", &stats.rhs_evaluations.to_string());
        result.add_metadata("jacobian products", &stats.jacobian_products.to_string());
        result.add_metadata("total time", &total_time.to_string());

        Ok(result)
    }

    fn name(&self) -> &str {
        "BDF (diffsol)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{PhysicalData, PhysicalQuantity};
    use approx::assert_relative_eq;

    // ====== Mock Models for Testing ======

    /// dy/dt = -k y, y(0) = 1
    struct ExponentialDecay {
        points: usize,
        decay_rate: f64,
    }

    impl PhysicalModel for ExponentialDecay {
        fn points(&self) -> usize {
            self.points
        }

        fn layout(&self) -> &[PhysicalQuantity] {
            &[PhysicalQuantity::Custom("y")]
        }

        fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
            let mut result = state.clone();
            if let Some(y) = result.get_mut(PhysicalQuantity::Custom("y")) {
                y.apply(|v| -self.decay_rate * v);
            }
            Ok(result)
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::uniform_vector(self.points, 1.0))
        }

        fn name(&self) -> &str {
            "Exponential Decay"
        }
    }

    /// Stiff relaxation towards a moving target: y' = -λ (y - cos t) - sin t
    ///
    /// Exact solution y = cos t for y(0) = 1.
    struct StiffTracking {
        lambda: f64,
    }

    impl PhysicalModel for StiffTracking {
        fn points(&self) -> usize {
            1
        }

        fn layout(&self) -> &[PhysicalQuantity] {
            &[PhysicalQuantity::Custom("y")]
        }

        fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
            let t = state.get_metadata("time").unwrap_or(0.0);
            let y = state.profile(PhysicalQuantity::Custom("y"))?;
            let dy = y.map(|v| -self.lambda * (v - t.cos()) - t.sin());
            Ok(PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::Vector(dy)))
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::uniform_vector(1, 1.0))
        }

        fn name(&self) -> &str {
            "Stiff Tracking"
        }
    }

    /// Fails once the integration passes `after`
    struct FailingModel {
        after: f64,
    }

    impl PhysicalModel for FailingModel {
        fn points(&self) -> usize {
            1
        }

        fn layout(&self) -> &[PhysicalQuantity] {
            &[PhysicalQuantity::Custom("y")]
        }

        fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
            if state.get_metadata("time").unwrap_or(0.0) > self.after {
                return Err(SimulationError::PhysicsViolation("model refused".to_string()));
            }
            Ok(PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::uniform_vector(1, 1.0)))
        }

        fn setup_initial_state(&self) -> PhysicalState {
            PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::uniform_vector(1, 0.0))
        }

        fn name(&self) -> &str {
            "Failing"
        }
    }

    fn solve(model: Box<dyn PhysicalModel>, config: SolverConfiguration) -> VpsaResult<SimulationResult> {
        let scenario = Scenario::from_model(model);
        BdfSolver::new().solve(&scenario, &config)
    }

    fn final_value(result: &SimulationResult) -> f64 {
        result.final_state.profile(PhysicalQuantity::Custom("y")).unwrap()[0]
    }

    #[test]
    fn test_exponential_decay_accuracy() {
        let model = Box::new(ExponentialDecay { points: 3, decay_rate: 2.0 });
        let result = solve(model, SolverConfiguration::adaptive(1.0, 1e-8, 1e-8, 10_000)).unwrap();

        assert_relative_eq!(final_value(&result), (-2.0_f64).exp(), max_relative = 1e-4);
        assert_eq!(*result.time_points.last().unwrap(), 1.0);
        assert_eq!(result.final_state.get_metadata("time"), Some(1.0));
    }

    #[test]
    fn test_tighter_tolerance_takes_more_steps() {
        let loose = solve(
            Box::new(ExponentialDecay { points: 1, decay_rate: 3.0 }),
            SolverConfiguration::adaptive(1.0, 1e-3, 1e-3, 10_000),
        )
        .unwrap();
        let tight = solve(
            Box::new(ExponentialDecay { points: 1, decay_rate: 3.0 }),
            SolverConfiguration::adaptive(1.0, 1e-8, 1e-8, 10_000),
        )
        .unwrap();

        assert!(tight.len() > loose.len());
        assert_relative_eq!(final_value(&tight), (-3.0_f64).exp(), max_relative = 1e-4);
    }

    #[test]
    fn test_stiff_problem_takes_few_steps() {
        let model = Box::new(StiffTracking { lambda: 1.0e6 });
        let result = solve(model, SolverConfiguration::adaptive(2.0, 1e-6, 1e-6, 5_000)).unwrap();

        assert_relative_eq!(final_value(&result), 2.0_f64.cos(), epsilon = 1e-3);

        let steps: usize = result.get_metadata("steps").unwrap().parse().unwrap();
        assert!(steps < 2_000, "stiff problem needed {steps} steps");
    }

    #[test]
    fn test_budget_exhaustion_is_reported() {
        let model = Box::new(StiffTracking { lambda: 1.0 });
        let error = solve(model, SolverConfiguration::adaptive(100.0, 1e-12, 1e-12, 5)).unwrap_err();

        assert!(matches!(error, SimulationError::StepBudgetExhausted { max_steps: 5, .. }));
        assert!(error.is_integrator_failure());
    }

    #[test]
    fn test_model_error_propagates() {
        let error = solve(Box::new(FailingModel { after: 0.5 }), SolverConfiguration::adaptive(1.0, 1e-6, 1e-6, 1_000))
            .unwrap_err();
        assert!(matches!(error, SimulationError::PhysicsViolation(_)), "got {error:?}");
    }

    #[test]
    fn test_without_trajectory_keeps_endpoints() {
        let scenario = Scenario::from_model(Box::new(ExponentialDecay { points: 2, decay_rate: 1.0 }));
        let result = BdfSolver::new()
            .with_trajectory(false)
            .solve(&scenario, &SolverConfiguration::adaptive(1.0, 1e-6, 1e-6, 1_000))
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.time_points, vec![0.0, 1.0]);
        assert_eq!(result.get_metadata("solver"), Some("BDF (diffsol)"));
    }
}
