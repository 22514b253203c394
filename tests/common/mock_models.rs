//! Mock physical models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use nalgebra::DVector;
use vpsa_rs::error::VpsaResult;
use vpsa_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};

const Y: PhysicalQuantity = PhysicalQuantity::Custom("y");

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// Exponential decay model: dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub points: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(points: usize, decay_rate: f64) -> Self {
        Self { points, decay_rate }
    }

    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl PhysicalModel for ExponentialDecay {
    fn points(&self) -> usize {
        self.points
    }

    fn layout(&self) -> &[PhysicalQuantity] {
        &[Y]
    }

    fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
        let y = state.profile(Y)?;
        Ok(PhysicalState::new(Y, PhysicalData::Vector(y * -self.decay_rate)))
    }

    fn setup_initial_state(&self) -> PhysicalState {
        PhysicalState::new(Y, PhysicalData::uniform_vector(self.points, 1.0))
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Forced relaxation: dy/dt = -λ (y - cos t) - sin t
// =================================================================================================

/// Stiff, non-autonomous relaxation onto cos(t)
///
/// Analytical solution: y(t) = cos(t) + (y₀ - 1) exp(-λ t)
pub struct ForcedRelaxation {
    pub stiffness: f64,
    pub y0: f64,
}

impl ForcedRelaxation {
    pub fn analytical_solution(&self, t: f64) -> f64 {
        t.cos() + (self.y0 - 1.0) * (-self.stiffness * t).exp()
    }
}

impl PhysicalModel for ForcedRelaxation {
    fn points(&self) -> usize {
        1
    }

    fn layout(&self) -> &[PhysicalQuantity] {
        &[Y]
    }

    fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
        let t = state.get_metadata("time").unwrap_or(0.0);
        let y = state.profile(Y)?[0];
        let dy = -self.stiffness * (y - t.cos()) - t.sin();
        Ok(PhysicalState::new(Y, PhysicalData::from_vec(vec![dy])))
    }

    fn setup_initial_state(&self) -> PhysicalState {
        PhysicalState::new(Y, PhysicalData::from_vec(vec![self.y0]))
    }

    fn name(&self) -> &str {
        "Forced Relaxation"
    }
}

// =================================================================================================
// Diffusion on a ring of cells: dy_i/dt = D (y_{i-1} - 2 y_i + y_{i+1})
// =================================================================================================

/// Discrete diffusion with zero-flux ends
///
/// The sum of `y` is conserved and the profile flattens towards its mean.
pub struct DiscreteDiffusion {
    pub points: usize,
    pub diffusivity: f64,
}

impl PhysicalModel for DiscreteDiffusion {
    fn points(&self) -> usize {
        self.points
    }

    fn layout(&self) -> &[PhysicalQuantity] {
        &[Y]
    }

    fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
        let y = state.profile(Y)?;
        let n = self.points;
        let dy = DVector::from_fn(n, |i, _| {
            let left = if i == 0 { y[i] } else { y[i - 1] };
            let right = if i + 1 == n { y[i] } else { y[i + 1] };
            self.diffusivity * (left - 2.0 * y[i] + right)
        });
        Ok(PhysicalState::new(Y, PhysicalData::Vector(dy)))
    }

    fn setup_initial_state(&self) -> PhysicalState {
        let y = DVector::from_fn(self.points, |i, _| if i < self.points / 2 { 1.0 } else { 0.0 });
        PhysicalState::new(Y, PhysicalData::Vector(y))
    }

    fn name(&self) -> &str {
        "Discrete Diffusion"
    }
}

/// The quantity every mock model integrates
pub fn mock_quantity() -> PhysicalQuantity {
    Y
}
