//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Architecture
//!
//! The separation between abstract solver interface (`solver::traits`) and concrete
//! implementations (`solver::methods`) keeps the method open for extension:
//! a new integrator is a new file, the `Solver` trait does not change.
//!
//! # Available Methods
//!
//! ## Implicit Multistep Methods
//!
//! - **[`BdfSolver`]**: variable-order BDF from `diffsol`
//!   - Order: 1 to 5, chosen by the integrator
//!   - Linear algebra: dense nalgebra LU
//!   - Use: stiff systems such as pressure equalisation in packed beds
//!
//! Jacobian-vector products are taken by directional finite differences of
//! the model's right-hand side.
//!
//! # Example
//!
//! ```rust
//! use vpsa_rs::error::VpsaResult;
//! use vpsa_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
//! use vpsa_rs::solver::{BdfSolver, Scenario, Solver, SolverConfiguration};
//!
//! struct Decay;
//!
//! impl PhysicalModel for Decay {
//!     fn points(&self) -> usize { 1 }
//!     fn layout(&self) -> &[PhysicalQuantity] { &[PhysicalQuantity::Custom("y")] }
//!     fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
//!         let y = state.profile(PhysicalQuantity::Custom("y"))?;
//!         Ok(PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::Vector(-y)))
//!     }
//!     fn setup_initial_state(&self) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Custom("y"), PhysicalData::uniform_vector(1, 1.0))
//!     }
//!     fn name(&self) -> &str { "Decay" }
//! }
//!
//! fn main() -> VpsaResult<()> {
//!     let scenario = Scenario::from_model(Box::new(Decay));
//!     let config = SolverConfiguration::adaptive(1.0, 1e-6, 1e-6, 10_000);
//!     let result = BdfSolver::new().solve(&scenario, &config)?;
//!
//!     let y = result.final_state.profile(PhysicalQuantity::Custom("y"))?[0];
//!     assert!((y - (-1.0_f64).exp()).abs() < 1e-4);
//!     Ok(())
//! }
//! ```

mod bdf;

// Re-exports for convenience
pub use bdf::BdfSolver;
