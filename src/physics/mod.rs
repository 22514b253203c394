//! Physical models
//!
//! This module provides the state container and the trait every physical
//! model implements.
//!
//! # Core Concepts
//!
//! - **Physical Model**: Computes the right-hand side of the equations at a given state
//! - **Physical State**: Container for all physical quantities (mole fraction, pressure, ...)
//! - **Physical Quantity**: Type-safe identifier for physical variables
//!
//! # Architecture
//!
//! Physical models are **separate from numerical solvers**:
//! - The model provides the **equations** (physics)
//! - The solver provides the **method** to solve them (numerics)
//!
//! A model also declares its **layout**, the order in which quantities are
//! concatenated into the flat vector a solver works on.
//!
//! # Example
//!
//! ```rust
//! use vpsa_rs::error::VpsaResult;
//! use vpsa_rs::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState};
//!
//! struct Relaxation;
//!
//! impl PhysicalModel for Relaxation {
//!     fn points(&self) -> usize { 1 }
//!     fn layout(&self) -> &[PhysicalQuantity] { &[PhysicalQuantity::Temperature] }
//!     fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
//!         let t = state.profile(PhysicalQuantity::Temperature)?;
//!         let dt = t.map(|x| 298.15 - x);
//!         Ok(PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::Vector(dt)))
//!     }
//!     fn setup_initial_state(&self) -> PhysicalState {
//!         PhysicalState::new(PhysicalQuantity::Temperature, PhysicalData::uniform_vector(1, 350.0))
//!     }
//!     fn name(&self) -> &str { "Relaxation" }
//! }
//!
//! let model = Relaxation;
//! let rate = model.compute_physics(&model.setup_initial_state()).unwrap();
//! assert!(rate.profile(PhysicalQuantity::Temperature).unwrap()[0] < 0.0);
//! ```

// module declaration
pub mod traits;
pub mod data;

// re-export commonly used types for convenience
pub use data::PhysicalData;
pub use traits::{
    PhysicalModel,
    PhysicalQuantity,
    PhysicalState,
    Species,
};
