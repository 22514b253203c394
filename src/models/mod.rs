//! Physical models of the VPSA column
//!
//! [`StepModel`] implements the [`PhysicalModel`](crate::physics::PhysicalModel)
//! trait. The solver calls `compute_physics` (or `rhs_flat`) at each stage;
//! the model owns the physics (flow, adsorption, heat), the solver the time
//! integration.
//!
//! # Building blocks
//!
//! ## [`IsothermParameters`]: dual-site Langmuir equilibrium
//!
//! Equilibrium loadings of CO2 and N2 as functions of gas concentration,
//! composition and temperature. Generic over `num::Float`.
//!
//! ## [`ProcessStep`]: what happens at the column ends
//!
//! Pressurization, feed, blowdown and evacuation, each with a boundary
//! pressure history and a pair of [`EndCondition`]s.
//!
//! ## [`ColumnModel`]: finite-volume flux builder
//!
//! Turns the 1-D packed bed into 5N ordinary differential equations over the
//! dimensionless step time τ. It is immutable and shared between steps through
//! [`StepModel`], which binds it to one [`ProcessStep`].

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod isotherm;
pub mod step;
pub mod column;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use isotherm::{IsothermParameters, LangmuirSite};
pub use step::{BoundaryProfile, EndCondition, PressureBounds, ProcessStep, StepKind};
pub use column::{ColumnModel, ColumnParameters, InitialCondition, StepModel, UpwindScheme};
