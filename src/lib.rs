//! vpsa-rs: cyclic steady state of a VPSA column
//!
//! Simulates a packed adsorption column separating CO2 from N2 with a
//! four-step vacuum pressure swing cycle (Pressurization, Feed, Blowdown,
//! Evacuation). The column is discretised by finite volumes, each step is
//! integrated by the BDF method of `diffsol` and cycles are repeated until
//! the state no longer changes from one cycle to the next.
//!
//! # Architecture
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physical models define equations ([`physics`], [`models`])
//!    - Numerical solvers provide methods ([`solver`])
//! 2. **Cycle orchestration** on top of both ([`cycle`], [`sweep`])
//! 3. **Outputs** for humans and tools ([`output`])
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use vpsa_rs::prelude::*;
//!
//! fn main() -> VpsaResult<()> {
//!     let column = ColumnModel::new(ColumnParameters::default(), IsothermParameters::default(), 20)?;
//!     let driver = CycleDriver::new(column, CycleDesign::default(), IntegratorSettings::default())?;
//!
//!     let report = driver.run_to_steady_state(&driver.initial_state(), 1000)?;
//!     println!("converged: {} after {} cycles", report.converged, report.cycles());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: state containers and the `PhysicalModel` trait
//! - [`models`]: isotherm, process steps and the column flux builder
//! - [`solver`]: `Solver` seam and the `diffsol` BDF adapter
//! - [`cycle`]: cycle driver and cyclic steady-state detection
//! - [`sweep`]: mesh-resolution study
//! - [`config`]: TOML run configuration
//! - [`output`]: CSV export and plots
//! - [`error`]: `SimulationError`

pub mod error;
pub mod physics;

pub mod models;
pub mod solver;

pub mod config;
pub mod cycle;
pub mod sweep;

pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use vpsa_rs::prelude::*;
    //! ```
    pub use crate::config::VpsaConfig;
    pub use crate::cycle::{CycleDesign, CycleDriver, CycleReport, IntegratorSettings, StateValidation};
    pub use crate::error::{SimulationError, VpsaResult};
    pub use crate::models::{
        ColumnModel, ColumnParameters, InitialCondition, IsothermParameters, PressureBounds,
        ProcessStep, StepKind, StepModel,
    };
    pub use crate::physics::{PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState, Species};
    pub use crate::solver::{
        BdfSolver, Scenario, SimulationResult, Solver, SolverConfiguration, SolverType,
    };
    pub use crate::sweep::{SweepDriver, SweepReport, SweepSettings};
}
