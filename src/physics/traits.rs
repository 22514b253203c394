//! Physical models traits and types
//!
//! This module defines the core API for physical models:
//! - `PhysicalModel`: trait for all physical models
//! - `PhysicalState`: flexible state container
//! - `PhysicalQuantity`: type-safe quantity identifiers

use nalgebra::DVector;
use std::collections::HashMap;
use std::fmt;

use crate::error::{SimulationError, VpsaResult};
use crate::physics::PhysicalData;

// =================================================================================================
// Physical quantities (Type-safe Identifiers)
// =================================================================================================

/// Adsorbing species of the binary feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Heavy (strongly adsorbed) component, index 0
    CarbonDioxide,

    /// Light component, index 1
    Nitrogen,
}

impl Species {
    /// Position of the species in isotherm and enthalpy arrays
    pub fn index(self) -> usize {
        match self {
            Species::CarbonDioxide => 0,
            Species::Nitrogen => 1,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::CarbonDioxide => write!(f, "CO2"),
            Species::Nitrogen => write!(f, "N2"),
        }
    }
}

/// Known physical quantities (type-safe enum)
///
/// # Example
/// ```
/// use vpsa_rs::physics::{PhysicalQuantity, Species};
///
/// let q = PhysicalQuantity::Loading(Species::CarbonDioxide);
/// assert_eq!(q.to_string(), "loading CO2");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalQuantity {
    /// Gas-phase mole fraction of the heavy component (-)
    MoleFraction,

    /// Gas pressure (stored scaled by the model's pressure scale)
    Pressure,

    /// Temperature (K)
    Temperature,

    /// Adsorbed-phase loading of a species (mol/kg)
    Loading(Species),

    /// Custom quantity (used by test and auxiliary models)
    Custom(&'static str),
}

impl fmt::Display for PhysicalQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicalQuantity::MoleFraction => write!(f, "mole fraction"),
            PhysicalQuantity::Pressure => write!(f, "pressure"),
            PhysicalQuantity::Temperature => write!(f, "temperature"),
            PhysicalQuantity::Loading(species) => write!(f, "loading {species}"),
            PhysicalQuantity::Custom(name) => write!(f, "{name}"),
        }
    }
}

// =================================================================================================
// Physical State (Flexible State Container)
// =================================================================================================

/// Physical state of the system
///
/// Contains all physical quantities at a given time, plus scalar metadata.
/// Solvers write the current (dimensionless) time under the `"time"` key
/// before every evaluation of the model.
///
/// A state maps to a flat vector through a *layout*: an ordered list of
/// quantities, each contributing one contiguous block of `points` values.
///
/// # Example
/// ```
/// use nalgebra::DVector;
/// use vpsa_rs::physics::{PhysicalData, PhysicalQuantity, PhysicalState};
///
/// let layout = [PhysicalQuantity::MoleFraction, PhysicalQuantity::Temperature];
/// let flat = DVector::from_vec(vec![0.1, 0.2, 300.0, 301.0]);
///
/// let state = PhysicalState::from_flat(&layout, 2, &flat).unwrap();
/// assert_eq!(state.to_flat(&layout).unwrap(), flat);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhysicalState {
    /// Physical quantities stored in a dictionary
    pub(crate) quantities: HashMap<PhysicalQuantity, PhysicalData>,

    /// Scalar metadata (time, cycle index, ...)
    metadata: HashMap<String, f64>,
}

impl PhysicalState {
    /// Create a new state with primary quantity
    pub fn new(quantity: PhysicalQuantity, value: PhysicalData) -> Self {
        let mut quantities = HashMap::new();
        quantities.insert(quantity, value);

        Self {
            quantities,
            metadata: HashMap::new(),
        }
    }

    /// Create an empty state
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get a quantity by type
    pub fn get(&self, quantity: PhysicalQuantity) -> Option<&PhysicalData> {
        self.quantities.get(&quantity)
    }

    /// Get mutable reference to a quantity
    pub fn get_mut(&mut self, quantity: PhysicalQuantity) -> Option<&mut PhysicalData> {
        self.quantities.get_mut(&quantity)
    }

    /// Set a quantity
    pub fn set(&mut self, quantity: PhysicalQuantity, value: PhysicalData) {
        self.quantities.insert(quantity, value);
    }

    /// Profile of a vector quantity, or an error naming what is missing
    pub fn profile(&self, quantity: PhysicalQuantity) -> VpsaResult<&DVector<f64>> {
        self.get(quantity)
            .ok_or_else(|| SimulationError::InvalidState(format!("missing quantity: {quantity}")))?
            .try_as_vector()
            .ok_or_else(|| SimulationError::InvalidState(format!("{quantity} is not a profile")))
    }

    /// List of available physical state quantities
    pub fn available_quantities(&self) -> Vec<PhysicalQuantity> {
        self.quantities.keys().cloned().collect()
    }

    /// Iterate over every stored quantity
    pub fn iter(&self) -> impl Iterator<Item = (&PhysicalQuantity, &PhysicalData)> {
        self.quantities.iter()
    }

    /// Get a metadata
    pub fn get_metadata(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).copied()
    }

    /// Set a metadata
    pub fn set_metadata(&mut self, key: String, value: f64) {
        self.metadata.insert(key, value);
    }

    // ======================================== flat layout =======================================

    /// Concatenate the quantities of `layout` into one vector
    pub fn to_flat(&self, layout: &[PhysicalQuantity]) -> VpsaResult<DVector<f64>> {
        let mut values = Vec::new();
        for &quantity in layout {
            let data = self.get(quantity).ok_or_else(|| {
                SimulationError::InvalidState(format!("missing quantity: {quantity}"))
            })?;
            values.extend_from_slice(data.as_slice());
        }
        Ok(DVector::from_vec(values))
    }

    /// Split a flat vector into `layout.len()` profiles of `points` values
    pub fn from_flat(
        layout: &[PhysicalQuantity],
        points: usize,
        flat: &DVector<f64>,
    ) -> VpsaResult<Self> {
        if flat.len() != layout.len() * points {
            return Err(SimulationError::InvalidState(format!(
                "flat vector has {} entries, layout needs {} x {}",
                flat.len(),
                layout.len(),
                points
            )));
        }

        let mut state = Self::empty();
        for (block, &quantity) in layout.iter().enumerate() {
            let segment = flat.rows(block * points, points).into_owned();
            state.set(quantity, PhysicalData::Vector(segment));
        }
        Ok(state)
    }
}

// =================================================================================================
// Physical Model Trait
// =================================================================================================

/// Trait for physical models
///
/// # Responsibility
/// Computes the physics equations of a system at a given state.
/// Does NOT solve them (that's the Solver's job).
///
/// The model provides the "physics" (equations), the Solver provides
/// the "numerics" (method to solve them).
pub trait PhysicalModel: Send + Sync {

    /// Number of spatial points
    fn points(&self) -> usize;

    /// Ordered quantities forming the flat state vector
    fn layout(&self) -> &[PhysicalQuantity];

    /// Computes the right-hand side f(x, t) of dx/dt = f(x, t)
    ///
    /// The returned state has the same quantities as the input and holds
    /// time derivatives. The current time is read from the `"time"` metadata.
    fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState>;

    /// Creates the initial state for this physical model
    fn setup_initial_state(&self) -> PhysicalState;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (option)
    fn description(&self) -> Option<&str> {
        None
    }

    /// Evaluate the right-hand side directly on a flat vector
    fn rhs_flat(&self, time: f64, x: &DVector<f64>) -> VpsaResult<DVector<f64>> {
        let mut state = PhysicalState::from_flat(self.layout(), self.points(), x)?;
        state.set_metadata("time".to_string(), time);
        self.compute_physics(&state)?.to_flat(self.layout())
    }
}
