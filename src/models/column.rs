//! Packed-bed VPSA column: finite-volume flux builder
//!
//! # Physical background
//!
//! A packed bed of porosity ε is divided into N control volumes of width
//! Δz = L/N. Each volume carries five unknowns:
//!
//! | Block | Quantity                       | Unit                 |
//! |-------|--------------------------------|----------------------|
//! | 0     | CO2 gas mole fraction y        | –                    |
//! | 1     | pressure P / P_scale           | –                    |
//! | 2     | temperature T                  | K                    |
//! | 3     | CO2 loading q₀                 | mol/kg               |
//! | 4     | N2 loading q₁                  | mol/kg               |
//!
//! The flat state vector is the concatenation of the five blocks
//! ([`ColumnModel::LAYOUT`]).
//!
//! # Discretisation
//!
//! 1. **Face velocities** follow Darcy's law, saturated by a hyperbolic tangent:
//!    $v = v_{max} \tanh\left(-K \frac{\Delta P}{\Delta z} / v_{max}\right)$ with
//!    $K = (2 r_p)^2 \varepsilon^3 / (150 (1-\varepsilon)^2 \mu)$.
//!    Pressure-driven ends use the gap to the boundary pressure over Δz/2.
//! 2. **Face values** of y, T and P blend the upstream and downstream cells with
//!    $\varphi = \tfrac{1}{2}(1 + \tanh(v / w))$. The feed-end ghost cell holds the
//!    feed composition and temperature, the product-end ghost copies the last cell.
//! 3. **Balances** per volume, with $f = (1-\varepsilon)/\varepsilon$ and
//!    LDF rates $r_k = k_{LDF}(q_k^* - q_k)$:
//!    - energy: $C_{p,eff}\,\dot T = -\partial_z(F C_{p,g} T) + Q$
//!    - total mass: $\dot P = R T (-\partial_z F + S) + (P/T)\,\dot T$
//!    - CO2: $C\,\dot y = -(\partial_z(F y) - y\,\partial_z F) + (S_y - y S)$
//!    - solid: $\dot q_k = r_k$
//! 4. The pressure block is divided by the pressure scale and every block is
//!    multiplied by the step duration, so one step spans τ ∈ [0, 1].
//!
//! Each face flux is evaluated once and shared by the two volumes it
//! separates, so with both ends closed the total gas and adsorbed inventory
//! ([`ColumnModel::total_inventory`]) is an exact invariant of the equations.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{SimulationError, VpsaResult};
use crate::models::isotherm::IsothermParameters;
use crate::models::step::{EndCondition, ProcessStep};
use crate::physics::{
    PhysicalData, PhysicalModel, PhysicalQuantity, PhysicalState, Species,
};

// =================================================================================================
// Parameters
// =================================================================================================

/// Face interpolation of transported quantities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpwindScheme {
    /// tanh blend of both neighbours, differentiable in the velocity
    Smooth,

    /// Pure upstream value
    Sharp,
}

/// Geometry, transport and thermal properties of the column
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnParameters {
    /// Bed length L (m)
    pub length: f64,

    /// Inner radius (m)
    pub inner_radius: f64,

    /// Bed porosity ε
    pub porosity: f64,

    /// Particle radius (m)
    pub particle_radius: f64,

    /// Solid density (kg/m³)
    pub solid_density: f64,

    /// Universal gas constant (J/mol/K)
    pub gas_constant: f64,

    /// Gas heat capacity (J/mol/K)
    pub gas_heat_capacity: f64,

    /// Solid heat capacity (J/kg/K)
    pub solid_heat_capacity: f64,

    /// Gas viscosity (Pa·s)
    pub viscosity: f64,

    /// Heats of adsorption ΔH for CO2 and N2 (J/mol)
    pub adsorption_enthalpy: [f64; 2],

    /// Linear-driving-force coefficient (1/s)
    pub ldf_coefficient: f64,

    /// Pressure used to non-dimensionalise the pressure block (Pa)
    pub pressure_scale: f64,

    /// Velocity saturation bound (m/s)
    pub max_velocity: f64,

    /// Width of the upwind blend (m/s)
    pub upwind_width: f64,

    pub upwind: UpwindScheme,

    /// CO2 mole fraction of the feed gas
    pub feed_mole_fraction: f64,

    /// Feed gas temperature (K)
    pub feed_temperature: f64,
}

impl Default for ColumnParameters {
    fn default() -> Self {
        Self {
            length: 1.0,
            inner_radius: 0.1445,
            porosity: 0.37,
            particle_radius: 1e-3,
            solid_density: 1130.0,
            gas_constant: 8.314,
            gas_heat_capacity: 30.7,
            solid_heat_capacity: 1070.0,
            viscosity: 1.72e-5,
            adsorption_enthalpy: [-36165.935, -15800.0],
            ldf_coefficient: 0.02477876,
            pressure_scale: 1.0e5,
            max_velocity: 5.0,
            upwind_width: 0.1,
            upwind: UpwindScheme::Smooth,
            feed_mole_fraction: 0.15,
            feed_temperature: 298.15,
        }
    }
}

impl ColumnParameters {
    /// Darcy permeability over viscosity, Blake-Kozeny form (m²/(Pa·s))
    pub fn darcy_constant(&self) -> f64 {
        let eps = self.porosity;
        let dp = 2.0 * self.particle_radius;
        dp * dp * eps.powi(3) / (150.0 * (1.0 - eps).powi(2) * self.viscosity)
    }

    /// Column cross-section (m²)
    pub fn cross_section(&self) -> f64 {
        std::f64::consts::PI * self.inner_radius * self.inner_radius
    }

    /// Builder: set the LDF coefficient
    pub fn with_ldf_coefficient(mut self, k: f64) -> Self {
        self.ldf_coefficient = k;
        self
    }

    /// Builder: set the upwind scheme
    pub fn with_upwind(mut self, scheme: UpwindScheme) -> Self {
        self.upwind = scheme;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.porosity > 0.0 && self.porosity < 1.0) {
            return Err(format!("Porosity must lie in (0, 1), got {}", self.porosity));
        }
        let positive = [
            ("length", self.length),
            ("inner_radius", self.inner_radius),
            ("particle_radius", self.particle_radius),
            ("solid_density", self.solid_density),
            ("gas_constant", self.gas_constant),
            ("gas_heat_capacity", self.gas_heat_capacity),
            ("solid_heat_capacity", self.solid_heat_capacity),
            ("viscosity", self.viscosity),
            ("pressure_scale", self.pressure_scale),
            ("max_velocity", self.max_velocity),
            ("upwind_width", self.upwind_width),
            ("feed_temperature", self.feed_temperature),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(format!("Column parameter {} must be positive, got {}", name, value));
            }
        }
        if !(self.ldf_coefficient >= 0.0) {
            return Err("LDF coefficient cannot be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.feed_mole_fraction) {
            return Err(format!(
                "Feed mole fraction must lie in [0, 1], got {}",
                self.feed_mole_fraction
            ));
        }
        Ok(())
    }
}

/// Uniform state the bed starts from, loadings at isotherm equilibrium
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialCondition {
    pub mole_fraction: f64,

    /// Pa
    pub pressure: f64,

    /// K
    pub temperature: f64,
}

impl Default for InitialCondition {
    fn default() -> Self {
        Self {
            mole_fraction: 0.0,
            pressure: 1.0e4,
            temperature: 298.15,
        }
    }
}

// =================================================================================================
// Column model
// =================================================================================================

/// Immutable column discretisation on N control volumes
#[derive(Debug, Clone)]
pub struct ColumnModel {
    params: ColumnParameters,
    isotherm: IsothermParameters,
    initial: InitialCondition,
    points: usize,
    dz: f64,
    darcy: f64,
}

impl ColumnModel {
    /// Block order of the flat state vector
    pub const LAYOUT: [PhysicalQuantity; 5] = [
        PhysicalQuantity::MoleFraction,
        PhysicalQuantity::Pressure,
        PhysicalQuantity::Temperature,
        PhysicalQuantity::Loading(Species::CarbonDioxide),
        PhysicalQuantity::Loading(Species::Nitrogen),
    ];

    /// Create a column with `points` control volumes
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidConfiguration`] when a parameter is
    /// out of range or fewer than two volumes are requested.
    pub fn new(
        params: ColumnParameters,
        isotherm: IsothermParameters,
        points: usize,
    ) -> VpsaResult<Self> {
        if points < 2 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "Column needs at least 2 control volumes, got {points}"
            )));
        }
        params.validate().map_err(SimulationError::InvalidConfiguration)?;
        isotherm.validate().map_err(SimulationError::InvalidConfiguration)?;

        Ok(Self {
            dz: params.length / points as f64,
            darcy: params.darcy_constant(),
            params,
            isotherm,
            initial: InitialCondition::default(),
            points,
        })
    }

    /// Builder: set the initial bed condition
    pub fn with_initial_condition(mut self, initial: InitialCondition) -> Self {
        self.initial = initial;
        self
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn params(&self) -> &ColumnParameters {
        &self.params
    }

    pub fn isotherm(&self) -> &IsothermParameters {
        &self.isotherm
    }

    pub fn initial_condition(&self) -> &InitialCondition {
        &self.initial
    }

    /// Length of the flat state vector (5N)
    pub fn state_len(&self) -> usize {
        Self::LAYOUT.len() * self.points
    }

    /// Cell-centre positions normalised by the bed length, z/L ∈ (0, 1)
    pub fn normalized_positions(&self) -> Vec<f64> {
        (0..self.points)
            .map(|i| (i as f64 + 0.5) / self.points as f64)
            .collect()
    }

    // ===================================== state helpers =====================================

    /// Uniform state at the initial condition with equilibrium loadings
    pub fn initial_state(&self) -> PhysicalState {
        let InitialCondition { mole_fraction, pressure, temperature } = self.initial;
        let (q0, q1) = self.isotherm.loadings_at_pressure(pressure, mole_fraction, temperature);
        let n = self.points;

        let mut state = PhysicalState::new(
            PhysicalQuantity::MoleFraction,
            PhysicalData::uniform_vector(n, mole_fraction),
        );
        state.set(
            PhysicalQuantity::Pressure,
            PhysicalData::uniform_vector(n, pressure / self.params.pressure_scale),
        );
        state.set(PhysicalQuantity::Temperature, PhysicalData::uniform_vector(n, temperature));
        state.set(
            PhysicalQuantity::Loading(Species::CarbonDioxide),
            PhysicalData::uniform_vector(n, q0),
        );
        state.set(
            PhysicalQuantity::Loading(Species::Nitrogen),
            PhysicalData::uniform_vector(n, q1),
        );
        state
    }

    /// Flatten a column state into the 5N vector
    pub fn flatten(&self, state: &PhysicalState) -> VpsaResult<DVector<f64>> {
        let flat = state.to_flat(&Self::LAYOUT)?;
        self.check_len(&flat)?;
        Ok(flat)
    }

    /// Rebuild a column state from the 5N vector
    pub fn unflatten(&self, flat: &DVector<f64>) -> VpsaResult<PhysicalState> {
        PhysicalState::from_flat(&Self::LAYOUT, self.points, flat)
    }

    /// Pressure profile in Pa
    pub fn pressure_pa(&self, state: &PhysicalState) -> VpsaResult<DVector<f64>> {
        Ok(state.profile(PhysicalQuantity::Pressure)? * self.params.pressure_scale)
    }

    fn check_len(&self, x: &DVector<f64>) -> VpsaResult<()> {
        if x.len() != self.state_len() {
            return Err(SimulationError::InvalidState(format!(
                "column state must have {} entries, got {}",
                self.state_len(),
                x.len()
            )));
        }
        Ok(())
    }

    // ======================================= inventories =====================================

    /// Gas-phase inventory Σ P/(R T) per unit void volume (mol/m³ summed over cells)
    pub fn gas_inventory(&self, x: &DVector<f64>) -> f64 {
        let n = self.points;
        let r = self.params.gas_constant;
        let scale = self.params.pressure_scale;
        (0..n).map(|i| x[n + i] * scale / (r * x[2 * n + i])).sum()
    }

    /// Gas plus adsorbed inventory on the same void-volume basis
    ///
    /// The adsorbed term uses the `(1 − ε)/ε` factor of the mass source, so this
    /// sum is conserved whenever no gas crosses the column ends.
    pub fn total_inventory(&self, x: &DVector<f64>) -> f64 {
        let n = self.points;
        let f = (1.0 - self.params.porosity) / self.params.porosity;
        let adsorbed: f64 = (0..n).map(|i| x[3 * n + i] + x[4 * n + i]).sum();
        self.gas_inventory(x) + f * adsorbed
    }

    // ========================================= physics =======================================

    fn saturate(&self, raw: f64) -> f64 {
        let vmax = self.params.max_velocity;
        vmax * (raw / vmax).tanh()
    }

    /// Weight of the upstream (lower index) neighbour at a face
    fn upwind_weight(&self, velocity: f64) -> f64 {
        match self.params.upwind {
            UpwindScheme::Smooth => 0.5 * (1.0 + (velocity / self.params.upwind_width).tanh()),
            UpwindScheme::Sharp => {
                if velocity > 0.0 {
                    1.0
                } else if velocity < 0.0 {
                    0.0
                } else {
                    0.5
                }
            }
        }
    }

    /// Face velocities v₀..v_N (m/s) for pressures `p` (Pa) at boundary pressure `pb`
    fn face_velocities(&self, step: &ProcessStep, p: &[f64], pb: f64) -> Vec<f64> {
        let n = self.points;
        let k = self.darcy;
        let dz = self.dz;
        let mut v = vec![0.0; n + 1];

        for i in 1..n {
            v[i] = self.saturate(-k * (p[i] - p[i - 1]) / dz);
        }

        v[0] = match step.feed_end {
            EndCondition::Closed => 0.0,
            EndCondition::Velocity(u) => u,
            EndCondition::PressureDriven => self.saturate(-k * (p[0] - pb) / (0.5 * dz)),
        };
        v[n] = match step.product_end {
            EndCondition::Closed => 0.0,
            EndCondition::Velocity(u) => u,
            EndCondition::PressureDriven => self.saturate(-k * (pb - p[n - 1]) / (0.5 * dz)),
        };

        v
    }

    /// Time derivative dx/dτ of the flat state at dimensionless time `tau`
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::InvalidState`] when `x` does not have 5N entries.
    pub fn rhs(&self, step: &ProcessStep, tau: f64, x: &DVector<f64>) -> VpsaResult<DVector<f64>> {
        self.check_len(x)?;

        let n = self.points;
        let pr = &self.params;
        let r = pr.gas_constant;
        let eps = pr.porosity;
        let solid = (1.0 - eps) / eps;
        let cpg = pr.gas_heat_capacity;
        let duration = step.duration;

        let y = &x.as_slice()[0..n];
        let p: Vec<f64> = x.as_slice()[n..2 * n].iter().map(|v| v * pr.pressure_scale).collect();
        let t = &x.as_slice()[2 * n..3 * n];
        let q0 = &x.as_slice()[3 * n..4 * n];
        let q1 = &x.as_slice()[4 * n..5 * n];

        let pb = step.boundary_pressure(tau);
        let v = self.face_velocities(step, &p, pb);

        // Face fluxes: total molar flux, CO2 flux and enthalpy flux per unit Cp_g.
        let mut flux = vec![0.0; n + 1];
        let mut flux_y = vec![0.0; n + 1];
        let mut flux_t = vec![0.0; n + 1];

        for face in 0..=n {
            let phi = self.upwind_weight(v[face]);
            let (y_up, t_up, p_up) = if face == 0 {
                (pr.feed_mole_fraction, pr.feed_temperature, p[0])
            } else {
                (y[face - 1], t[face - 1], p[face - 1])
            };
            let (y_dn, t_dn, p_dn) = if face == n {
                (y[n - 1], t[n - 1], p[n - 1])
            } else {
                (y[face], t[face], p[face])
            };

            let y_face = phi * y_up + (1.0 - phi) * y_dn;
            let t_face = phi * t_up + (1.0 - phi) * t_dn;
            let p_face = phi * p_up + (1.0 - phi) * p_dn;

            flux[face] = v[face] * p_face / (r * t_face);
            flux_y[face] = flux[face] * y_face;
            flux_t[face] = flux[face] * t_face;
        }

        let (co2, n2) = (Species::CarbonDioxide.index(), Species::Nitrogen.index());

        let c_total = DVector::from_fn(n, |i, _| p[i] / (r * t[i]));
        let (q0_eq, q1_eq) = self.isotherm.loadings_profile(
            &c_total,
            &DVector::from_column_slice(y),
            &DVector::from_column_slice(t),
        );

        let mut dx = DVector::zeros(5 * n);

        for i in 0..n {
            let c = c_total[i];
            let rate0 = pr.ldf_coefficient * (q0_eq[i] - q0[i]);
            let rate1 = pr.ldf_coefficient * (q1_eq[i] - q1[i]);

            let div_m = (flux[i + 1] - flux[i]) / self.dz;
            let div_y = (flux_y[i + 1] - flux_y[i]) / self.dz;
            let div_h = cpg * (flux_t[i + 1] - flux_t[i]) / self.dz;

            let s_mass = -solid * (rate0 + rate1);
            let s_y = -solid * rate0;
            let heat = -(pr.adsorption_enthalpy[co2] * rate0 + pr.adsorption_enthalpy[n2] * rate1)
                * pr.solid_density
                * solid;
            let cp_eff = eps * c * cpg + (1.0 - eps) * pr.solid_density * pr.solid_heat_capacity;

            let dt = (-div_h + heat) / cp_eff;
            let dp = r * t[i] * (-div_m + s_mass) + p[i] / t[i] * dt;
            let dy = (-(div_y - y[i] * div_m) + (s_y - y[i] * s_mass)) / c;

            dx[i] = dy * duration;
            dx[n + i] = dp / pr.pressure_scale * duration;
            dx[2 * n + i] = dt * duration;
            dx[3 * n + i] = rate0 * duration;
            dx[4 * n + i] = rate1 * duration;
        }

        Ok(dx)
    }
}

// =================================================================================================
// Step-bound model
// =================================================================================================

/// A column bound to one process step, as seen by a solver
///
/// Cheap to build: the column is shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct StepModel {
    column: Arc<ColumnModel>,
    step: ProcessStep,
    label: String,
}

impl StepModel {
    pub fn new(column: Arc<ColumnModel>, step: ProcessStep) -> Self {
        let label = format!("VPSA column N={} [{}]", column.points(), step.kind);
        Self { column, step, label }
    }

    pub fn column(&self) -> &ColumnModel {
        &self.column
    }

    pub fn step(&self) -> &ProcessStep {
        &self.step
    }
}

impl PhysicalModel for StepModel {
    fn points(&self) -> usize {
        self.column.points()
    }

    fn layout(&self) -> &[PhysicalQuantity] {
        &ColumnModel::LAYOUT
    }

    fn compute_physics(&self, state: &PhysicalState) -> VpsaResult<PhysicalState> {
        let tau = state.get_metadata("time").unwrap_or(0.0);
        let x = self.column.flatten(state)?;
        let dx = self.column.rhs(&self.step, tau, &x)?;
        self.column.unflatten(&dx)
    }

    fn setup_initial_state(&self) -> PhysicalState {
        self.column.initial_state()
    }

    fn name(&self) -> &str {
        &self.label
    }

    fn description(&self) -> Option<&str> {
        Some("Dual-site Langmuir VPSA column, finite volumes with LDF kinetics")
    }

    fn rhs_flat(&self, time: f64, x: &DVector<f64>) -> VpsaResult<DVector<f64>> {
        self.column.rhs(&self.step, time, x)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
