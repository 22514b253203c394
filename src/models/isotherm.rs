//! Dual-site Langmuir isotherm for the CO2/N2 pair
//!
//! # Model equations
//!
//! Each site affinity follows an Arrhenius-type temperature dependence
//!
//! $$k(T) = k_0 \exp\left(-\frac{\Delta U}{R T}\right)$$
//!
//! and, with $c_0 = c\,y$ and $c_1 = c\,(1 - y)$, the equilibrium loadings are
//!
//! $$q_0^* = \frac{q_{sb,0}\, b_0 c_0}{1 + b_0 c_0 + b_1 c_1} + \frac{q_{sd,0}\, d_0 c_0}{1 + d_0 c_0}$$
//!
//! $$q_1^* = \frac{q_{sb,1}\, b_1 c_1}{1 + b_0 c_0 + b_1 c_1}$$
//!
//! Site *b* is shared competitively by both species, site *d* only
//! adsorbs CO2.
//!
//! # Evaluation contexts
//!
//! | Function                  | Input                         | Used by                      |
//! |---------------------------|-------------------------------|------------------------------|
//! | [`IsothermParameters::loadings`] | any `num::Float` scalar | generic callers, tests  |
//! | [`IsothermParameters::loadings_profile`] | `DVector` over the column | flux builder |
//! | [`IsothermParameters::loadings_at_pressure`] | P, y, T | initial state      |
//!
//! All three evaluate the same expressions and agree to rounding.

use nalgebra::DVector;
use num::Float;
use serde::{Deserialize, Serialize};

// =================================================================================================
// Parameters
// =================================================================================================

/// One Langmuir site: capacity and temperature-dependent affinity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LangmuirSite {
    /// Saturation capacity (mol/kg)
    pub capacity: f64,

    /// Pre-exponential affinity factor (m³/mol)
    pub affinity: f64,

    /// Internal energy of adsorption ΔU (J/mol), negative for exothermic sites
    pub internal_energy: f64,
}

impl LangmuirSite {
    pub fn new(capacity: f64, affinity: f64, internal_energy: f64) -> Self {
        Self { capacity, affinity, internal_energy }
    }

    /// Affinity at temperature `t`
    fn affinity_at<F: Float>(&self, t: F, gas_constant: F) -> F {
        cast::<F>(self.affinity) * (-cast::<F>(self.internal_energy) / (gas_constant * t)).exp()
    }
}

/// Dual-site Langmuir parameters for CO2 (index 0) and N2 (index 1)
///
/// Defaults are the fitted values for CO2/N2 on the reference sorbent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IsothermParameters {
    /// Universal gas constant (J/mol/K)
    pub gas_constant: f64,

    /// CO2 on the shared site
    pub co2_shared: LangmuirSite,

    /// CO2 on the CO2-only site
    pub co2_dedicated: LangmuirSite,

    /// N2 on the shared site
    pub n2_shared: LangmuirSite,
}

impl Default for IsothermParameters {
    fn default() -> Self {
        Self {
            gas_constant: 8.314,
            co2_shared: LangmuirSite::new(3.09, 8.65e-7, -36641.21),
            co2_dedicated: LangmuirSite::new(2.54, 2.63e-8, -35690.66),
            n2_shared: LangmuirSite::new(5.84, 2.50e-6, -1.58e4),
        }
    }
}

fn cast<F: Float>(value: f64) -> F {
    F::from(value).unwrap_or_else(F::nan)
}

// =================================================================================================
// Evaluation
// =================================================================================================

impl IsothermParameters {
    /// Equilibrium loadings `(q0*, q1*)` for total gas concentration `c_total`
    /// (mol/m³), mole fraction `y` and temperature `t`
    ///
    /// # Example
    ///
    /// ```rust
    /// use vpsa_rs::models::IsothermParameters;
    ///
    /// let iso = IsothermParameters::default();
    /// let (q0, q1) = iso.loadings(40.0_f64, 0.15, 298.15);
    /// assert!(q0 > q1);
    /// ```
    pub fn loadings<F: Float>(&self, c_total: F, y: F, t: F) -> (F, F) {
        let r = cast::<F>(self.gas_constant);
        let one = F::one();

        let b0 = self.co2_shared.affinity_at(t, r);
        let d0 = self.co2_dedicated.affinity_at(t, r);
        let b1 = self.n2_shared.affinity_at(t, r);

        let c0 = c_total * y;
        let c1 = c_total * (one - y);

        let shared = one + b0 * c0 + b1 * c1;
        let dedicated = one + d0 * c0;

        let q0 = cast::<F>(self.co2_shared.capacity) * b0 * c0 / shared
            + cast::<F>(self.co2_dedicated.capacity) * d0 * c0 / dedicated;
        let q1 = cast::<F>(self.n2_shared.capacity) * b1 * c1 / shared;

        (q0, q1)
    }

    /// Equilibrium loadings at pressure `p` (Pa), using `c = p / (R T)`
    pub fn loadings_at_pressure(&self, p: f64, y: f64, t: f64) -> (f64, f64) {
        self.loadings(p / (self.gas_constant * t), y, t)
    }

    /// Equilibrium loading profiles over the column
    pub fn loadings_profile(
        &self,
        c_total: &DVector<f64>,
        y: &DVector<f64>,
        t: &DVector<f64>,
    ) -> (DVector<f64>, DVector<f64>) {
        let n = c_total.len();
        let mut q0 = DVector::zeros(n);
        let mut q1 = DVector::zeros(n);

        for i in 0..n {
            let (a, b) = self.loadings(c_total[i], y[i], t[i]);
            q0[i] = a;
            q1[i] = b;
        }

        (q0, q1)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, site) in [
            ("co2_shared", &self.co2_shared),
            ("co2_dedicated", &self.co2_dedicated),
            ("n2_shared", &self.n2_shared),
        ] {
            if !(site.capacity >= 0.0) || !(site.affinity >= 0.0) || !site.internal_energy.is_finite() {
                return Err(format!("Isotherm site {} has invalid parameters: {:?}", name, site));
            }
        }
        if !(self.gas_constant > 0.0) {
            return Err("Gas constant must be positive".to_string());
        }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
