//! TOML configuration of a simulation run
//!
//! Every section is optional: a file only names what it changes.
//!
//! ```toml
//! [column]
//! length = 1.0
//! upwind = "sharp"
//!
//! [cycle]
//! durations = [20.0, 15.0, 30.0, 40.0]
//! bounds = { low = 1.0e4, high = 1.0e5 }
//!
//! [integrator]
//! abs_tolerance = 1e-4
//! rel_tolerance = 1e-4
//!
//! [sweep]
//! resolutions = [15, 20, 25, 30, 35, 40]
//! max_cycles = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cycle::{CycleDesign, CycleDriver, IntegratorSettings};
use crate::error::{SimulationError, VpsaResult};
use crate::models::{ColumnParameters, InitialCondition, IsothermParameters};
use crate::sweep::{SweepDriver, SweepSettings};

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VpsaConfig {
    pub column: ColumnParameters,
    pub isotherm: IsothermParameters,
    pub cycle: CycleDesign,
    pub integrator: IntegratorSettings,
    pub initial: InitialCondition,
    pub sweep: SweepSettings,
}

impl VpsaConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> VpsaResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> VpsaResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> VpsaResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| SimulationError::InvalidConfiguration(format!("TOML serialization failed: {e}")))
    }

    /// Check every section
    pub fn validate(&self) -> VpsaResult<()> {
        let invalid = SimulationError::InvalidConfiguration;

        self.column.validate().map_err(invalid)?;
        self.isotherm.validate().map_err(invalid)?;
        self.cycle.validate().map_err(invalid)?;
        self.integrator.configuration().validate().map_err(invalid)?;
        self.sweep.validate().map_err(invalid)?;

        let InitialCondition { mole_fraction, pressure, temperature } = self.initial;
        if !(0.0..=1.0).contains(&mole_fraction) || !(pressure > 0.0) || !(temperature > 0.0) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "Initial condition out of range: y = {mole_fraction}, P = {pressure} Pa, T = {temperature} K"
            )));
        }
        Ok(())
    }

    /// Builder: replace the sweep settings
    pub fn with_sweep(mut self, sweep: SweepSettings) -> Self {
        self.sweep = sweep;
        self
    }

    /// Builder: replace the integrator settings
    pub fn with_integrator(mut self, integrator: IntegratorSettings) -> Self {
        self.integrator = integrator;
        self
    }

    /// Sweep driver over the configured resolutions
    pub fn sweep_driver(&self) -> SweepDriver {
        SweepDriver {
            column: self.column,
            isotherm: self.isotherm,
            initial: self.initial,
            design: self.cycle,
            integrator: self.integrator,
            settings: self.sweep.clone(),
        }
    }

    /// Cycle driver on `points` control volumes
    pub fn cycle_driver(&self, points: usize) -> VpsaResult<CycleDriver> {
        self.sweep_driver().driver(points)
    }
}
