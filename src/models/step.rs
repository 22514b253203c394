//! Process steps of the four-step VPSA cycle
//!
//! A step fixes what happens at the two column ends while it runs:
//!
//! | kind           | boundary pressure P_b(t)           | feed end (z = 0)  | product end (z = L) |
//! |----------------|------------------------------------|-------------------|---------------------|
//! | Pressurization | P_H − (P_H − P_L)·e^(−λt)          | pressure-driven   | closed              |
//! | Feed           | P_H                                | fixed velocity    | pressure-driven     |
//! | Blowdown       | P_L + (P_H − P_L)·e^(−λt)          | closed            | pressure-driven     |
//! | Evacuation     | P_v + (P_L − P_v)·e^(−λt)          | pressure-driven   | closed              |
//!
//! with λ = k / (duration + 10⁻³), P_v = r·P_L and t = τ·duration.

use serde::{Deserialize, Serialize};
use std::fmt;

// =================================================================================================
// Step kind
// =================================================================================================

/// Kind of a process step, with its cycle position as numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    Pressurization,
    Feed,
    Blowdown,
    Evacuation,
}

impl StepKind {
    /// The four steps in cycle order
    pub const CYCLE: [StepKind; 4] = [
        StepKind::Pressurization,
        StepKind::Feed,
        StepKind::Blowdown,
        StepKind::Evacuation,
    ];

    /// Numeric code 0..=3
    pub fn code(self) -> u8 {
        match self {
            StepKind::Pressurization => 0,
            StepKind::Feed => 1,
            StepKind::Blowdown => 2,
            StepKind::Evacuation => 3,
        }
    }

    /// Inverse of [`StepKind::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(StepKind::Pressurization),
            1 => Some(StepKind::Feed),
            2 => Some(StepKind::Blowdown),
            3 => Some(StepKind::Evacuation),
            _ => None,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Pressurization => "Pressurization",
            StepKind::Feed => "Feed",
            StepKind::Blowdown => "Blowdown",
            StepKind::Evacuation => "Evacuation",
        };
        write!(f, "{name}")
    }
}

// =================================================================================================
// Boundary description
// =================================================================================================

/// Low and high cycle pressures (Pa)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureBounds {
    pub low: f64,
    pub high: f64,
}

impl Default for PressureBounds {
    fn default() -> Self {
        Self { low: 1.0e4, high: 1.0e5 }
    }
}

/// Shape of the boundary conditions shared by every step of a cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryProfile {
    /// Superficial velocity imposed at the feed end during Feed (m/s)
    pub feed_velocity: f64,

    /// Vacuum level as a fraction of the low pressure
    pub vacuum_ratio: f64,

    /// Number of relaxation time constants per step duration
    pub relaxation: f64,
}

impl Default for BoundaryProfile {
    fn default() -> Self {
        Self {
            feed_velocity: 1.0,
            vacuum_ratio: 0.5,
            relaxation: 5.0,
        }
    }
}

/// Condition at one column end
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EndCondition {
    /// No flow through the face
    Closed,

    /// Imposed superficial velocity (m/s), positive towards the product end
    Velocity(f64),

    /// Darcy flow driven by the boundary pressure over half a cell
    PressureDriven,
}

// =================================================================================================
// Process step
// =================================================================================================

/// One step of the cycle: kind, duration and end conditions
///
/// # Example
///
/// ```rust
/// use vpsa_rs::models::{PressureBounds, ProcessStep, StepKind};
///
/// let step = ProcessStep::new(StepKind::Pressurization, 20.0, PressureBounds::default());
/// assert_eq!(step.boundary_pressure(0.0), 1.0e4);
/// assert!(step.boundary_pressure(1.0) > 0.99e5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStep {
    pub kind: StepKind,
    pub duration: f64,
    pub bounds: PressureBounds,
    pub profile: BoundaryProfile,
    pub feed_end: EndCondition,
    pub product_end: EndCondition,
}

impl ProcessStep {
    /// Step with the default boundary profile
    pub fn new(kind: StepKind, duration: f64, bounds: PressureBounds) -> Self {
        Self::with_profile(kind, duration, bounds, BoundaryProfile::default())
    }

    /// Step with explicit boundary profile; end conditions follow from `kind`
    pub fn with_profile(
        kind: StepKind,
        duration: f64,
        bounds: PressureBounds,
        profile: BoundaryProfile,
    ) -> Self {
        let (feed_end, product_end) = match kind {
            StepKind::Pressurization => (EndCondition::PressureDriven, EndCondition::Closed),
            StepKind::Feed => (
                EndCondition::Velocity(profile.feed_velocity),
                EndCondition::PressureDriven,
            ),
            StepKind::Blowdown => (EndCondition::Closed, EndCondition::PressureDriven),
            StepKind::Evacuation => (EndCondition::PressureDriven, EndCondition::Closed),
        };

        Self {
            kind,
            duration,
            bounds,
            profile,
            feed_end,
            product_end,
        }
    }

    /// Override both end conditions
    pub fn with_ends(mut self, feed_end: EndCondition, product_end: EndCondition) -> Self {
        self.feed_end = feed_end;
        self.product_end = product_end;
        self
    }

    /// Exponential relaxation rate λ (1/s)
    pub fn relaxation_rate(&self) -> f64 {
        self.profile.relaxation / (self.duration + 1e-3)
    }

    /// Boundary pressure (Pa) at dimensionless time `tau` ∈ [0, 1]
    pub fn boundary_pressure(&self, tau: f64) -> f64 {
        let PressureBounds { low, high } = self.bounds;
        let decay = (-self.relaxation_rate() * tau * self.duration).exp();

        match self.kind {
            StepKind::Pressurization => high - (high - low) * decay,
            StepKind::Feed => high,
            StepKind::Blowdown => low + (high - low) * decay,
            StepKind::Evacuation => {
                let vacuum = self.profile.vacuum_ratio * low;
                vacuum + (low - vacuum) * decay
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.duration > 0.0) {
            return Err(format!("{} duration must be positive, got {}", self.kind, self.duration));
        }
        if !(self.bounds.low > 0.0) || !(self.bounds.high > self.bounds.low) {
            return Err(format!(
                "Pressure bounds must satisfy 0 < low < high, got low = {} high = {}",
                self.bounds.low, self.bounds.high
            ));
        }
        if !(self.profile.vacuum_ratio > 0.0 && self.profile.vacuum_ratio <= 1.0) {
            return Err(format!("Vacuum ratio must lie in (0, 1], got {}", self.profile.vacuum_ratio));
        }
        if !(self.profile.relaxation > 0.0) {
            return Err("Relaxation constant must be positive".to_string());
        }
        if let EndCondition::Velocity(v) = self.feed_end
            && !v.is_finite() {
                return Err("Feed velocity must be finite".to_string());
            }
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bounds() -> PressureBounds {
        PressureBounds { low: 1.0e4, high: 1.0e5 }
    }

    #[test]
    fn test_code_round_trip() {
        for kind in StepKind::CYCLE {
            assert_eq!(StepKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(StepKind::from_code(4), None);
    }

    #[test]
    fn test_pressurization_reaches_high_pressure() {
        let step = ProcessStep::new(StepKind::Pressurization, 20.0, bounds());

        assert_relative_eq!(step.boundary_pressure(0.0), 1.0e4);

        let end = step.boundary_pressure(1.0);
        let relative = (end - 1.0e5).abs() / 1.0e5;
        assert!(relative <= (-5.0_f64 / (20.0 + 1e-3)).exp());
        assert!(relative < 0.01);
    }

    #[test]
    fn test_feed_is_constant() {
        let step = ProcessStep::new(StepKind::Feed, 15.0, bounds());
        assert_eq!(step.boundary_pressure(0.0), 1.0e5);
        assert_eq!(step.boundary_pressure(0.7), 1.0e5);
        assert_eq!(step.feed_end, EndCondition::Velocity(1.0));
        assert_eq!(step.product_end, EndCondition::PressureDriven);
    }

    #[test]
    fn test_blowdown_decays_to_low_pressure() {
        let step = ProcessStep::new(StepKind::Blowdown, 30.0, bounds());
        assert_relative_eq!(step.boundary_pressure(0.0), 1.0e5);
        assert!(step.boundary_pressure(1.0) < 1.1e4);
        assert_eq!(step.feed_end, EndCondition::Closed);
    }

    #[test]
    fn test_evacuation_targets_vacuum() {
        let step = ProcessStep::new(StepKind::Evacuation, 40.0, bounds());
        assert_relative_eq!(step.boundary_pressure(0.0), 1.0e4);
        let end = step.boundary_pressure(1.0);
        assert!(end > 5.0e3 && end < 5.1e3);
        assert_eq!(step.product_end, EndCondition::Closed);
    }

    #[test]
    fn test_with_ends_overrides() {
        let step = ProcessStep::new(StepKind::Feed, 15.0, bounds())
            .with_ends(EndCondition::Closed, EndCondition::Closed);
        assert_eq!(step.feed_end, EndCondition::Closed);
        assert_eq!(step.product_end, EndCondition::Closed);
    }

    #[test]
    fn test_validate() {
        assert!(ProcessStep::new(StepKind::Feed, 15.0, bounds()).validate().is_ok());
        assert!(ProcessStep::new(StepKind::Feed, 0.0, bounds()).validate().is_err());

        let inverted = PressureBounds { low: 1.0e5, high: 1.0e4 };
        assert!(ProcessStep::new(StepKind::Feed, 15.0, inverted).validate().is_err());
    }
}
