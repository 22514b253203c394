//! Physical data types
//!
//! A quantity of the column model is either a uniform value (a scalar) or a
//! spatial profile over the control volumes (a vector).

use nalgebra::DVector;
use std::fmt;

/// Physical data container
///
/// # Storage Types
///
/// - **Scalar**: Single uniform value, e.g. a boundary pressure
/// - **Vector**: Profile over the N control volumes of the column
///
/// # Examples
///
/// ```rust
/// use vpsa_rs::physics::PhysicalData;
///
/// let pressure = PhysicalData::uniform_vector(20, 1.0e4);
/// assert_eq!(pressure.len(), 20);
/// assert!(pressure.is_vector());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalData {
    /// Scalar value (0D)
    Scalar(f64),

    /// Vector (1D), one entry per control volume
    Vector(DVector<f64>),
}

impl PhysicalData {

    // ======================================= constructors =======================================

    /// Create from scalar
    pub fn from_scalar(value: f64) -> Self {
        Self::Scalar(value)
    }

    /// Create from vector
    pub fn from_vec(vector: Vec<f64>) -> Self {
        Self::Vector(DVector::from_vec(vector))
    }

    /// Create from DVector
    pub fn from_vector(vector: DVector<f64>) -> Self {
        Self::Vector(vector)
    }

    /// Create a uniform profile
    pub fn uniform_vector(size: usize, value: f64) -> Self {
        Self::Vector(DVector::from_element(size, value))
    }

    // ======================================== inspection ========================================

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Vector(_))
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Vector(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the stored values as a slice
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(x) => std::slice::from_ref(x),
            Self::Vector(v) => v.as_slice(),
        }
    }

    /// Scalar value, if this is a scalar
    pub fn try_as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(x) => Some(*x),
            Self::Vector(_) => None,
        }
    }

    /// Profile, if this is a vector
    pub fn try_as_vector(&self) -> Option<&DVector<f64>> {
        match self {
            Self::Vector(v) => Some(v),
            Self::Scalar(_) => None,
        }
    }

    /// True when every stored value is finite
    pub fn is_finite(&self) -> bool {
        self.as_slice().iter().all(|x| x.is_finite())
    }

    /// Apply a function element-wise, in place
    pub fn apply<F>(&mut self, f: F)
    where
        F: Fn(f64) -> f64,
    {
        match self {
            Self::Scalar(x) => *x = f(*x),
            Self::Vector(v) => v.apply(|x| *x = f(*x)),
        }
    }
}

impl fmt::Display for PhysicalData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(x) => write!(f, "Scalar({x})"),
            Self::Vector(v) => write!(f, "Vector[{}]", v.len()),
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar() {
        let data = PhysicalData::from_scalar(298.15);
        assert!(data.is_scalar());
        assert_eq!(data.len(), 1);
        assert_eq!(data.try_as_scalar(), Some(298.15));
        assert!(data.try_as_vector().is_none());
    }

    #[test]
    fn test_vector() {
        let data = PhysicalData::from_vec(vec![0.1, 0.2, 0.3]);
        assert!(data.is_vector());
        assert_eq!(data.as_slice(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_apply() {
        let mut data = PhysicalData::uniform_vector(4, 2.0);
        data.apply(|x| x * x);
        assert!(data.as_slice().iter().all(|&x| x == 4.0));
    }

    #[test]
    fn test_non_finite_detection() {
        let data = PhysicalData::from_vec(vec![1.0, f64::NAN]);
        assert!(!data.is_finite());
        assert_eq!(format!("{data}"), "Vector[2]");
    }
}
