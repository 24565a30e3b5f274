//! Interface to the tabulated PMF spline and the mapping between a collective
//! variable `xi` and the spline's normalized coordinate `z`.
//!
//! Spline construction and fitting live outside this crate; only derivative
//! queries are needed here.

use crate::core::models::restraint::InternalCoordinate;
use serde::Deserialize;

pub trait Spline {
    /// Number of coordinates the spline was built over (1 or 2).
    fn dimension(&self) -> usize;
    /// `dS/dz` of a one-dimensional spline.
    fn derivative(&self, z: f64) -> f64;
    /// `(dS/dz1, dS/dz2)` of a two-dimensional spline.
    fn derivative_2d(&self, z1: f64, z2: f64) -> (f64, f64);
}

/// One PMF-IC collective variable with its mapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PmfIcCoordinate {
    pub coordinate: InternalCoordinate,
    pub xi0: f64,
    pub length: f64,
}

impl PmfIcCoordinate {
    pub fn new(coordinate: InternalCoordinate, xi0: f64, length: f64) -> Self {
        Self {
            coordinate,
            xi0,
            length,
        }
    }
}

#[inline]
pub fn xi_to_z(xi: f64, xi0: f64, length: f64) -> f64 {
    (xi - xi0) / length
}

#[inline]
pub fn dz_dxi(length: f64) -> f64 {
    1.0 / length
}
