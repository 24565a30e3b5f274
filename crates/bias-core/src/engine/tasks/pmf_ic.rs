use crate::core::bias::potentials;
use crate::core::bias::spline::{PmfIcCoordinate, Spline};
use crate::engine::error::BiasError;
use nalgebra::{Point3, Vector3};
use tracing::debug;

pub fn check_spline<'s>(
    coordinates: &[PmfIcCoordinate],
    spline: Option<&'s dyn Spline>,
) -> Result<&'s dyn Spline, BiasError> {
    let spline = spline.ok_or(BiasError::MissingSpline)?;
    if spline.dimension() != coordinates.len() {
        return Err(BiasError::SplineDimension {
            expected: coordinates.len(),
            found: spline.dimension(),
        });
    }
    Ok(spline)
}

pub fn run(
    coordinates: &[PmfIcCoordinate],
    spline: &dyn Spline,
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
) {
    potentials::pmf_ic_correction(positions, gradients, coordinates, spline);
    debug!(dimension = coordinates.len(), "Applied PMF-IC correction.");
}
