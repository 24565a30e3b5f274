use crate::core::bias::potentials;
use crate::core::models::restraint::{
    Axis, CubicConfinement, SphericalConfinement, ThresholdConfinement,
};
use nalgebra::{Point3, Vector3};
use tracing::debug;

pub fn spherical(
    walls: &[SphericalConfinement],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    center: &Point3<f64>,
) -> f64 {
    let mut energy = 0.0;
    for wall in walls {
        let mut outside = 0usize;
        for (position, gradient) in positions.iter().zip(gradients.iter_mut()) {
            if let Some((e, g)) = potentials::spherical_wall(position, center, wall) {
                energy += e;
                *gradient += g;
                outside += 1;
            }
        }
        debug!(radius = wall.radius, outside, "Applied spherical confinement.");
    }
    energy
}

pub fn cubic(
    walls: &[CubicConfinement],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    center: &Point3<f64>,
) -> f64 {
    let mut energy = 0.0;
    for wall in walls {
        for (position, gradient) in positions.iter().zip(gradients.iter_mut()) {
            let (e, g) = potentials::cubic_wall(position, center, wall);
            energy += e;
            *gradient += g;
        }
        debug!(dimensions = ?wall.dimensions, "Applied cubic confinement.");
    }
    energy
}

/// Pushes atoms back below `box_max + offset` along `axis`.
///
/// The push lands on the `axis` component of each gradient alone; the other
/// two components do not receive the same scalar. Energy is always zero.
pub fn threshold_top(
    walls: &[ThresholdConfinement],
    axis: Axis,
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    box_max: &Point3<f64>,
) -> f64 {
    let k = axis.index();
    for wall in walls {
        for (position, gradient) in positions.iter().zip(gradients.iter_mut()) {
            if let Some(g) = potentials::threshold_top(position[k], box_max[k], wall) {
                gradient[k] += g;
            }
        }
    }
    0.0
}

/// Mirror of [`threshold_top`] against `box_min - offset`.
pub fn threshold_bottom(
    walls: &[ThresholdConfinement],
    axis: Axis,
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    box_min: &Point3<f64>,
) -> f64 {
    let k = axis.index();
    for wall in walls {
        for (position, gradient) in positions.iter().zip(gradients.iter_mut()) {
            if let Some(g) = potentials::threshold_bottom(position[k], box_min[k], wall) {
                gradient[k] += g;
            }
        }
    }
    0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bias::testing::zero_gradients;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn spherical_only_counts_atoms_outside_the_radius() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let mut gradients = zero_gradients(3);
        let energy = spherical(
            &[SphericalConfinement::new(2.0, 1.0, 1.0)],
            &positions,
            &mut gradients,
            &Point3::origin(),
        );

        assert!(f64_approx_equal(energy, 3.0));
        assert_eq!(gradients[0], Vector3::zeros());
        assert!(f64_approx_equal(gradients[1].x, 1.0));
        assert!(f64_approx_equal(gradients[2].y, 1.0));
    }

    #[test]
    fn cubic_walls_accumulate_over_atoms_and_walls() {
        let positions = vec![Point3::new(2.0, 0.0, 0.0), Point3::new(0.0, 0.0, -3.0)];
        let walls = [
            CubicConfinement::new([2.0, 2.0, 2.0], 1.0, 2.0),
            CubicConfinement::new([2.0, 2.0, 2.0], 1.0, 2.0),
        ];
        let mut gradients = zero_gradients(2);
        let energy = cubic(&walls, &positions, &mut gradients, &Point3::origin());

        // (2-1)^2 + (3-1)^2, twice
        assert!(f64_approx_equal(energy, 10.0));
        assert!(f64_approx_equal(gradients[0].x, 4.0));
        assert!(f64_approx_equal(gradients[1].z, -8.0));
    }

    #[test]
    fn threshold_top_touches_only_the_configured_axis_and_reports_no_energy() {
        let positions = vec![Point3::new(9.0, 9.0, 9.0), Point3::new(0.0, 0.0, 0.0)];
        let mut gradients = zero_gradients(2);
        let energy = threshold_top(
            &[ThresholdConfinement::new(1.0, 2.0)],
            Axis::Y,
            &positions,
            &mut gradients,
            &Point3::new(5.0, 5.0, 5.0),
        );

        assert_eq!(energy, 0.0);
        assert!(f64_approx_equal(gradients[0].y, 6.0));
        assert_eq!(gradients[0].x, 0.0);
        assert_eq!(gradients[0].z, 0.0);
        assert_eq!(gradients[1], Vector3::zeros());
    }

    #[test]
    fn threshold_bottom_pushes_atoms_back_up() {
        let positions = vec![Point3::new(0.0, 0.0, -4.0), Point3::new(0.0, 0.0, -1.5)];
        let mut gradients = zero_gradients(2);
        let energy = threshold_bottom(
            &[ThresholdConfinement::new(1.0, 0.5)],
            Axis::Z,
            &positions,
            &mut gradients,
            &Point3::new(-1.0, -1.0, -1.0),
        );

        assert_eq!(energy, 0.0);
        assert!(f64_approx_equal(gradients[0].z, -1.0));
        assert_eq!(gradients[1], Vector3::zeros());
    }
}
