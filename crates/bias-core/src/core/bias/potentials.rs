use super::derivatives::{
    distribute_angle, distribute_coordinate, distribute_distance, distribute_torsion,
};
use super::spline::{PmfIcCoordinate, Spline, dz_dxi, xi_to_z};
use crate::core::models::restraint::{
    AngleRestraint, CombinedDistanceRestraint, CubicConfinement, DihedralRestraint,
    DistanceRestraint, SphericalConfinement, ThresholdConfinement, UmbrellaAngle,
    UmbrellaDihedral, UmbrellaDistance,
};
use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};

/// Energy of one restraint together with the collective variable it measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub energy: f64,
    pub value: f64,
}

#[inline]
pub fn harmonic_distance(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &DistanceRestraint,
) -> Evaluation {
    let [a, b] = restraint.atoms;
    let value = geometry::distance(&positions[a], &positions[b]);
    let diff = value - restraint.ideal;
    distribute_distance(positions, gradients, restraint.atoms, 2.0 * restraint.force * diff);
    Evaluation {
        energy: restraint.force * diff * diff,
        value,
    }
}

/// `E = k * dtheta^2` with `dtheta` in radians; the reported value is in degrees.
#[inline]
pub fn harmonic_angle(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &AngleRestraint,
) -> Evaluation {
    let [a, b, c] = restraint.atoms;
    let value = geometry::angle_degrees(&positions[a], &positions[b], &positions[c]);
    let diff = (value - restraint.ideal).to_radians();
    distribute_angle(positions, gradients, restraint.atoms, 2.0 * restraint.force * diff);
    Evaluation {
        energy: restraint.force * diff * diff,
        value,
    }
}

/// `E = k * (1 - cos(phi - phi0))`, expanded into sine/cosine pairs so the
/// difference never has to be wrapped. `None` when the torsion is undefined.
pub fn cosine_dihedral(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &DihedralRestraint,
) -> Option<Evaluation> {
    let [a, b, c, d] = restraint.atoms;
    let ba = positions[b] - positions[a];
    let cb = positions[c] - positions[b];
    let dc = positions[d] - positions[c];

    let t = ba.cross(&cb);
    let u = cb.cross(&dc);
    let rtru = (t.norm_squared() * u.norm_squared()).sqrt();
    let rcb = cb.norm();
    if rtru * rcb == 0.0 {
        return None;
    }

    let cosine = (t.dot(&u) / rtru).clamp(-1.0, 1.0);
    let sine = cb.dot(&t.cross(&u)) / (rcb * rtru);
    let (s0, c0) = restraint.ideal.to_radians().sin_cos();

    let energy = restraint.force * (1.0 - (cosine * c0 + sine * s0));
    let magnitude = cosine.acos().to_degrees();
    let value = if sine < 0.0 { -magnitude } else { magnitude };

    // d/dphi [k (1 - cos(phi - phi0))] = k sin(phi - phi0)
    let de_dphi = restraint.force * (sine * c0 - cosine * s0);
    distribute_torsion(positions, gradients, restraint.atoms, de_dphi);

    Some(Evaluation { energy, value })
}

/// Gradient-only umbrella restraint on a torsion.
///
/// The difference to the target is wrapped into [-180, 180] and applied as
/// `dE/dphi = k * diff` in radians. Returns the measured torsion shifted onto
/// the periodic image nearest to the target, or `None` when the torsion is
/// undefined.
pub fn umbrella_dihedral(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &UmbrellaDihedral,
) -> Option<f64> {
    let [a, b, c, d] = restraint.atoms;
    let torsion =
        geometry::torsion_degrees(&positions[a], &positions[b], &positions[c], &positions[d])?;

    let diff = geometry::wrap_to_180(torsion - restraint.target);
    let de_dphi = restraint.force * diff.to_radians();
    distribute_torsion(positions, gradients, restraint.atoms, de_dphi);

    Some(geometry::nearest_periodic_image(torsion, restraint.target))
}

/// Gradient-only umbrella restraint on an angle. Returns the angle in degrees.
pub fn umbrella_angle(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &UmbrellaAngle,
) -> f64 {
    let [a, b, c] = restraint.atoms;
    let value = geometry::angle_degrees(&positions[a], &positions[b], &positions[c]);
    let de_dtheta = restraint.force * (value - restraint.target).to_radians();
    distribute_angle(positions, gradients, restraint.atoms, de_dtheta);
    value
}

/// Gradient-only umbrella restraint on a distance. Returns the distance.
pub fn umbrella_distance(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &UmbrellaDistance,
) -> f64 {
    let [a, b] = restraint.atoms;
    let value = geometry::distance(&positions[a], &positions[b]);
    distribute_distance(
        positions,
        gradients,
        restraint.atoms,
        restraint.force * (value - restraint.target),
    );
    value
}

/// `E = 1/2 * force * (RC - target)^2` over the combined reaction coordinate
/// `RC = sum(factor * distance)`. The force constant is passed in because the
/// ramped and fixed evaluations use different ones.
pub fn combined_distance(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    restraint: &CombinedDistanceRestraint,
    force: f64,
) -> Evaluation {
    let value = restraint.reaction_coordinate(positions);
    let diff = value - restraint.target;
    for term in &restraint.terms {
        distribute_distance(positions, gradients, term.atoms, force * diff * term.factor);
    }
    Evaluation {
        energy: 0.5 * force * diff * diff,
        value,
    }
}

/// Energy and gradient of one atom against a spherical wall, `None` while the
/// atom is inside the sphere or exactly on its surface.
pub fn spherical_wall(
    position: &Point3<f64>,
    center: &Point3<f64>,
    wall: &SphericalConfinement,
) -> Option<(f64, Vector3<f64>)> {
    let offset = position - center;
    let distance = offset.norm();
    if distance <= wall.radius {
        return None;
    }

    let delta = distance - wall.radius;
    let exponent = wall.effective_exponent();
    let energy = wall.force * delta.powf(exponent);
    let de_ddelta = wall.force * exponent * delta.powf(exponent - 1.0);
    Some((energy, offset * (de_ddelta / distance)))
}

/// Energy and gradient of one atom against a box wall. Each axis contributes
/// independently once the offset from the center exceeds the half dimension.
pub fn cubic_wall(
    position: &Point3<f64>,
    center: &Point3<f64>,
    wall: &CubicConfinement,
) -> (f64, Vector3<f64>) {
    let half = wall.half_dimensions();
    let exponent = wall.effective_exponent();
    let offset = position - center;

    let mut energy = 0.0;
    let mut gradient = Vector3::zeros();
    for axis in 0..3 {
        let delta = offset[axis].abs() - half[axis];
        if delta > 0.0 {
            energy += wall.force * delta.powf(exponent);
            let magnitude = wall.force * exponent * delta.powf(exponent - 1.0);
            gradient[axis] = if offset[axis] < 0.0 {
                -magnitude
            } else {
                magnitude
            };
        }
    }
    (energy, gradient)
}

/// Gradient component pushing a coordinate back below `max + offset`.
#[inline]
pub fn threshold_top(coordinate: f64, max: f64, wall: &ThresholdConfinement) -> Option<f64> {
    let bound = max + wall.offset;
    (coordinate > bound).then(|| wall.force * (coordinate - bound))
}

/// Gradient component pushing a coordinate back above `min - offset`.
#[inline]
pub fn threshold_bottom(coordinate: f64, min: f64, wall: &ThresholdConfinement) -> Option<f64> {
    let bound = min - wall.offset;
    (coordinate < bound).then(|| wall.force * (coordinate - bound))
}

/// PMF-IC gradient correction: `dS/dz * dz/dxi * dxi/dx` for one or two
/// coordinates. The caller guarantees `coordinates.len() == spline.dimension()`.
/// Coordinates that cannot be measured (degenerate torsion) are skipped.
pub fn pmf_ic_correction(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    coordinates: &[PmfIcCoordinate],
    spline: &dyn Spline,
) {
    let mut xis = [0.0; 2];
    let mut zs = [0.0; 2];
    for (k, ic) in coordinates.iter().take(2).enumerate() {
        let Some(xi) = ic.coordinate.measure(positions) else {
            return;
        };
        xis[k] = xi;
        zs[k] = xi_to_z(xi, ic.xi0, ic.length);
    }

    let ds_dz = match coordinates.len() {
        1 => [spline.derivative(zs[0]), 0.0],
        _ => {
            let (d1, d2) = spline.derivative_2d(zs[0], zs[1]);
            [d1, d2]
        }
    };

    for (k, ic) in coordinates.iter().take(2).enumerate() {
        let prefactor = ds_dz[k] * dz_dxi(ic.length);
        distribute_coordinate(positions, gradients, &ic.coordinate, prefactor);
    }
}
