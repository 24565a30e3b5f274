//! Chain-rule distributors: given `dE/dxi` for one internal coordinate, add
//! `dE/dxi * dxi/dx` onto the gradient of every atom that defines it.
//!
//! Angles and torsions are differentiated with respect to radians; callers
//! holding a derivative per degree multiply by `180 / pi` first.

use crate::core::models::restraint::InternalCoordinate;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

pub const DEGREES_PER_RADIAN: f64 = 180.0 / PI;

/// `r = |p_i - p_j|`, so `dr/dp_i = (p_i - p_j) / r` and `dr/dp_j = -dr/dp_i`.
pub fn distribute_distance(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    [i, j]: [usize; 2],
    de_dr: f64,
) {
    let r_ij = positions[i] - positions[j];
    let r = r_ij.norm();
    if r == 0.0 {
        return;
    }
    let g = r_ij * (de_dr / r);
    gradients[i] += g;
    gradients[j] -= g;
}

/// `theta = acos(v1.v2 / (|v1||v2|))` with `v1 = a - b`, `v2 = c - b`.
///
/// Uses `dtheta/dx = -1/sqrt(1 - cos^2 theta) * dcos/dx`, which diverges for
/// collinear arms.
pub fn distribute_angle(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    [a, b, c]: [usize; 3],
    de_dtheta: f64,
) {
    let v1 = positions[a] - positions[b];
    let v2 = positions[c] - positions[b];
    let d1 = v1.norm();
    let d2 = v2.norm();
    if d1 == 0.0 || d2 == 0.0 {
        return;
    }

    let cosine = v1.dot(&v2) / (d1 * d2);
    let prefactor = -de_dtheta / (1.0 - cosine * cosine).sqrt();

    let dcos_da = v2 / (d1 * d2) - v1 * (cosine / (d1 * d1));
    let dcos_dc = v1 / (d1 * d2) - v2 * (cosine / (d2 * d2));

    gradients[a] += dcos_da * prefactor;
    gradients[c] += dcos_dc * prefactor;
    gradients[b] -= (dcos_da + dcos_dc) * prefactor;
}

/// Torsion of `a-b-c-d` with the sign convention of
/// [`torsion_degrees`](crate::core::utils::geometry::torsion_degrees).
///
/// Returns `false` without touching the gradients when the torsion is
/// undefined.
pub fn distribute_torsion(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    [a, b, c, d]: [usize; 4],
    de_dphi: f64,
) -> bool {
    let (pa, pb, pc, pd) = (positions[a], positions[b], positions[c], positions[d]);

    let ba = pb - pa;
    let cb = pc - pb;
    let dc = pd - pc;

    let t = ba.cross(&cb);
    let u = cb.cross(&dc);
    let rt2 = t.norm_squared();
    let ru2 = u.norm_squared();
    let rcb = cb.norm();
    if rt2 * ru2 * rcb == 0.0 {
        return false;
    }

    let dt = t.cross(&cb) * (de_dphi / (rt2 * rcb));
    let du = cb.cross(&u) * (de_dphi / (ru2 * rcb));

    gradients[a] += dt.cross(&cb);
    gradients[b] += (pc - pa).cross(&dt) + du.cross(&dc);
    gradients[c] += dt.cross(&ba) + (pd - pb).cross(&du);
    gradients[d] += du.cross(&cb);
    true
}

/// Distributes `dE/dxi` for a coordinate measured as by
/// [`InternalCoordinate::measure`], i.e. with angles and torsions in degrees.
pub fn distribute_coordinate(
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    coordinate: &InternalCoordinate,
    de_dxi: f64,
) -> bool {
    match *coordinate {
        InternalCoordinate::Distance(atoms) => {
            distribute_distance(positions, gradients, atoms, de_dxi);
            true
        }
        InternalCoordinate::Angle(atoms) => {
            distribute_angle(positions, gradients, atoms, de_dxi * DEGREES_PER_RADIAN);
            true
        }
        InternalCoordinate::Torsion(atoms) => {
            distribute_torsion(positions, gradients, atoms, de_dxi * DEGREES_PER_RADIAN)
        }
    }
}
