use nalgebra::Point3;

#[inline]
pub fn distance(p1: &Point3<f64>, p2: &Point3<f64>) -> f64 {
    (p1 - p2).norm()
}

/// Angle at `vertex` between the arms towards `a` and `c`, in degrees.
#[inline]
pub fn angle_degrees(a: &Point3<f64>, vertex: &Point3<f64>, c: &Point3<f64>) -> f64 {
    (a - vertex).angle(&(c - vertex)).to_degrees()
}

/// Proper dihedral angle of the chain `p0-p1-p2-p3` in degrees, in (-180, 180].
///
/// The magnitude is the angle between the normals `t = b01 x b12` and
/// `u = b12 x b23`; the sign is negative when `b12 . (t x u) < 0`.
/// Returns `None` for degenerate geometry (collinear bonds or a zero-length
/// central bond), where the torsion is undefined.
pub fn torsion_degrees(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
    p3: &Point3<f64>,
) -> Option<f64> {
    let b01 = p1 - p0;
    let b12 = p2 - p1;
    let b23 = p3 - p2;

    let t = b01.cross(&b12);
    let u = b12.cross(&b23);

    let tu_norm = t.norm() * u.norm();
    if tu_norm * b12.norm() == 0.0 {
        return None;
    }

    let cosine = (t.dot(&u) / tu_norm).clamp(-1.0, 1.0);
    let magnitude = cosine.acos().to_degrees();

    if b12.dot(&t.cross(&u)) < 0.0 {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

/// Folds an angular difference of any size into [-180, 180]. A positive
/// half turn stays at +180.
#[inline]
pub fn wrap_to_180(diff: f64) -> f64 {
    let wrapped = (diff + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && diff > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Returns whichever of `value`, `value - 360` and `value + 360` lies closest
/// to `reference`. Ties keep the unshifted value.
pub fn nearest_periodic_image(value: f64, reference: f64) -> f64 {
    let direct = (value - reference).abs();
    let minus = (value - 360.0 - reference).abs();
    let plus = (value + 360.0 - reference).abs();

    if minus < direct {
        value - 360.0
    } else if plus < direct {
        value + 360.0
    } else {
        value
    }
}
