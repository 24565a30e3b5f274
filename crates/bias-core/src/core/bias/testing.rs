use nalgebra::{Point3, Vector3};

const STEP: f64 = 1e-5;

/// Central-difference gradient of `energy` with respect to every coordinate.
pub(crate) fn finite_difference_gradients<F>(
    positions: &[Point3<f64>],
    energy: F,
) -> Vec<Vector3<f64>>
where
    F: Fn(&[Point3<f64>]) -> f64,
{
    let mut displaced = positions.to_vec();
    let mut gradients = vec![Vector3::zeros(); positions.len()];
    for atom in 0..positions.len() {
        for axis in 0..3 {
            let original = displaced[atom][axis];
            displaced[atom][axis] = original + STEP;
            let forward = energy(&displaced);
            displaced[atom][axis] = original - STEP;
            let backward = energy(&displaced);
            displaced[atom][axis] = original;
            gradients[atom][axis] = (forward - backward) / (2.0 * STEP);
        }
    }
    gradients
}

pub(crate) fn assert_gradients_match(
    analytic: &[Vector3<f64>],
    numeric: &[Vector3<f64>],
    tolerance: f64,
) {
    assert_eq!(analytic.len(), numeric.len());
    for (atom, (a, n)) in analytic.iter().zip(numeric).enumerate() {
        for axis in 0..3 {
            let scale = n[axis].abs().max(1.0);
            assert!(
                (a[axis] - n[axis]).abs() <= tolerance * scale,
                "atom {atom} axis {axis}: analytic {} vs numeric {}",
                a[axis],
                n[axis]
            );
        }
    }
}

pub(crate) fn zero_gradients(n: usize) -> Vec<Vector3<f64>> {
    vec![Vector3::zeros(); n]
}
