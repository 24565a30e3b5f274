use crate::core::bias::potentials;
use crate::core::models::restraint::{
    CombinedDistanceRestraint, UmbrellaAngle, UmbrellaDihedral, UmbrellaDistance,
};
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace, warn};

/// A torsion that cannot be measured is recorded as `NaN` so the trace keeps
/// one entry per restraint.
pub fn dihedrals(
    restraints: &[UmbrellaDihedral],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    trace: &mut Vec<f64>,
) {
    for restraint in restraints {
        match potentials::umbrella_dihedral(positions, gradients, restraint) {
            Some(value) => {
                trace!(atoms = ?restraint.atoms, value, target = restraint.target, "umbrella dihedral");
                trace.push(value);
            }
            None => {
                warn!(atoms = ?restraint.atoms, "Umbrella dihedral is undefined for collinear atoms; skipped.");
                trace.push(f64::NAN);
            }
        }
    }
}

pub fn angles(
    restraints: &[UmbrellaAngle],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    trace: &mut Vec<f64>,
) {
    for restraint in restraints {
        let value = potentials::umbrella_angle(positions, gradients, restraint);
        trace!(atoms = ?restraint.atoms, value, target = restraint.target, "umbrella angle");
        trace.push(value);
    }
}

pub fn distances(
    restraints: &[UmbrellaDistance],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    trace: &mut Vec<f64>,
) {
    for restraint in restraints {
        let value = potentials::umbrella_distance(positions, gradients, restraint);
        trace!(atoms = ?restraint.atoms, value, target = restraint.target, "umbrella distance");
        trace.push(value);
    }
}

/// Ramps each force constant one step, then applies the gradient with it.
/// Appends the reaction coordinate of every restraint to `trace`.
pub fn combined_ramped(
    restraints: &mut [CombinedDistanceRestraint],
    equilibration_steps: usize,
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
    trace: &mut Vec<f64>,
) {
    for restraint in restraints.iter_mut() {
        restraint.ramp_force(equilibration_steps);
        let eval =
            potentials::combined_distance(positions, gradients, restraint, restraint.force_current);
        debug!(
            force = restraint.force_current,
            reaction_coordinate = eval.value,
            target = restraint.target,
            "Applied ramped combined distance restraint."
        );
        trace.push(eval.value);
    }
}

/// Applies every restraint at its final force constant and returns the summed
/// energy. The ramp state is left untouched.
pub fn combined_fixed(
    restraints: &[CombinedDistanceRestraint],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
) -> f64 {
    restraints
        .iter()
        .map(|restraint| {
            potentials::combined_distance(positions, gradients, restraint, restraint.force_final)
                .energy
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bias::testing::{
        assert_gradients_match, finite_difference_gradients, zero_gradients,
    };
    use crate::core::models::restraint::DistanceTerm;
    use crate::core::utils::geometry;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn chain() -> Vec<Point3<f64>> {
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]
    }

    #[test]
    fn dihedrals_record_nan_for_degenerate_torsion_and_continue() {
        let mut positions = chain();
        positions[0] = Point3::new(0.0, 0.0, -1.0);
        let mut gradients = zero_gradients(4);
        let mut trace = Vec::new();
        dihedrals(
            &[
                UmbrellaDihedral::new([0, 1, 2, 3], 60.0, 1.0),
                UmbrellaDihedral::new([0, 1, 2, 3], -60.0, 1.0),
            ],
            &positions,
            &mut gradients,
            &mut trace,
        );
        distances(
            &[UmbrellaDistance::new([1, 2], 1.0, 1.0)],
            &positions,
            &mut gradients,
            &mut trace,
        );

        assert_eq!(trace.len(), 3);
        assert!(trace[0].is_nan());
        assert!(trace[1].is_nan());
        assert!(f64_approx_equal(trace[2], 1.0));
        assert!(gradients.iter().all(|g| g.norm() < TOLERANCE));
    }

    fn chain_at(torsion: f64) -> Vec<Point3<f64>> {
        let phi = torsion.to_radians();
        let mut positions = chain();
        positions[3] = Point3::new(phi.cos(), phi.sin(), 1.0);
        positions
    }

    fn half_harmonic(positions: &[Point3<f64>], target: f64, force: f64) -> f64 {
        let phi =
            geometry::torsion_degrees(&positions[0], &positions[1], &positions[2], &positions[3])
                .unwrap();
        let diff = geometry::wrap_to_180(phi - target).to_radians();
        0.5 * force * diff * diff
    }

    #[test]
    fn dihedral_with_negative_target_wraps_across_the_half_turn() {
        let positions = chain_at(170.0);
        let restraint = UmbrellaDihedral::new([0, 1, 2, 3], -170.0, 2.0);
        let mut gradients = zero_gradients(4);
        let mut trace = Vec::new();
        dihedrals(&[restraint], &positions, &mut gradients, &mut trace);

        assert_eq!(trace.len(), 1);
        assert!((trace[0] + 190.0).abs() < 1e-6);

        let numeric =
            finite_difference_gradients(&positions, |p| half_harmonic(p, -170.0, 2.0));
        assert_gradients_match(&gradients, &numeric, 1e-6);
        // diff is -20 degrees, so the gradient does not vanish
        assert!(gradients[3].norm() > 1e-3);
    }

    #[test]
    fn dihedral_with_zero_target_uses_signed_torsion() {
        let positions = chain_at(-60.0);
        let restraint = UmbrellaDihedral::new([0, 1, 2, 3], 0.0, 1.5);
        let mut gradients = zero_gradients(4);
        let mut trace = Vec::new();
        dihedrals(&[restraint], &positions, &mut gradients, &mut trace);

        assert!((trace[0] + 60.0).abs() < 1e-6);

        let numeric = finite_difference_gradients(&positions, |p| half_harmonic(p, 0.0, 1.5));
        assert_gradients_match(&gradients, &numeric, 1e-6);
    }

    #[test]
    fn values_are_appended_in_call_order() {
        let positions = chain();
        let mut gradients = zero_gradients(4);
        let mut trace = vec![-1.0];

        dihedrals(
            &[UmbrellaDihedral::new([0, 1, 2, 3], 90.0, 1.0)],
            &positions,
            &mut gradients,
            &mut trace,
        );
        angles(
            &[UmbrellaAngle::new([0, 1, 2], 90.0, 1.0)],
            &positions,
            &mut gradients,
            &mut trace,
        );
        distances(
            &[UmbrellaDistance::new([0, 3], 0.0, 0.0)],
            &positions,
            &mut gradients,
            &mut trace,
        );

        assert_eq!(trace.len(), 4);
        assert_eq!(trace[0], -1.0);
        assert!(f64_approx_equal(trace[1], 90.0));
        assert!(f64_approx_equal(trace[2], 90.0));
        assert!(f64_approx_equal(trace[3], 3.0_f64.sqrt()));
    }

    #[test]
    fn combined_ramped_increases_force_and_records_reaction_coordinate() {
        let positions = chain();
        let mut restraints = vec![CombinedDistanceRestraint::new(
            vec![DistanceTerm::new([0, 1], 1.0), DistanceTerm::new([1, 2], -1.0)],
            0.5,
            4.0,
        )];
        let mut trace = Vec::new();

        combined_ramped(&mut restraints, 4, &positions, &mut zero_gradients(4), &mut trace);
        assert!(f64_approx_equal(restraints[0].force_current, 2.0));
        combined_ramped(&mut restraints, 4, &positions, &mut zero_gradients(4), &mut trace);
        assert!(f64_approx_equal(restraints[0].force_current, 4.0));
        combined_ramped(&mut restraints, 4, &positions, &mut zero_gradients(4), &mut trace);
        assert!(f64_approx_equal(restraints[0].force_current, 4.0));

        assert_eq!(trace, vec![0.0; 3]);
    }

    #[test]
    fn combined_fixed_uses_final_force_and_leaves_ramp_alone() {
        let positions = chain();
        let restraints = vec![CombinedDistanceRestraint::new(
            vec![DistanceTerm::new([0, 1], 1.0)],
            3.0,
            2.0,
        )];
        let mut gradients = zero_gradients(4);
        let energy = combined_fixed(&restraints, &positions, &mut gradients);

        // 1/2 * 2 * (1 - 3)^2
        assert!(f64_approx_equal(energy, 4.0));
        assert_eq!(restraints[0].force_current, 0.0);
        assert!(f64_approx_equal(gradients[0].x, -4.0));
        assert!(f64_approx_equal(gradients[1].x, 4.0));
    }
}
