use crate::core::bias::potentials;
use crate::core::models::restraint::{AngleRestraint, DihedralRestraint, DistanceRestraint};
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace};

pub fn distances(
    restraints: &mut [DistanceRestraint],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
) -> f64 {
    let mut energy = 0.0;
    for restraint in restraints.iter_mut() {
        let eval = potentials::harmonic_distance(positions, gradients, restraint);
        trace!(
            atoms = ?restraint.atoms,
            value = eval.value,
            ideal = restraint.ideal,
            energy = eval.energy,
            "distance restraint"
        );
        restraint.value = Some(eval.value);
        energy += eval.energy;
    }
    debug!(count = restraints.len(), energy, "Applied distance restraints.");
    energy
}

pub fn angles(
    restraints: &mut [AngleRestraint],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
) -> f64 {
    let mut energy = 0.0;
    for restraint in restraints.iter_mut() {
        let eval = potentials::harmonic_angle(positions, gradients, restraint);
        trace!(
            atoms = ?restraint.atoms,
            value = eval.value,
            ideal = restraint.ideal,
            energy = eval.energy,
            "angle restraint"
        );
        restraint.value = Some(eval.value);
        energy += eval.energy;
    }
    debug!(count = restraints.len(), energy, "Applied angle restraints.");
    energy
}

/// Degenerate torsions are skipped for this step and keep their previous value.
pub fn dihedrals(
    restraints: &mut [DihedralRestraint],
    positions: &[Point3<f64>],
    gradients: &mut [Vector3<f64>],
) -> f64 {
    let mut energy = 0.0;
    for restraint in restraints.iter_mut() {
        match potentials::cosine_dihedral(positions, gradients, restraint) {
            Some(eval) => {
                trace!(
                    atoms = ?restraint.atoms,
                    value = eval.value,
                    ideal = restraint.ideal,
                    energy = eval.energy,
                    "dihedral restraint"
                );
                restraint.value = Some(eval.value);
                energy += eval.energy;
            }
            None => debug!(atoms = ?restraint.atoms, "Skipping dihedral restraint on degenerate geometry."),
        }
    }
    debug!(count = restraints.len(), energy, "Applied dihedral restraints.");
    energy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bias::testing::zero_gradients;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn distances_sums_energy_and_records_measured_values() {
        let positions = square();
        let mut restraints = vec![
            DistanceRestraint::new([0, 1], 2.0, 1.0),
            DistanceRestraint::new([0, 2], 2.0_f64.sqrt(), 3.0),
        ];
        let energy = distances(&mut restraints, &positions, &mut zero_gradients(4));

        assert!(f64_approx_equal(energy, 1.0));
        assert!(f64_approx_equal(restraints[0].value.unwrap(), 1.0));
        assert!(f64_approx_equal(restraints[1].value.unwrap(), 2.0_f64.sqrt()));
    }

    #[test]
    fn angles_records_values_in_degrees() {
        let positions = square();
        let mut restraints = vec![AngleRestraint::new([0, 1, 2], 90.0, 5.0)];
        let energy = angles(&mut restraints, &positions, &mut zero_gradients(4));

        assert!(f64_approx_equal(energy, 0.0));
        assert!(f64_approx_equal(restraints[0].value.unwrap(), 90.0));
    }

    #[test]
    fn dihedrals_skip_degenerate_torsions_and_keep_previous_value() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ];
        let mut restraints = vec![DihedralRestraint::new([0, 1, 2, 3], 180.0, 1.0)];
        restraints[0].value = Some(42.0);
        let mut gradients = zero_gradients(4);
        let energy = dihedrals(&mut restraints, &positions, &mut gradients);

        assert_eq!(energy, 0.0);
        assert_eq!(restraints[0].value, Some(42.0));
        assert!(gradients.iter().all(|g| *g == Vector3::zeros()));
    }

    #[test]
    fn dihedrals_cis_chain_restrained_to_trans() {
        let mut restraints = vec![DihedralRestraint::new([0, 1, 2, 3], 180.0, 2.0)];
        let energy = dihedrals(&mut restraints, &square(), &mut zero_gradients(4));

        assert!(f64_approx_equal(restraints[0].value.unwrap(), 0.0));
        assert!(f64_approx_equal(energy, 4.0));
    }
}
