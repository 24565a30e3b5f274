use super::config::{BiasConfig, ConfigError, UmbrellaSettings};
use super::error::BiasError;
use super::tasks::{confinement, harmonic, pmf_ic, umbrella};
use crate::core::bias::spline::{PmfIcCoordinate, Spline};
use crate::core::bias::term::BiasEnergy;
use crate::core::models::restraint::{
    AngleRestraint, AtomIndexed, Axis, CombinedDistanceRestraint, CubicConfinement,
    DihedralRestraint, DistanceRestraint, SphericalConfinement, ThresholdConfinement,
    UmbrellaAngle, UmbrellaDihedral, UmbrellaDistance,
};
use nalgebra::{Point3, Vector3};
use tracing::{debug, instrument};

/// The full set of bias potentials acting on one simulation.
///
/// Both entry points add into a caller-owned gradient buffer that must hold
/// one entry per position. Every atom index is checked against the position
/// count before anything is written, so a rejected call leaves the gradients,
/// the trace and the ramp state exactly as they were.
#[derive(Debug, Clone)]
pub struct BiasPotentialSet {
    config: BiasConfig,
    energy: BiasEnergy,
}

impl BiasPotentialSet {
    pub fn new(config: BiasConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            distances = config.distances.len(),
            angles = config.angles.len(),
            dihedrals = config.dihedrals.len(),
            spherical = config.spherical.len(),
            cubic = config.cubic.len(),
            threshold = config.threshold.len() + config.threshold_bottom.len(),
            umbrella = config.umbrella_distances.len()
                + config.umbrella_angles.len()
                + config.umbrella_dihedrals.len(),
            combined = config.combined.len(),
            pmf_ic = config.pmf_ic.is_some(),
            "Created bias potential set."
        );
        Ok(Self {
            config,
            energy: BiasEnergy::default(),
        })
    }

    /// `true` when no restraint of any family and no PMF-IC correction is set.
    pub fn is_empty(&self) -> bool {
        let c = &self.config;
        c.distances.is_empty()
            && c.angles.is_empty()
            && c.dihedrals.is_empty()
            && c.spherical.is_empty()
            && c.cubic.is_empty()
            && c.threshold.is_empty()
            && c.threshold_bottom.is_empty()
            && c.umbrella_distances.is_empty()
            && c.umbrella_angles.is_empty()
            && c.umbrella_dihedrals.is_empty()
            && c.combined.is_empty()
            && c.pmf_ic.is_none()
    }

    /// Merges the restraint lists of `other` into this set.
    ///
    /// Settings already present here win; `other`'s equilibration steps and
    /// PMF-IC coordinates are only taken when this set has none. The merged
    /// result is validated before it replaces the current definition.
    pub fn append(&mut self, other: BiasConfig) -> Result<(), ConfigError> {
        let mut merged = self.config.clone();
        merged.distances.extend(other.distances);
        merged.angles.extend(other.angles);
        merged.dihedrals.extend(other.dihedrals);
        merged.spherical.extend(other.spherical);
        merged.cubic.extend(other.cubic);
        merged.threshold.extend(other.threshold);
        merged.threshold_bottom.extend(other.threshold_bottom);
        merged.umbrella_distances.extend(other.umbrella_distances);
        merged.umbrella_angles.extend(other.umbrella_angles);
        merged.umbrella_dihedrals.extend(other.umbrella_dihedrals);
        merged.combined.extend(other.combined);
        merged.umbrella.use_combined |= other.umbrella.use_combined;
        if merged.umbrella.equilibration_steps == 0 {
            merged.umbrella.equilibration_steps = other.umbrella.equilibration_steps;
        }
        if merged.pmf_ic.is_none() {
            merged.pmf_ic = other.pmf_ic;
        }

        merged.validate()?;
        self.config = merged;
        Ok(())
    }

    /// Energy breakdown of the most recent [`apply`](Self::apply).
    pub fn energy(&self) -> &BiasEnergy {
        &self.energy
    }

    pub fn distances(&self) -> &[DistanceRestraint] {
        &self.config.distances
    }
    pub fn angles(&self) -> &[AngleRestraint] {
        &self.config.angles
    }
    pub fn dihedrals(&self) -> &[DihedralRestraint] {
        &self.config.dihedrals
    }
    pub fn spherical(&self) -> &[SphericalConfinement] {
        &self.config.spherical
    }
    pub fn cubic(&self) -> &[CubicConfinement] {
        &self.config.cubic
    }
    pub fn threshold(&self) -> &[ThresholdConfinement] {
        &self.config.threshold
    }
    pub fn threshold_bottom(&self) -> &[ThresholdConfinement] {
        &self.config.threshold_bottom
    }
    pub fn threshold_axis(&self) -> Axis {
        self.config.threshold_axis
    }
    pub fn umbrella_distances(&self) -> &[UmbrellaDistance] {
        &self.config.umbrella_distances
    }
    pub fn umbrella_angles(&self) -> &[UmbrellaAngle] {
        &self.config.umbrella_angles
    }
    pub fn umbrella_dihedrals(&self) -> &[UmbrellaDihedral] {
        &self.config.umbrella_dihedrals
    }
    pub fn combined(&self) -> &[CombinedDistanceRestraint] {
        &self.config.combined
    }
    pub fn umbrella_settings(&self) -> &UmbrellaSettings {
        &self.config.umbrella
    }
    pub fn pmf_ic(&self) -> Option<&[PmfIcCoordinate]> {
        self.config.pmf_ic.as_deref()
    }

    // Targets and force constants may be moved between umbrella windows; the
    // atom lists are re-checked on every call, so no validation happens here.
    pub fn umbrella_distances_mut(&mut self) -> &mut [UmbrellaDistance] {
        &mut self.config.umbrella_distances
    }
    pub fn umbrella_angles_mut(&mut self) -> &mut [UmbrellaAngle] {
        &mut self.config.umbrella_angles
    }
    pub fn umbrella_dihedrals_mut(&mut self) -> &mut [UmbrellaDihedral] {
        &mut self.config.umbrella_dihedrals
    }
    pub fn combined_mut(&mut self) -> &mut [CombinedDistanceRestraint] {
        &mut self.config.combined
    }

    /// Applies the equilibrium restraints and confinements, returning their
    /// summed energy.
    ///
    /// Families are evaluated as dihedral, angle, distance, spherical, cubic,
    /// threshold (top then bottom) and, when enabled, the combined-distance
    /// restraints at their final force constant. Threshold walls only push
    /// gradients and contribute zero energy.
    #[instrument(skip_all, name = "bias_apply")]
    pub fn apply(
        &mut self,
        positions: &[Point3<f64>],
        gradients: &mut [Vector3<f64>],
        box_max: &Point3<f64>,
        box_min: &Point3<f64>,
        center: &Point3<f64>,
    ) -> Result<f64, BiasError> {
        self.check_call(positions, gradients)?;

        let c = &mut self.config;
        let mut energy = BiasEnergy {
            dihedral: harmonic::dihedrals(&mut c.dihedrals, positions, gradients),
            angle: harmonic::angles(&mut c.angles, positions, gradients),
            distance: harmonic::distances(&mut c.distances, positions, gradients),
            spherical: confinement::spherical(&c.spherical, positions, gradients, center),
            cubic: confinement::cubic(&c.cubic, positions, gradients, center),
            ..BiasEnergy::default()
        };
        energy.threshold = confinement::threshold_top(
            &c.threshold,
            c.threshold_axis,
            positions,
            gradients,
            box_max,
        ) + confinement::threshold_bottom(
            &c.threshold_bottom,
            c.threshold_axis,
            positions,
            gradients,
            box_min,
        );
        if c.umbrella.use_combined {
            energy.combined = umbrella::combined_fixed(&c.combined, positions, gradients);
        }

        let total = energy.total();
        debug!(total, "Bias energy evaluated.");
        self.energy = energy;
        Ok(total)
    }

    /// Applies the gradient-only umbrella restraints, the ramped combined
    /// restraints and, if configured, the PMF-IC correction.
    ///
    /// One measured value per umbrella restraint is appended to `trace` in the
    /// order dihedral, angle, distance, combined. `spline` is required exactly
    /// when PMF-IC coordinates are configured and must match their count.
    #[instrument(skip_all, name = "bias_apply_umbrella")]
    pub fn apply_umbrella(
        &mut self,
        positions: &[Point3<f64>],
        gradients: &mut [Vector3<f64>],
        trace: &mut Vec<f64>,
        spline: Option<&dyn Spline>,
    ) -> Result<(), BiasError> {
        self.check_call(positions, gradients)?;
        let spline = match &self.config.pmf_ic {
            Some(coordinates) => Some(pmf_ic::check_spline(coordinates, spline)?),
            None => None,
        };

        let c = &mut self.config;
        umbrella::dihedrals(&c.umbrella_dihedrals, positions, gradients, trace);
        umbrella::angles(&c.umbrella_angles, positions, gradients, trace);
        umbrella::distances(&c.umbrella_distances, positions, gradients, trace);
        umbrella::combined_ramped(
            &mut c.combined,
            c.umbrella.equilibration_steps,
            positions,
            gradients,
            trace,
        );

        if let (Some(coordinates), Some(spline)) = (&c.pmf_ic, spline) {
            pmf_ic::run(coordinates, spline, positions, gradients);
        }
        Ok(())
    }

    fn check_call(
        &self,
        positions: &[Point3<f64>],
        gradients: &[Vector3<f64>],
    ) -> Result<(), BiasError> {
        if positions.len() != gradients.len() {
            return Err(BiasError::GradientLength {
                positions: positions.len(),
                gradients: gradients.len(),
            });
        }

        let n = positions.len();
        let c = &self.config;
        check_atoms("Distance", &c.distances, n)?;
        check_atoms("Angle", &c.angles, n)?;
        check_atoms("Dihedral", &c.dihedrals, n)?;
        check_atoms("Umbrella distance", &c.umbrella_distances, n)?;
        check_atoms("Umbrella angle", &c.umbrella_angles, n)?;
        check_atoms("Umbrella dihedral", &c.umbrella_dihedrals, n)?;
        for restraint in &c.combined {
            check_atoms("Combined distance", &restraint.terms, n)?;
        }
        if let Some(coordinates) = &c.pmf_ic {
            for ic in coordinates {
                check_indices("PMF-IC", ic.coordinate.atoms(), n)?;
            }
        }
        Ok(())
    }
}

fn check_atoms<T: AtomIndexed>(
    family: &'static str,
    items: &[T],
    atom_count: usize,
) -> Result<(), BiasError> {
    items
        .iter()
        .try_for_each(|item| check_indices(family, item.atoms(), atom_count))
}

fn check_indices(family: &'static str, atoms: &[usize], atom_count: usize) -> Result<(), BiasError> {
    match atoms.iter().find(|&&index| index >= atom_count) {
        Some(&index) => Err(BiasError::AtomOutOfRange {
            family,
            index,
            atom_count,
        }),
        None => Ok(()),
    }
}
