use crate::core::bias::spline::PmfIcCoordinate;
use crate::core::models::restraint::{
    AngleRestraint, AtomIndexed, Axis, CombinedDistanceRestraint, CubicConfinement,
    DefinitionError, DihedralRestraint, DistanceRestraint, SphericalConfinement,
    ThresholdConfinement, UmbrellaAngle, UmbrellaDihedral, UmbrellaDistance,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("{family} restraint uses atom {index} more than once")]
    DuplicateAtom { family: &'static str, index: usize },

    #[error("{family} force constant must be non-negative and finite, got {value}")]
    InvalidForce { family: &'static str, value: f64 },

    #[error("{family} target must lie within [-180, 180] degrees, got {value}")]
    InvalidTarget { family: &'static str, value: f64 },

    #[error("Combined distance restraints need a positive number of equilibration steps")]
    ZeroEquilibrationSteps,

    #[error("A combined distance restraint needs at least one distance term")]
    EmptyCombination,

    #[error("PMF-IC needs 1 or 2 coordinates, got {0}")]
    PmfIcDimension(usize),

    #[error("PMF-IC mapping length must be positive and finite, got {0}")]
    PmfIcLength(f64),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UmbrellaSettings {
    /// Whether `apply` evaluates the combined-distance restraints with their
    /// final force constant and counts their energy.
    pub use_combined: bool,
    /// Length of the equilibration window; the ramped force constant reaches
    /// its final value after half of it.
    pub equilibration_steps: usize,
}

/// Everything a [`BiasPotentialSet`](super::BiasPotentialSet) is built from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BiasConfig {
    pub distances: Vec<DistanceRestraint>,
    pub angles: Vec<AngleRestraint>,
    pub dihedrals: Vec<DihedralRestraint>,
    pub spherical: Vec<SphericalConfinement>,
    pub cubic: Vec<CubicConfinement>,
    pub threshold: Vec<ThresholdConfinement>,
    pub threshold_bottom: Vec<ThresholdConfinement>,
    pub umbrella_distances: Vec<UmbrellaDistance>,
    pub umbrella_angles: Vec<UmbrellaAngle>,
    pub umbrella_dihedrals: Vec<UmbrellaDihedral>,
    pub combined: Vec<CombinedDistanceRestraint>,
    pub threshold_axis: Axis,
    pub umbrella: UmbrellaSettings,
    /// Collective variables of the PMF-IC correction; `None` disables it.
    pub pmf_ic: Option<Vec<PmfIcCoordinate>>,
}

impl BiasConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_family("Distance", &self.distances, |r| r.force)?;
        check_family("Angle", &self.angles, |r| r.force)?;
        check_family("Dihedral", &self.dihedrals, |r| r.force)?;
        check_family("Umbrella distance", &self.umbrella_distances, |r| r.force)?;
        check_family("Umbrella angle", &self.umbrella_angles, |r| r.force)?;
        check_family("Umbrella dihedral", &self.umbrella_dihedrals, |r| r.force)?;
        for restraint in &self.umbrella_dihedrals {
            if !(-180.0..=180.0).contains(&restraint.target) {
                return Err(ConfigError::InvalidTarget {
                    family: "Umbrella dihedral",
                    value: restraint.target,
                });
            }
        }

        for wall in &self.spherical {
            check_force("Spherical", wall.force)?;
        }
        for wall in &self.cubic {
            check_force("Cubic", wall.force)?;
        }
        for wall in self.threshold.iter().chain(&self.threshold_bottom) {
            check_force("Threshold", wall.force)?;
        }

        for restraint in &self.combined {
            if restraint.terms.is_empty() {
                return Err(ConfigError::EmptyCombination);
            }
            check_family("Combined distance", &restraint.terms, |_| 0.0)?;
            check_force("Combined distance", restraint.force_final)?;
            check_force("Combined distance", restraint.force_current)?;
        }
        if !self.combined.is_empty() && self.umbrella.equilibration_steps == 0 {
            return Err(ConfigError::ZeroEquilibrationSteps);
        }

        if let Some(coordinates) = &self.pmf_ic {
            if !(1..=2).contains(&coordinates.len()) {
                return Err(ConfigError::PmfIcDimension(coordinates.len()));
            }
            for ic in coordinates {
                check_distinct("PMF-IC", ic.coordinate.atoms())?;
                if !(ic.length.is_finite() && ic.length > 0.0) {
                    return Err(ConfigError::PmfIcLength(ic.length));
                }
            }
        }

        Ok(())
    }
}

fn check_family<T: AtomIndexed>(
    family: &'static str,
    items: &[T],
    force: impl Fn(&T) -> f64,
) -> Result<(), ConfigError> {
    for item in items {
        check_distinct(family, item.atoms())?;
        check_force(family, force(item))?;
    }
    Ok(())
}

fn check_distinct(family: &'static str, atoms: &[usize]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(atoms.len());
    for &index in atoms {
        if !seen.insert(index) {
            return Err(ConfigError::DuplicateAtom { family, index });
        }
    }
    Ok(())
}

fn check_force(family: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidForce { family, value })
    }
}

#[derive(Default)]
pub struct BiasConfigBuilder {
    config: BiasConfig,
    equilibration_steps: Option<usize>,
}

impl BiasConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(mut self, restraint: DistanceRestraint) -> Self {
        self.config.distances.push(restraint);
        self
    }
    pub fn angle(mut self, restraint: AngleRestraint) -> Self {
        self.config.angles.push(restraint);
        self
    }
    pub fn dihedral(mut self, restraint: DihedralRestraint) -> Self {
        self.config.dihedrals.push(restraint);
        self
    }
    pub fn spherical(mut self, wall: SphericalConfinement) -> Self {
        self.config.spherical.push(wall);
        self
    }
    pub fn cubic(mut self, wall: CubicConfinement) -> Self {
        self.config.cubic.push(wall);
        self
    }
    pub fn threshold(mut self, wall: ThresholdConfinement) -> Self {
        self.config.threshold.push(wall);
        self
    }
    pub fn threshold_bottom(mut self, wall: ThresholdConfinement) -> Self {
        self.config.threshold_bottom.push(wall);
        self
    }
    pub fn threshold_axis(mut self, axis: Axis) -> Self {
        self.config.threshold_axis = axis;
        self
    }
    pub fn umbrella_distance(mut self, restraint: UmbrellaDistance) -> Self {
        self.config.umbrella_distances.push(restraint);
        self
    }
    pub fn umbrella_angle(mut self, restraint: UmbrellaAngle) -> Self {
        self.config.umbrella_angles.push(restraint);
        self
    }
    pub fn umbrella_dihedral(mut self, restraint: UmbrellaDihedral) -> Self {
        self.config.umbrella_dihedrals.push(restraint);
        self
    }
    pub fn combined(mut self, restraint: CombinedDistanceRestraint) -> Self {
        self.config.combined.push(restraint);
        self
    }
    pub fn use_combined(mut self, enabled: bool) -> Self {
        self.config.umbrella.use_combined = enabled;
        self
    }
    pub fn equilibration_steps(mut self, steps: usize) -> Self {
        self.equilibration_steps = Some(steps);
        self
    }
    pub fn pmf_ic(mut self, coordinates: Vec<PmfIcCoordinate>) -> Self {
        self.config.pmf_ic = Some(coordinates);
        self
    }

    pub fn build(mut self) -> Result<BiasConfig, ConfigError> {
        if !self.config.combined.is_empty() {
            self.config.umbrella.equilibration_steps = self
                .equilibration_steps
                .ok_or(ConfigError::MissingParameter("equilibration_steps"))?;
        } else if let Some(steps) = self.equilibration_steps {
            self.config.umbrella.equilibration_steps = steps;
        }
        self.config.validate()?;
        Ok(self.config)
    }
}
