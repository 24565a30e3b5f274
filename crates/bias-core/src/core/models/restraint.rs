use crate::core::utils::geometry;
use nalgebra::{Point3, Vector3};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DefinitionError {
    #[error("Entered invalid dimension '{0}'. Only x, y and z are possible")]
    InvalidAxis(char),
    #[error("An internal coordinate needs 2, 3 or 4 atom indices, got {0}")]
    InvalidArity(usize),
}

/// Anything defined on a fixed tuple of atom indices.
pub trait AtomIndexed {
    fn atoms(&self) -> &[usize];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "char")]
pub enum Axis {
    X,
    Y,
    #[default]
    Z,
}

impl Axis {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl TryFrom<char> for Axis {
    type Error = DefinitionError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c.to_ascii_lowercase() {
            'x' => Ok(Axis::X),
            'y' => Ok(Axis::Y),
            'z' => Ok(Axis::Z),
            _ => Err(DefinitionError::InvalidAxis(c)),
        }
    }
}

/// Harmonic restraint on the distance between two atoms, `E = k (r - r0)^2`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DistanceRestraint {
    pub atoms: [usize; 2],
    pub ideal: f64,
    pub force: f64,
    /// Distance measured during the most recent evaluation.
    #[serde(skip)]
    pub value: Option<f64>,
}

impl DistanceRestraint {
    pub fn new(atoms: [usize; 2], ideal: f64, force: f64) -> Self {
        Self {
            atoms,
            ideal,
            force,
            value: None,
        }
    }
}

/// Harmonic restraint on a bond angle; `atoms[1]` is the vertex. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AngleRestraint {
    pub atoms: [usize; 3],
    pub ideal: f64,
    pub force: f64,
    #[serde(skip)]
    pub value: Option<f64>,
}

impl AngleRestraint {
    pub fn new(atoms: [usize; 3], ideal: f64, force: f64) -> Self {
        Self {
            atoms,
            ideal,
            force,
            value: None,
        }
    }
}

/// Cosine restraint on a proper dihedral, `E = k (1 - cos(phi - phi0))`. Angles in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DihedralRestraint {
    pub atoms: [usize; 4],
    pub ideal: f64,
    pub force: f64,
    #[serde(skip)]
    pub value: Option<f64>,
}

impl DihedralRestraint {
    pub fn new(atoms: [usize; 4], ideal: f64, force: f64) -> Self {
        Self {
            atoms,
            ideal,
            force,
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UmbrellaDistance {
    pub atoms: [usize; 2],
    pub target: f64,
    pub force: f64,
}

impl UmbrellaDistance {
    pub fn new(atoms: [usize; 2], target: f64, force: f64) -> Self {
        Self {
            atoms,
            target,
            force,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UmbrellaAngle {
    pub atoms: [usize; 3],
    pub target: f64,
    pub force: f64,
}

impl UmbrellaAngle {
    pub fn new(atoms: [usize; 3], target: f64, force: f64) -> Self {
        Self {
            atoms,
            target,
            force,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct UmbrellaDihedral {
    pub atoms: [usize; 4],
    /// Target torsion in degrees, within [-180, 180].
    pub target: f64,
    pub force: f64,
}

impl UmbrellaDihedral {
    pub fn new(atoms: [usize; 4], target: f64, force: f64) -> Self {
        Self {
            atoms,
            target,
            force,
        }
    }
}

macro_rules! impl_atom_indexed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl AtomIndexed for $ty {
                #[inline]
                fn atoms(&self) -> &[usize] {
                    &self.atoms
                }
            }
        )*
    };
}

impl_atom_indexed!(
    DistanceRestraint,
    AngleRestraint,
    DihedralRestraint,
    UmbrellaDistance,
    UmbrellaAngle,
    UmbrellaDihedral,
    DistanceTerm,
);

/// One signed distance contribution to a combined reaction coordinate.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct DistanceTerm {
    pub atoms: [usize; 2],
    pub factor: f64,
}

impl DistanceTerm {
    pub fn new(atoms: [usize; 2], factor: f64) -> Self {
        Self { atoms, factor }
    }
}

/// Umbrella restraint on `sum(factor * distance)` over several atom pairs.
///
/// `force_current` ramps towards `force_final` during equilibration and is
/// only used by the ramped evaluation; the fixed evaluation always uses
/// `force_final`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CombinedDistanceRestraint {
    pub terms: Vec<DistanceTerm>,
    pub target: f64,
    #[serde(default)]
    pub force_current: f64,
    pub force_final: f64,
}

impl CombinedDistanceRestraint {
    pub fn new(terms: Vec<DistanceTerm>, target: f64, force_final: f64) -> Self {
        Self {
            terms,
            target,
            force_current: 0.0,
            force_final,
        }
    }

    pub fn reaction_coordinate(&self, positions: &[Point3<f64>]) -> f64 {
        self.terms
            .iter()
            .map(|term| {
                let [i, j] = term.atoms;
                term.factor * geometry::distance(&positions[i], &positions[j])
            })
            .sum()
    }

    /// Raises `force_current` by `2 * force_final / equilibration_steps`,
    /// saturating at `force_final`.
    pub fn ramp_force(&mut self, equilibration_steps: usize) {
        if self.force_current < self.force_final {
            let increment = 2.0 * self.force_final / equilibration_steps as f64;
            self.force_current = (self.force_current + increment).min(self.force_final);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SphericalConfinement {
    pub radius: f64,
    pub force: f64,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
}

impl SphericalConfinement {
    pub fn new(radius: f64, force: f64, exponent: f64) -> Self {
        Self {
            radius,
            force,
            exponent,
        }
    }

    #[inline]
    pub fn effective_exponent(&self) -> f64 {
        self.exponent.max(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CubicConfinement {
    /// Full side lengths of the box along x, y and z.
    pub dimensions: [f64; 3],
    pub force: f64,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
}

impl CubicConfinement {
    pub fn new(dimensions: [f64; 3], force: f64, exponent: f64) -> Self {
        Self {
            dimensions,
            force,
            exponent,
        }
    }

    #[inline]
    pub fn effective_exponent(&self) -> f64 {
        self.exponent.max(1.0)
    }

    pub fn half_dimensions(&self) -> Vector3<f64> {
        Vector3::from(self.dimensions).abs() / 2.0
    }
}

/// One-sided linear wall along the set-wide threshold axis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ThresholdConfinement {
    pub offset: f64,
    pub force: f64,
}

impl ThresholdConfinement {
    pub fn new(offset: f64, force: f64) -> Self {
        Self { offset, force }
    }
}

fn default_exponent() -> f64 {
    1.0
}

/// Collective variable selected by the arity of its atom list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Vec<usize>")]
pub enum InternalCoordinate {
    Distance([usize; 2]),
    Angle([usize; 3]),
    Torsion([usize; 4]),
}

impl InternalCoordinate {
    pub fn from_indices(indices: &[usize]) -> Result<Self, DefinitionError> {
        match *indices {
            [a, b] => Ok(Self::Distance([a, b])),
            [a, b, c] => Ok(Self::Angle([a, b, c])),
            [a, b, c, d] => Ok(Self::Torsion([a, b, c, d])),
            _ => Err(DefinitionError::InvalidArity(indices.len())),
        }
    }

    /// Distance in length units, angle and torsion in degrees.
    /// `None` only for a degenerate torsion.
    pub fn measure(&self, positions: &[Point3<f64>]) -> Option<f64> {
        match *self {
            Self::Distance([a, b]) => Some(geometry::distance(&positions[a], &positions[b])),
            Self::Angle([a, b, c]) => Some(geometry::angle_degrees(
                &positions[a],
                &positions[b],
                &positions[c],
            )),
            Self::Torsion([a, b, c, d]) => geometry::torsion_degrees(
                &positions[a],
                &positions[b],
                &positions[c],
                &positions[d],
            ),
        }
    }
}

impl AtomIndexed for InternalCoordinate {
    fn atoms(&self) -> &[usize] {
        match self {
            Self::Distance(atoms) => atoms.as_slice(),
            Self::Angle(atoms) => atoms.as_slice(),
            Self::Torsion(atoms) => atoms.as_slice(),
        }
    }
}

impl TryFrom<Vec<usize>> for InternalCoordinate {
    type Error = DefinitionError;

    fn try_from(indices: Vec<usize>) -> Result<Self, Self::Error> {
        Self::from_indices(&indices)
    }
}
