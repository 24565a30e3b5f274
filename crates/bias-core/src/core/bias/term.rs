use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Bias energy split by restraint family.
///
/// `threshold` is carried for reporting but the threshold walls are
/// gradient-only, so it stays zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BiasEnergy {
    pub distance: f64,
    pub angle: f64,
    pub dihedral: f64,
    pub spherical: f64,
    pub cubic: f64,
    pub threshold: f64,
    pub combined: f64,
}

impl BiasEnergy {
    #[inline]
    pub fn total(&self) -> f64 {
        self.distance
            + self.angle
            + self.dihedral
            + self.spherical
            + self.cubic
            + self.threshold
            + self.combined
    }
}

impl Add for BiasEnergy {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            distance: self.distance + rhs.distance,
            angle: self.angle + rhs.angle,
            dihedral: self.dihedral + rhs.dihedral,
            spherical: self.spherical + rhs.spherical,
            cubic: self.cubic + rhs.cubic,
            threshold: self.threshold + rhs.threshold,
            combined: self.combined + rhs.combined,
        }
    }
}

impl AddAssign for BiasEnergy {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for BiasEnergy {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, term| acc + term)
    }
}
