use super::config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BiasError {
    #[error("Invalid bias configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Gradient buffer holds {gradients} entries but {positions} positions were given")]
    GradientLength { positions: usize, gradients: usize },

    #[error("{family} restraint refers to atom {index}, but only {atom_count} atoms are present")]
    AtomOutOfRange {
        family: &'static str,
        index: usize,
        atom_count: usize,
    },

    #[error("PMF-IC correction is enabled but no spline was supplied")]
    MissingSpline,

    #[error("PMF-IC is configured for {expected} coordinate(s) but the spline has dimension {found}")]
    SplineDimension { expected: usize, found: usize },
}
