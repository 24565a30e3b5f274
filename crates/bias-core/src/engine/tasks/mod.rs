pub mod confinement;
pub mod harmonic;
pub mod pmf_ic;
pub mod umbrella;
