//! # Bias Module
//!
//! Pure bias-potential mathematics. Nothing here owns state: every function
//! reads positions, adds onto a caller-owned gradient buffer and returns the
//! energy and measured value so the caller can do the bookkeeping.
//!
//! - [`derivatives`] - Gradient distributors for distances, angles and torsions
//! - [`potentials`] - Single-restraint and single-atom evaluators
//! - [`spline`] - The external spline interface and the xi/z mapping used by PMF-IC
//! - [`term`] - Per-family energy breakdown

pub mod derivatives;
pub mod potentials;
pub mod spline;
pub mod term;

#[cfg(test)]
pub(crate) mod testing;
