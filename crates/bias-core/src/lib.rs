//! # biaspot
//!
//! Bias potentials for molecular simulation: harmonic restraints on internal
//! coordinates, geometric confinement walls, umbrella-sampling restraints and
//! PMF-IC spline corrections, each with exact analytic gradients.
//!
//! ## Architecture
//!
//! The library follows a two-layer layout.
//!
//! - **[`core`]: The Foundation.** Stateless pieces: measurement primitives for
//!   distances, angles and torsions, the restraint records, gradient
//!   distributors for each internal coordinate, and single-restraint
//!   evaluators that return an energy and a measured value.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer. [`engine::BiasPotentialSet`]
//!   owns the restraint lists built from a validated [`engine::config::BiasConfig`],
//!   runs the family aggregators and writes measured values back into the
//!   records for reporting.
//!
//! ## Usage
//!
//! ```ignore
//! use biaspot::engine::BiasPotentialSet;
//! use biaspot::engine::config::BiasConfigBuilder;
//!
//! let config = BiasConfigBuilder::new().distance(restraint).build()?;
//! let mut set = BiasPotentialSet::new(config)?;
//! let energy = set.apply(&positions, &mut gradients, &box_max, &box_min, &center)?;
//! ```

pub mod core;
pub mod engine;
