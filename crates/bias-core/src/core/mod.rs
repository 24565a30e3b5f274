//! # Core Module
//!
//! Stateless building blocks of the bias engine.
//!
//! - **Geometry** ([`utils::geometry`]) - Distance, angle and torsion measurement
//! - **Records** ([`models::restraint`]) - Restraint and confinement definitions
//! - **Bias math** ([`bias`]) - Gradient distributors, per-restraint evaluators,
//!   the spline interface and the energy breakdown type

pub mod bias;
pub mod models;
pub mod utils;
