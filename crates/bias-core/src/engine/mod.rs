//! # Engine Module
//!
//! The stateful layer of the bias engine. [`BiasPotentialSet`] owns the
//! restraint lists, validates every call before touching the gradient buffer,
//! dispatches to the family aggregators in [`tasks`] and keeps the measured
//! values and the last energy breakdown for reporting.

pub mod config;
pub mod error;
mod potential_set;
pub(crate) mod tasks;

pub use potential_set::BiasPotentialSet;
