//! # Constraint propagation for constraint integer programming
//!
//! Two parts of a branch-and-bound solver for constraint integer programs:
//!
//! * A constraint propagation engine with handlers for linking constraints (an integer variable
//! tied to one binary variable per value) and logic-or constraints (clauses over binary literals),
//! driven by bound change events, with presolving, separation and conflict analysis.
//! * The sparse linear algebra and ratio test kernels of a simplex solver: semi-sparse vectors,
//! the basis descriptor, quality measures and the Harris ratio test with bound shifting.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod error;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
