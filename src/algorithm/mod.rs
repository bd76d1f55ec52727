//! # Algorithms
//!
//! Constraint propagation works on the problem in `data::problem`, the simplex kernels on the
//! vectors and matrices in `data::linear_algebra`.
pub mod propagation;
pub mod simplex;
