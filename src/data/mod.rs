//! # Storing of problems in memory
//!
//! This module provides the data structures that the algorithms work on: the variables and
//! domains of a constraint integer program, and the vectors and matrices of the simplex kernels.
//! Algorithms may introduce their specific data structures in `algorithm::my_algorithm`.

pub mod linear_algebra;
pub mod problem;
