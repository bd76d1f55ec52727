//! # Simplex kernels
//!
//! Building blocks of a simplex solver that do not depend on the main loop: the basis descriptor,
//! the ratio tests that select the pivot and the quality measures of a solution.
pub mod basis;
pub mod quality;
pub mod ratio_test;
