//! # Traits for elements in vectors and matrices
//!
//! All linear algebra in this crate happens in floating point arithmetic. Values smaller in
//! absolute value than some epsilon are treated as zero by the sparse data structures; the
//! epsilon is a property of the data structure, not of the element type.
use std::fmt::{Debug, Display};

use num_traits::Float;

/// Element of a `Vector` or `Matrix` type.
///
/// This bundles the traits that are needed to derive a few practical traits for the
/// aforementioned types.
pub trait Element: Float + Display + Debug {
    /// Whether this value should be stored in a sparse data structure, given a zero threshold.
    fn is_not_zero_with(self, epsilon: Self) -> bool {
        self.abs() > epsilon
    }
}

impl<T: Float + Display + Debug> Element for T {}
