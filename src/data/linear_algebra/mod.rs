//! # Linear algebra primitives
//!
//! Linear algebra primitives used to represent data in either a dense, a sparse or a semi-sparse
//! format.

pub mod matrix;
pub mod traits;
pub mod vector;

/// Default threshold at or below which the absolute value of a vector element is treated as zero.
pub const EPSILON: f64 = 1e-16;

/// A (row or column) index together with a value.
pub type SparseTuple<F> = (usize, F);
/// Sorted collection of `SparseTuple`s.
pub type SparseTupleVec<F> = Vec<SparseTuple<F>>;
