//! # Vector types
//!
//! Dense, sparse and semi-sparse vectors. These were written by hand, because a certain specific
//! set of operations needs to be done quickly with these types: the simplex kernels constantly mix
//! sparse and dense operands, and the semi-sparse vector switches between both views.
use std::fmt::{Debug, Display};

pub use dense::Dense as DenseVector;
pub use semi_sparse::SemiSparse;
pub use sparse::Sparse as SparseVector;

use crate::data::linear_algebra::SparseTuple;

mod dense;
mod semi_sparse;
mod sparse;

/// Defines basic ways to create or change a vector, regardless of back-end.
pub trait Vector<F>: PartialEq + Display + Debug {
    /// Items stored internally.
    type Inner;

    /// Create a new instance.
    ///
    /// # Arguments
    ///
    /// * `data`: Internal data values. Will not be changed and directly used for creation.
    /// * `len`: Length of the vector represented (and not necessarily of the internal data
    /// structure).
    ///
    /// # Return value
    ///
    /// Input data wrapped inside a vector.
    fn new(data: Vec<Self::Inner>, len: usize) -> Self;
    /// Compute the inner product with a column of a sparse matrix.
    fn sparse_inner_product<'a, I>(&self, column: I) -> F
    where
        I: IntoIterator<Item = &'a SparseTuple<F>>,
        F: 'a,
    ;
    /// Set the value at an index.
    ///
    /// Depending on internal representation, this can be an expensive operation (for `Sparse`
    /// vectors, the cost depends on the (lack of) sparsity).
    fn set(&mut self, index: usize, value: F);
    /// Retrieve the value at an index.
    ///
    /// # Returns
    ///
    /// `None` if the representation is sparse and the value at the index is zero.
    fn get(&self, index: usize) -> Option<&F>;
    /// Number of items represented by the vector.
    fn len(&self) -> usize;
    /// Whether the vector is empty.
    fn is_empty(&self) -> bool;
    /// Get the size of the internal data structure (and not of the represented vector).
    fn size(&self) -> usize;
}
