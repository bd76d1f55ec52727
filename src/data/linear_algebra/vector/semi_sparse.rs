//! # Semi-sparse vector
//!
//! A dense array of values with an optional overlay of indices of the nonzero values. While the
//! vector is *set up*, the overlay can be trusted and operations run in time proportional to the
//! number of nonzeros; otherwise the vector is treated as dense.
//!
//! Invariant while set up: every index that is not in the overlay has value exactly zero. Indices
//! in the overlay may hold values that became (nearly) zero through cancellation.
use std::fmt;
use std::fmt::Display;
use std::ops::{AddAssign, MulAssign, SubAssign};

use crate::data::linear_algebra::matrix::SparseMatrix;
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::{DenseVector, SparseVector, Vector};

/// Density of the operand above which products are computed by gathering inner products.
pub const DEFAULT_PRODUCT_THRESHOLD: f64 = 0.1;

/// Dense values with a lazily maintained set of nonzero indices.
#[derive(Clone, Debug)]
pub struct SemiSparse<F> {
    val: Vec<F>,
    idx: Vec<usize>,
    /// Whether an index is in `idx`, only meaningful while set up.
    marked: Vec<bool>,
    setup: bool,
    epsilon: F,
    product_threshold: f64,
}

impl<F: Element> SemiSparse<F> {
    /// Create a zero vector.
    ///
    /// # Arguments
    ///
    /// * `dim`: Dimension, fixed after creation.
    /// * `epsilon`: Values with an absolute value at or below this threshold are zero.
    ///
    /// # Return value
    ///
    /// A set up vector without nonzeros.
    pub fn new(dim: usize, epsilon: F) -> Self {
        debug_assert!(epsilon >= F::zero());

        Self {
            val: vec![F::zero(); dim],
            idx: Vec::new(),
            marked: vec![false; dim],
            setup: true,
            epsilon,
            product_threshold: DEFAULT_PRODUCT_THRESHOLD,
        }
    }

    /// Create a vector that is not set up from dense values.
    pub fn from_values(values: Vec<F>, epsilon: F) -> Self {
        let dim = values.len();

        Self {
            val: values,
            idx: Vec::new(),
            marked: vec![false; dim],
            setup: false,
            epsilon,
            product_threshold: DEFAULT_PRODUCT_THRESHOLD,
        }
    }

    /// Dimension of the vector.
    pub fn dim(&self) -> usize {
        self.val.len()
    }

    /// Number of indices in the overlay.
    ///
    /// Requires the vector to be set up.
    pub fn size(&self) -> usize {
        debug_assert!(self.setup);

        self.idx.len()
    }

    /// Whether the index overlay can be trusted.
    pub fn is_setup(&self) -> bool {
        self.setup
    }

    /// Build the index overlay if it is not valid, zeroing all values at or below epsilon.
    pub fn setup(&mut self) {
        if !self.setup {
            self.force_setup();
        }
    }

    /// Rebuild the index overlay, regardless of the current setup status.
    ///
    /// Runs in time linear in the dimension.
    pub fn force_setup(&mut self) {
        self.idx.clear();
        for i in 0..self.val.len() {
            if self.val[i].is_not_zero_with(self.epsilon) {
                self.idx.push(i);
                self.marked[i] = true;
            } else {
                self.val[i] = F::zero();
                self.marked[i] = false;
            }
        }
        self.setup = true;
    }

    /// Mark the index overlay as invalid. Constant time.
    pub fn un_setup(&mut self) {
        self.setup = false;
    }

    /// Index of the `n`-th nonzero.
    pub fn index(&self, n: usize) -> usize {
        debug_assert!(self.setup);

        self.idx[n]
    }

    /// Value of the `n`-th nonzero.
    pub fn value_at(&self, n: usize) -> F {
        debug_assert!(self.setup);

        self.val[self.idx[n]]
    }

    /// Position of index `i` in the overlay, if it is present.
    pub fn position(&self, i: usize) -> Option<usize> {
        debug_assert!(self.setup);
        debug_assert!(i < self.dim());

        if self.marked[i] {
            self.idx.iter().position(|&j| j == i)
        } else {
            None
        }
    }

    /// The index overlay, in insertion order.
    pub fn indices(&self) -> &[usize] {
        debug_assert!(self.setup);

        &self.idx
    }

    /// The dense values.
    pub fn values(&self) -> &[F] {
        &self.val
    }

    /// Value at index `i`.
    pub fn get(&self, i: usize) -> F {
        self.val[i]
    }

    /// Add a new nonzero.
    ///
    /// Index `i` may not be present yet, and the vector should be set up.
    pub fn add(&mut self, i: usize, x: F) {
        debug_assert!(self.setup);
        debug_assert!(!self.marked[i]);
        debug_assert!(self.val[i].is_zero());

        self.idx.push(i);
        self.marked[i] = true;
        self.val[i] = x;
    }

    /// Set the value at index `i`, keeping the overlay consistent.
    pub fn set_value(&mut self, i: usize, x: F) {
        debug_assert!(i < self.dim());

        if self.setup {
            let is_nonzero = x.is_not_zero_with(self.epsilon);
            match (self.marked[i], is_nonzero) {
                (false, true) => {
                    self.idx.push(i);
                    self.marked[i] = true;
                    self.val[i] = x;
                },
                (false, false) => self.val[i] = F::zero(),
                (true, true) => self.val[i] = x,
                (true, false) => self.clear_index(i),
            }
        } else {
            self.val[i] = x;
        }
    }

    /// Set the value at index `i` to zero, removing it from the overlay.
    pub fn clear_index(&mut self, i: usize) {
        if self.setup {
            if let Some(n) = self.position(i) {
                self.clear_position(n);
                return;
            }
        }
        self.val[i] = F::zero();
    }

    /// Set the `n`-th nonzero to zero.
    ///
    /// The last nonzero takes its place in the overlay.
    pub fn clear_position(&mut self, n: usize) {
        debug_assert!(self.setup);

        let i = self.idx.swap_remove(n);
        self.marked[i] = false;
        self.val[i] = F::zero();
    }

    /// Set all values to zero. The result is set up.
    pub fn clear(&mut self) {
        if self.setup {
            for &i in &self.idx {
                self.val[i] = F::zero();
                self.marked[i] = false;
            }
        } else {
            self.val.iter_mut().for_each(|v| *v = F::zero());
            self.marked.iter_mut().for_each(|m| *m = false);
        }
        self.idx.clear();
        self.setup = true;
    }

    /// The zero threshold.
    pub fn epsilon(&self) -> F {
        self.epsilon
    }

    /// Change the zero threshold.
    ///
    /// The overlay is invalidated, because its entries were selected with the old threshold.
    pub fn set_epsilon(&mut self, epsilon: F) {
        debug_assert!(epsilon >= F::zero());

        self.epsilon = epsilon;
        self.un_setup();
    }

    /// Density of the operand above which products gather instead of scatter.
    pub fn product_threshold(&self) -> f64 {
        self.product_threshold
    }

    /// Change the density threshold used by the products.
    pub fn set_product_threshold(&mut self, threshold: f64) {
        debug_assert!((0f64..=1f64).contains(&threshold));

        self.product_threshold = threshold;
    }

    /// Largest absolute value.
    pub fn max_abs(&self) -> F {
        self.fold_values(F::zero(), |max, v| max.max(v.abs()))
    }

    /// Squared euclidean norm.
    pub fn length2(&self) -> F {
        self.fold_values(F::zero(), |total, v| total + v * v)
    }

    /// Euclidean norm.
    pub fn length(&self) -> F {
        self.length2().sqrt()
    }

    fn fold_values(&self, init: F, f: impl Fn(F, F) -> F) -> F {
        if self.setup {
            self.idx.iter().fold(init, |acc, &i| f(acc, self.val[i]))
        } else {
            self.val.iter().fold(init, |acc, &v| f(acc, v))
        }
    }

    /// Record index `i` in the overlay if it is not there yet. Only used while set up.
    fn touch(&mut self, i: usize) {
        if !self.marked[i] {
            self.marked[i] = true;
            self.idx.push(i);
        }
    }

    /// Add `x` times a dense vector.
    ///
    /// The result is not set up.
    pub fn mult_add_dense(&mut self, x: F, other: &DenseVector<F>) {
        debug_assert_eq!(other.len(), self.dim());

        for (v, &w) in self.val.iter_mut().zip(other.data.iter()) {
            *v = *v + x * w;
        }
        self.un_setup();
    }

    /// Add `x` times a sparse vector.
    ///
    /// Touches only the nonzeros of `other`; the setup status is kept.
    pub fn mult_add_sparse(&mut self, x: F, other: &SparseVector<F>) {
        debug_assert_eq!(other.len(), self.dim());

        self.mult_add_tuples(x, other.iter().copied());
    }

    /// Add `x` times another semi-sparse vector.
    ///
    /// If `other` is set up, only its nonzeros are visited and the setup status of this vector is
    /// kept; otherwise the addition is dense and this vector is no longer set up.
    pub fn mult_add_semi_sparse(&mut self, x: F, other: &SemiSparse<F>) {
        debug_assert_eq!(other.dim(), self.dim());

        if other.setup {
            self.mult_add_tuples(x, other.idx.iter().map(|&i| (i, other.val[i])));
        } else {
            for (v, &w) in self.val.iter_mut().zip(other.val.iter()) {
                *v = *v + x * w;
            }
            self.un_setup();
        }
    }

    fn mult_add_tuples(&mut self, x: F, tuples: impl Iterator<Item = SparseTuple<F>>) {
        for (i, w) in tuples {
            self.val[i] = self.val[i] + x * w;
            if self.setup {
                self.touch(i);
            }
        }
    }

    /// Become a copy of a sparse vector. The result is set up.
    pub fn assign_sparse(&mut self, other: &SparseVector<F>) {
        debug_assert_eq!(other.len(), self.dim());

        self.clear();
        for &(i, v) in other.iter() {
            if v.is_not_zero_with(self.epsilon) {
                self.add(i, v);
            }
        }
    }

    /// Become a copy of a dense vector. The result is not set up.
    pub fn assign_dense(&mut self, other: &DenseVector<F>) {
        debug_assert_eq!(other.len(), self.dim());

        self.val.copy_from_slice(&other.data);
        self.un_setup();
    }

    /// Inner product with a dense vector.
    pub fn inner_product_dense(&self, other: &DenseVector<F>) -> F {
        debug_assert_eq!(other.len(), self.dim());

        if self.setup {
            self.idx.iter().fold(F::zero(), |total, &i| total + self.val[i] * other[i])
        } else {
            self.val.iter().zip(&other.data).fold(F::zero(), |total, (&a, &b)| total + a * b)
        }
    }

    /// Whether the operand should be treated as dense in a product.
    fn use_gather(&self, x: &SemiSparse<F>) -> bool {
        !x.setup || x.idx.len() as f64 > self.product_threshold * x.dim() as f64
    }

    /// Compute `xᵀ A` into this vector.
    ///
    /// # Arguments
    ///
    /// * `x`: Vector with dimension equal to the number of rows of `a`.
    /// * `a`: Matrix with as many columns as this vector has dimensions.
    ///
    /// The result is set up if the sparse strategy was used, and not set up otherwise.
    pub fn assign_vector_matrix(&mut self, x: &SemiSparse<F>, a: &SparseMatrix<F>) {
        self.vector_matrix(x, a, false);
    }

    /// Compute `xᵀ A` into this vector and set it up.
    pub fn assign_vector_matrix_and_setup(&mut self, x: &SemiSparse<F>, a: &SparseMatrix<F>) {
        self.vector_matrix(x, a, true);
    }

    fn vector_matrix(&mut self, x: &SemiSparse<F>, a: &SparseMatrix<F>, and_setup: bool) {
        debug_assert_eq!(x.dim(), a.nr_rows());
        debug_assert_eq!(self.dim(), a.nr_columns());

        if self.use_gather(x) {
            self.gather(and_setup, |j| a.column(j).fold(F::zero(), |total, &(i, v)| total + x.val[i] * v));
        } else {
            self.scatter(x, |i| a.row(i), and_setup);
        }
    }

    /// Compute `A x` into this vector.
    ///
    /// # Arguments
    ///
    /// * `a`: Matrix with as many rows as this vector has dimensions.
    /// * `x`: Vector with dimension equal to the number of columns of `a`.
    ///
    /// The result is set up if the sparse strategy was used, and not set up otherwise.
    pub fn assign_matrix_vector(&mut self, a: &SparseMatrix<F>, x: &SemiSparse<F>) {
        self.matrix_vector(a, x, false);
    }

    /// Compute `A x` into this vector and set it up.
    pub fn assign_matrix_vector_and_setup(&mut self, a: &SparseMatrix<F>, x: &SemiSparse<F>) {
        self.matrix_vector(a, x, true);
    }

    fn matrix_vector(&mut self, a: &SparseMatrix<F>, x: &SemiSparse<F>, and_setup: bool) {
        debug_assert_eq!(x.dim(), a.nr_columns());
        debug_assert_eq!(self.dim(), a.nr_rows());

        if self.use_gather(x) {
            self.gather(and_setup, |i| a.row(i).fold(F::zero(), |total, &(j, v)| total + v * x.val[j]));
        } else {
            self.scatter(x, |j| a.column(j), and_setup);
        }
    }

    /// Dense accumulation: every component is an inner product.
    fn gather(&mut self, and_setup: bool, component: impl Fn(usize) -> F) {
        if and_setup {
            self.idx.clear();
            for i in 0..self.dim() {
                let value = component(i);
                if value.is_not_zero_with(self.epsilon) {
                    self.val[i] = value;
                    self.idx.push(i);
                    self.marked[i] = true;
                } else {
                    self.val[i] = F::zero();
                    self.marked[i] = false;
                }
            }
            self.setup = true;
        } else {
            for i in 0..self.dim() {
                self.val[i] = component(i);
            }
            self.setup = false;
        }
    }

    /// Sparse merge: the lines of the matrix matching the nonzeros of `x` are accumulated.
    fn scatter<'a, I>(&mut self, x: &SemiSparse<F>, line: impl Fn(usize) -> I, and_setup: bool)
    where
        I: Iterator<Item = &'a SparseTuple<F>>,
        F: 'a,
    {
        self.clear();
        for &i in &x.idx {
            let factor = x.val[i];
            for &(j, v) in line(i) {
                self.val[j] = self.val[j] + factor * v;
                self.touch(j);
            }
        }

        if and_setup {
            // Compact: drop cancelled entries.
            let mut n = 0;
            while n < self.idx.len() {
                if self.val[self.idx[n]].is_not_zero_with(self.epsilon) {
                    n += 1;
                } else {
                    self.clear_position(n);
                }
            }
        }
    }

    /// Sparse copy of the nonzeros, sorted by index. Sets the vector up.
    pub fn to_sparse(&mut self) -> SparseVector<F> {
        self.setup();

        let mut tuples = self.idx.iter()
            .map(|&i| (i, self.val[i]))
            .filter(|&(_, v)| v.is_not_zero_with(self.epsilon))
            .collect::<Vec<_>>();
        tuples.sort_unstable_by_key(|&(i, _)| i);

        SparseVector::new(tuples, self.dim())
    }

    /// Dense copy of the values.
    pub fn to_dense(&self) -> DenseVector<F> {
        DenseVector::new(self.val.clone(), self.dim())
    }
}

impl<F: Element> AddAssign<&DenseVector<F>> for SemiSparse<F> {
    fn add_assign(&mut self, rhs: &DenseVector<F>) {
        self.mult_add_dense(F::one(), rhs);
    }
}

impl<F: Element> SubAssign<&DenseVector<F>> for SemiSparse<F> {
    fn sub_assign(&mut self, rhs: &DenseVector<F>) {
        self.mult_add_dense(-F::one(), rhs);
    }
}

impl<F: Element> AddAssign<&SparseVector<F>> for SemiSparse<F> {
    fn add_assign(&mut self, rhs: &SparseVector<F>) {
        self.mult_add_sparse(F::one(), rhs);
    }
}

impl<F: Element> SubAssign<&SparseVector<F>> for SemiSparse<F> {
    fn sub_assign(&mut self, rhs: &SparseVector<F>) {
        self.mult_add_sparse(-F::one(), rhs);
    }
}

impl<F: Element> AddAssign<&SemiSparse<F>> for SemiSparse<F> {
    fn add_assign(&mut self, rhs: &SemiSparse<F>) {
        self.mult_add_semi_sparse(F::one(), rhs);
    }
}

impl<F: Element> SubAssign<&SemiSparse<F>> for SemiSparse<F> {
    fn sub_assign(&mut self, rhs: &SemiSparse<F>) {
        self.mult_add_semi_sparse(-F::one(), rhs);
    }
}

impl<F: Element> MulAssign<F> for SemiSparse<F> {
    fn mul_assign(&mut self, rhs: F) {
        if rhs.is_zero() {
            self.clear();
        } else if self.setup {
            for &i in &self.idx {
                self.val[i] = self.val[i] * rhs;
            }
        } else {
            self.val.iter_mut().for_each(|v| *v = *v * rhs);
        }
    }
}

impl<F: Element> Display for SemiSparse<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.setup {
            write!(f, "{{")?;
            for (n, &i) in self.idx.iter().enumerate() {
                if n > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", i, self.val[i])?;
            }
            write!(f, "}} (dim {})", self.dim())
        } else {
            write!(f, "[")?;
            for (i, v) in self.val.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", v)?;
            }
            write!(f, "] (not set up)")
        }
    }
}
