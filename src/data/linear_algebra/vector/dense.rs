//! # Dense vector
//!
//! Wrapping a `Vec` such that it has a fixed size and can interact with sparse vectors.
use std::fmt;
use std::fmt::Display;
use std::ops::{Index, IndexMut};

use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::Vector;

/// Uses a `Vec` as underlying data a structure. Length is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense<F> {
    #[allow(missing_docs)]
    pub data: Vec<F>,
}

impl<F> Index<usize> for Dense<F> {
    type Output = F;

    fn index(&self, index: usize) -> &Self::Output {
        debug_assert!(index < self.data.len());

        &self.data[index]
    }
}

impl<F> IndexMut<usize> for Dense<F> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        debug_assert!(index < self.data.len());

        &mut self.data[index]
    }
}

impl<F: Element> Vector<F> for Dense<F> {
    type Inner = F;

    /// Create a `DenseVector` from the provided data.
    fn new(data: Vec<Self::Inner>, len: usize) -> Self {
        debug_assert_eq!(data.len(), len);

        Self { data, }
    }

    fn sparse_inner_product<'a, I>(&self, column: I) -> F
    where
        I: IntoIterator<Item = &'a SparseTuple<F>>,
        F: 'a,
    {
        let mut total = F::zero();
        for &(i, v) in column {
            total = total + self.data[i] * v;
        }

        total
    }

    /// Set the value at index `i` to `value`.
    fn set(&mut self, i: usize, value: F) {
        debug_assert!(i < self.len());

        self.data[i] = value;
    }

    fn get(&self, i: usize) -> Option<&F> {
        debug_assert!(i < self.len());

        Some(&self.data[i])
    }

    /// The length of this vector.
    fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this vector is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The size of this vector in memory.
    fn size(&self) -> usize {
        self.data.len()
    }
}

impl<F: Display> Display for Dense<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for value in &self.data {
            writeln!(f, "{}", value)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::vector::{DenseVector, Vector};
    use crate::data::linear_algebra::vector::test::{get_set, len, TestVector};

    type T = f64;

    #[test]
    fn test_get_set() {
        get_set::<DenseVector<T>>();
    }

    #[test]
    fn test_len() {
        len::<DenseVector<T>>();
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_set() {
        let mut v = DenseVector::<T>::from_test_data(vec![1, 2]);
        v.set(2, 1f64);
    }

    #[test]
    fn sparse_inner_product() {
        let v = DenseVector::<T>::from_test_data(vec![1, 2, 3]);
        let column = vec![(0, 2f64), (2, -1f64)];
        assert_eq!(v.sparse_inner_product(&column), -1f64);
        assert_eq!(v.sparse_inner_product(&Vec::<(usize, T)>::new()), 0f64);
    }
}
