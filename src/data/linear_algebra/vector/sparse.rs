//! # Sparse vector
//!
//! Wrapping a `Vec<(usize, _)>`, fixed size.
use std::fmt;
use std::fmt::Display;
use std::slice::Iter;

use crate::data::linear_algebra::{SparseTuple, SparseTupleVec};
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::Vector;

/// A sparse vector using a `Vec` with (row, value) combinations as back-end. Indices start at
/// `0`.
///
/// Tuples are sorted by index and no explicit zeros are stored.
#[derive(PartialEq, Clone, Debug)]
pub struct Sparse<F> {
    data: SparseTupleVec<F>,
    len: usize,
}

impl<F> Sparse<F> {
    fn get_data_index(&self, i: usize) -> Result<usize, usize> {
        self.data.binary_search_by_key(&i, |&(index, _)| index)
    }

    fn set_zero(&mut self, i: usize) {
        if let Ok(index) = self.get_data_index(i) {
            self.data.remove(index);
        }
    }

    /// Iterate over the stored `(index, value)` tuples in increasing index order.
    pub fn iter(&self) -> Iter<'_, SparseTuple<F>> {
        self.data.iter()
    }
}

impl<F: Element> Vector<F> for Sparse<F> {
    type Inner = SparseTuple<F>;

    /// Create a vector of length `len` from `data`.
    ///
    /// Requires that values equal to zero are already filtered.
    fn new(data: Vec<Self::Inner>, len: usize) -> Self {
        debug_assert!(data.iter().all(|&(i, _)| i < len));
        debug_assert!(data.windows(2).all(|w| w[0].0 < w[1].0));
        debug_assert!(data.iter().all(|(_, v)| !v.is_zero()));

        Self { data, len, }
    }

    fn sparse_inner_product<'a, I>(&self, column: I) -> F
    where
        I: IntoIterator<Item = &'a SparseTuple<F>>,
        F: 'a,
    {
        let mut total = F::zero();
        let mut own = self.data.iter().peekable();
        for &(i, v) in column {
            while own.peek().is_some_and(|&&(j, _)| j < i) {
                own.next();
            }
            if let Some(&&(j, w)) = own.peek() {
                if j == i {
                    total = total + v * w;
                }
            }
        }

        total
    }

    /// Set the value at index `i` to `value`.
    ///
    /// # Arguments
    ///
    /// * `i`: Index of the value. New tuple will be inserted, potentially causing many values to
    /// be shifted.
    /// * `value`: Value to be taken at index `i`. A zero value removes the tuple.
    fn set(&mut self, i: usize, value: F) {
        debug_assert!(i < self.len);

        if value.is_zero() {
            self.set_zero(i);
        } else {
            match self.get_data_index(i) {
                Ok(index) => self.data[index].1 = value,
                Err(index) => self.data.insert(index, (i, value)),
            }
        }
    }

    fn get(&self, index: usize) -> Option<&F> {
        debug_assert!(index < self.len);

        self.get_data_index(index).ok().map(|i| &self.data[i].1)
    }

    /// The length of this vector.
    fn len(&self) -> usize {
        self.len
    }

    /// Whether this vector has zero size.
    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The size of this vector in memory.
    fn size(&self) -> usize {
        self.data.len()
    }
}

impl<F: Display> Display for Sparse<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[")?;
        for (index, (i, v)) in self.data.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", i, v)?;
        }
        write!(f, "] (len {})", self.len)
    }
}
