//! # Sparse matrix
//!
//! A matrix that is stored twice: once column-major and once row-major. Products with a vector
//! from the left and from the right can then both be computed either by gathering over the
//! inner products or by scattering the nonzeros of the vector.
use std::fmt;
use std::fmt::Display;
use std::slice::Iter;

use crate::data::linear_algebra::{SparseTuple, SparseTupleVec};
use crate::data::linear_algebra::traits::Element;

/// Uses two indices as underlying data structures: a column-major `Vec<Vec<(usize, F)>>` as well as
/// a row-major `Vec<Vec<(usize, F)>>`. Indices start at `0`.
///
/// The matrix is immutable after creation, such that both copies always agree.
#[derive(PartialEq, Clone, Debug)]
pub struct SparseMatrix<F> {
    columns: Vec<SparseTupleVec<F>>,
    rows: Vec<SparseTupleVec<F>>,
    nr_rows: usize,
}

impl<F: Element> SparseMatrix<F> {
    /// Create a new instance from column-major data.
    ///
    /// # Arguments
    ///
    /// * `columns`: For each column, the `(row, value)` tuples sorted by row index. Values should
    /// not be zero.
    /// * `nr_rows`: Number of rows in the matrix, all row indices should be smaller.
    ///
    /// # Return value
    ///
    /// A matrix with the row-major copy constructed from the column-major data.
    pub fn from_column_major(columns: Vec<SparseTupleVec<F>>, nr_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|column| column.windows(2).all(|w| w[0].0 < w[1].0)));
        debug_assert!(columns.iter().all(|column| column.iter().all(|&(i, _)| i < nr_rows)));
        debug_assert!(columns.iter().all(|column| column.iter().all(|(_, v)| !v.is_zero())));

        let mut rows = vec![Vec::new(); nr_rows];
        for (j, column) in columns.iter().enumerate() {
            for &(i, value) in column {
                rows[i].push((j, value));
            }
        }

        Self { columns, rows, nr_rows, }
    }

    /// Create a new instance from row-major dense data, dropping exact zeros.
    ///
    /// All rows should have the same length.
    pub fn from_dense(data: Vec<Vec<F>>) -> Self {
        let nr_rows = data.len();
        let nr_columns = data.first().map_or(0, Vec::len);
        debug_assert!(data.iter().all(|row| row.len() == nr_columns));

        let mut columns = vec![Vec::new(); nr_columns];
        for (i, row) in data.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                if !value.is_zero() {
                    columns[j].push((i, value));
                }
            }
        }

        Self::from_column_major(columns, nr_rows)
    }

    /// Create a square identity matrix.
    pub fn identity(len: usize) -> Self {
        Self::from_column_major((0..len).map(|i| vec![(i, F::one())]).collect(), len)
    }

    /// Get the value at coordinate (`i`, `j`).
    pub fn get_value(&self, i: usize, j: usize) -> F {
        debug_assert!(i < self.nr_rows);
        debug_assert!(j < self.nr_columns());

        match self.columns[j].binary_search_by_key(&i, |&(row, _)| row) {
            Ok(index) => self.columns[j][index].1,
            Err(_) => F::zero(),
        }
    }
}

impl<F> SparseMatrix<F> {
    /// Get all (`row`, `value`) tuples of column `j`.
    pub fn column(&self, j: usize) -> Iter<'_, SparseTuple<F>> {
        debug_assert!(j < self.columns.len());

        self.columns[j].iter()
    }

    /// Get all (`column`, `value`) tuples of row `i`.
    pub fn row(&self, i: usize) -> Iter<'_, SparseTuple<F>> {
        debug_assert!(i < self.nr_rows);

        self.rows[i].iter()
    }

    /// Get the number of rows in this matrix.
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Get the number of columns in this matrix.
    pub fn nr_columns(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of nonzero values in this matrix.
    pub fn size(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

impl<F: Element> Display for SparseMatrix<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for i in 0..self.nr_rows {
            for j in 0..self.nr_columns() {
                if j > 0 {
                    write!(f, "\t")?;
                }
                write!(f, "{}", self.get_value(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::matrix::SparseMatrix;

    fn matrix() -> SparseMatrix<f64> {
        SparseMatrix::from_dense(vec![
            vec![1f64, 0f64, 2f64],
            vec![0f64, 0f64, 3f64],
        ])
    }

    #[test]
    fn dimensions() {
        let m = matrix();
        assert_eq!(m.nr_rows(), 2);
        assert_eq!(m.nr_columns(), 3);
        assert_eq!(m.size(), 3);
    }

    #[test]
    fn get_value() {
        let m = matrix();
        assert_eq!(m.get_value(0, 0), 1f64);
        assert_eq!(m.get_value(1, 0), 0f64);
        assert_eq!(m.get_value(1, 2), 3f64);
    }

    #[test]
    fn row_column_agree() {
        let m = matrix();
        assert_eq!(m.row(0).copied().collect::<Vec<_>>(), vec![(0, 1f64), (2, 2f64)]);
        assert_eq!(m.column(2).copied().collect::<Vec<_>>(), vec![(0, 2f64), (1, 3f64)]);
        assert_eq!(m.column(1).count(), 0);
    }

    #[test]
    fn identity() {
        let m = SparseMatrix::<f64>::identity(3);
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(m.get_value(i, j), if i == j { 1f64 } else { 0f64 });
            }
        }
    }
}
