//! # Basis descriptor
//!
//! Status of every row and every column of a linear program with respect to a simplex basis.
//!
//! In the column representation, the basis consists of columns (structural and slack variables)
//! and a variable is basic if it carries a dual status. In the row representation, the basis
//! consists of rows (constraints and bounds) and a variable is basic if it carries a primal status.
//! Which of the two status arrays plays the role of the "status" and which the "co-status" is
//! decided by the representation; switching representation never moves the arrays themselves.
use std::fmt;

use enum_map::{enum_map, Enum, EnumMap};

/// Status of a row or column.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// Nonbasic at its lower bound.
    PrimalOnLower,
    /// Nonbasic at its upper bound.
    PrimalOnUpper,
    /// Nonbasic and free, at value zero.
    PrimalFree,
    /// Nonbasic with equal lower and upper bound.
    PrimalFixed,
    /// Basic and free.
    DualFree,
    /// Basic, the dual value is bounded from above.
    DualOnUpper,
    /// Basic, the dual value is bounded from below.
    DualOnLower,
    /// Basic with a dual value bounded from both sides.
    DualOnBoth,
    /// Basic with an unknown dual status.
    DualUndefined,
}

impl Status {
    /// Whether this is one of the primal statuses.
    pub fn is_primal(self) -> bool {
        matches!(
            self,
            Status::PrimalOnLower | Status::PrimalOnUpper | Status::PrimalFree | Status::PrimalFixed,
        )
    }

    /// Whether this is one of the dual statuses.
    pub fn is_dual(self) -> bool {
        !self.is_primal()
    }

    /// Whether a row or column with this status is in the basis of a representation.
    pub fn is_basic(self, representation: Representation) -> bool {
        match representation {
            Representation::Column => self.is_dual(),
            Representation::Row => self.is_primal(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Status::PrimalOnLower => "P_ON_LOWER",
            Status::PrimalOnUpper => "P_ON_UPPER",
            Status::PrimalFree => "P_FREE",
            Status::PrimalFixed => "P_FIXED",
            Status::DualFree => "D_FREE",
            Status::DualOnUpper => "D_ON_UPPER",
            Status::DualOnLower => "D_ON_LOWER",
            Status::DualOnBoth => "D_ON_BOTH",
            Status::DualUndefined => "D_UNDEFINED",
        };
        f.write_str(code)
    }
}

/// Whether the basis is made of columns or of rows.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Representation {
    /// The basis matrix consists of rows.
    Row,
    /// The basis matrix consists of columns.
    Column,
}

/// The two status arrays.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Dimension {
    #[allow(missing_docs)]
    Row,
    #[allow(missing_docs)]
    Column,
}

/// Status of all rows and columns.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Desc {
    statuses: EnumMap<Dimension, Vec<Status>>,
}

impl Desc {
    /// Create the slack basis: all rows basic, all columns on their lower bound.
    pub fn new(nr_rows: usize, nr_columns: usize) -> Self {
        Self {
            statuses: enum_map! {
                Dimension::Row => vec![Status::DualFree; nr_rows],
                Dimension::Column => vec![Status::PrimalOnLower; nr_columns],
            },
        }
    }

    /// Array that holds the status in the given representation.
    ///
    /// The row statuses in the row representation, the column statuses in the column
    /// representation.
    pub fn status(&self, representation: Representation) -> &[Status] {
        &self.statuses[Self::active(representation)]
    }

    /// Mutable version of `status`.
    pub fn status_mut(&mut self, representation: Representation) -> &mut Vec<Status> {
        &mut self.statuses[Self::active(representation)]
    }

    /// Array that holds the co-status in the given representation.
    pub fn co_status(&self, representation: Representation) -> &[Status] {
        &self.statuses[Self::inactive(representation)]
    }

    /// Mutable version of `co_status`.
    pub fn co_status_mut(&mut self, representation: Representation) -> &mut Vec<Status> {
        &mut self.statuses[Self::inactive(representation)]
    }

    fn active(representation: Representation) -> Dimension {
        match representation {
            Representation::Row => Dimension::Row,
            Representation::Column => Dimension::Column,
        }
    }

    fn inactive(representation: Representation) -> Dimension {
        match representation {
            Representation::Row => Dimension::Column,
            Representation::Column => Dimension::Row,
        }
    }

    /// Number of rows described.
    pub fn nr_rows(&self) -> usize {
        self.statuses[Dimension::Row].len()
    }

    /// Number of columns described.
    pub fn nr_columns(&self) -> usize {
        self.statuses[Dimension::Column].len()
    }

    /// Status of row `i`.
    pub fn row_status(&self, i: usize) -> Status {
        self.statuses[Dimension::Row][i]
    }

    /// Status of column `j`.
    pub fn column_status(&self, j: usize) -> Status {
        self.statuses[Dimension::Column][j]
    }

    /// Mutable status of row `i`.
    pub fn row_status_mut(&mut self, i: usize) -> &mut Status {
        &mut self.statuses[Dimension::Row][i]
    }

    /// Mutable status of column `j`.
    pub fn column_status_mut(&mut self, j: usize) -> &mut Status {
        &mut self.statuses[Dimension::Column][j]
    }

    /// Change the number of rows and columns.
    ///
    /// Existing statuses are kept, new rows are basic and new columns are on their lower bound.
    pub fn resize(&mut self, nr_rows: usize, nr_columns: usize) {
        self.statuses[Dimension::Row].resize(nr_rows, Status::DualFree);
        self.statuses[Dimension::Column].resize(nr_columns, Status::PrimalOnLower);
    }

    /// Number of basic rows and columns in a representation.
    pub fn nr_basic(&self, representation: Representation) -> usize {
        self.statuses.values()
            .flat_map(|statuses| statuses.iter())
            .filter(|status| status.is_basic(representation))
            .count()
    }

    /// Whether the descriptor describes a basis of the right size.
    ///
    /// In the column representation there is a basic variable for each row, in the row
    /// representation one for each column. As every status is either primal or dual, a
    /// descriptor is consistent in both representations or in neither.
    pub fn is_consistent(&self, representation: Representation) -> bool {
        let expected = match representation {
            Representation::Column => self.nr_rows(),
            Representation::Row => self.nr_columns(),
        };

        self.nr_basic(representation) == expected
    }
}

impl fmt::Display for Desc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rows:")?;
        for (i, status) in self.statuses[Dimension::Row].iter().enumerate() {
            writeln!(f, "\t{}: {}", i, status)?;
        }
        writeln!(f, "columns:")?;
        for (j, status) in self.statuses[Dimension::Column].iter().enumerate() {
            writeln!(f, "\t{}: {}", j, status)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::algorithm::simplex::basis::{Desc, Representation, Status};

    #[test]
    fn slack_basis() {
        let desc = Desc::new(2, 3);
        assert_eq!(desc.nr_basic(Representation::Column), 2);
        assert!(desc.is_consistent(Representation::Column));
        // The same statuses in the row representation: the columns on their bounds are basic.
        assert_eq!(desc.nr_basic(Representation::Row), 3);
        assert!(desc.is_consistent(Representation::Row));
    }

    #[test]
    fn representations_agree() {
        let mut desc = Desc::new(3, 2);
        for (row, column) in [(0, 0), (2, 1)] {
            *desc.row_status_mut(row) = Status::PrimalOnLower;
            *desc.column_status_mut(column) = Status::DualOnLower;
            assert!(desc.is_consistent(Representation::Column));
            assert!(desc.is_consistent(Representation::Row));
        }
        assert_eq!(desc.nr_basic(Representation::Row), 2);

        *desc.row_status_mut(1) = Status::PrimalFixed;
        assert!(!desc.is_consistent(Representation::Column));
        assert!(!desc.is_consistent(Representation::Row));
    }

    #[test]
    fn representation_selects_arrays() {
        let mut desc = Desc::new(1, 2);
        assert_eq!(desc.status(Representation::Row), &[Status::DualFree]);
        assert_eq!(desc.co_status(Representation::Row), &[Status::PrimalOnLower; 2]);
        assert_eq!(desc.status(Representation::Column), desc.co_status(Representation::Row));

        desc.status_mut(Representation::Column)[1] = Status::PrimalOnUpper;
        assert_eq!(desc.column_status(1), Status::PrimalOnUpper);
        desc.co_status_mut(Representation::Column)[0] = Status::PrimalFixed;
        assert_eq!(desc.row_status(0), Status::PrimalFixed);
    }

    #[test]
    fn pivot_keeps_consistency() {
        let mut desc = Desc::new(2, 2);
        *desc.row_status_mut(0) = Status::PrimalOnUpper;
        assert!(!desc.is_consistent(Representation::Column));
        *desc.column_status_mut(1) = Status::DualOnBoth;
        assert!(desc.is_consistent(Representation::Column));
    }

    #[test]
    fn resize() {
        let mut desc = Desc::new(1, 1);
        *desc.column_status_mut(0) = Status::PrimalFree;
        desc.resize(2, 3);
        assert_eq!(desc.nr_rows(), 2);
        assert_eq!(desc.column_status(0), Status::PrimalFree);
        assert_eq!(desc.column_status(2), Status::PrimalOnLower);
        assert!(desc.is_consistent(Representation::Column));
    }

    #[test]
    fn display() {
        let desc = Desc::new(1, 1);
        assert_eq!(desc.to_string(), "rows:\n\t0: D_FREE\ncolumns:\n\t0: P_ON_LOWER\n");
    }
}
