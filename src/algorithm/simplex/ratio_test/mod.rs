//! # Ratio tests
//!
//! Given the direction in which a set of variables moves, find how far one can move before a
//! variable hits one of its bounds, and which variable that is.
//!
//! A variable `i` moves as `values[i] + t * sign * update[i]` for a step `t >= 0`, where the sign is
//! determined by the `Direction`. The leaving variable of a primal pivot is found with
//! `select_leave`; `select_enter` does the same for two vectors at once (a vector and its
//! co-vector, as in the dual ratio test of the row and column representation).
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::{DenseVector, SemiSparse, Vector};

pub mod harris;
pub mod textbook;

/// Orientation of the step along the update vector.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Direction {
    /// Move along the update vector.
    Increase,
    /// Move against the update vector.
    Decrease,
}

impl Direction {
    fn sign<F: Element>(self) -> F {
        match self {
            Direction::Increase => F::one(),
            Direction::Decrease => -F::one(),
        }
    }
}

/// Current values of a set of variables together with their bounds.
///
/// Bounds may be infinite.
#[derive(Clone, Debug, PartialEq)]
pub struct Boxed<F> {
    /// Current values.
    pub values: DenseVector<F>,
    /// Lower bounds.
    pub lower: DenseVector<F>,
    /// Upper bounds.
    pub upper: DenseVector<F>,
}

impl<F: Element> Boxed<F> {
    /// Bundle values and bounds of the same length.
    pub fn new(values: Vec<F>, lower: Vec<F>, upper: Vec<F>) -> Self {
        let len = values.len();
        debug_assert_eq!(lower.len(), len);
        debug_assert_eq!(upper.len(), len);

        Self {
            values: DenseVector::new(values, len),
            lower: DenseVector::new(lower, len),
            upper: DenseVector::new(upper, len),
        }
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no variables.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Room between the value of `i` and the bound it approaches when moving with rate `rate`.
    ///
    /// Negative if the value already violates that bound. `None` if the bound is infinite.
    fn slack(&self, i: usize, rate: F) -> Option<F> {
        let bound = if rate > F::zero() { self.upper[i] } else { self.lower[i] };
        if bound.is_infinite() {
            None
        } else {
            Some(bound - self.values[i])
        }
    }
}

/// Which of the two vectors of `select_enter` the selection belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    /// The first vector.
    Vector,
    /// The second vector, the co-vector.
    CoVector,
}

/// A selected variable.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Selection<F> {
    /// Index of the variable that hits its bound.
    pub index: usize,
    /// Step length, nonnegative.
    pub step: F,
    /// Component of the update vector at the index, the pivot element.
    pub pivot: F,
}

/// Select the variable that limits a step.
pub trait RatioTest<F: Element> {
    /// Select the leaving variable.
    ///
    /// # Arguments
    ///
    /// * `update`: Rate of change of each variable.
    /// * `boxed`: Values and bounds of the variables. Implementations may shift bounds.
    /// * `direction`: Whether to move along or against the update.
    ///
    /// # Return value
    ///
    /// The selected variable, or `None` if the step is unbounded.
    fn select_leave(
        &mut self,
        update: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<Selection<F>>;

    /// Select the entering variable among two sets of variables.
    ///
    /// # Arguments
    ///
    /// * `vector`, `co_vector`: Rates of change of the two sets.
    /// * `boxed`, `co_boxed`: Values and bounds of the two sets.
    /// * `direction`: Whether to move along or against the updates.
    ///
    /// # Return value
    ///
    /// The set and the selected variable in it, or `None` if the step is unbounded.
    fn select_enter(
        &mut self,
        vector: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        co_vector: &SemiSparse<F>,
        co_boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<(Side, Selection<F>)>;
}

/// Nonzero components of a semi-sparse vector, in the order of the overlay if it is set up.
fn nonzeros<F: Element>(vector: &SemiSparse<F>) -> Vec<(usize, F)> {
    if vector.is_setup() {
        vector.indices().iter().map(|&i| (i, vector.get(i))).collect()
    } else {
        vector.values().iter().copied().enumerate().filter(|(_, v)| !v.is_zero()).collect()
    }
}
