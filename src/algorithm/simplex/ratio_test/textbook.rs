//! # Textbook ratio test
//!
//! The minimum ratio over all variables, without tolerances. Ties are broken by the lowest index,
//! which is Bland's rule for the leaving variable.
use crate::algorithm::simplex::ratio_test::{Boxed, Direction, nonzeros, RatioTest, Selection, Side};
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::SemiSparse;

/// Single pass minimum ratio test.
#[derive(Copy, Clone, Debug, Default)]
pub struct Textbook;

impl Textbook {
    fn minimum<F: Element>(
        nonzeros: &[(usize, F)],
        boxed: &Boxed<F>,
        sign: F,
    ) -> Option<Selection<F>> {
        let mut best: Option<Selection<F>> = None;

        for &(index, value) in nonzeros {
            let rate = sign * value;
            if rate.is_zero() {
                continue;
            }

            if let Some(slack) = boxed.slack(index, rate) {
                let step = (slack / rate).max(F::zero());
                let better = match &best {
                    None => true,
                    Some(b) => step < b.step || (step == b.step && index < b.index),
                };
                if better {
                    best = Some(Selection { index, step, pivot: value, });
                }
            }
        }

        best
    }
}

impl<F: Element> RatioTest<F> for Textbook {
    fn select_leave(
        &mut self,
        update: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<Selection<F>> {
        Self::minimum(&nonzeros(update), boxed, direction.sign())
    }

    fn select_enter(
        &mut self,
        vector: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        co_vector: &SemiSparse<F>,
        co_boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<(Side, Selection<F>)> {
        let sign = direction.sign();
        let first = Self::minimum(&nonzeros(vector), boxed, sign);
        let second = Self::minimum(&nonzeros(co_vector), co_boxed, sign);

        match (first, second) {
            (Some(first), Some(second)) if second.step < first.step => Some((Side::CoVector, second)),
            (Some(first), _) => Some((Side::Vector, first)),
            (None, Some(second)) => Some((Side::CoVector, second)),
            (None, None) => None,
        }
    }
}
