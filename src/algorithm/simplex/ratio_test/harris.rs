//! # Harris ratio test
//!
//! Two passes over the candidates. The first pass computes the largest step that keeps every
//! variable within its bounds relaxed by `delta`. The second pass considers only the variables
//! that hit their (exact) bound within that relaxed step, and takes the one with the largest
//! update component. Large pivot elements keep the basis well conditioned, and the freedom gained
//! from the relaxation avoids being forced to pick tiny pivots.
//!
//! When the selected variable already violates its bound (by less than `delta`), the step is set
//! to zero and the bound is shifted onto the current value.
use log::{debug, trace};

use crate::algorithm::simplex::ratio_test::{Boxed, Direction, nonzeros, RatioTest, Selection, Side};
use crate::data::linear_algebra::traits::Element;
use crate::data::linear_algebra::vector::SemiSparse;

/// Tolerances of the Harris ratio test.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HarrisSettings<F> {
    /// Allowed violation of a bound.
    pub delta: F,
    /// Update components at or below this magnitude are ignored.
    pub epsilon: F,
    /// Pivots smaller than this fraction of the largest update component are avoided.
    pub minimum_stability: F,
}

impl Default for HarrisSettings<f64> {
    fn default() -> Self {
        Self {
            delta: 1e-6,
            epsilon: 1e-12,
            minimum_stability: 1e-4,
        }
    }
}

/// Harris ratio test with bound shifting.
#[derive(Clone, Debug)]
pub struct Harris<F> {
    settings: HarrisSettings<F>,
    total_shift: F,
}

struct Candidate<F> {
    set: usize,
    index: usize,
    rate: F,
    ratio: F,
}

impl<F: Element> Harris<F> {
    /// Create a new instance.
    pub fn new(settings: HarrisSettings<F>) -> Self {
        debug_assert!(settings.delta >= F::zero());
        debug_assert!(settings.epsilon >= F::zero());

        Self { settings, total_shift: F::zero(), }
    }

    /// Sum of all bound shifts made so far.
    pub fn total_shift(&self) -> F {
        self.total_shift
    }

    /// Forget the accumulated shift, for example after the bounds were restored.
    pub fn reset_shift(&mut self) {
        self.total_shift = F::zero();
    }

    /// First pass: the largest step that respects the relaxed bounds.
    fn max_delta(&self, sets: &[(Vec<(usize, F)>, &mut Boxed<F>)], sign: F) -> (F, F) {
        let mut max = F::infinity();
        let mut max_abs = F::zero();

        for (nonzeros, boxed) in sets {
            for &(i, value) in nonzeros {
                let rate = sign * value;
                if rate.abs() <= self.settings.epsilon {
                    continue;
                }
                max_abs = max_abs.max(rate.abs());

                if let Some(slack) = boxed.slack(i, rate) {
                    let relaxed = slack / rate + self.settings.delta / rate.abs();
                    max = max.min(relaxed);
                }
            }
        }

        (max, max_abs)
    }

    /// Second pass: among the variables within the relaxed step, the largest rate.
    fn most_stable(
        &self,
        sets: &[(Vec<(usize, F)>, &mut Boxed<F>)],
        sign: F,
        max: F,
        threshold: F,
    ) -> Option<Candidate<F>> {
        let mut best: Option<Candidate<F>> = None;

        for (set, (nonzeros, boxed)) in sets.iter().enumerate() {
            for &(index, value) in nonzeros {
                let rate = sign * value;
                if rate.abs() <= threshold {
                    continue;
                }

                if let Some(slack) = boxed.slack(index, rate) {
                    let ratio = slack / rate;
                    let better = best.as_ref().is_none_or(|b| rate.abs() > b.rate.abs());
                    if ratio <= max && better {
                        best = Some(Candidate { set, index, rate, ratio, });
                    }
                }
            }
        }

        best
    }

    fn select(
        &mut self,
        sets: &mut [(Vec<(usize, F)>, &mut Boxed<F>)],
        direction: Direction,
    ) -> Option<(usize, Selection<F>)> {
        let sign = direction.sign::<F>();

        let (max, max_abs) = self.max_delta(sets, sign);
        if max.is_infinite() {
            return None;
        }

        let threshold = (self.settings.minimum_stability * max_abs).max(self.settings.epsilon);
        let candidate = self.most_stable(sets, sign, max, threshold)
            .or_else(|| self.most_stable(sets, sign, max, self.settings.epsilon))?;
        trace!("harris: relaxed step {}, selected {} with rate {}", max, candidate.index, candidate.rate);

        let Candidate { set, index, rate, ratio } = candidate;
        let step = if ratio < F::zero() {
            let boxed = &mut *sets[set].1;
            let value = boxed.values[index];
            let shift = if rate > F::zero() {
                let shift = value - boxed.upper[index];
                boxed.upper[index] = value;
                shift
            } else {
                let shift = boxed.lower[index] - value;
                boxed.lower[index] = value;
                shift
            };
            self.total_shift = self.total_shift + shift.abs();
            debug!("harris: shifted bound of {} by {}", index, shift);

            F::zero()
        } else {
            ratio
        };

        Some((set, Selection { index, step, pivot: sign * rate, }))
    }
}

impl<F: Element> RatioTest<F> for Harris<F> {
    fn select_leave(
        &mut self,
        update: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<Selection<F>> {
        debug_assert_eq!(update.dim(), boxed.len());

        let mut sets = [(nonzeros(update), boxed)];
        self.select(&mut sets, direction).map(|(_, selection)| selection)
    }

    fn select_enter(
        &mut self,
        vector: &SemiSparse<F>,
        boxed: &mut Boxed<F>,
        co_vector: &SemiSparse<F>,
        co_boxed: &mut Boxed<F>,
        direction: Direction,
    ) -> Option<(Side, Selection<F>)> {
        debug_assert_eq!(vector.dim(), boxed.len());
        debug_assert_eq!(co_vector.dim(), co_boxed.len());

        let mut sets = [(nonzeros(vector), boxed), (nonzeros(co_vector), co_boxed)];
        self.select(&mut sets, direction).map(|(set, selection)| {
            let side = if set == 0 { Side::Vector } else { Side::CoVector };
            (side, selection)
        })
    }
}
