//! # Properties
//!
//! Randomized checks of invariants that should hold for any input.
use proptest::prelude::*;

use rcip::algorithm::propagation::ResultCode;
use rcip::algorithm::propagation::settings::Settings;
use rcip::algorithm::propagation::system::ConstraintSystem;
use rcip::algorithm::simplex::ratio_test::{Boxed, Direction, RatioTest};
use rcip::algorithm::simplex::ratio_test::harris::{Harris, HarrisSettings};
use rcip::algorithm::simplex::ratio_test::textbook::Textbook;
use rcip::data::linear_algebra::vector::SemiSparse;
use rcip::data::problem::Problem;
use rcip::data::problem::elements::VariableType;
use rcip::data::problem::history::Cause;

#[derive(Clone, Debug)]
enum Operation {
    Push,
    FixBinary(usize, bool),
    TightenLower(i32),
    TightenUpper(i32),
    Propagate,
    Backtrack,
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        Just(Operation::Push),
        (0..6usize, any::<bool>()).prop_map(|(i, one)| Operation::FixBinary(i, one)),
        (0..6).prop_map(Operation::TightenLower),
        (0..6).prop_map(Operation::TightenUpper),
        Just(Operation::Propagate),
        Just(Operation::Backtrack),
    ]
}

proptest! {
    /// The fixing counters of a linking constraint agree with the domains after propagation.
    #[test]
    fn linking_counters(operations in prop::collection::vec(operation(), 1..40)) {
        let mut problem = Problem::new();
        let x = problem.add_variable("x", VariableType::Integer, 0f64, 5f64);
        let mut system = ConstraintSystem::new(problem, Settings::default());
        system.include_linking();
        let id = system.add_linking(x).unwrap();
        let binaries = system.linking_binaries(x).unwrap();
        system.push_node();

        for operation in operations {
            match operation {
                Operation::Push => system.push_node(),
                Operation::FixBinary(i, one) => {
                    let value = if one { 1f64 } else { 0f64 };
                    let _ = system.problem_mut().fix(binaries[i], value, Cause::Decision);
                },
                Operation::TightenLower(value) => {
                    let _ = system.problem_mut().tighten_lower(x, value as f64);
                },
                Operation::TightenUpper(value) => {
                    let _ = system.problem_mut().tighten_upper(x, value as f64);
                },
                Operation::Propagate => {
                    if system.propagate() == ResultCode::Cutoff {
                        let depth = system.problem().depth();
                        system.backtrack(depth - 1);
                        if depth == 1 {
                            system.push_node();
                        }
                        continue;
                    }

                    let problem = system.problem();
                    let constraint = system.linking().unwrap().constraint(id);
                    let ones = binaries.iter().filter(|&&b| problem.is_fixed_to_one(b)).count();
                    let zeros = binaries.iter().filter(|&&b| problem.is_fixed_to_zero(b)).count();
                    prop_assert_eq!(constraint.nr_fixed_ones(), ones);
                    prop_assert_eq!(constraint.nr_fixed_zeros(), zeros);
                    prop_assert!(ones + zeros <= constraint.nr_binaries());
                    prop_assert!(ones <= 1);
                    if ones == 1 {
                        prop_assert!(problem.is_fixed(x));
                    }
                },
                Operation::Backtrack => {
                    let depth = system.problem().depth();
                    if depth > 1 {
                        system.backtrack(depth - 1);
                    }
                },
            }
        }
    }

    /// Setting up keeps exactly the values above epsilon, and nothing else changes.
    #[test]
    fn semi_sparse_setup(values in prop::collection::vec(prop_oneof![Just(0f64), -1e-10..1e-10, -10f64..10f64], 0..30)) {
        let epsilon = 1e-9;
        let mut vector = SemiSparse::from_values(values.clone(), epsilon);
        vector.setup();

        let mut indices = vector.indices().to_vec();
        indices.sort_unstable();
        let expected = (0..values.len()).filter(|&i| values[i].abs() > epsilon).collect::<Vec<_>>();
        prop_assert_eq!(&indices, &expected);
        for (i, &value) in values.iter().enumerate() {
            let kept = if value.abs() > epsilon { value } else { 0f64 };
            prop_assert_eq!(vector.get(i), kept);
        }
        prop_assert_eq!(vector.size(), expected.len());
    }

    /// Scaling the update by a power of two scales the step inversely and keeps the selection.
    #[test]
    fn ratio_test_scaling(
        rows in prop::collection::vec((0.5f64..4f64, any::<bool>(), 0f64..10f64), 1..10),
        exponent in -4..5i32,
        decrease in any::<bool>(),
    ) {
        let scale = 2f64.powi(exponent);
        let update = rows.iter().map(|&(rate, negative, _)| if negative { -rate } else { rate }).collect::<Vec<_>>();
        let values = vec![0f64; rows.len()];
        let lower = rows.iter().map(|&(_, _, slack)| -slack).collect::<Vec<_>>();
        let upper = rows.iter().map(|&(_, _, slack)| slack).collect::<Vec<_>>();
        let boxed = Boxed::new(values, lower, upper);
        let direction = if decrease { Direction::Decrease } else { Direction::Increase };

        let mut original = SemiSparse::from_values(update.clone(), 1e-12);
        original.setup();
        let mut scaled = SemiSparse::from_values(update.iter().map(|&v| v * scale).collect(), 1e-12);
        scaled.setup();

        let mut harris = Harris::new(HarrisSettings::default());
        let first = harris.select_leave(&original, &mut boxed.clone(), direction).unwrap();
        let second = harris.select_leave(&scaled, &mut boxed.clone(), direction).unwrap();
        prop_assert_eq!(first.index, second.index);
        prop_assert_eq!(first.step, second.step * scale);
        prop_assert_eq!(first.pivot * scale, second.pivot);

        let first = Textbook.select_leave(&original, &mut boxed.clone(), direction).unwrap();
        let second = Textbook.select_leave(&scaled, &mut boxed.clone(), direction).unwrap();
        prop_assert_eq!(first.index, second.index);
        prop_assert_eq!(first.step, second.step * scale);
    }
}
