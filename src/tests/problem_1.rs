//! Two integer variables that have to take different values.
//!
//! `x, y in {0, 1, 2}`, both linked to binary variables `x_v` and `y_v`, with the clauses
//! `!x_v or !y_v` for every value `v` and `x_2 or y_2`.
use crate::algorithm::propagation::ResultCode;
use crate::algorithm::propagation::settings::Settings;
use crate::algorithm::propagation::system::ConstraintSystem;
use crate::data::problem::{Problem, VariableId};
use crate::data::problem::elements::VariableType;
use crate::data::problem::literal::Literal;

#[test]
fn pipeline() {
    let (mut system, x, y) = system();
    let xs = system.linking_binaries(x).unwrap();
    let ys = system.linking_binaries(y).unwrap();
    assert_eq!(system.presolve(|| false), ResultCode::DidNotFind);
    assert_eq!(system.propagate(), ResultCode::DidNotFind);
    assert_eq!(system.logicor().unwrap().constraints().filter(|(_, c)| !c.is_deleted()).count(), 4);

    // Branch on x <= 1: x_2 is zero, so y_2 is one, so y is two.
    system.push_node();
    let _ = system.problem_mut().tighten_upper(x, 1f64);
    assert_eq!(system.propagate(), ResultCode::ReducedDomain);
    assert!(system.problem().is_fixed_to_zero(xs[2]));
    assert!(system.problem().is_fixed_to_one(ys[2]));
    assert_eq!((system.problem().lower(y), system.problem().upper(y)), (2f64, 2f64));
    assert_eq!((system.problem().lower(x), system.problem().upper(x)), (0f64, 1f64));

    let solution = expected_solution(&system, x, y, 0);
    assert!(system.check(&solution));
    assert_eq!(system.enforce(&solution), ResultCode::Feasible);

    // Same value for both variables.
    let solution = expected_solution(&system, x, y, 2);
    assert!(!system.check(&solution));

    system.backtrack(0);
    assert_eq!((system.problem().lower(y), system.problem().upper(y)), (0f64, 2f64));
    assert!(system.logicor().unwrap().constraints().all(|(_, c)| c.is_enabled()));
}

#[test]
fn relaxation() {
    let (mut system, x, y) = system();
    let _ = system.linking_binaries(x).unwrap();
    let _ = system.linking_binaries(y).unwrap();

    assert_eq!(system.init_lp(), ResultCode::Separated);
    // Two rows per linking constraint, one per clause.
    assert_eq!(system.context().cuts.len(), 2 * 2 + 4);
}

/// The variables.
pub fn problem() -> (Problem, VariableId, VariableId) {
    let mut problem = Problem::new();
    let x = problem.add_variable("x", VariableType::Integer, 0f64, 2f64);
    let y = problem.add_variable("y", VariableType::Integer, 0f64, 2f64);

    (problem, x, y)
}

/// The constraints.
pub fn system() -> (ConstraintSystem, VariableId, VariableId) {
    let (problem, x, y) = problem();
    let mut system = ConstraintSystem::new(problem, Settings::default());
    system.include_linking();
    system.include_logicor();
    system.add_linking(x).unwrap();
    system.add_linking(y).unwrap();

    let xs = system.linking_binaries(x).unwrap();
    let ys = system.linking_binaries(y).unwrap();
    for value in 0..3 {
        let literals = vec![Literal::negative(xs[value]), Literal::negative(ys[value])];
        system.add_logicor(format!("different_{}", value), literals).unwrap();
    }
    system.add_logicor("large", vec![Literal::positive(xs[2]), Literal::positive(ys[2])]).unwrap();

    (system, x, y)
}

/// A solution with `x = x_value` and `y = 2`.
pub fn expected_solution(system: &ConstraintSystem, x: VariableId, y: VariableId, x_value: usize) -> Vec<f64> {
    let linking = system.linking().unwrap();
    let mut solution = vec![0f64; system.problem().nr_variables()];
    solution[x.index()] = x_value as f64;
    solution[y.index()] = 2f64;
    for (variable, value) in [(x, x_value), (y, 2)] {
        let id = linking.find(variable).unwrap();
        solution[linking.constraint(id).binaries()[value].index()] = 1f64;
    }

    solution
}
