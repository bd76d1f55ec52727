//! # Propagation scenarios
//!
//! Small search trees driven through the public interface of the constraint system.
use rcip::algorithm::propagation::ResultCode;
use rcip::algorithm::propagation::conflict::BoundRef;
use rcip::algorithm::propagation::settings::Settings;
use rcip::algorithm::propagation::system::ConstraintSystem;
use rcip::data::problem::{Problem, VariableId};
use rcip::data::problem::elements::VariableType;
use rcip::data::problem::literal::Literal;

fn binaries(n: usize) -> (ConstraintSystem, Vec<VariableId>) {
    let mut problem = Problem::new();
    let variables = (0..n).map(|i| problem.add_binary(format!("b{}", i))).collect();
    let mut system = ConstraintSystem::new(problem, Settings::default());
    system.include_logicor();

    (system, variables)
}

fn fixings(system: &ConstraintSystem, variables: &[VariableId]) -> Vec<Option<f64>> {
    variables.iter()
        .map(|&v| system.problem().is_fixed(v).then(|| system.problem().lower(v)))
        .collect()
}

#[test]
fn linking_fixed_integer() {
    let mut problem = Problem::new();
    let x = problem.add_variable("x", VariableType::Integer, 2f64, 5f64);
    let mut system = ConstraintSystem::new(problem, Settings::default());
    system.include_linking();
    let id = system.add_linking(x).unwrap();
    let binaries = system.linking_binaries(x).unwrap();
    assert_eq!(binaries.len(), 4);
    assert_eq!(system.linking().unwrap().constraint(id).offset(), 2);

    system.push_node();
    let _ = system.problem_mut().tighten_lower(x, 4f64);
    let _ = system.problem_mut().tighten_upper(x, 4f64);
    assert_eq!(system.propagate(), ResultCode::ReducedDomain);
    assert_eq!(fixings(&system, &binaries), vec![Some(0f64), Some(0f64), Some(1f64), Some(0f64)]);
    assert!(!system.linking().unwrap().constraint(id).is_enabled());

    system.backtrack(0);
    assert_eq!(fixings(&system, &binaries), vec![None; 4]);
    assert!(system.linking().unwrap().constraint(id).is_enabled());
}

#[test]
fn logicor_unit_propagation() {
    let (mut system, b) = binaries(3);
    let id = system.add_logicor("c", b.iter().map(|&v| Literal::positive(v)).collect()).unwrap();
    assert_eq!(system.propagate(), ResultCode::DidNotFind);

    system.push_node();
    let _ = system.problem_mut().tighten_upper(b[1], 0f64);
    let _ = system.problem_mut().tighten_upper(b[2], 0f64);
    assert_eq!(system.propagate(), ResultCode::ReducedDomain);
    assert_eq!(fixings(&system, &b), vec![Some(1f64), Some(0f64), Some(0f64)]);
    assert!(!system.logicor().unwrap().constraint(id).is_enabled());
    assert_eq!(system.context().statistics.nr_cutoffs, 0);
}

#[test]
fn logicor_conflict_set() {
    for n in 1..6 {
        let (mut system, b) = binaries(n);
        let literals = b.iter()
            .enumerate()
            .map(|(i, &v)| if i % 2 == 0 { Literal::positive(v) } else { Literal::negative(v) })
            .collect::<Vec<_>>();
        system.add_logicor("c", literals.clone()).unwrap();

        system.push_node();
        for &literal in &literals {
            let _ = system.problem_mut().set_true(!literal, rcip::data::problem::history::Cause::Decision);
        }
        assert_eq!(system.propagate(), ResultCode::Cutoff);

        let conflict = system.context().conflict.last_conflict().unwrap();
        assert_eq!(conflict.bounds.len(), n);
        assert_eq!(conflict.bounds, literals.iter().map(|&l| BoundRef::falsifying(l)).collect::<Vec<_>>());
        // All bounds are decisions, so the clause is the constraint itself.
        assert_eq!(system.last_resolved().unwrap().clause.as_ref(), Some(&literals));
    }
}

#[test]
fn presolve_is_idempotent() {
    let (mut system, b) = binaries(4);
    let id = system.add_logicor("c", vec![
        Literal::positive(b[2]),
        Literal::negative(b[0]),
        Literal::positive(b[2]),
        Literal::positive(b[3]),
    ]).unwrap();

    assert_eq!(system.presolve(|| false), ResultCode::ReducedDomain);
    let reduced = system.logicor().unwrap().constraint(id).literals().to_vec();
    assert_eq!(reduced.len(), 3);
    let deleted = system.context().statistics.nr_deleted;

    assert_eq!(system.presolve(|| false), ResultCode::DidNotFind);
    assert_eq!(system.logicor().unwrap().constraint(id).literals(), &reduced[..]);
    assert_eq!(system.context().statistics.nr_deleted, deleted);
}

#[test]
fn linking_and_clauses() {
    let mut problem = Problem::new();
    let x = problem.add_variable("x", VariableType::Integer, 0f64, 3f64);
    let mut system = ConstraintSystem::new(problem, Settings::default());
    system.include_linking();
    system.include_logicor();
    system.add_linking(x).unwrap();
    let binaries = system.linking_binaries(x).unwrap();
    // x is zero or three.
    system.add_logicor("ends", vec![Literal::positive(binaries[0]), Literal::positive(binaries[3])]).unwrap();
    assert_eq!(system.propagate(), ResultCode::DidNotFind);

    system.push_node();
    let _ = system.problem_mut().tighten_lower(x, 1f64);
    assert_eq!(system.propagate(), ResultCode::ReducedDomain);
    assert_eq!(system.problem().lower(x), 3f64);
    assert!(system.problem().is_fixed_to_one(binaries[3]));
}
