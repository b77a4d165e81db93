use approx::assert_abs_diff_eq;

use tableau_lp::algorithm::{Algorithm, OptimizationResult};
use tableau_lp::algorithm::sensitivity::analyse;
use tableau_lp::data::linear_program::solution::Solution;
use tableau_lp::data::number_types::Approximate;

use super::to_tableau;

fn solve(name: &str, algorithm: Algorithm) -> OptimizationResult {
    let mut tableau = to_tableau(name);
    algorithm.solve(&mut tableau).unwrap().result
}

fn optimum(name: &str, algorithm: Algorithm) -> Solution {
    match solve(name, algorithm) {
        OptimizationResult::FiniteOptimum(solution) => solution,
        other => panic!("{}: expected an optimum, got {:?}", name, other),
    }
}

#[test]
fn wyndor() {
    let solution = optimum("wyndor", Algorithm::PrimalSimplex);
    let expected = Solution::new(
        36f64,
        vec![
            ("x1".to_string(), 2f64),
            ("x2".to_string(), 6f64),
            ("s1".to_string(), 2f64),
            ("s2".to_string(), 0f64),
            ("s3".to_string(), 0f64),
        ],
    );

    assert!(expected.is_probably_equal_to(&solution));
    assert_eq!(solution.values().len(), 5);
}

#[test]
fn wyndor_sensitivity() {
    let mut tableau = to_tableau("wyndor");
    Algorithm::PrimalSimplex.solve(&mut tableau).unwrap();

    let first = analyse(&tableau).unwrap();
    let second = analyse(&tableau).unwrap();
    assert_eq!(first, second);

    for ((_, price), expected) in first.shadow_prices.iter().zip([0f64, 1.5f64, 1f64]) {
        assert_abs_diff_eq!(*price, expected, epsilon = 1e-9);
    }
    let x1 = first.range("x1").unwrap();
    assert_abs_diff_eq!(x1.lower(), 0f64, epsilon = 1e-9);
    assert_abs_diff_eq!(x1.upper(), 7.5f64, epsilon = 1e-9);
}

#[test]
fn diet() {
    for algorithm in [Algorithm::DualSimplex, Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        let solution = optimum("diet", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), 9f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 3f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 1f64, epsilon = 1e-6);
    }
}

#[test]
fn integer() {
    for algorithm in [Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        let solution = optimum("integer", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), 40f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 5f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 0f64, epsilon = 1e-6);
    }
}

#[test]
fn integer_2() {
    for algorithm in [Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        let solution = optimum("integer_2", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), 58f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 4f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 3f64, epsilon = 1e-6);
    }
}

#[test]
fn cutting_plane_ends_integral() {
    for name in ["integer", "integer_2"] {
        let mut tableau = to_tableau(name);
        Algorithm::CuttingPlane.solve(&mut tableau).unwrap();

        assert!((1..tableau.height()).all(|i| tableau.rhs(i).is_integral()));
    }
}

#[test]
fn knapsack() {
    let solution = optimum("knapsack", Algorithm::BranchAndBoundKnapsack);

    assert_abs_diff_eq!(solution.objective_value(), 220f64);
    assert_eq!(solution.value("x1"), Some(0f64));
    assert_eq!(solution.value("x2"), Some(1f64));
    assert_eq!(solution.value("x3"), Some(1f64));

    for algorithm in [Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        let solution = optimum("knapsack", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), 220f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 0f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 1f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x3").unwrap(), 1f64, epsilon = 1e-6);
    }
}

#[test]
fn multiple_optima() {
    let solution = optimum("multiple_optima", Algorithm::PrimalSimplex);

    assert_abs_diff_eq!(solution.objective_value(), 5f64);
    assert_eq!(solution.value("x1"), Some(5f64));
    assert_eq!(solution.value("x2"), Some(0f64));
    assert_eq!(solution.value("s1"), Some(0f64));
}

#[test]
fn binary() {
    for algorithm in [Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        let solution = optimum("binary", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), 2f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 1f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 1f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("s1").unwrap(), 3f64, epsilon = 1e-6);
    }
}

#[test]
fn nonpositive() {
    for algorithm in [Algorithm::PrimalSimplex, Algorithm::DualSimplex] {
        let solution = optimum("nonpositive", algorithm);

        assert_abs_diff_eq!(solution.objective_value(), -5f64, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), -5f64, epsilon = 1e-9);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 0f64, epsilon = 1e-9);
    }
}

#[test]
fn free() {
    let solution = optimum("free", Algorithm::PrimalSimplex);

    assert_abs_diff_eq!(solution.objective_value(), -2f64, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.value("x1").unwrap(), -2f64, epsilon = 1e-9);
    assert_eq!(solution.value("x1+"), None);

    assert_eq!(solve("free_unbounded", Algorithm::PrimalSimplex), OptimizationResult::Unbounded);
}

#[test]
fn infeasible() {
    for algorithm in [Algorithm::DualSimplex, Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        assert_eq!(solve("infeasible", algorithm), OptimizationResult::Infeasible);
    }
}

#[test]
fn no_integral_solution() {
    assert_eq!(solve("equality", Algorithm::BranchAndBound), OptimizationResult::NoIncumbent);
}

#[test]
fn unbounded() {
    for algorithm in [Algorithm::PrimalSimplex, Algorithm::BranchAndBound, Algorithm::CuttingPlane] {
        assert_eq!(solve("unbounded", algorithm), OptimizationResult::Unbounded);
    }
}
