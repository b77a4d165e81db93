//! # Sensitivity analysis
//!
//! For an optimal tableau, determine how far each objective function coefficient can move before
//! the current basis stops being optimal, and the shadow price of each constraint.
//!
//! The analysis compares the current basis with the tableau as it was before the first pivot: the
//! basis matrix is taken from those initial constraint rows and inverted.
use std::fmt;

use log::debug;
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::data::linear_program::elements::Objective;
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::Approximate;

/// Reasons why the sensitivity of a tableau can't be analysed.
#[derive(Debug, Error, PartialEq)]
pub enum SensitivityError {
    /// The tableau was never pivoted, so there is no initial tableau to compare with.
    #[error("The tableau has no initial snapshot, it was never pivoted")]
    NoSnapshot,
    /// Rows or columns were added after the first pivot.
    #[error("The initial tableau is {initial_height}x{initial_width}, the current one {height}x{width}")]
    SnapshotMismatch {
        /// Number of rows of the initial tableau.
        initial_height: usize,
        /// Number of columns of the initial tableau.
        initial_width: usize,
        /// Number of rows of the current tableau.
        height: usize,
        /// Number of columns of the current tableau.
        width: usize,
    },
    /// Some objective row coefficient is still negative.
    #[error("The tableau is not optimal")]
    NotOptimal,
    /// Not every constraint row has a basic column.
    #[error("Expected {expected} basic variables, found {found}")]
    BasisSize {
        /// Number of constraint rows.
        expected: usize,
        /// Number of basic columns.
        found: usize,
    },
    /// The basis matrix taken from the initial tableau can't be inverted.
    #[error("The basis matrix is singular")]
    SingularBasis,
}

/// Range of an objective function coefficient within which the current basis stays optimal.
#[derive(Clone, Debug, PartialEq)]
pub struct CoefficientRange {
    /// Name of the variable.
    pub variable: String,
    /// Whether the variable is basic.
    pub basic: bool,
    /// Current objective function coefficient, in the direction of the problem.
    pub coefficient: f64,
    /// How much the coefficient can decrease, possibly infinite.
    pub allowable_decrease: f64,
    /// How much the coefficient can increase, possibly infinite.
    pub allowable_increase: f64,
}

impl CoefficientRange {
    /// Smallest coefficient for which the basis stays optimal.
    pub fn lower(&self) -> f64 {
        self.coefficient - self.allowable_decrease
    }

    /// Largest coefficient for which the basis stays optimal.
    pub fn upper(&self) -> f64 {
        self.coefficient + self.allowable_increase
    }
}

/// Outcome of the analysis.
#[derive(Clone, Debug, PartialEq)]
pub struct SensitivityReport {
    /// (row name, shadow price) for every constraint.
    pub shadow_prices: Vec<(String, f64)>,
    /// A range for every variable, in column order.
    pub ranges: Vec<CoefficientRange>,
}

impl SensitivityReport {
    /// Look up the range of a variable by name.
    pub fn range(&self, variable: &str) -> Option<&CoefficientRange> {
        self.ranges.iter().find(|range| range.variable == variable)
    }
}

impl fmt::Display for SensitivityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shadow prices:")?;
        for (row, price) in &self.shadow_prices {
            writeln!(f, "{} = {:.3}", row, price)?;
        }
        writeln!(f)?;
        writeln!(f, "Objective function coefficient ranges:")?;
        for range in &self.ranges {
            writeln!(
                f,
                "{} ({}): {:.3} in [{:.3}, {:.3}], decrease {:.3}, increase {:.3}",
                range.variable,
                if range.basic { "basic" } else { "non-basic" },
                range.coefficient,
                range.lower(),
                range.upper(),
                range.allowable_decrease,
                range.allowable_increase,
            )?;
        }

        Ok(())
    }
}

/// Analyse the sensitivity of an optimal tableau.
///
/// The tableau is only read, so repeated analysis gives identical results.
///
/// # Errors
///
/// If there is no snapshot of the same dimensions, if the tableau is not optimal or if the basis
/// can't be determined or inverted.
pub fn analyse(tableau: &Tableau) -> Result<SensitivityReport, SensitivityError> {
    let initial = tableau.initial().ok_or(SensitivityError::NoSnapshot)?;
    if (initial.height(), initial.width()) != (tableau.height(), tableau.width()) {
        return Err(SensitivityError::SnapshotMismatch {
            initial_height: initial.height(),
            initial_width: initial.width(),
            height: tableau.height(),
            width: tableau.width(),
        });
    }
    if !tableau.is_optimal() {
        return Err(SensitivityError::NotOptimal);
    }
    let m = tableau.height() - 1;
    let n = tableau.rhs_column();
    let basis = tableau.basis().ok_or_else(|| SensitivityError::BasisSize {
        expected: m,
        found: tableau.basic_columns().len(),
    })?;

    // Constraint matrix and maximization form costs, as they were before the first pivot
    let a = DMatrix::from_fn(m, n, |i, j| initial[(i + 1, j)]);
    let costs = DVector::from_fn(n, |j, _| -initial[(0, j)]);

    let b = DMatrix::from_fn(m, m, |i, r| a[(i, basis[r])]);
    let b_inverse = b.try_inverse().ok_or(SensitivityError::SingularBasis)?;
    let basic_costs = DVector::from_fn(m, |r, _| costs[basis[r]]);

    let shadow_prices = b_inverse.transpose() * basic_costs;
    let alpha = &b_inverse * &a;
    let reduced_costs = a.transpose() * &shadow_prices - &costs;
    debug!("Reduced costs: {:?}", reduced_costs.as_slice());

    let non_basic = tableau.non_basic_columns();
    let mut ranges = Vec::with_capacity(n);
    for j in 0..n {
        let (increase, decrease) = match basis.iter().position(|&k| k == j) {
            Some(r) => {
                let mut increase = f64::INFINITY;
                let mut decrease = f64::INFINITY;
                for &k in &non_basic {
                    let entry = alpha[(r, k)];
                    if entry.is_strictly_negative() {
                        increase = increase.min(reduced_costs[k] / -entry);
                    } else if entry.is_strictly_positive() {
                        decrease = decrease.min(reduced_costs[k] / entry);
                    }
                }
                (increase, decrease)
            },
            None => (reduced_costs[j], f64::INFINITY),
        };

        ranges.push(match tableau.objective() {
            Objective::Maximize => CoefficientRange {
                variable: tableau.column_names()[j].clone(),
                basic: basis.contains(&j),
                coefficient: costs[j],
                allowable_decrease: decrease,
                allowable_increase: increase,
            },
            Objective::Minimize => CoefficientRange {
                variable: tableau.column_names()[j].clone(),
                basic: basis.contains(&j),
                coefficient: -costs[j],
                allowable_decrease: increase,
                allowable_increase: decrease,
            },
        });
    }

    let sign = match tableau.objective() {
        Objective::Maximize => 1f64,
        Objective::Minimize => -1f64,
    };
    let shadow_prices = tableau.row_names()[1..].iter().cloned()
        .zip(shadow_prices.iter().map(|&price| sign * price))
        .collect();

    Ok(SensitivityReport { shadow_prices, ranges })
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::sensitivity::{analyse, SensitivityError};
    use crate::algorithm::simplex::{dual, primal};
    use crate::tests::{problem_3, wyndor};

    #[test]
    fn wyndor_glass() {
        let mut tableau = wyndor();
        primal::solve(&mut tableau).unwrap();
        let report = analyse(&tableau).unwrap();

        let prices = report.shadow_prices.iter().map(|&(_, price)| price).collect::<Vec<_>>();
        assert_eq!(report.shadow_prices[1].0, "c2");
        for (price, expected) in prices.into_iter().zip([0f64, 1.5f64, 1f64]) {
            assert_abs_diff_eq!(price, expected, epsilon = 1e-9);
        }

        let x1 = report.range("x1").unwrap();
        assert!(x1.basic);
        assert_abs_diff_eq!(x1.coefficient, 3f64, epsilon = 1e-9);
        assert_abs_diff_eq!(x1.lower(), 0f64, epsilon = 1e-9);
        assert_abs_diff_eq!(x1.upper(), 7.5f64, epsilon = 1e-9);

        let x2 = report.range("x2").unwrap();
        assert_abs_diff_eq!(x2.lower(), 2f64, epsilon = 1e-9);
        assert_eq!(x2.upper(), f64::INFINITY);

        let s1 = report.range("s1").unwrap();
        assert!(s1.basic);
        assert_abs_diff_eq!(s1.lower(), -4.5f64, epsilon = 1e-9);
        assert_abs_diff_eq!(s1.upper(), 3f64, epsilon = 1e-9);

        let s2 = report.range("s2").unwrap();
        assert!(!s2.basic);
        assert_abs_diff_eq!(s2.allowable_increase, 1.5f64, epsilon = 1e-9);
        assert_eq!(s2.lower(), f64::NEG_INFINITY);
    }

    #[test]
    fn repeatable() {
        let mut tableau = wyndor();
        primal::solve(&mut tableau).unwrap();

        assert_eq!(analyse(&tableau), analyse(&tableau));
    }

    #[test]
    fn minimization() {
        let mut tableau = problem_3::tableau_form();
        dual::solve(&mut tableau).unwrap();
        let report = analyse(&tableau).unwrap();

        // min 2 x1 + 3 x2 with x1 + x2 >= 4 and x1 + 3 x2 >= 6, optimal at (3, 1)
        let x1 = report.range("x1").unwrap();
        assert_abs_diff_eq!(x1.coefficient, 2f64, epsilon = 1e-9);
        assert_abs_diff_eq!(x1.lower(), 1f64, epsilon = 1e-9);
        assert_abs_diff_eq!(x1.upper(), 3f64, epsilon = 1e-9);
        let x2 = report.range("x2").unwrap();
        assert_abs_diff_eq!(x2.lower(), 2f64, epsilon = 1e-9);
        assert_abs_diff_eq!(x2.upper(), 6f64, epsilon = 1e-9);

        // The rows were negated, so in problem terms the prices are of the >= constraints
        let prices = report.shadow_prices.iter().map(|&(_, price)| price).collect::<Vec<_>>();
        assert_abs_diff_eq!(prices[0], -1.5f64, epsilon = 1e-9);
        assert_abs_diff_eq!(prices[1], -0.5f64, epsilon = 1e-9);
    }

    #[test]
    fn preconditions() {
        assert_eq!(analyse(&wyndor()), Err(SensitivityError::NoSnapshot));

        let mut tableau = wyndor();
        tableau.pivot(1, 0).unwrap();
        assert_eq!(analyse(&tableau), Err(SensitivityError::NotOptimal));

        let mut tableau = wyndor();
        primal::solve(&mut tableau).unwrap();
        tableau.add_slack_constraint(&[1f64, 0f64, 0f64, 0f64, 0f64], 1f64).unwrap();
        assert!(matches!(analyse(&tableau), Err(SensitivityError::SnapshotMismatch { .. })));
    }
}
