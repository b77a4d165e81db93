//! # Primal simplex
//!
//! Starting from a primal feasible basis, repeatedly bring the first column with a negative
//! objective row coefficient into the basis.
use log::{debug, warn};

use crate::algorithm::{OptimizationResult, Report, SolveError, Trace};
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::Approximate;

/// Run the primal simplex method.
///
/// # Errors
///
/// If the tableau is not primal feasible, or when a pivot fails.
pub fn solve(tableau: &mut Tableau) -> Result<Report, SolveError> {
    let mut trace = Trace::new();
    let result = run(tableau, &mut trace)?;

    Ok(Report::new(result, trace))
}

/// Run the primal simplex method, recording steps in an existing trace.
///
/// When an optimum is found, the solution is recorded as the final step.
pub fn run(tableau: &mut Tableau, trace: &mut Trace) -> Result<OptimizationResult, SolveError> {
    if let Some(row) = (1..tableau.height()).find(|&i| tableau.rhs(i).is_strictly_negative()) {
        return Err(SolveError::NotPrimalFeasible {
            row: tableau.row_names()[row].clone(),
            rhs: tableau.rhs(row),
        });
    }

    let result = loop {
        match entering_column(tableau) {
            Some(column) => match leaving_row(tableau, column) {
                Some(row) => trace.record(tableau.pivot(row, column)?),
                None => {
                    let name = &tableau.column_names()[column];
                    warn!("Problem is unbounded in the direction of {}", name);
                    trace.record(format!("Problem is unbounded: no row limits the increase of {}", name));
                    break OptimizationResult::Unbounded;
                },
            },
            None => break OptimizationResult::FiniteOptimum(tableau.solution()),
        }
    };

    if let OptimizationResult::FiniteOptimum(solution) = &result {
        debug!("Optimal after {} pivots with value {}", tableau.iteration(), solution.objective_value());
        trace.record(solution.to_string());
    }

    Ok(result)
}

/// Column to bring into the basis.
///
/// The first column with an objective row coefficient that is negative, or `None` if the tableau
/// is optimal.
pub fn entering_column(tableau: &Tableau) -> Option<usize> {
    (0..tableau.rhs_column()).find(|&j| tableau[(0, j)].is_strictly_negative())
}

/// Row that leaves the basis when `column` enters.
///
/// Minimum ratio of right hand side and column entry over the rows with a positive entry; the
/// first row wins ties. `None` if there is no such row, in which case the problem is unbounded.
pub fn leaving_row(tableau: &Tableau, column: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 1..tableau.height() {
        let value = tableau[(i, column)];
        if value.is_strictly_positive() {
            let ratio = tableau.rhs(i) / value;
            if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                best = Some((i, ratio));
            }
        }
    }

    best.map(|(i, _)| i)
}
