//! # Dual simplex
//!
//! Restores primal feasibility of a tableau by repeatedly pivoting on the row with the most
//! negative right hand side, after which the primal method finishes the solve.
use log::{debug, warn};

use crate::algorithm::{OptimizationResult, Report, SolveError, Trace};
use crate::algorithm::simplex::primal;
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::Approximate;

/// Run the dual simplex method followed by the primal simplex method.
///
/// # Errors
///
/// When a pivot fails.
pub fn solve(tableau: &mut Tableau) -> Result<Report, SolveError> {
    let mut trace = Trace::new();
    let result = run(tableau, &mut trace)?;
    if result == OptimizationResult::Infeasible {
        warn!("Problem is infeasible");
    }

    Ok(Report::new(result, trace))
}

/// Run the dual simplex method followed by the primal simplex method, recording steps in an
/// existing trace.
pub fn run(tableau: &mut Tableau, trace: &mut Trace) -> Result<OptimizationResult, SolveError> {
    normalize_signs(tableau, trace);

    if restore_feasibility(tableau, trace)? {
        primal::run(tableau, trace)
    } else {
        debug!("No basis is primal feasible");
        Ok(OptimizationResult::Infeasible)
    }
}

/// Make rows without a basic column basic in a column that has a `-1` as its only nonzero.
///
/// Such a column is typically the excess variable of a `>=` constraint that was not yet negated.
/// Every flipped row is recorded as a step.
pub fn normalize_signs(tableau: &mut Tableau, trace: &mut Trace) {
    for j in 0..tableau.rhs_column() {
        if !tableau[(0, j)].is_negligible() {
            continue;
        }

        let mut nonzeros = (1..tableau.height()).filter(|&i| !tableau[(i, j)].is_negligible());
        let row = match (nonzeros.next(), nonzeros.next()) {
            (Some(i), None) if tableau[(i, j)].approx_eq(-1f64) => i,
            _ => continue,
        };
        if tableau.basic_column(row).is_some() {
            continue;
        }

        tableau.multiply_row(row, -1f64);
        debug!("Multiplied {} by -1 to make {} basic", tableau.row_names()[row], tableau.column_names()[j]);
        trace.record(format!("Multiply {} by -1\n\n{}", tableau.row_names()[row], tableau));
    }
}

/// Pivot until all right hand sides are nonnegative.
///
/// When at least one pivot happens, the pivots are bracketed by "Start Dual Simplex" and
/// "End Dual Simplex" steps.
///
/// # Return value
///
/// Whether feasibility was restored. If not, the problem is infeasible.
pub fn restore_feasibility(tableau: &mut Tableau, trace: &mut Trace) -> Result<bool, SolveError> {
    let mut pivoted = false;

    let feasible = loop {
        let row = match pivot_row(tableau) {
            Some(row) => row,
            None => break true,
        };
        match pivot_column(tableau, row) {
            Some(column) => {
                if !pivoted {
                    trace.record("Start Dual Simplex");
                    pivoted = true;
                }
                trace.record(tableau.pivot(row, column)?);
            },
            None => {
                let name = &tableau.row_names()[row];
                debug!("Row {} can't be made nonnegative", name);
                trace.record(format!(
                    "Problem is infeasible: no column can make the right hand side of {} nonnegative",
                    name,
                ));
                break false;
            },
        }
    };

    if pivoted {
        trace.record("End Dual Simplex");
    }

    Ok(feasible)
}

/// Row to pivot on, the one with the most negative right hand side.
///
/// `None` if the tableau is primal feasible.
pub fn pivot_row(tableau: &Tableau) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for i in 1..tableau.height() {
        let rhs = tableau.rhs(i);
        if rhs.is_strictly_negative() && best.map_or(true, |(_, best_rhs)| rhs < best_rhs) {
            best = Some((i, rhs));
        }
    }

    best.map(|(i, _)| i)
}

/// Column to pivot on in a given row.
///
/// Among the columns with a negative entry in the row, the one for which the objective row
/// coefficient divided by that entry is smallest in absolute value. The first column wins ties.
/// `None` if no column has a negative entry, in which case the problem is infeasible.
pub fn pivot_column(tableau: &Tableau, row: usize) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for j in 0..tableau.rhs_column() {
        let value = tableau[(row, j)];
        if value.is_strictly_negative() {
            let ratio = (tableau[(0, j)] / value).abs();
            if best.map_or(true, |(_, best_ratio)| ratio < best_ratio) {
                best = Some((j, ratio));
            }
        }
    }

    best.map(|(j, _)| j)
}
