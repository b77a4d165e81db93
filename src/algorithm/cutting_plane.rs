//! # Gomory's cutting plane method
//!
//! After solving the relaxation, a row in which an integral variable is basic with a fractional
//! value yields a constraint that every integral solution satisfies but the current basic
//! solution violates. The cut is added with its own slack, feasibility is restored with the dual
//! method and the scan repeats.
//!
//! When all variables in the row are integral this is the fractional cut. Otherwise the row
//! involves continuous variables, such as the slack of a constraint with fractional data, and the
//! mixed integer cut is used.
use log::{debug, info, warn};

use crate::algorithm::{OptimizationResult, Report, SolveError, Trace};
use crate::algorithm::simplex::{dual, primal, solve_relaxation};
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::Approximate;

/// Maximum number of cuts before giving up.
pub const MAX_CUTS: usize = 256;

/// The kind of cut derived from a row.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cut {
    /// All variables in the row are integral, and so is the slack of the cut.
    Fractional,
    /// Some variable in the row is continuous.
    MixedInteger,
}

/// Run the cutting plane method.
///
/// # Errors
///
/// When a pivot fails, or when no integral solution is reached within `MAX_CUTS` cuts.
pub fn solve(tableau: &mut Tableau) -> Result<Report, SolveError> {
    let mut trace = Trace::new();
    let result = run(tableau, &mut trace)?;

    Ok(Report::new(result, trace))
}

/// Run the cutting plane method, recording steps in an existing trace.
pub fn run(tableau: &mut Tableau, trace: &mut Trace) -> Result<OptimizationResult, SolveError> {
    let mut integral = integral_columns(tableau);
    match solve_relaxation(tableau, trace)? {
        OptimizationResult::FiniteOptimum(_) => {},
        other => {
            warn!("Relaxation has no finite optimum: {:?}", other);
            return Ok(other);
        },
    }

    let mut nr_cuts = 0;
    while let Some(row) = fractional_row(tableau, &integral) {
        if nr_cuts == MAX_CUTS {
            warn!("No integral solution after {} cuts", MAX_CUTS);
            return Err(SolveError::IterationLimit(MAX_CUTS));
        }
        if nr_cuts == 0 {
            trace.record("Start Cutting Plane");
        }
        nr_cuts += 1;

        let (cut, kind) = add_cut(tableau, row, &integral)?;
        integral.push(kind == Cut::Fractional);
        debug!("{:?} cut {} derived from {}", kind, tableau.row_names()[cut], tableau.row_names()[row]);
        let description = match kind {
            Cut::Fractional => "fractional",
            Cut::MixedInteger => "mixed integer",
        };
        trace.record(format!(
            "Add {} cutting constraint derived from {}\n\n{}",
            description,
            tableau.row_names()[row],
            tableau,
        ));

        if !dual::restore_feasibility(tableau, trace)? {
            warn!("No integral solution satisfies the cuts");
            trace.record("End Cutting Plane");
            return Ok(OptimizationResult::Infeasible);
        }
        match primal::run(tableau, trace)? {
            OptimizationResult::FiniteOptimum(_) => {},
            other => return Ok(other),
        }
    }

    if nr_cuts > 0 {
        trace.record("End Cutting Plane");
    }
    info!("Integral after {} cuts", nr_cuts);

    Ok(OptimizationResult::FiniteOptimum(tableau.solution()))
}

/// For every variable column, whether it takes an integral value in every integral solution.
///
/// These are the integer and binary columns, or all columns when none of them carries an integer
/// restriction. A basic column, typically a slack or excess variable, is integral as well when
/// all other coefficients in its row are integral and on such columns, and the right hand side is
/// integral. Slack and excess columns are only recognized while they are basic in their own row,
/// so this is meant for the tableau before the first pivot.
pub fn integral_columns(tableau: &Tableau) -> Vec<bool> {
    let integer_columns = tableau.integer_columns();
    let mut restricted = vec![integer_columns.is_empty(); tableau.rhs_column()];
    for j in integer_columns {
        restricted[j] = true;
    }

    (0..tableau.rhs_column())
        .map(|j| restricted[j] || tableau.basic_row(j).is_some_and(|row| {
            tableau.rhs(row).is_integral() && (0..tableau.rhs_column())
                .filter(|&k| k != j)
                .all(|k| tableau[(row, k)].is_negligible() || (restricted[k] && tableau[(row, k)].is_integral()))
        }))
        .collect()
}

/// First constraint row in which an integral column is basic with a value that is not integral.
pub fn fractional_row(tableau: &Tableau, integral: &[bool]) -> Option<usize> {
    (1..tableau.height()).find(|&i| {
        !tableau.rhs(i).is_integral() && tableau.basic_column(i).is_some_and(|j| integral[j])
    })
}

/// Add the cut derived from a row.
///
/// With `f` the fractional part of the right hand side, the cut reads `sum g_j x_j >= f` and is
/// added as `sum -g_j x_j + s = -f`, such that the new slack is basic with a negative right hand
/// side. For a row with only integral variables `g_j` is the fractional part of coefficient
/// `a_j`. Otherwise, for an integral `x_j` it is the fractional part `f_j` if that is at most
/// `f`, and `f (1 - f_j) / (1 - f)` if not; for a continuous `x_j` it is `a_j` if that is
/// positive and `-f a_j / (1 - f)` if not.
///
/// # Arguments
///
/// * `integral`: For every variable column, whether it takes integral values, see
/// `integral_columns`.
///
/// # Return value
///
/// The index of the new row, and which cut it is.
pub fn add_cut(tableau: &mut Tableau, row: usize, integral: &[bool]) -> Result<(usize, Cut), SolveError> {
    let kind = if (0..tableau.rhs_column()).all(|j| integral[j] || tableau[(row, j)].is_negligible()) {
        Cut::Fractional
    } else {
        Cut::MixedInteger
    };

    let f = fractional_part(tableau.rhs(row));
    let coefficients = (0..tableau.rhs_column())
        .map(|j| {
            let a = tableau[(row, j)];
            let g = match kind {
                Cut::Fractional => fractional_part(a),
                Cut::MixedInteger if integral[j] => {
                    let f_j = fractional_part(a);
                    if f_j <= f { f_j } else { f * (1f64 - f_j) / (1f64 - f) }
                },
                Cut::MixedInteger if a.is_negligible() => 0f64,
                Cut::MixedInteger if a > 0f64 => a,
                Cut::MixedInteger => -f * a / (1f64 - f),
            };
            -g + 0f64
        })
        .collect::<Vec<_>>();

    let cut = tableau.add_slack_constraint(&coefficients, -f)?;
    Ok((cut, kind))
}

/// `a - floor(a)`, or zero when `a` is within tolerance of an integer.
fn fractional_part(value: f64) -> f64 {
    if value.is_integral() {
        0f64
    } else {
        value - value.floor()
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::Algorithm;
    use crate::algorithm::cutting_plane::{add_cut, Cut, fractional_row, integral_columns, solve};
    use crate::algorithm::simplex::primal;
    use crate::data::number_types::Approximate;
    use crate::io::text::parse;
    use crate::tests::{problem_2, problem_4, wyndor};

    #[test]
    fn cut_row() {
        let mut tableau = problem_2::tableau_form();
        let integral = integral_columns(&tableau);
        assert_eq!(integral, vec![true; 4]);
        primal::solve(&mut tableau).unwrap();
        // x1 = 3.75, x2 = 2.25
        let row = fractional_row(&tableau, &integral).unwrap();
        let height = tableau.height();

        let (cut, kind) = add_cut(&mut tableau, row, &integral).unwrap();
        assert_eq!(cut, height);
        assert_eq!(kind, Cut::Fractional);
        assert_eq!(tableau.basic_row(tableau.rhs_column() - 1), Some(cut));
        assert_abs_diff_eq!(tableau.rhs(cut), -0.25f64, epsilon = 1e-9);
        for j in tableau.basic_columns() {
            assert_abs_diff_eq!(tableau[(cut, j)], if j == tableau.rhs_column() - 1 { 1f64 } else { 0f64 });
        }
    }

    #[test]
    fn integral_optimum() {
        for (mut tableau, value) in [(problem_2::tableau_form(), 40f64), (problem_4::tableau_form(), 58f64)] {
            let report = solve(&mut tableau).unwrap();

            let solution = report.result.solution().unwrap();
            assert_abs_diff_eq!(solution.objective_value(), value, epsilon = 1e-6);
            assert!((1..tableau.height()).all(|i| tableau.rhs(i).is_integral()));
            assert_eq!(report.steps.iter().filter(|step| *step == "Start Cutting Plane").count(), 1);
            assert_eq!(report.steps.iter().filter(|step| *step == "End Cutting Plane").count(), 1);
        }
    }

    #[test]
    fn known_solution() {
        let mut tableau = problem_4::tableau_form();
        let solution = solve(&mut tableau).unwrap().result.solution().cloned().unwrap();

        assert_abs_diff_eq!(solution.value("x1").unwrap(), 4f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 3f64, epsilon = 1e-6);
    }

    #[test]
    fn no_cut_needed() {
        let mut tableau = wyndor();
        let report = solve(&mut tableau).unwrap();

        assert_abs_diff_eq!(report.result.solution().unwrap().objective_value(), 36f64, epsilon = 1e-9);
        assert_eq!(tableau.height(), wyndor().height());
        assert!(report.steps.iter().all(|step| !step.contains("Cutting Plane")));
    }

    #[test]
    fn fractional_data() {
        // The slack of the second constraint is not integral
        let text = "max 3 2\n1 1 >=2\n1 1 <=4.5\n2 1 <=7\nint int";
        let tableau = parse(text).unwrap().into_tableau().unwrap();
        assert_eq!(integral_columns(&tableau), vec![true, true, true, false, true]);

        let mut cutting_plane = tableau.clone();
        let report = solve(&mut cutting_plane).unwrap();
        assert!(report.steps.iter().any(|step| step.starts_with("Add mixed integer cutting constraint")));
        let mut branch_and_bound = tableau;
        let expected = Algorithm::BranchAndBound.solve(&mut branch_and_bound).unwrap();

        let solution = report.result.solution().unwrap();
        let expected = expected.result.solution().unwrap();
        assert_abs_diff_eq!(solution.objective_value(), 11f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.objective_value(), expected.objective_value(), epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x1").unwrap(), 3f64, epsilon = 1e-6);
        assert_abs_diff_eq!(solution.value("x2").unwrap(), 1f64, epsilon = 1e-6);
    }
}
