//! # Tests that require a look inside the crate, and fixtures shared by the unit tests.
//!
//! Convention for function names:
//!
//! * `const TEXT`: the problem in the text format
//! * `fn tableau_form()`: the initial tableau, built by hand
use crate::data::linear_program::elements::{Objective, Restriction};
use crate::data::linear_program::tableau::Tableau;


pub use problem_1::tableau_form as wyndor;

/// Build a tableau with decision variables `x1, ..., xn` followed by named slack and excess
/// columns.
///
/// # Arguments
///
/// * `objective`: Direction, determines the label of the objective row.
/// * `restrictions`: Restrictions of the decision variables; all other columns are nonnegative.
/// * `other_columns`: Names of the slack and excess columns.
/// * `rows`: All rows, including the objective row and the right hand side.
pub fn tableau(
    objective: Objective,
    restrictions: &[Restriction],
    other_columns: &[&str],
    rows: Vec<Vec<f64>>,
) -> Tableau {
    let row_names = std::iter::once(objective.row_label().to_string())
        .chain((1..rows.len()).map(|i| format!("c{}", i)))
        .collect();
    let column_names = (1..=restrictions.len()).map(|j| format!("x{}", j))
        .chain(other_columns.iter().map(|name| name.to_string()))
        .chain(std::iter::once("rhs".to_string()))
        .collect();
    let column_restrictions = restrictions.iter().copied()
        .chain(other_columns.iter().map(|_| Restriction::NonNegative))
        .collect();

    Tableau::new(rows, row_names, column_names, column_restrictions).unwrap()
}

/// The Wyndor glass problem with integer variables, which has an integral relaxation.
pub fn wyndor_integer() -> Tableau {
    crate::io::text::parse(&problem_1::TEXT.replace("+ +", "int int")).unwrap().into_tableau().unwrap()
}

/// Knapsack with items (60, 10), (100, 20) and (120, 30) and capacity 50.
pub fn knapsack() -> Tableau {
    tableau(
        Objective::Maximize,
        &[Restriction::Binary; 3],
        &["s1"],
        vec![
            vec![-60f64, -100f64, -120f64, 0f64, 0f64],
            vec![10f64, 20f64, 30f64, 1f64, 50f64],
        ],
    )
}
