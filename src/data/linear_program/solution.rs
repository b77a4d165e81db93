//! # Representation of feasible solutions
//!
//! Once a linear program is solved, a solution is read from the final tableau. It contains a value
//! for every variable column, including slack and excess variables.
use std::collections::HashMap;
use std::fmt;

use crate::data::number_types::Approximate;

/// Represents a full solution to a linear program.
///
/// Should represent a solution that is feasible. This struct would probably be used to print the
/// optimal solution for the user.
#[derive(Clone, PartialEq, Debug)]
pub struct Solution {
    /// Value of the objective function for this solution, in the direction of the problem.
    objective_value: f64,
    /// (variable name, solution value) tuples for all variables, in column order.
    solution_values: Vec<(String, f64)>,
}

impl Solution {
    /// Create a new `Solution` instance.
    ///
    /// A plain constructor.
    pub fn new(objective_value: f64, solution_values: Vec<(String, f64)>) -> Self {
        Self { objective_value, solution_values }
    }

    /// Value of the objective function.
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// All (variable name, value) tuples, in column order.
    pub fn values(&self) -> &[(String, f64)] {
        &self.solution_values
    }

    /// Look up the value of a variable by name.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.solution_values.iter()
            .find(|(variable, _)| variable == name)
            .map(|&(_, value)| value)
    }

    /// Whether two solutions agree within tolerance on the objective value and on every variable.
    pub fn is_probably_equal_to(&self, other: &Self) -> bool {
        if !self.objective_value.approx_eq(other.objective_value) {
            return false;
        }
        if self.solution_values.len() != other.solution_values.len() {
            return false;
        }

        let other_map = other.solution_values.iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect::<HashMap<_, _>>();
        self.solution_values.iter().all(|(name, value)| {
            other_map.get(name.as_str()).is_some_and(|other| value.approx_eq(*other))
        })
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimal Solution:")?;
        writeln!(f, "Optimal Value: {:.3}", self.objective_value)?;
        for (name, value) in &self.solution_values {
            writeln!(f, "{} = {:.3}", name, value)?;
        }

        Ok(())
    }
}
