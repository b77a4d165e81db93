//! # The simplex tableau
//!
//! A dense tableau holding the objective row (row `0`) and one row per constraint, with one column
//! per variable (decision, slack and excess variables) followed by the right hand side. All
//! algorithms in this crate operate on this structure through `Tableau::pivot` and by appending
//! rows and columns.
use std::fmt;
use std::ops::{Index, IndexMut};
use std::sync::Arc;

use enum_map::EnumMap;
use itertools::{Itertools, repeat_n};
use log::debug;
use thiserror::Error;

use crate::data::linear_algebra::matrix::DenseMatrix;
use crate::data::linear_program::elements::{Objective, Restriction};
use crate::data::linear_program::solution::Solution;
use crate::data::number_types::Approximate;

/// Name of the last column of every tableau.
pub const RHS: &str = "rhs";

/// Width of a single cell when rendering a tableau.
const COLUMN_WIDTH: usize = 6;

/// Structural problems with a tableau, or a pivot that can't be carried out.
#[derive(Debug, Error, PartialEq)]
pub enum TableauError {
    /// A tableau needs an objective row, a constraint, a variable and a right hand side.
    #[error("A tableau must be at least 2x3, got {height}x{width}")]
    TooSmall {
        /// Number of rows.
        height: usize,
        /// Number of columns.
        width: usize,
    },
    /// Not all rows have the same length.
    #[error("The rows of the tableau have inconsistent lengths")]
    RaggedRows,
    /// The number of row names doesn't match the number of rows.
    #[error("Expected {expected} row names, got {found}")]
    RowNames {
        /// Number of rows.
        expected: usize,
        /// Number of names.
        found: usize,
    },
    /// The number of column names doesn't match the number of columns.
    #[error("Expected {expected} column names, got {found}")]
    ColumnNames {
        /// Number of columns.
        expected: usize,
        /// Number of names.
        found: usize,
    },
    /// The last column is not the right hand side.
    #[error("The last column must be named \"{RHS}\", found \"{0}\"")]
    RhsColumn(String),
    /// The number of restrictions doesn't match the number of variable columns.
    #[error("Expected {expected} column restrictions, got {found}")]
    Restrictions {
        /// Number of variable columns.
        expected: usize,
        /// Number of restrictions.
        found: usize,
    },
    /// A new row or column has the wrong number of values.
    #[error("Expected {expected} values, got {found}")]
    Length {
        /// Required length.
        expected: usize,
        /// Provided length.
        found: usize,
    },
    /// Pivoting is only possible on a constraint row and a variable column.
    #[error("Can't pivot on ({row}, {column}) in a {height}x{width} tableau")]
    PivotOutOfRange {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
        /// Number of rows.
        height: usize,
        /// Number of columns.
        width: usize,
    },
    /// The pivot element is too close to zero to divide by.
    #[error("Pivot element {value:e} on {row}, {column} is too close to zero")]
    ZeroPivot {
        /// Row label.
        row: String,
        /// Column label.
        column: String,
        /// The pivot element.
        value: f64,
    },
    /// The objective row, or the last constraint, can't be removed.
    #[error("Row {0} can't be removed")]
    RemoveRow(usize),
    /// The right hand side, or the last variable, can't be removed.
    #[error("Column {0} can't be removed")]
    RemoveColumn(usize),
}

/// The simplex tableau.
///
/// A value type: `clone` produces a fully independent tableau. Only the snapshot taken at the
/// first pivot is shared between clones, and it is never modified.
#[derive(Clone, Debug, PartialEq)]
pub struct Tableau {
    values: DenseMatrix,
    /// Row `0` is the objective row, labelled "max z" or "min z".
    row_names: Vec<String>,
    /// The last name is always `RHS`.
    column_names: Vec<String>,
    /// One for every column except the right hand side.
    column_restrictions: Vec<Restriction>,
    /// Number of pivots done so far.
    iteration: usize,
    /// The tableau as it was before the first pivot.
    initial: Option<Arc<Tableau>>,
}

impl Tableau {
    /// Create a tableau.
    ///
    /// # Arguments
    ///
    /// * `values`: Rows of the tableau, the objective row first and the right hand side last.
    /// * `row_names`: One name per row; the first one determines the objective direction.
    /// * `column_names`: One name per column; the last one should be `RHS`.
    /// * `column_restrictions`: One restriction per variable column.
    ///
    /// # Errors
    ///
    /// If the dimensions are too small or the names don't match the dimensions.
    pub fn new(
        values: Vec<Vec<f64>>,
        row_names: Vec<String>,
        column_names: Vec<String>,
        column_restrictions: Vec<Restriction>,
    ) -> Result<Self, TableauError> {
        let values = DenseMatrix::from_data(values).ok_or(TableauError::RaggedRows)?;
        let tableau = Self {
            values,
            row_names,
            column_names,
            column_restrictions,
            iteration: 0,
            initial: None,
        };
        tableau.validate()?;

        Ok(tableau)
    }

    /// Create a tableau with generated names.
    ///
    /// Rows are named "max z" (or "min z") followed by `c1`, `c2`, ..., variable columns `x1`,
    /// `x2`, ... and every variable is nonnegative.
    pub fn with_default_names(objective: Objective, values: Vec<Vec<f64>>) -> Result<Self, TableauError> {
        let height = values.len();
        let width = values.first().map_or(0, Vec::len);

        let row_names = std::iter::once(objective.row_label().to_string())
            .chain((1..height).map(|i| format!("c{}", i)))
            .collect();
        let column_names = (1..width).map(|j| format!("x{}", j))
            .chain(std::iter::once(RHS.to_string()))
            .collect();
        let restrictions = vec![Restriction::NonNegative; width.saturating_sub(1)];

        Self::new(values, row_names, column_names, restrictions)
    }

    /// Check the structural invariants.
    ///
    /// # Errors
    ///
    /// The first violated invariant.
    pub fn validate(&self) -> Result<(), TableauError> {
        let (height, width) = (self.height(), self.width());
        if height < 2 || width < 3 {
            return Err(TableauError::TooSmall { height, width });
        }
        if self.row_names.len() != height {
            return Err(TableauError::RowNames { expected: height, found: self.row_names.len() });
        }
        if self.column_names.len() != width {
            return Err(TableauError::ColumnNames { expected: width, found: self.column_names.len() });
        }
        if self.column_names[width - 1] != RHS {
            return Err(TableauError::RhsColumn(self.column_names[width - 1].clone()));
        }
        if self.column_restrictions.len() != width - 1 {
            return Err(TableauError::Restrictions {
                expected: width - 1,
                found: self.column_restrictions.len(),
            });
        }

        Ok(())
    }

    /// Pivot on a constraint row and a variable column.
    ///
    /// The pivot row is divided by the pivot element, after which a multiple of it is subtracted
    /// from every other row such that the pivot column becomes a unit vector. On the first pivot,
    /// a snapshot of the tableau is kept for sensitivity analysis.
    ///
    /// # Return value
    ///
    /// A description of the step, including the resulting tableau.
    ///
    /// # Errors
    ///
    /// When the position is not a constraint row and variable column, or when the pivot element is
    /// within tolerance of zero.
    pub fn pivot(&mut self, row: usize, column: usize) -> Result<String, TableauError> {
        if row == 0 || row >= self.height() || column >= self.rhs_column() {
            return Err(TableauError::PivotOutOfRange {
                row,
                column,
                height: self.height(),
                width: self.width(),
            });
        }
        let pivot = self.values[(row, column)];
        if pivot.is_negligible() {
            return Err(TableauError::ZeroPivot {
                row: self.row_names[row].clone(),
                column: self.column_names[column].clone(),
                value: pivot,
            });
        }

        if self.initial.is_none() {
            self.initial = Some(Arc::new(self.clone()));
        }
        self.iteration += 1;

        self.values.multiply_row(row, pivot.recip());
        for i in (0..self.height()).filter(|&i| i != row) {
            let factor = self.values[(i, column)];
            if factor != 0f64 {
                self.values.mul_add_rows(row, i, -factor);
            }
            self.values[(i, column)] = 0f64;
        }
        self.values[(row, column)] = 1f64;

        debug!("T{}: pivot on {}, {}", self.iteration, self.row_names[row], self.column_names[column]);
        Ok(format!("Pivot on {}, {}\n\n{}", self.row_names[row], self.column_names[column], self))
    }

    /// Append a constraint row at the bottom of the tableau.
    ///
    /// # Arguments
    ///
    /// * `row`: Coefficients for all columns, including the right hand side.
    /// * `name`: Label of the row.
    ///
    /// # Return value
    ///
    /// The index of the new row.
    pub fn add_row(&mut self, row: Vec<f64>, name: impl Into<String>) -> Result<usize, TableauError> {
        if row.len() != self.width() {
            return Err(TableauError::Length { expected: self.width(), found: row.len() });
        }

        self.values.push_row(row);
        self.row_names.push(name.into());

        Ok(self.height() - 1)
    }

    /// Add a variable column, directly before the right hand side.
    ///
    /// # Arguments
    ///
    /// * `column`: Coefficients for all rows, including the objective row.
    /// * `name`: Name of the variable.
    /// * `restriction`: Sign or integrality restriction of the variable.
    ///
    /// # Return value
    ///
    /// The index of the new column.
    pub fn add_column(
        &mut self,
        column: &[f64],
        name: impl Into<String>,
        restriction: Restriction,
    ) -> Result<usize, TableauError> {
        if column.len() != self.height() {
            return Err(TableauError::Length { expected: self.height(), found: column.len() });
        }

        let j = self.rhs_column();
        self.values.insert_column(j, column);
        self.column_names.insert(j, name.into());
        self.column_restrictions.push(restriction);

        Ok(j)
    }

    /// Append a `<=` constraint together with its own slack variable, expressed in the current
    /// basis.
    ///
    /// The slack becomes basic in the new row. Coefficients of variables that are basic in another
    /// row are eliminated by subtracting that row, such that the tableau stays in canonical form.
    /// The resulting right hand side is negative exactly when the constraint cuts off the current
    /// basic solution.
    ///
    /// # Arguments
    ///
    /// * `coefficients`: One coefficient per existing variable column.
    /// * `rhs`: Right hand side of the constraint.
    ///
    /// # Return value
    ///
    /// The index of the new row. The new row is named `c<i>` and its slack `s<i>`, with `i` that
    /// index.
    pub fn add_slack_constraint(&mut self, coefficients: &[f64], rhs: f64) -> Result<usize, TableauError> {
        if coefficients.len() != self.rhs_column() {
            return Err(TableauError::Length { expected: self.rhs_column(), found: coefficients.len() });
        }

        // The new row would break the unit columns, so the basis is determined first
        let basic_rows = (0..self.rhs_column()).map(|j| self.basic_row(j)).collect::<Vec<_>>();

        let i = self.height();
        self.add_column(&vec![0f64; self.height()], format!("s{}", i), Restriction::NonNegative)?;
        let row = coefficients.iter().copied()
            .chain([1f64, rhs])
            .collect();
        self.add_row(row, format!("c{}", i))?;

        for (j, basic_row) in basic_rows.into_iter().enumerate() {
            let coefficient = self.values[(i, j)];
            if coefficient.is_negligible() {
                self.values[(i, j)] = 0f64;
            } else if let Some(basic_row) = basic_row {
                self.values.mul_add_rows(basic_row, i, -coefficient);
                self.values[(i, j)] = 0f64;
            }
        }

        Ok(i)
    }

    /// Remove a constraint row.
    ///
    /// # Errors
    ///
    /// When trying to remove the objective row, a row that doesn't exist, or the last constraint.
    pub fn remove_row(&mut self, i: usize) -> Result<Vec<f64>, TableauError> {
        if i == 0 || i >= self.height() || self.height() <= 2 {
            return Err(TableauError::RemoveRow(i));
        }

        self.row_names.remove(i);
        Ok(self.values.remove_row(i))
    }

    /// Remove a variable column.
    ///
    /// # Errors
    ///
    /// When trying to remove the right hand side, a column that doesn't exist, or the last
    /// variable.
    pub fn remove_column(&mut self, j: usize) -> Result<Vec<f64>, TableauError> {
        if j >= self.rhs_column() || self.width() <= 3 {
            return Err(TableauError::RemoveColumn(j));
        }

        self.column_names.remove(j);
        self.column_restrictions.remove(j);
        Ok(self.values.remove_column(j))
    }

    /// Multiply a constraint row by a factor.
    pub fn multiply_row(&mut self, i: usize, factor: f64) {
        debug_assert!(0 < i && i < self.height());

        self.values.multiply_row(i, factor);
    }

    /// The constraint row in which column `j` is a unit vector, if it is one.
    ///
    /// The objective row entry is zero, one constraint row entry is one and all other entries are
    /// zero, all within tolerance.
    fn unit_row(&self, j: usize) -> Option<usize> {
        debug_assert!(j < self.rhs_column());

        let mut unit_row = None;
        for (i, value) in self.values.column_iter(j).enumerate() {
            if value.is_negligible() {
                continue;
            }
            if i > 0 && unit_row.is_none() && value.approx_eq(1f64) {
                unit_row = Some(i);
            } else {
                return None;
            }
        }

        unit_row
    }

    /// The row in which column `j` is basic, if it is basic.
    ///
    /// A column is basic when it is the first unit vector with its one in that row. Later columns
    /// that are the same unit vector are non-basic, they have value zero in the basic solution.
    pub fn basic_row(&self, j: usize) -> Option<usize> {
        self.unit_row(j).filter(|&i| self.basic_column(i) == Some(j))
    }

    /// The column that is basic in row `i`, if any.
    pub fn basic_column(&self, i: usize) -> Option<usize> {
        (0..self.rhs_column()).find(|&j| self.unit_row(j) == Some(i))
    }

    /// Whether column `j` is basic.
    pub fn is_basic(&self, j: usize) -> bool {
        self.basic_row(j).is_some()
    }

    /// Indices of all basic variable columns.
    pub fn basic_columns(&self) -> Vec<usize> {
        (0..self.rhs_column()).filter(|&j| self.is_basic(j)).collect()
    }

    /// Indices of all non-basic variable columns.
    pub fn non_basic_columns(&self) -> Vec<usize> {
        (0..self.rhs_column()).filter(|&j| !self.is_basic(j)).collect()
    }

    /// The basic column of every constraint row.
    ///
    /// # Return value
    ///
    /// Column indices ordered by row, or `None` if a constraint row has no basic column.
    pub fn basis(&self) -> Option<Vec<usize>> {
        (1..self.height()).map(|i| self.basic_column(i)).collect()
    }

    /// Value of the variable in column `j` in the current basic solution.
    ///
    /// The right hand side of its row if the column is basic, zero otherwise.
    pub fn variable_value(&self, j: usize) -> f64 {
        self.basic_row(j).map_or(0f64, |i| self.rhs(i))
    }

    /// Right hand side of row `i`.
    pub fn rhs(&self, i: usize) -> f64 {
        self.values[(i, self.rhs_column())]
    }

    /// Direction of optimization, read from the label of the objective row.
    pub fn objective(&self) -> Objective {
        Objective::from_row_label(&self.row_names[0])
    }

    /// Objective value of the current basic solution, in the direction of the problem.
    ///
    /// The objective row always describes a maximization; for a minimization problem it
    /// maximizes `-z`.
    pub fn objective_value(&self) -> f64 {
        match self.objective() {
            Objective::Maximize => self.rhs(0),
            Objective::Minimize => -self.rhs(0),
        }
    }

    /// Objective function coefficient of column `j`, in the direction of the problem.
    pub fn cost(&self, j: usize) -> f64 {
        match self.objective() {
            Objective::Maximize => -self.values[(0, j)],
            Objective::Minimize => self.values[(0, j)],
        }
    }

    /// Whether all constraint right hand sides are nonnegative.
    pub fn is_primal_feasible(&self) -> bool {
        (1..self.height()).all(|i| !self.rhs(i).is_strictly_negative())
    }

    /// Whether no objective row coefficient is negative.
    pub fn is_optimal(&self) -> bool {
        (0..self.rhs_column()).all(|j| !self.values[(0, j)].is_strictly_negative())
    }

    /// The current basic solution, in terms of the problem variables.
    ///
    /// A column restricted to `-` holds the negation of its variable. A free variable is split
    /// over a column named `<name>+` directly followed by a column named `<name>-`, and its value
    /// is their difference. All other columns are reported as they are.
    pub fn solution(&self) -> Solution {
        let mut values = Vec::with_capacity(self.rhs_column());
        let mut j = 0;
        while j < self.rhs_column() {
            let name = &self.column_names[j];
            match self.column_restrictions[j] {
                Restriction::NonPositive => values.push((name.clone(), -self.variable_value(j) + 0f64)),
                Restriction::Free => match self.split_variable(j) {
                    Some(stem) => {
                        let value = self.variable_value(j) - self.variable_value(j + 1);
                        values.push((stem.to_string(), value + 0f64));
                        j += 1;
                    },
                    None => values.push((name.clone(), self.variable_value(j))),
                },
                _ => values.push((name.clone(), self.variable_value(j))),
            }
            j += 1;
        }

        Solution::new(self.objective_value(), values)
    }

    /// Name of the free variable whose positive part is in column `j`, if the negative part
    /// follows it.
    fn split_variable(&self, j: usize) -> Option<&str> {
        let stem = self.column_names[j].strip_suffix('+')?;
        let next = j + 1;
        let is_negative_part = next < self.rhs_column()
            && self.column_restrictions[next] == Restriction::Free
            && self.column_names[next].strip_suffix('-') == Some(stem);

        is_negative_part.then_some(stem)
    }

    /// Variable columns grouped by their restriction, in increasing order.
    pub fn columns_by_restriction(&self) -> EnumMap<Restriction, Vec<usize>> {
        let mut groups = EnumMap::<Restriction, Vec<usize>>::default();
        for (j, &restriction) in self.column_restrictions.iter().enumerate() {
            groups[restriction].push(j);
        }

        groups
    }

    /// Variable columns that need to take an integer value, in increasing order.
    pub fn integer_columns(&self) -> Vec<usize> {
        let groups = self.columns_by_restriction();
        groups[Restriction::Integer].iter()
            .merge(&groups[Restriction::Binary])
            .copied()
            .collect()
    }

    /// Number of rows, including the objective row.
    pub fn height(&self) -> usize {
        self.values.nr_rows()
    }

    /// Number of columns, including the right hand side.
    pub fn width(&self) -> usize {
        self.values.nr_columns()
    }

    /// Index of the right hand side column, equal to the number of variables.
    pub fn rhs_column(&self) -> usize {
        self.width() - 1
    }

    /// Label of every row.
    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    /// Label of every column.
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Restriction of every variable column.
    pub fn column_restrictions(&self) -> &[Restriction] {
        &self.column_restrictions
    }

    /// Number of pivots done so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// The tableau as it was right before the first pivot.
    pub fn initial(&self) -> Option<&Tableau> {
        self.initial.as_deref()
    }

    /// The underlying matrix.
    pub fn values(&self) -> &DenseMatrix {
        &self.values
    }
}

impl Index<(usize, usize)> for Tableau {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.values[index]
    }
}

impl IndexMut<(usize, usize)> for Tableau {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        &mut self.values[index]
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // | T1     |     x1 |     s1 |    rhs |
        write!(f, "| {:<width$} ", format!("T{}", self.iteration), width = COLUMN_WIDTH)?;
        for name in &self.column_names {
            write!(f, "| {:>width$} ", name, width = COLUMN_WIDTH)?;
        }
        writeln!(f, "|")?;

        // | -----: | -----: | -----: | -----: |
        let separator = format!("| {:>width$} ", "-----:", width = COLUMN_WIDTH);
        writeln!(f, "{}|", repeat_n(separator.as_str(), self.width() + 1).collect::<String>())?;

        // |  max z |  0.000 |  0.000 |  0.000 |
        for (i, name) in self.row_names.iter().enumerate() {
            write!(f, "| {:>width$} ", name, width = COLUMN_WIDTH)?;
            let row = self.values.row(i).iter()
                // Avoid printing "-0.000"
                .map(|&value| format!("| {:>width$.3} ", value + 0f64, width = COLUMN_WIDTH))
                .join("");
            writeln!(f, "{}|", row)?;
        }

        // |        |    int |      + |        |
        write!(f, "| {:>width$} ", "", width = COLUMN_WIDTH)?;
        for restriction in &self.column_restrictions {
            write!(f, "| {:>width$} ", restriction.to_string(), width = COLUMN_WIDTH)?;
        }
        writeln!(f, "| {:>width$} |", "", width = COLUMN_WIDTH)
    }
}
