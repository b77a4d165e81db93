//! # Text format
//!
//! A problem is described on consecutive lines:
//!
//! ```text
//! max 3 5
//! 1 0 <=4
//! 0 2 <=12
//! 3 2 <=18
//! + +
//! ```
//!
//! The first line holds the direction and the objective function coefficients, the last line a
//! restriction (`+`, `-`, `urs`, `int` or `bin`) for every variable. Every line in between is a
//! constraint: its coefficients followed by a relation (`<=`, `>=` or `=`) and the right hand side.
//! Blank lines and lines starting with `#` are ignored.
use std::fmt;
use std::str::FromStr;

use itertools::{Itertools, repeat_n};

use crate::data::linear_program::elements::{ConstraintRelation, Objective, Restriction};
use crate::data::linear_program::tableau::{RHS, Tableau, TableauError};
use crate::io::error::{FileLocation, ParseError};

/// A single constraint as it was read.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    /// One coefficient per decision variable.
    pub coefficients: Vec<f64>,
    /// Type of (in)equality.
    pub relation: ConstraintRelation,
    /// Right hand side.
    pub rhs: f64,
}

/// A problem as it was read, before slack and excess variables are introduced.
#[derive(Clone, Debug, PartialEq)]
pub struct Problem {
    /// Direction of optimization.
    pub objective: Objective,
    /// Objective function coefficients.
    pub cost: Vec<f64>,
    /// All constraints, in the order in which they were read.
    pub constraints: Vec<Constraint>,
    /// Restriction of each decision variable.
    pub restrictions: Vec<Restriction>,
}

/// A `<=` row of the tableau, with the name and sign of its slack or excess variable.
struct Row {
    coefficients: Vec<f64>,
    rhs: f64,
    /// Either `s` for slack or `e` for excess.
    prefix: char,
}

/// A tableau column representing (part of) a decision variable.
struct Column {
    /// Index of the decision variable.
    variable: usize,
    name: String,
    restriction: Restriction,
    /// The column holds the variable times this sign.
    sign: f64,
}

impl Problem {
    /// Number of decision variables.
    pub fn nr_variables(&self) -> usize {
        self.cost.len()
    }

    /// Equality constraints are split into a `<=` and a `>=` row, and every binary variable gets
    /// an upper bound of one.
    fn rows(&self) -> Vec<Row> {
        let mut rows = Vec::with_capacity(self.constraints.len());
        for constraint in &self.constraints {
            let row = |prefix| Row { coefficients: constraint.coefficients.clone(), rhs: constraint.rhs, prefix };
            match constraint.relation {
                ConstraintRelation::Less => rows.push(row('s')),
                ConstraintRelation::Greater => rows.push(row('e')),
                ConstraintRelation::Equal => {
                    rows.push(row('s'));
                    rows.push(row('e'));
                },
            }
        }
        for (j, _) in self.restrictions.iter().enumerate().filter(|&(_, &r)| r == Restriction::Binary) {
            let coefficients = (0..self.nr_variables()).map(|k| if k == j { 1f64 } else { 0f64 }).collect();
            rows.push(Row { coefficients, rhs: 1f64, prefix: 's' });
        }

        rows
    }

    /// Decision variable columns.
    ///
    /// A variable restricted to `-` is replaced by its negation, a free variable `x` by the
    /// difference of two nonnegative columns `x+` and `x-`.
    fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::with_capacity(self.nr_variables());
        for (variable, &restriction) in self.restrictions.iter().enumerate() {
            let name = format!("x{}", variable + 1);
            match restriction {
                Restriction::NonPositive => columns.push(Column { variable, name, restriction, sign: -1f64 }),
                Restriction::Free => {
                    columns.push(Column { variable, name: format!("{}+", name), restriction, sign: 1f64 });
                    columns.push(Column { variable, name: format!("{}-", name), restriction, sign: -1f64 });
                },
                _ => columns.push(Column { variable, name, restriction, sign: 1f64 }),
            }
        }

        columns
    }

    /// Build the initial tableau.
    ///
    /// Every `<=` row gets a slack variable `s<i>`, every `>=` row an excess variable `e<i>` after
    /// which the row is negated, such that each row has a basic column. The right hand side of a
    /// negated row is negative when the original right hand side is positive. Binary variables
    /// are bounded by an extra `<=` row. Variables restricted to `-` or `urs` are substituted,
    /// see `Tableau::solution` for how their values are recovered.
    ///
    /// # Errors
    ///
    /// When the problem doesn't fit in a tableau, for example because it has no constraints.
    pub fn into_tableau(self) -> Result<Tableau, TableauError> {
        let columns = self.columns();
        let rows = self.rows();
        let m = rows.len();

        let sign = match self.objective {
            Objective::Maximize => -1f64,
            Objective::Minimize => 1f64,
        };
        let mut values = Vec::with_capacity(m + 1);
        values.push(columns.iter().map(|column| sign * column.sign * self.cost[column.variable] + 0f64)
            .chain(repeat_n(0f64, m + 1))
            .collect::<Vec<_>>());
        for (i, row) in rows.iter().enumerate() {
            let sign = if row.prefix == 'e' { -1f64 } else { 1f64 };
            let mut values_row = columns.iter()
                .map(|column| sign * column.sign * row.coefficients[column.variable] + 0f64)
                .collect::<Vec<_>>();
            values_row.extend((0..m).map(|k| if k == i { 1f64 } else { 0f64 }));
            values_row.push(sign * row.rhs + 0f64);
            values.push(values_row);
        }

        let row_names = std::iter::once(self.objective.row_label().to_string())
            .chain((1..=m).map(|i| format!("c{}", i)))
            .collect();
        let column_names = columns.iter().map(|column| column.name.clone())
            .chain(rows.iter().enumerate().map(|(i, row)| format!("{}{}", row.prefix, i + 1)))
            .chain(std::iter::once(RHS.to_string()))
            .collect();
        let restrictions = columns.iter().map(|column| column.restriction)
            .chain(repeat_n(Restriction::NonNegative, m))
            .collect();

        Tableau::new(values, row_names, column_names, restrictions)
    }
}

impl fmt::Display for Problem {
    /// The canonical form: objective function, constraints with their slack and excess variables,
    /// and the sign restrictions.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = (1..=self.nr_variables()).map(|j| format!("x{}", j)).collect::<Vec<_>>();

        writeln!(f, "{} z = {}", self.objective, terms(self.cost.iter().copied().zip(names.iter().cloned())))?;
        writeln!(f, "s.t.")?;
        let rows = self.rows();
        for (i, row) in rows.iter().enumerate() {
            let sign = if row.prefix == 'e' { -1f64 } else { 1f64 };
            let all_terms = row.coefficients.iter().copied().zip(names.iter().cloned())
                .chain(std::iter::once((sign, format!("{}{}", row.prefix, i + 1))));
            writeln!(f, "  c{}: {} = {}", i + 1, terms(all_terms), row.rhs)?;
        }

        for (name, restriction) in names.iter().zip(&self.restrictions) {
            let description = match restriction {
                Restriction::NonNegative => ">= 0",
                Restriction::NonPositive => "<= 0",
                Restriction::Free => "urs",
                Restriction::Integer => "int",
                Restriction::Binary => "bin",
            };
            writeln!(f, "  {} {}", name, description)?;
        }
        if !rows.is_empty() {
            let names = rows.iter().enumerate().map(|(i, row)| format!("{}{}", row.prefix, i + 1)).join(", ");
            writeln!(f, "  {} >= 0", names)?;
        }

        Ok(())
    }
}

/// Render a linear expression, leaving out zero terms and unit coefficients.
fn terms(terms: impl Iterator<Item = (f64, String)>) -> String {
    let mut text = String::new();
    for (coefficient, name) in terms.filter(|&(coefficient, _)| coefficient != 0f64) {
        let magnitude = coefficient.abs();
        let sign = match (text.is_empty(), coefficient < 0f64) {
            (true, false) => "",
            (true, true) => "-",
            (false, false) => " + ",
            (false, true) => " - ",
        };
        text.push_str(sign);
        if magnitude != 1f64 {
            text.push_str(&magnitude.to_string());
        }
        text.push_str(&name);
    }

    if text.is_empty() { "0".to_string() } else { text }
}

/// Parse a problem in the text format.
///
/// # Errors
///
/// When a line can't be parsed or the number of coefficients or restrictions doesn't match the
/// objective function. Errors caused by a line carry its line number.
pub fn parse(program: &str) -> Result<Problem, ParseError> {
    let lines = into_lines(program).collect::<Vec<_>>();
    let (first, rest) = lines.split_first().ok_or(ParseError::Empty)?;
    let (last, middle) = rest.split_last().ok_or(ParseError::MissingRestrictions)?;

    let (objective, cost) = parse_objective(*first)?;
    let constraints = middle.iter()
        .map(|&location| parse_constraint(location, cost.len()))
        .collect::<Result<Vec<_>, _>>()?;
    let restrictions = parse_restrictions(*last, cost.len())?;

    Ok(Problem { objective, cost, constraints, restrictions })
}

/// Numbered lines with content, without comments.
fn into_lines(program: &str) -> impl Iterator<Item = FileLocation<'_>> {
    program.lines()
        .enumerate()
        .map(|(number, line)| (number + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_objective(location: FileLocation) -> Result<(Objective, Vec<f64>), ParseError> {
    let (_, line) = location;
    let mut tokens = line.split_whitespace();

    let objective = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
        Some("max") => Objective::Maximize,
        Some("min") => Objective::Minimize,
        _ => return Err(ParseError::with_file_location("Expected \"max\" or \"min\"", location)),
    };
    let cost = tokens.map(|token| parse_number(token, location)).collect::<Result<Vec<_>, _>>()?;
    if cost.is_empty() {
        return Err(ParseError::with_file_location("No objective function coefficients", location));
    }

    Ok((objective, cost))
}

fn parse_constraint(location: FileLocation, nr_variables: usize) -> Result<Constraint, ParseError> {
    let (_, line) = location;
    let mut tokens = line.split_whitespace().collect::<Vec<_>>();

    // The relation is either attached to the right hand side, or a separate token
    let last = tokens.pop().ok_or_else(|| ParseError::with_file_location("Empty constraint", location))?;
    let (relation, rhs) = match tokens.last().and_then(|&token| parse_relation(token)) {
        Some((relation, "")) => {
            tokens.pop();
            (relation, last)
        },
        _ => parse_relation(last).ok_or_else(|| ParseError::with_file_location(
            format!("Expected a relation (<=, >= or =) before the right hand side, found \"{}\"", last),
            location,
        ))?,
    };

    if tokens.len() != nr_variables {
        return Err(ParseError::with_file_location(
            format!("Expected {} coefficients, found {}", nr_variables, tokens.len()),
            location,
        ));
    }
    let coefficients = tokens.into_iter()
        .map(|token| parse_number(token, location))
        .collect::<Result<Vec<_>, _>>()?;
    let rhs = parse_number(rhs, location)?;

    Ok(Constraint { coefficients, relation, rhs })
}

/// Split a relation operator from the front of a token.
fn parse_relation(token: &str) -> Option<(ConstraintRelation, &str)> {
    [ConstraintRelation::Less, ConstraintRelation::Greater, ConstraintRelation::Equal].into_iter()
        .find_map(|relation| token.strip_prefix(relation.symbol()).map(|rest| (relation, rest)))
}

fn parse_restrictions(location: FileLocation, nr_variables: usize) -> Result<Vec<Restriction>, ParseError> {
    let (_, line) = location;
    let restrictions = line.split_whitespace()
        .map(|token| Restriction::from_str(token)
            .map_err(|message| ParseError::with_file_location(message, location)))
        .collect::<Result<Vec<_>, _>>()?;

    if restrictions.len() != nr_variables {
        return Err(ParseError::with_file_location(
            format!("Expected {} restrictions, found {}", nr_variables, restrictions.len()),
            location,
        ));
    }

    Ok(restrictions)
}

fn parse_number(token: &str, location: FileLocation) -> Result<f64, ParseError> {
    token.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ParseError::with_file_location(format!("Could not parse \"{}\" as a number", token), location))
}

#[cfg(test)]
mod test {
    use crate::data::linear_program::elements::{ConstraintRelation, Objective, Restriction};
    use crate::io::error::ParseError;
    use crate::io::text::parse;
    use crate::tests::{problem_1, problem_3, wyndor};

    #[test]
    fn wyndor_glass() {
        let problem = parse(problem_1::TEXT).unwrap();

        assert_eq!(problem.objective, Objective::Maximize);
        assert_eq!(problem.cost, vec![3f64, 5f64]);
        assert_eq!(problem.constraints.len(), 3);
        assert_eq!(problem.constraints[2].relation, ConstraintRelation::Less);
        assert_eq!(problem.restrictions, vec![Restriction::NonNegative; 2]);
        assert_eq!(problem.into_tableau().unwrap(), wyndor());
    }

    #[test]
    fn excess_rows_are_negated() {
        let tableau = parse(problem_3::TEXT).unwrap().into_tableau().unwrap();
        assert_eq!(tableau, problem_3::tableau_form());
    }

    #[test]
    fn equality() {
        let tableau = parse("min 1 2\n1 1 =3\n+ +").unwrap().into_tableau().unwrap();

        assert_eq!(tableau.row_names(), &["min z", "c1", "c2"]);
        assert_eq!(tableau.column_names(), &["x1", "x2", "s1", "e2", "rhs"]);
        assert_eq!(tableau.values().row(0), &[1f64, 2f64, 0f64, 0f64, 0f64]);
        assert_eq!(tableau.values().row(1), &[1f64, 1f64, 1f64, 0f64, 3f64]);
        assert_eq!(tableau.values().row(2), &[-1f64, -1f64, 0f64, 1f64, -3f64]);
    }

    #[test]
    fn free_variable_is_split() {
        let tableau = parse("min 1 2\n1 1 <=3\n+ urs").unwrap().into_tableau().unwrap();

        assert_eq!(tableau.column_names(), &["x1", "x2+", "x2-", "s1", "rhs"]);
        assert_eq!(tableau.values().row(0), &[1f64, 2f64, -2f64, 0f64, 0f64]);
        assert_eq!(tableau.values().row(1), &[1f64, 1f64, -1f64, 1f64, 3f64]);
        assert_eq!(tableau.column_restrictions()[1..3], [Restriction::Free; 2]);
    }

    #[test]
    fn nonpositive_variable_is_negated() {
        let tableau = parse("max 3 -1\n2 1 >=-4\n- +").unwrap().into_tableau().unwrap();

        assert_eq!(tableau.column_names(), &["x1", "x2", "e1", "rhs"]);
        assert_eq!(tableau.values().row(0), &[3f64, 1f64, 0f64, 0f64]);
        assert_eq!(tableau.values().row(1), &[2f64, -1f64, 1f64, 4f64]);
        assert_eq!(tableau.column_restrictions()[0], Restriction::NonPositive);
    }

    #[test]
    fn binary_variables_are_bounded() {
        let tableau = parse("max 1 1 1\n1 1 1 <=5\nbin + bin").unwrap().into_tableau().unwrap();

        assert_eq!(tableau.row_names(), &["max z", "c1", "c2", "c3"]);
        assert_eq!(tableau.column_names(), &["x1", "x2", "x3", "s1", "s2", "s3", "rhs"]);
        assert_eq!(tableau.values().row(2), &[1f64, 0f64, 0f64, 0f64, 1f64, 0f64, 1f64]);
        assert_eq!(tableau.values().row(3), &[0f64, 0f64, 1f64, 0f64, 0f64, 1f64, 1f64]);
        assert_eq!(tableau.integer_columns(), vec![0, 2]);
    }

    #[test]
    fn whitespace_and_comments() {
        let program = "\
# Wyndor glass
max 3 5

1 0 <= 4
0 2 <=12
   3 2 <=18
+ +
";
        assert_eq!(parse(program).unwrap().into_tableau().unwrap(), wyndor());
    }

    #[test]
    fn errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("# nothing\n\n"), Err(ParseError::Empty));
        assert_eq!(parse("max 1 1"), Err(ParseError::MissingRestrictions));
        assert_eq!(parse("maximize 1 1\n+ +").unwrap_err().line_number(), Some(1));
        assert_eq!(parse("max 1 1\n\n1 1 1 <=3\n+ +").unwrap_err().line_number(), Some(3));
        assert_eq!(parse("max 1 1\n1 1 <3\n+ +").unwrap_err().line_number(), Some(2));
        assert_eq!(parse("max 1 1\n1 a <=3\n+ +").unwrap_err().line_number(), Some(2));
        assert_eq!(parse("max 1 1\n1 1 <=3\n+ integer").unwrap_err().line_number(), Some(3));
        assert_eq!(parse("max 1 1\n1 1 <=3\n+").unwrap_err().line_number(), Some(3));

        // No constraints
        assert!(parse("max 1 1\n+ +").unwrap().into_tableau().is_err());
    }

    #[test]
    fn canonical_form() {
        let problem = parse("min 2 -1\n1 1 >=4\n1 0 =2.5\nint +").unwrap();
        let expected = "\
min z = 2x1 - x2
s.t.
  c1: x1 + x2 - e1 = 4
  c2: x1 + s2 = 2.5
  c3: x1 - e3 = 2.5
  x1 int
  x2 >= 0
  e1, s2, e3 >= 0
";
        assert_eq!(problem.to_string(), expected);
    }
}
