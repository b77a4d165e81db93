//! # Building blocks to describe linear programs.
use std::fmt;
use std::str::FromStr;

use enum_map::Enum;

/// Direction of optimization.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Objective {
    /// Label of the objective row of a tableau with this direction.
    pub fn row_label(self) -> &'static str {
        match self {
            Objective::Maximize => "max z",
            Objective::Minimize => "min z",
        }
    }

    /// Read the direction from the label of an objective row.
    ///
    /// Anything that doesn't start with "min" is considered a maximization.
    pub fn from_row_label(label: &str) -> Self {
        if label.trim_start().starts_with("min") {
            Objective::Minimize
        } else {
            Objective::Maximize
        }
    }

    /// Whether `candidate` is a strictly better objective value than `incumbent`.
    pub fn improves(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Objective::Maximize => candidate > incumbent,
            Objective::Minimize => candidate < incumbent,
        }
    }

    /// Map an objective value such that larger is always better.
    pub fn larger_is_better(self, value: f64) -> f64 {
        match self {
            Objective::Maximize => value,
            Objective::Minimize => -value,
        }
    }
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Maximize
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Objective::Maximize => "max",
            Objective::Minimize => "min",
        })
    }
}

/// A `Constraint` is a type of (in)equality.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstraintRelation {
    Less,
    Equal,
    Greater,
}

impl ConstraintRelation {
    /// The operator as it is written in a problem file.
    pub fn symbol(self) -> &'static str {
        match self {
            ConstraintRelation::Less => "<=",
            ConstraintRelation::Equal => "=",
            ConstraintRelation::Greater => ">=",
        }
    }
}

/// Sign or integrality restriction on a variable.
///
/// The tableau algorithms treat every column as nonnegative; the sign variants are carried along
/// as a description of the problem. Integrality is used by the integer programming algorithms.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Enum)]
pub enum Restriction {
    /// `+`
    NonNegative,
    /// `-`
    NonPositive,
    /// `urs`: unrestricted in sign.
    Free,
    /// `int`
    Integer,
    /// `bin`
    Binary,
}

impl Default for Restriction {
    fn default() -> Self {
        Restriction::NonNegative
    }
}

impl FromStr for Restriction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Restriction::NonNegative),
            "-" => Ok(Restriction::NonPositive),
            "urs" => Ok(Restriction::Free),
            "int" => Ok(Restriction::Integer),
            "bin" => Ok(Restriction::Binary),
            other => Err(format!("Unknown restriction \"{}\", expected one of +, -, urs, int, bin", other)),
        }
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Restriction::NonNegative => "+",
            Restriction::NonPositive => "-",
            Restriction::Free => "urs",
            Restriction::Integer => "int",
            Restriction::Binary => "bin",
        })
    }
}

/// Direction of a bound.
///
/// Used when branching: a variable with a fractional value gets an upper bound in one child and a
/// lower bound in the other.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoundDirection {
    /// In the case of a variable, x >= b >= 0.
    Lower,
    /// In the case of a variable, 0 <= x <= b.
    Upper,
}

impl BoundDirection {
    /// Coefficient of the variable in the `<=` row encoding this bound.
    ///
    /// Upper bounds are written as `x <= b`, lower bounds as `-x <= -b`.
    #[must_use]
    pub fn sign(self) -> f64 {
        match self {
            BoundDirection::Lower => -1f64,
            BoundDirection::Upper => 1f64,
        }
    }

    /// The operator as it appears in the trace.
    pub fn symbol(self) -> &'static str {
        match self {
            BoundDirection::Lower => ">=",
            BoundDirection::Upper => "<=",
        }
    }
}
