//! # Algorithms
//!
//! Every algorithm operates on a `Tableau` in place and returns a `Report`: the outcome of the
//! search together with the steps that were taken to get there.
use std::fmt;
use std::str::FromStr;

use log::{info, trace};
use thiserror::Error;

use crate::data::linear_program::solution::Solution;
use crate::data::linear_program::tableau::{Tableau, TableauError};

pub mod branch_and_bound;
pub mod cutting_plane;
pub mod sensitivity;
pub mod simplex;

/// A linear program is either infeasible, unbounded or has a finite optimum.
///
/// An integer program can in addition have a feasible relaxation but no integral solution that
/// was found by the search.
#[derive(Clone, Debug, PartialEq)]
pub enum OptimizationResult {
    /// An optimal solution.
    FiniteOptimum(Solution),
    /// No solution satisfies all constraints.
    Infeasible,
    /// The objective value can be improved without limit.
    Unbounded,
    /// The search finished without finding any integral solution.
    NoIncumbent,
}

impl OptimizationResult {
    /// The solution, if there is one.
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            OptimizationResult::FiniteOptimum(solution) => Some(solution),
            _ => None,
        }
    }
}

impl fmt::Display for OptimizationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationResult::FiniteOptimum(solution) => solution.fmt(f),
            OptimizationResult::Infeasible => f.write_str("Problem is not feasible."),
            OptimizationResult::Unbounded => f.write_str("Problem is unbounded."),
            OptimizationResult::NoIncumbent => f.write_str("No integral solution was found."),
        }
    }
}

/// Reasons for an algorithm to give up on a tableau.
///
/// These are structural problems; infeasible or unbounded problems are a regular
/// `OptimizationResult`.
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    /// An operation on the tableau failed.
    #[error(transparent)]
    Tableau(#[from] TableauError),
    /// The primal simplex method needs a primal feasible basis to start from.
    #[error("The tableau is not primal feasible: row {row} has right hand side {rhs}")]
    NotPrimalFeasible {
        /// Label of the offending row.
        row: String,
        /// Its right hand side.
        rhs: f64,
    },
    /// The tableau doesn't describe a 0/1 knapsack problem.
    #[error("Not a knapsack problem: {0}")]
    NotAKnapsack(String),
    /// An iterative method didn't converge.
    #[error("No convergence after {0} iterations")]
    IterationLimit(usize),
}

/// Steps recorded by an algorithm, in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Trace {
    steps: Vec<String>,
}

impl Trace {
    /// Create an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step.
    pub fn record(&mut self, step: impl Into<String>) {
        let step = step.into();
        trace!("{}", step);
        self.steps.push(step);
    }

    /// The recorded steps.
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Take the recorded steps.
    pub fn into_steps(self) -> Vec<String> {
        self.steps
    }
}

/// Outcome of an algorithm together with the steps that were taken.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    /// What the algorithm found.
    pub result: OptimizationResult,
    /// Human-readable description of every step, in order.
    pub steps: Vec<String>,
}

impl Report {
    /// Bundle a result with the steps that led to it.
    pub fn new(result: OptimizationResult, trace: Trace) -> Self {
        Self { result, steps: trace.into_steps() }
    }
}

/// All solvers, selectable by name.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    PrimalSimplex,
    DualSimplex,
    BranchAndBound,
    BranchAndBoundKnapsack,
    CuttingPlane,
}

impl Algorithm {
    /// Every algorithm, in the order of presentation.
    pub const ALL: [Algorithm; 5] = [
        Algorithm::PrimalSimplex,
        Algorithm::DualSimplex,
        Algorithm::BranchAndBound,
        Algorithm::BranchAndBoundKnapsack,
        Algorithm::CuttingPlane,
    ];

    /// The name used to select this algorithm.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::PrimalSimplex => "primal-simplex",
            Algorithm::DualSimplex => "dual-simplex",
            Algorithm::BranchAndBound => "branch-and-bound",
            Algorithm::BranchAndBoundKnapsack => "knapsack",
            Algorithm::CuttingPlane => "cutting-plane",
        }
    }

    /// Run the algorithm on a tableau.
    ///
    /// The tableau is modified in place; after a successful run it holds the final tableau of the
    /// algorithm. The knapsack algorithm works on a reduced model and leaves it untouched.
    ///
    /// # Errors
    ///
    /// When the tableau doesn't meet the requirements of the algorithm, or when a pivot fails.
    pub fn solve(self, tableau: &mut Tableau) -> Result<Report, SolveError> {
        info!("Running {} on a {}x{} tableau", self, tableau.height(), tableau.width());

        let report = match self {
            Algorithm::PrimalSimplex => simplex::primal::solve(tableau),
            Algorithm::DualSimplex => simplex::dual::solve(tableau),
            Algorithm::BranchAndBound => branch_and_bound::solve(tableau),
            Algorithm::BranchAndBoundKnapsack => branch_and_bound::knapsack::solve(tableau),
            Algorithm::CuttingPlane => cutting_plane::solve(tableau),
        }?;

        info!("Finished {} after {} steps", self, report.steps.len());
        Ok(report)
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL.into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!(
                "Unknown algorithm \"{}\", expected one of {}",
                s,
                Algorithm::ALL.map(Algorithm::name).join(", "),
            ))
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
