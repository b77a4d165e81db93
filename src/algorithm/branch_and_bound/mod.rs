//! # Branch and bound
//!
//! Best bound search over linear relaxations. Each node owns an independent copy of the tableau;
//! a node with a fractional value for an integer variable is split in two children, one with an
//! upper and one with a lower bound on that variable.
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::algorithm::{OptimizationResult, Report, SolveError, Trace};
use crate::algorithm::simplex::solve_relaxation;
use crate::data::linear_program::elements::{BoundDirection, Objective};
use crate::data::linear_program::solution::Solution;
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::{Approximate, EPSILON};

pub mod knapsack;

/// Run branch and bound.
///
/// On success, the tableau is replaced by the tableau of the best integral solution. See
/// `solve_with_statistics`.
pub fn solve(tableau: &mut Tableau) -> Result<Report, SolveError> {
    solve_with_statistics(tableau).map(|(report, _)| report)
}

/// Run branch and bound, also returning counts describing the search.
///
/// # Return value
///
/// The best integral solution, `NoIncumbent` if there is none, or the outcome of the root
/// relaxation if that is not a finite optimum.
///
/// # Errors
///
/// When a pivot fails.
pub fn solve_with_statistics(tableau: &mut Tableau) -> Result<(Report, Statistics), SolveError> {
    let objective = tableau.objective();
    let mut trace = Trace::new();
    let mut statistics = Statistics::default();

    let mut root = tableau.clone();
    match solve_relaxation(&mut root, &mut trace)? {
        OptimizationResult::FiniteOptimum(_) => {},
        other => {
            warn!("Root relaxation has no finite optimum: {:?}", other);
            *tableau = root;
            return Ok((Report::new(other, trace), statistics));
        },
    }

    let integer_columns = tableau.integer_columns();
    let mut search = Search::new(objective, root.clone());
    search.push(root, Vec::new());

    while let Some(node) = search.frontier.pop() {
        statistics.nodes_explored += 1;
        debug!("Exploring node {} at level {} with bound {}", node.sequence, node.level(), node.bound);

        if let Some((incumbent, _)) = &search.incumbent {
            if !improves_by_margin(objective, node.bound, incumbent.objective_value()) {
                statistics.nodes_pruned += 1;
                trace.record(format!(
                    "Prune {}: bound {:.3} does not improve on {:.3}",
                    node, node.bound, incumbent.objective_value(),
                ));
                continue;
            }
        }

        if node.tableau.basis().is_none() {
            statistics.nodes_infeasible += 1;
            trace.record(format!("Discard {}: no basic solution", node));
            continue;
        }

        let solution = node.tableau.solution();
        match first_fractional(&node.tableau, &integer_columns) {
            None => {
                let value = solution.objective_value();
                let improves = search.incumbent.as_ref()
                    .map_or(true, |(incumbent, _)| objective.improves(value, incumbent.objective_value()));
                if improves {
                    info!("New incumbent with value {}", value);
                    trace.record(format!("New incumbent at {}\n\n{}", node, solution));
                    statistics.incumbents_found += 1;
                    search.incumbent = Some((solution, node.tableau));
                } else {
                    trace.record(format!("Integral solution at {} does not improve the incumbent", node));
                }
            },
            Some(column) => {
                statistics.nodes_branched += 1;
                branch(&mut search, node, column, &mut trace, &mut statistics)?;
            },
        }
    }

    trace.record(statistics.to_string());
    let result = match search.incumbent {
        Some((solution, incumbent_tableau)) => {
            *tableau = incumbent_tableau;
            OptimizationResult::FiniteOptimum(solution)
        },
        None => {
            warn!("Search finished without an integral solution");
            *tableau = search.root;
            OptimizationResult::NoIncumbent
        },
    };

    Ok((Report::new(result, trace), statistics))
}

/// Split a node on a fractional variable and push the children that have a feasible relaxation.
fn branch(
    search: &mut Search,
    node: Node,
    column: usize,
    trace: &mut Trace,
    statistics: &mut Statistics,
) -> Result<(), SolveError> {
    let value = node.tableau.variable_value(column);
    let name = node.tableau.column_names()[column].clone();
    trace.record(format!("Branch {} on {} = {:.3}", node, name, value));

    for direction in [BoundDirection::Upper, BoundDirection::Lower] {
        let bound = match direction {
            BoundDirection::Upper => value.tolerant_floor(),
            BoundDirection::Lower => value.tolerant_ceil(),
        };
        let decision = Decision { variable: name.clone(), direction, value: bound };

        let mut child = node.tableau.clone();
        add_bound(&mut child, column, direction, bound)?;
        trace.record(format!("Add {}\n\n{}", decision, child));

        let mut path = node.path.clone();
        path.push(decision);
        match solve_relaxation(&mut child, trace)? {
            OptimizationResult::FiniteOptimum(_) => search.push(child, path),
            other => {
                statistics.nodes_infeasible += 1;
                debug!("Child {} discarded: {:?}", path.iter().join(", "), other);
            },
        }
    }

    Ok(())
}

/// Add the constraint `x_column <= value` or `x_column >= value` to a tableau.
///
/// The bound is written as a `<=` row with its own slack and expressed in the current basis; its
/// right hand side is negative exactly when the current basic solution violates it.
pub fn add_bound(
    tableau: &mut Tableau,
    column: usize,
    direction: BoundDirection,
    value: f64,
) -> Result<usize, SolveError> {
    let mut coefficients = vec![0f64; tableau.rhs_column()];
    coefficients[column] = direction.sign();

    Ok(tableau.add_slack_constraint(&coefficients, direction.sign() * value)?)
}

/// First column among `columns` with a fractional value.
///
/// When `columns` is empty, every variable column is required to be integral.
fn first_fractional(tableau: &Tableau, columns: &[usize]) -> Option<usize> {
    if columns.is_empty() {
        (0..tableau.rhs_column()).find(|&j| !tableau.variable_value(j).is_integral())
    } else {
        columns.iter().copied().find(|&j| !tableau.variable_value(j).is_integral())
    }
}

/// Whether `candidate` is better than `incumbent` by more than the tolerance.
fn improves_by_margin(objective: Objective, candidate: f64, incumbent: f64) -> bool {
    objective.larger_is_better(candidate) - objective.larger_is_better(incumbent) > EPSILON
}

/// Counts describing a branch and bound search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Nodes taken from the frontier.
    pub nodes_explored: usize,
    /// Nodes that were split in two.
    pub nodes_branched: usize,
    /// Nodes discarded because their bound doesn't improve on the incumbent.
    pub nodes_pruned: usize,
    /// Nodes and children discarded because they have no feasible relaxation.
    pub nodes_infeasible: usize,
    /// Number of times the incumbent was replaced.
    pub incumbents_found: usize,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Branch and bound statistics:")?;
        writeln!(f, "  Nodes explored:   {}", self.nodes_explored)?;
        writeln!(f, "  Nodes branched:   {}", self.nodes_branched)?;
        writeln!(f, "  Nodes pruned:     {}", self.nodes_pruned)?;
        writeln!(f, "  Nodes infeasible: {}", self.nodes_infeasible)?;
        writeln!(f, "  Incumbents found: {}", self.incumbents_found)
    }
}

/// A bound on a variable that was added when branching.
#[derive(Clone, Debug, PartialEq)]
pub struct Decision {
    /// Name of the bounded variable.
    pub variable: String,
    /// Whether this is an upper or a lower bound.
    pub direction: BoundDirection,
    /// The bound, an integer.
    pub value: f64,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.variable, self.direction.symbol(), self.value)
    }
}

/// State of the search.
struct Search {
    objective: Objective,
    frontier: BinaryHeap<Node>,
    incumbent: Option<(Solution, Tableau)>,
    /// The tableau to leave behind if no integral solution is found.
    root: Tableau,
    created: usize,
}

impl Search {
    fn new(objective: Objective, root: Tableau) -> Self {
        Self {
            objective,
            frontier: BinaryHeap::new(),
            incumbent: None,
            root,
            created: 0,
        }
    }

    /// Add a node with a solved relaxation to the frontier.
    fn push(&mut self, tableau: Tableau, path: Vec<Decision>) {
        let node = Node {
            bound: tableau.objective_value(),
            tableau,
            path,
            sequence: self.created,
            objective: self.objective,
        };
        debug!("Created node {} with bound {}", node.sequence, node.bound);

        self.created += 1;
        self.frontier.push(node);
    }
}

/// A subproblem of the search.
///
/// Instead of referring to its parent, a node carries the decisions that lead to it from the root.
struct Node {
    tableau: Tableau,
    /// Objective value of the relaxation, in the direction of the problem.
    bound: f64,
    path: Vec<Decision>,
    /// Creation order.
    sequence: usize,
    objective: Objective,
}

impl Node {
    /// Depth in the tree, the root is at level `0`.
    fn level(&self) -> usize {
        self.path.len()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("root")
        } else {
            write!(f, "node ({})", self.path.iter().join(", "))
        }
    }
}

impl Ord for Node {
    /// Better bound first, then shallower nodes, then older nodes.
    fn cmp(&self, other: &Self) -> Ordering {
        let bound = self.objective.larger_is_better(self.bound);
        let other_bound = other.objective.larger_is_better(other.bound);

        bound.total_cmp(&other_bound)
            .then_with(|| other.level().cmp(&self.level()))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}
