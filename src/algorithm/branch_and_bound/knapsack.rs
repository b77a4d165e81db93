//! # Branch and bound for the 0/1 knapsack problem
//!
//! A maximization problem with a single `<=` constraint and nonnegative weights, apart from the
//! upper bounds of binary variables, doesn't need a tableau per node. The problem is reduced to a list of items and a capacity, and nodes are
//! bounded with a greedy fractional fill of the remaining capacity.
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use itertools::Itertools;
use log::{debug, info};

use crate::algorithm::{OptimizationResult, Report, SolveError, Trace};
use crate::data::linear_program::elements::{Objective, Restriction};
use crate::data::linear_program::solution::Solution;
use crate::data::linear_program::tableau::Tableau;
use crate::data::number_types::{Approximate, EPSILON};

/// Solve the knapsack problem described by a tableau.
///
/// The tableau is only read; the search happens on the reduced problem.
///
/// # Errors
///
/// If the tableau doesn't describe a knapsack problem, see `Knapsack::from_tableau`.
pub fn solve(tableau: &Tableau) -> Result<Report, SolveError> {
    let knapsack = Knapsack::from_tableau(tableau)?;
    let mut trace = Trace::new();

    trace.record(format!("Items by value / weight ratio, capacity {}:\n{}", knapsack.capacity, knapsack));
    let (profit, chosen) = knapsack.search(&mut trace);

    let names = chosen.iter()
        .map(|&item| tableau.column_names()[knapsack.items[item].column].as_str())
        .join(", ");
    info!("Maximum profit {} with items {}", profit, names);
    trace.record(format!("Maximum profit: {} with items {{{}}}", profit, names));

    let solution = knapsack.solution(tableau, profit, &chosen);
    trace.record(solution.to_string());

    Ok(Report::new(OptimizationResult::FiniteOptimum(solution), trace))
}

/// A variable that can be put in the knapsack.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Item {
    /// Objective function coefficient.
    pub value: f64,
    /// Coefficient in the capacity constraint.
    pub weight: f64,
    /// Column of the variable in the tableau.
    pub column: usize,
}

impl Item {
    /// Value per unit of weight, infinite for weightless items.
    pub fn ratio(&self) -> f64 {
        if self.weight.is_negligible() {
            f64::INFINITY
        } else {
            self.value / self.weight
        }
    }
}

/// The reduced problem: items sorted by decreasing value per unit of weight, and a capacity.
#[derive(Clone, Debug, PartialEq)]
pub struct Knapsack {
    items: Vec<Item>,
    capacity: f64,
    /// (slack column, bounded column) for every `x <= 1` row after the capacity constraint.
    upper_bounds: Vec<(usize, usize)>,
}

impl Knapsack {
    /// Read the items and the capacity from a tableau.
    ///
    /// Items are the columns with a positive objective function coefficient. The first
    /// constraint is the capacity constraint, it may only be followed by `x <= 1` rows such as
    /// those of binary variables.
    ///
    /// # Errors
    ///
    /// If the problem is not a maximization, has constraints other than the capacity constraint
    /// and upper bounds of one, has a negative capacity or an item with a negative weight or a
    /// sign restriction other than nonnegative.
    pub fn from_tableau(tableau: &Tableau) -> Result<Self, SolveError> {
        if tableau.objective() != Objective::Maximize {
            return Err(SolveError::NotAKnapsack("the objective should be maximized".to_string()));
        }
        let upper_bounds = (2..tableau.height())
            .map(|i| upper_bound(tableau, i).ok_or_else(|| SolveError::NotAKnapsack(format!(
                "constraint {} is not an upper bound of one on a single variable",
                tableau.row_names()[i],
            ))))
            .collect::<Result<Vec<_>, _>>()?;
        let capacity = tableau.rhs(1);
        if capacity.is_strictly_negative() {
            return Err(SolveError::NotAKnapsack(format!("negative capacity {}", capacity)));
        }

        let mut items = Vec::new();
        for column in 0..tableau.rhs_column() {
            let value = tableau.cost(column);
            if !value.is_strictly_positive() {
                continue;
            }
            if matches!(tableau.column_restrictions()[column], Restriction::NonPositive | Restriction::Free) {
                return Err(SolveError::NotAKnapsack(format!(
                    "item {} is not restricted to be nonnegative",
                    tableau.column_names()[column],
                )));
            }
            let weight = tableau[(1, column)];
            if weight.is_strictly_negative() {
                return Err(SolveError::NotAKnapsack(format!(
                    "item {} has negative weight {}",
                    tableau.column_names()[column],
                    weight,
                )));
            }
            items.push(Item { value, weight: weight.max(0f64), column });
        }
        items.sort_by(|a, b| b.ratio().total_cmp(&a.ratio()));

        Ok(Self { items, capacity: capacity.max(0f64), upper_bounds })
    }

    /// The items, by decreasing ratio.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// The capacity.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Upper bound on the profit of any completion of a partial selection.
    ///
    /// # Arguments
    ///
    /// * `profit`, `weight`: Of the items selected so far.
    /// * `next`: Index of the first item that has not been decided on.
    ///
    /// # Return value
    ///
    /// Zero if the selection is over capacity, the greedy fill of the remaining capacity with a
    /// fraction of the first item that doesn't fit otherwise.
    pub fn bound(&self, profit: f64, weight: f64, next: usize) -> f64 {
        if weight > self.capacity + EPSILON {
            return 0f64;
        }

        let (mut profit, mut weight) = (profit, weight);
        for item in &self.items[next.min(self.items.len())..] {
            if weight + item.weight <= self.capacity + EPSILON {
                profit += item.value;
                weight += item.weight;
            } else {
                return profit + (self.capacity - weight) * item.ratio();
            }
        }

        profit
    }

    /// Best first search over include / exclude decisions.
    ///
    /// # Return value
    ///
    /// The maximum profit and the indices of the chosen items.
    pub fn search(&self, trace: &mut Trace) -> (f64, Vec<usize>) {
        let mut frontier = BinaryHeap::new();
        let mut created = 0;
        let mut push = |frontier: &mut BinaryHeap<Node>, profit, weight, decisions: Vec<bool>| {
            let bound = self.bound(profit, weight, decisions.len());
            frontier.push(Node { profit, weight, bound, decisions, sequence: created });
            created += 1;
            bound
        };

        let bound = push(&mut frontier, 0f64, 0f64, Vec::new());
        trace.record(format!("Initial node added with bound {:.3}", bound));

        let mut best_profit = 0f64;
        let mut best_decisions = Vec::new();
        while let Some(node) = frontier.pop() {
            debug!("Knapsack node at level {} with bound {}", node.level(), node.bound);
            trace.record(format!(
                "Explore node at level {} with profit {:.3}, weight {:.3}, bound {:.3}",
                node.level(), node.profit, node.weight, node.bound,
            ));

            let next = node.decisions.len();
            if next >= self.items.len() || !(node.bound - best_profit).is_strictly_positive() {
                continue;
            }
            let item = self.items[next];

            // Include the next item
            let (profit, weight) = (node.profit + item.value, node.weight + item.weight);
            let mut decisions = node.decisions.clone();
            decisions.push(true);
            trace.record(format!(
                "Include item {} (column {}): profit {:.3}, weight {:.3}",
                next, item.column, profit, weight,
            ));
            if weight <= self.capacity + EPSILON && (profit - best_profit).is_strictly_positive() {
                best_profit = profit;
                best_decisions = decisions.clone();
                trace.record(format!("New maximum profit {:.3}", best_profit));
            }
            let bound = self.bound(profit, weight, next + 1);
            if (bound - best_profit).is_strictly_positive() {
                push(&mut frontier, profit, weight, decisions);
                trace.record(format!("Node added with bound {:.3}", bound));
            }

            // Exclude the next item
            let mut decisions = node.decisions;
            decisions.push(false);
            let bound = self.bound(node.profit, node.weight, next + 1);
            trace.record(format!("Exclude item {} (column {}): bound {:.3}", next, item.column, bound));
            if (bound - best_profit).is_strictly_positive() {
                push(&mut frontier, node.profit, node.weight, decisions);
                trace.record(format!("Node added with bound {:.3}", bound));
            }
        }

        let chosen = best_decisions.iter().enumerate()
            .filter(|&(_, &included)| included)
            .map(|(item, _)| item)
            .collect();
        (best_profit, chosen)
    }

    /// Express a selection of items as a solution of the tableau.
    ///
    /// Chosen items have value one, all other columns zero, except for the column that is basic in
    /// the constraint row, which holds the unused capacity.
    fn solution(&self, tableau: &Tableau, profit: f64, chosen: &[usize]) -> Solution {
        let mut values = vec![0f64; tableau.rhs_column()];
        let mut used = 0f64;
        for &item in chosen {
            let Item { weight, column, .. } = self.items[item];
            values[column] = 1f64;
            used += weight;
        }
        if let Some(slack) = tableau.basic_column(1) {
            if values[slack] == 0f64 {
                values[slack] = self.capacity - used;
            }
        }
        for &(slack, column) in &self.upper_bounds {
            values[slack] = 1f64 - values[column];
        }

        let values = tableau.column_names().iter().cloned().zip(values).collect();
        Solution::new(profit, values)
    }
}

/// The (slack, variable) columns of a constraint row of the form `x + s = 1` with `s` basic.
fn upper_bound(tableau: &Tableau, row: usize) -> Option<(usize, usize)> {
    if !tableau.rhs(row).approx_eq(1f64) {
        return None;
    }
    let slack = tableau.basic_column(row)?;
    let mut others = (0..tableau.rhs_column())
        .filter(|&j| j != slack && !tableau[(row, j)].is_negligible());
    match (others.next(), others.next()) {
        (Some(column), None) if tableau[(row, column)].approx_eq(1f64) => Some((slack, column)),
        _ => None,
    }
}

impl std::fmt::Display for Knapsack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, item) in self.items.iter().enumerate() {
            writeln!(
                f,
                "{}: column {}, value {:.3}, weight {:.3}, ratio {:.3}",
                index, item.column, item.value, item.weight, item.ratio(),
            )?;
        }

        Ok(())
    }
}

/// A partial selection of items.
struct Node {
    profit: f64,
    weight: f64,
    bound: f64,
    /// Include or exclude, for the first items in ratio order.
    decisions: Vec<bool>,
    sequence: usize,
}

impl Node {
    /// Index of the last decided item, `-1` for the root.
    fn level(&self) -> isize {
        self.decisions.len() as isize - 1
    }
}

impl Ord for Node {
    /// Higher bound first, then older nodes.
    fn cmp(&self, other: &Self) -> Ordering {
        self.bound.total_cmp(&other.bound)
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

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::{SolveError, Trace};
    use crate::algorithm::branch_and_bound::knapsack::{Knapsack, solve};
    use crate::data::linear_program::elements::Objective;
    use crate::data::linear_program::tableau::Tableau;
    use crate::io::text::parse;
    use crate::tests::knapsack;

    #[test]
    fn textbook() {
        let tableau = knapsack();
        let report = solve(&tableau).unwrap();

        let solution = report.result.solution().unwrap();
        assert_abs_diff_eq!(solution.objective_value(), 220f64);
        assert_eq!(solution.value("x1"), Some(0f64));
        assert_eq!(solution.value("x2"), Some(1f64));
        assert_eq!(solution.value("x3"), Some(1f64));
        assert_eq!(solution.value("s1"), Some(0f64));
        assert!(report.steps.iter().any(|step| step.starts_with("Maximum profit: 220 with items {x2, x3}")));
        // Untouched
        assert_eq!(tableau, knapsack());
    }

    #[test]
    fn reduction() {
        let knapsack = Knapsack::from_tableau(&knapsack()).unwrap();
        assert_eq!(knapsack.capacity(), 50f64);
        assert_eq!(knapsack.items().iter().map(|item| item.column).collect::<Vec<_>>(), vec![0, 1, 2]);

        assert_abs_diff_eq!(knapsack.bound(0f64, 0f64, 0), 240f64);
        assert_abs_diff_eq!(knapsack.bound(60f64, 10f64, 1), 240f64);
        assert_abs_diff_eq!(knapsack.bound(0f64, 0f64, 1), 220f64);
        assert_abs_diff_eq!(knapsack.bound(280f64, 60f64, 3), 0f64);
    }

    #[test]
    fn unused_capacity() {
        // max 10 x1 + 7 x2 s.t. 4 x1 + 5 x2 <= 6
        let tableau = Tableau::new(
            vec![
                vec![-10f64, -7f64, 0f64, 0f64],
                vec![4f64, 5f64, 1f64, 6f64],
            ],
            vec!["max z".to_string(), "c1".to_string()],
            vec!["x1".to_string(), "x2".to_string(), "s1".to_string(), "rhs".to_string()],
            vec![Default::default(); 3],
        ).unwrap();
        let knapsack = Knapsack::from_tableau(&tableau).unwrap();
        let (profit, chosen) = knapsack.search(&mut Trace::new());
        assert_abs_diff_eq!(profit, 10f64);
        assert_eq!(chosen, vec![0]);

        let solution = solve(&tableau).unwrap().result.solution().cloned().unwrap();
        assert_eq!(solution.value("s1"), Some(2f64));
    }

    #[test]
    fn not_a_knapsack() {
        let minimize = Tableau::with_default_names(Objective::Minimize, vec![
            vec![1f64, 0f64, 0f64],
            vec![1f64, 1f64, 5f64],
        ]).unwrap();
        assert!(matches!(solve(&minimize), Err(SolveError::NotAKnapsack(_))));

        assert!(matches!(solve(&crate::tests::wyndor()), Err(SolveError::NotAKnapsack(_))));

        let negative_weight = Tableau::with_default_names(Objective::Maximize, vec![
            vec![-1f64, 0f64, 0f64],
            vec![-1f64, 1f64, 5f64],
        ]).unwrap();
        assert!(matches!(solve(&negative_weight), Err(SolveError::NotAKnapsack(_))));
    }

    #[test]
    fn unsorted_items() {
        // Ratios 2, 3, infinite and 3
        let tableau = Tableau::with_default_names(Objective::Maximize, vec![
            vec![-10f64, -30f64, -5f64, -12f64, 0f64, 0f64],
            vec![5f64, 10f64, 0f64, 4f64, 1f64, 12f64],
        ]).unwrap();
        let knapsack = Knapsack::from_tableau(&tableau).unwrap();
        assert_eq!(knapsack.items().iter().map(|item| item.column).collect::<Vec<_>>(), vec![2, 1, 3, 0]);
        assert_eq!(knapsack.items()[0].ratio(), f64::INFINITY);
        assert_abs_diff_eq!(knapsack.bound(0f64, 0f64, 0), 41f64);

        let solution = solve(&tableau).unwrap().result.solution().cloned().unwrap();
        assert_abs_diff_eq!(solution.objective_value(), 35f64);
        assert_eq!(solution.value("x1"), Some(0f64));
        assert_eq!(solution.value("x2"), Some(1f64));
        assert_eq!(solution.value("x3"), Some(1f64));
        assert_eq!(solution.value("x4"), Some(0f64));
        assert_eq!(solution.value("x5"), Some(2f64));
    }

    #[test]
    fn binary_upper_bounds() {
        let tableau = parse("max 60 100 120\n10 20 30 <=50\nbin bin bin").unwrap().into_tableau().unwrap();
        assert_eq!(tableau.height(), 5);

        let solution = solve(&tableau).unwrap().result.solution().cloned().unwrap();
        assert_abs_diff_eq!(solution.objective_value(), 220f64);
        assert_eq!(solution.value("s1"), Some(0f64));
        assert_eq!(solution.value("s2"), Some(1f64));
        assert_eq!(solution.value("s3"), Some(0f64));
        assert_eq!(solution.value("s4"), Some(0f64));

        let other_bound = parse("max 60 100\n10 20 <=50\n1 0 <=2\n+ +").unwrap().into_tableau().unwrap();
        assert!(matches!(solve(&other_bound), Err(SolveError::NotAKnapsack(_))));
    }
}
