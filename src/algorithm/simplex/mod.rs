//! # The simplex method
//!
//! The primal phase moves between primal feasible bases until the objective row shows no more
//! improving column. The dual phase moves between bases that are not primal feasible until they
//! are, after which the primal phase takes over.
use crate::algorithm::{OptimizationResult, SolveError, Trace};
use crate::data::linear_program::tableau::Tableau;

pub mod dual;
pub mod primal;

/// Solve the linear relaxation of the problem described by a tableau.
///
/// Integrality restrictions are ignored. When the tableau is not primal feasible, the dual phase
/// restores feasibility first.
///
/// # Arguments
///
/// * `tableau`: Tableau in canonical form, modified in place.
/// * `trace`: Steps get appended to this trace.
pub fn solve_relaxation(tableau: &mut Tableau, trace: &mut Trace) -> Result<OptimizationResult, SolveError> {
    if tableau.is_primal_feasible() {
        primal::run(tableau, trace)
    } else {
        dual::run(tableau, trace)
    }
}
