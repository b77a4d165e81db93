//! # A simplex tableau solver
//!
//! Linear and integer programs are solved by pivoting on a dense simplex tableau. Every algorithm
//! records the steps it takes as human-readable text, such that a solve can be followed pivot by
//! pivot.
//!
//! Available algorithms are the primal and dual simplex method, branch and bound (both general and
//! specialized for the 0/1 knapsack problem) and Gomory's cutting plane method. An optimal tableau
//! can be analysed for the sensitivity of its objective function coefficients.
#![warn(missing_docs)]

pub mod algorithm;
pub mod data;
pub mod io;

#[cfg(test)]
mod tests;
