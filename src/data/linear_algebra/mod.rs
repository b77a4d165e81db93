//! # Linear algebra
//!
//! The dense storage backing a tableau.
pub mod matrix;
