//! # Linear programs
//!
//! The tableau representation that all algorithms operate on, and the building blocks it is
//! described with.
pub mod elements;
pub mod solution;
pub mod tableau;
