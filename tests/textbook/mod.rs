//! # Small textbook problems
//!
//! Problems from introductory operations research courses, stored in the text format.
use std::path::{Path, PathBuf};

use tableau_lp::data::linear_program::tableau::Tableau;
use tableau_lp::io::import;

/// # Generation and execution
#[allow(missing_docs)]
mod test;

/// Relative path of the folder where the problem files are stored.
///
/// The path is relative to the project root folder.
fn problem_file_directory() -> PathBuf {
    Path::new(file!()).parent().unwrap().to_path_buf()
}

/// Compute the path of the problem file, based on the problem name.
///
/// # Arguments
///
/// * `name`: Problem name without extension.
///
/// # Return value
///
/// File path relative to the project root folder.
fn get_test_file_path(name: &str) -> PathBuf {
    problem_file_directory().join(name).with_extension("txt")
}

/// Read a problem file and build its initial tableau.
fn to_tableau(name: &str) -> Tableau {
    import(&get_test_file_path(name)).unwrap().into_tableau().unwrap()
}
