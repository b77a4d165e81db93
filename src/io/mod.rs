//! # Reading of problems
//!
//! Problems are described in a small text format, see the `text` module.
use std::fs;
use std::path::Path;

use log::info;

use crate::io::error::ImportError;
use crate::io::text::Problem;

pub mod error;
pub mod text;

/// Import a problem from a file.
///
/// Files without an extension, or with a `txt` or `lp` extension, are read in the text format.
///
/// # Errors
///
/// When a file extension is unknown, a file cannot be found or read, or the contents are not a
/// valid problem.
pub fn import(file_path: &Path) -> Result<Problem, ImportError> {
    match file_path.extension().map(|extension| extension.to_str()) {
        None | Some(Some("txt" | "lp")) => {},
        Some(Some(extension)) => return Err(ImportError::FileExtension(format!(
            "Could not recognise file extension \"{}\" of file: {:?}",
            extension, file_path,
        ))),
        Some(None) => return Err(ImportError::FileExtension(format!(
            "Could not convert OsStr to &str, probably invalid unicode: {:?}",
            file_path,
        ))),
    }

    let program = fs::read_to_string(file_path)?;
    let problem = text::parse(&program)?;
    info!(
        "Read a problem with {} variables and {} constraints from {:?}",
        problem.nr_variables(), problem.constraints.len(), file_path,
    );

    Ok(problem)
}
