//! # Error reporting for reading of problem files
//!
//! A collection of enums describing any problems encountered during reading and parsing.
use std::io;

use thiserror::Error;

use crate::data::linear_program::tableau::TableauError;

/// An `ImportError` is created when an error was encountered during IO or parsing.
///
/// It is the highest error in the io error hierarchy.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The file extension of the provided file path is not known or supported.
    ///
    /// The contained `String` is a message for the end user.
    #[error("{0}")]
    FileExtension(String),
    /// The file to read isn't found, or the reading of file couldn't start or was interrupted.
    #[error("Couldn't read the problem file")]
    IO(#[from] io::Error),
    /// Contents of the file could not be parsed into a problem.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The parsed problem doesn't fit in a tableau, for example because it has no constraints.
    #[error("Inconsistent problem")]
    Inconsistency(#[from] TableauError),
}

/// A `ParseError` represents all errors encountered during parsing.
///
/// Errors caused by a specific line carry the line number, as in the file, and the line itself.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    /// There are no lines with content.
    #[error("The problem is empty")]
    Empty,
    /// Only an objective function was found.
    #[error("Missing the line with variable restrictions")]
    MissingRestrictions,
    /// A line couldn't be parsed.
    #[error("{description}\n\tCaused at line\t{line_number}:\t{line}")]
    Line {
        /// What is wrong.
        description: String,
        /// Line number in the file, starting at `1`.
        line_number: usize,
        /// Contents of the line.
        line: String,
    },
}

impl ParseError {
    /// Create a new `ParseError` caused by a specific line.
    ///
    /// # Arguments
    ///
    /// * `description`: What's wrong at the moment of creation.
    /// * `file_location`: A reference to a line number and line that caused the error.
    pub fn with_file_location(description: impl Into<String>, file_location: FileLocation) -> Self {
        let (line_number, line) = file_location;
        ParseError::Line {
            description: description.into(),
            line_number,
            line: line.to_string(),
        }
    }

    /// Line number that caused this error, if any.
    pub fn line_number(&self) -> Option<usize> {
        match self {
            ParseError::Line { line_number, .. } => Some(*line_number),
            _ => None,
        }
    }
}

/// A `FileLocation` references a line in the file by the line number of the file as originally
/// read from the disk. It contains a reference to the line itself.
pub type FileLocation<'a> = (usize, &'a str);
