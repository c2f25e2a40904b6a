//! Error types for testcase-engine

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for engine operations
///
/// Only failures that prevent a test case from being obtained end up here.
/// Failures of a test while it runs are reported as a
/// [`TestResult`](crate::TestResult) instead.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The test cases of a program could not be loaded
    #[error("Failed to load test cases from '{}': {message}", program.display())]
    Discovery { program: PathBuf, message: String },

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Create a discovery error
    pub fn discovery(program: impl AsRef<Path>, message: impl Into<String>) -> Self {
        Error::Discovery {
            program: program.as_ref().to_path_buf(),
            message: message.into(),
        }
    }
}
