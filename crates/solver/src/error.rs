use std::fmt;
use std::path::PathBuf;

use crate::config::SolverKind;

/// Errors from solver interaction.
#[derive(Debug)]
pub enum SolverError {
    /// Solver binary not found at the specified path.
    NotFound(SolverKind, PathBuf),
    /// Process failed to start or crashed.
    ProcessError(String),
    /// Failed to parse solver output.
    ParseError(String),
    /// Timeout exceeded.
    Timeout,
    /// The backend cannot handle the given query (sort, term or size).
    Unsupported(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::NotFound(kind, path) => {
                write!(f, "{kind} binary not found at: {}", path.display())
            }
            SolverError::ProcessError(msg) => write!(f, "Solver process error: {msg}"),
            SolverError::ParseError(msg) => write!(f, "Failed to parse solver output: {msg}"),
            SolverError::Timeout => write!(f, "Solver timeout exceeded"),
            SolverError::Unsupported(msg) => write!(f, "Unsupported by solver backend: {msg}"),
        }
    }
}

impl std::error::Error for SolverError {}

impl PartialEq for SolverError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SolverError::NotFound(k1, a), SolverError::NotFound(k2, b)) => k1 == k2 && a == b,
            (SolverError::ProcessError(a), SolverError::ProcessError(b)) => a == b,
            (SolverError::ParseError(a), SolverError::ParseError(b)) => a == b,
            (SolverError::Timeout, SolverError::Timeout) => true,
            (SolverError::Unsupported(a), SolverError::Unsupported(b)) => a == b,
            _ => false,
        }
    }
}
