use std::fmt;

use crc_crack_solver::SolverError;

/// Fatal errors of a search. Satisfiability outcomes are not errors.
#[derive(Debug, PartialEq)]
pub enum SearchError {
    /// The solver failed to run or answer.
    Solver(SolverError),
    /// The solver answered `unknown`, with its reason.
    Inconclusive(String),
    /// The solver answered `sat` without a model.
    MissingModel,
    /// A byte variable's value is not a byte.
    BadModelValue { var: String, value: String },
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Solver(e) => write!(f, "{e}"),
            SearchError::Inconclusive(reason) => write!(f, "Solver returned unknown: {reason}"),
            SearchError::MissingModel => write!(f, "Solver reported sat without a model"),
            SearchError::BadModelValue { var, value } => {
                write!(f, "Model value for {var} is not a byte: {value}")
            }
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SolverError> for SearchError {
    fn from(e: SolverError) -> Self {
        SearchError::Solver(e)
    }
}
