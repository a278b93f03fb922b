use crate::model::Model;

/// Outcome of a satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// The assertions have a solution; the model, when the solver printed one.
    Sat(Option<Model>),
    /// No assignment satisfies the assertions.
    Unsat,
    /// Solver couldn't decide (timeout, resource limit, incompleteness).
    Unknown(String),
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SolverResult::Unknown(_))
    }

    /// Returns the model if the result is `Sat` with a model.
    pub fn model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(Some(model)) => Some(model),
            _ => None,
        }
    }

    /// Short lowercase label, as the solver would print it.
    pub fn label(&self) -> &'static str {
        match self {
            SolverResult::Sat(_) => "sat",
            SolverResult::Unsat => "unsat",
            SolverResult::Unknown(_) => "unknown",
        }
    }
}
