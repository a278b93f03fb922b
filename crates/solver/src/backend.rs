//! One-shot solver backends.
//!
//! A `SolverBackend` answers a single satisfiability question about a whole
//! script. Incremental use (declare, assert, check, repeat) is layered on top
//! by [`ScriptSession`](crate::session::ScriptSession), which replays the
//! accumulated script on every check.

use crc_crack_smtlib::script::Script;

use crate::error::SolverError;
use crate::result::SolverResult;
use crate::solver::CliSolver;

/// Trait abstracting over one-shot solver implementations.
pub trait SolverBackend {
    /// Check satisfiability of the given SMT script.
    ///
    /// Returns:
    /// - `Ok(SolverResult::Sat(model))` if satisfiable
    /// - `Ok(SolverResult::Unsat)` if unsatisfiable
    /// - `Ok(SolverResult::Unknown(reason))` if the solver couldn't decide
    /// - `Err(SolverError)` if the solver invocation failed
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError>;
}

impl SolverBackend for CliSolver {
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        CliSolver::check_sat(self, script)
    }
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        (**self).check_sat(script)
    }
}
