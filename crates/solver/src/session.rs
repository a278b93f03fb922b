//! Incremental solver sessions.
//!
//! A session is the solver service the search engine talks to: constants are
//! declared once, formulas are added over time, and each `check` answers for
//! everything added so far.

use std::path::PathBuf;

use crc_crack_smtlib::command::Command as SmtCmd;
use crc_crack_smtlib::script::Script;
use crc_crack_smtlib::sort::Sort;
use crc_crack_smtlib::term::Term;

use crate::backend::SolverBackend;
use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::model::Model;
use crate::result::SolverResult;
use crate::solver::CliSolver;

/// An incremental SMT solver.
pub trait SolverSession {
    /// Declare a free constant.
    fn declare(&mut self, name: &str, sort: Sort) -> Result<(), SolverError>;

    /// Assert a Bool formula. It stays asserted for every later check.
    fn add(&mut self, formula: Term) -> Result<(), SolverError>;

    /// Check satisfiability of all formulas added so far.
    fn check(&mut self) -> Result<SolverResult, SolverError>;

    /// Model of the most recent `check`, if it was `Sat`.
    fn model(&self) -> Option<&Model>;

    /// Number of formulas added so far.
    fn assertion_count(&self) -> usize;
}

impl<S: SolverSession + ?Sized> SolverSession for Box<S> {
    fn declare(&mut self, name: &str, sort: Sort) -> Result<(), SolverError> {
        (**self).declare(name, sort)
    }

    fn add(&mut self, formula: Term) -> Result<(), SolverError> {
        (**self).add(formula)
    }

    fn check(&mut self) -> Result<SolverResult, SolverError> {
        (**self).check()
    }

    fn model(&self) -> Option<&Model> {
        (**self).model()
    }

    fn assertion_count(&self) -> usize {
        (**self).assertion_count()
    }
}

/// Session that accumulates a `QF_BV` script and replays it through a
/// one-shot backend on every check.
#[derive(Debug)]
pub struct ScriptSession<B> {
    backend: B,
    script: Script,
    model: Option<Model>,
}

impl<B: SolverBackend> ScriptSession<B> {
    pub fn new(backend: B) -> Self {
        let script = Script::with_commands(vec![
            SmtCmd::SetLogic("QF_BV".to_string()),
            SmtCmd::SetOption("produce-models".to_string(), "true".to_string()),
        ]);
        Self {
            backend,
            script,
            model: None,
        }
    }

    /// The script replayed on each check.
    pub fn script(&self) -> &Script {
        &self.script
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SolverBackend> SolverSession for ScriptSession<B> {
    fn declare(&mut self, name: &str, sort: Sort) -> Result<(), SolverError> {
        self.script
            .push(SmtCmd::DeclareConst(name.to_string(), sort));
        Ok(())
    }

    fn add(&mut self, formula: Term) -> Result<(), SolverError> {
        self.script.push(SmtCmd::Assert(formula));
        Ok(())
    }

    fn check(&mut self) -> Result<SolverResult, SolverError> {
        self.model = None;
        let result = self.backend.check_sat(&self.script)?;
        self.model = result.model().cloned();
        Ok(result)
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn assertion_count(&self) -> usize {
        self.script.assertion_count()
    }
}

/// Create a session for the given solver.
///
/// With the `z3-native` feature, Z3 without an explicit binary path uses the
/// in-process API. Every other combination spawns the solver binary, located
/// at `path` or auto-detected.
pub fn create_session(
    kind: SolverKind,
    path: Option<PathBuf>,
    timeout_ms: u64,
) -> Result<Box<dyn SolverSession>, SolverError> {
    #[cfg(feature = "z3-native")]
    if kind == SolverKind::Z3 && path.is_none() {
        tracing::debug!("Using Z3 native API session");
        return Ok(Box::new(crate::z3_native::Z3NativeSession::new(timeout_ms)));
    }

    let config = SolverConfig::locate(kind, path)?.with_timeout(timeout_ms);
    tracing::debug!("Using {kind} subprocess at {}", config.solver_path.display());
    Ok(Box::new(ScriptSession::new(CliSolver::new(config))))
}
