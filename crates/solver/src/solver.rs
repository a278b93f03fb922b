use std::io::Write;
use std::process::{Command, Stdio};
use std::time::Instant;

use crc_crack_smtlib::command::Command as SmtCmd;
use crc_crack_smtlib::script::Script;

use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::parser::parse_solver_output;
use crate::result::SolverResult;

/// Subprocess SMT solver (Z3, CVC5 or Yices).
///
/// Each check spawns the configured binary, pipes the script as SMT-LIB2
/// text to its stdin and parses the verdict and model from stdout.
#[derive(Debug, Clone)]
pub struct CliSolver {
    config: SolverConfig,
}

impl CliSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Auto-detect Z3 with default settings.
    pub fn with_default_config() -> Result<Self, SolverError> {
        Self::with_default_config_for(SolverKind::Z3)
    }

    /// Auto-detect the given solver with default settings.
    pub fn with_default_config_for(kind: SolverKind) -> Result<Self, SolverError> {
        Ok(Self::new(SolverConfig::auto_detect_for(kind)?))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Check satisfiability of a script.
    ///
    /// `(check-sat)` and `(get-model)` are appended when the script does not
    /// already contain them.
    pub fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        let mut smtlib = script.to_string();
        ensure_check_sat_and_get_model(&mut smtlib, script);
        tracing::trace!("{} input:\n{smtlib}", self.config.kind);
        self.check_sat_raw(&smtlib)
    }

    /// Check satisfiability of hand-written SMT-LIB2 text.
    pub fn check_sat_raw(&self, smtlib: &str) -> Result<SolverResult, SolverError> {
        self.config.validate()?;
        let start = Instant::now();
        let kind = self.config.kind;

        let mut child = Command::new(&self.config.solver_path)
            .args(self.config.build_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::ProcessError(format!("Failed to start {kind}: {e}")))?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                SolverError::ProcessError(format!("Failed to open {kind} stdin"))
            })?;
            stdin.write_all(smtlib.as_bytes()).map_err(|e| {
                SolverError::ProcessError(format!("Failed to write to {kind} stdin: {e}"))
            })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SolverError::ProcessError(format!("Failed to wait for {kind}: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stdout.trim() == "timeout" {
            return Err(SolverError::Timeout);
        }

        let result = parse_solver_output(&stdout, &stderr);
        tracing::debug!(
            "{kind}: {} in {:?}",
            result.as_ref().map(SolverResult::label).unwrap_or("error"),
            start.elapsed()
        );
        result
    }
}

/// Ensure the SMT-LIB text ends with `(check-sat)` and `(get-model)`.
fn ensure_check_sat_and_get_model(smtlib: &mut String, script: &Script) {
    let has = |wanted: &SmtCmd| script.commands().iter().any(|c| c == wanted);

    if !has(&SmtCmd::CheckSat) {
        smtlib.push_str("(check-sat)\n");
    }
    if !has(&SmtCmd::GetModel) {
        smtlib.push_str("(get-model)\n");
    }
}
