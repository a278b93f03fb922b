use std::fmt;
use std::path::PathBuf;

use crate::error::SolverError;

/// Supported external SMT solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    /// Z3 from Microsoft Research.
    Z3,
    /// CVC5 from Stanford/Iowa.
    Cvc5,
    /// Yices2 from SRI International.
    Yices,
}

impl SolverKind {
    /// Binary name used for PATH lookup.
    pub fn binary_name(&self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices-smt2",
        }
    }

    /// Common installation paths to check when PATH lookup fails.
    fn common_paths(&self) -> &'static [&'static str] {
        match self {
            SolverKind::Z3 => &["/opt/homebrew/bin/z3", "/usr/local/bin/z3", "/usr/bin/z3"],
            SolverKind::Cvc5 => &[
                "/opt/homebrew/bin/cvc5",
                "/usr/local/bin/cvc5",
                "/usr/bin/cvc5",
            ],
            SolverKind::Yices => &[
                "/opt/homebrew/bin/yices-smt2",
                "/usr/local/bin/yices-smt2",
                "/usr/bin/yices-smt2",
            ],
        }
    }

    /// Arguments that make the solver read an SMT-LIB2 script from stdin.
    pub fn stdin_args(&self) -> Vec<String> {
        match self {
            SolverKind::Z3 => vec!["-smt2".to_string(), "-in".to_string()],
            SolverKind::Cvc5 => vec![
                "--lang".to_string(),
                "smt2".to_string(),
                "--produce-models".to_string(),
            ],
            SolverKind::Yices => Vec::new(),
        }
    }

    /// Solver-specific per-query timeout argument, if supported.
    pub fn timeout_arg(&self, timeout_ms: u64) -> Option<String> {
        if timeout_ms == 0 {
            return None;
        }
        match self {
            SolverKind::Z3 => Some(format!("-t:{timeout_ms}")),
            SolverKind::Cvc5 => Some(format!("--tlimit-per={timeout_ms}")),
            // Yices only takes whole seconds; round up so short limits still apply.
            SolverKind::Yices => Some(format!("--timeout={}", timeout_ms.div_ceil(1000))),
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverKind::Z3 => write!(f, "Z3"),
            SolverKind::Cvc5 => write!(f, "CVC5"),
            SolverKind::Yices => write!(f, "Yices"),
        }
    }
}

impl std::str::FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z3" => Ok(SolverKind::Z3),
            "cvc5" => Ok(SolverKind::Cvc5),
            "yices" | "yices2" | "yices-smt2" => Ok(SolverKind::Yices),
            _ => Err(format!("Unknown solver: {s}. Valid options: z3, cvc5, yices")),
        }
    }
}

/// Configuration of an external solver process.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Which solver to run.
    pub kind: SolverKind,
    /// Path to the solver binary.
    pub solver_path: PathBuf,
    /// Per-query timeout in milliseconds (0 = no timeout).
    pub timeout_ms: u64,
}

impl SolverConfig {
    pub fn new(kind: SolverKind, solver_path: PathBuf) -> Self {
        Self {
            kind,
            solver_path,
            timeout_ms: 0,
        }
    }

    /// Set the per-query timeout (in milliseconds).
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Auto-detect the solver binary for `kind`.
    ///
    /// Tries `which <binary>` first, then common installation paths.
    pub fn auto_detect_for(kind: SolverKind) -> Result<Self, SolverError> {
        let binary = kind.binary_name();

        if let Some(path) = which(binary) {
            return Ok(Self::new(kind, path));
        }

        kind.common_paths()
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
            .map(|path| Self::new(kind, path))
            .ok_or_else(|| SolverError::NotFound(kind, PathBuf::from(binary)))
    }

    /// Auto-detect Z3.
    pub fn auto_detect() -> Result<Self, SolverError> {
        Self::auto_detect_for(SolverKind::Z3)
    }

    /// Use `path` when given, otherwise auto-detect.
    pub fn locate(kind: SolverKind, path: Option<PathBuf>) -> Result<Self, SolverError> {
        match path {
            Some(path) => {
                let config = Self::new(kind, path);
                config.validate()?;
                Ok(config)
            }
            None => Self::auto_detect_for(kind),
        }
    }

    /// Full argument list for one solver invocation.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.kind.stdin_args();

        if let Some(timeout_arg) = self.kind.timeout_arg(self.timeout_ms) {
            args.push(timeout_arg);
        }
        args
    }

    /// Validate that the configured solver binary exists.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.solver_path.exists() {
            return Err(SolverError::NotFound(self.kind, self.solver_path.clone()));
        }
        Ok(())
    }
}

fn which(binary: &str) -> Option<PathBuf> {
    let output = std::process::Command::new("which")
        .arg(binary)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let path = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
    (!path.as_os_str().is_empty() && path.exists()).then_some(path)
}
