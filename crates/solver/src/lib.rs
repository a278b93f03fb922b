//! # crc-crack-solver
//!
//! Incremental SMT solver sessions for bit-vector queries.
//!
//! Three implementations of [`SolverSession`] are provided:
//!
//! - [`ScriptSession`] over [`CliSolver`], which pipes SMT-LIB2 text to a
//!   Z3, CVC5 or Yices process on every check;
//! - `Z3NativeSession` (feature `z3-native`), which keeps an in-process Z3
//!   solver alive between checks;
//! - [`ReferenceSolver`], an exhaustive evaluator for tiny problems.
//!
//! ## Usage
//!
//! ```no_run
//! use crc_crack_smtlib::sort::Sort;
//! use crc_crack_smtlib::term::Term;
//! use crc_crack_solver::{SolverKind, SolverResult, SolverSession, create_session};
//!
//! let mut session = create_session(SolverKind::Z3, None, 0).unwrap();
//! session.declare("x", Sort::BitVec(8)).unwrap();
//! session.add(Term::bvuge(Term::var("x"), Term::bv(0x61, 8))).unwrap();
//!
//! match session.check().unwrap() {
//!     SolverResult::Sat(model) => println!("SAT: {model:?}"),
//!     SolverResult::Unsat => println!("UNSAT"),
//!     SolverResult::Unknown(reason) => println!("Unknown: {reason}"),
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
mod parser;
pub mod reference;
pub mod result;
pub mod session;
pub mod solver;
#[cfg(feature = "z3-native")]
pub mod z3_native;

pub use backend::SolverBackend;
pub use config::{SolverConfig, SolverKind};
pub use error::SolverError;
pub use model::{Model, parse_bitvec_literal};
pub use parser::parse_solver_output;
pub use reference::ReferenceSolver;
pub use result::SolverResult;
pub use session::{ScriptSession, SolverSession, create_session};
pub use solver::CliSolver;
#[cfg(feature = "z3-native")]
pub use z3_native::Z3NativeSession;
