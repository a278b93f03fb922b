//! # crc-crack-smtlib
//!
//! SMT-LIB2 abstract syntax for the quantifier-free bit-vector fragment
//! (`QF_BV`), its textual formatting, and a concrete evaluator.
//!
//! Terms are built with the helper constructors on [`Term`] and rendered to
//! SMT-LIB2 through `Display`:
//!
//! ```
//! use crc_crack_smtlib::term::Term;
//!
//! let t = Term::negate(Term::equal(Term::var("s0"), Term::bv(b'_' as u128, 8)));
//! assert_eq!(t.to_string(), "(not (= s0 #x5f))");
//! ```

pub mod command;
pub mod eval;
mod formatter;
pub mod script;
pub mod sort;
pub mod term;
