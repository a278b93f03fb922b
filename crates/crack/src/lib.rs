//! # crc-crack
//!
//! Finds byte strings of a fixed length whose CRC-32 equals a target, under
//! lexical constraints: a pinned prefix and suffix, a required substring,
//! an identifier alphabet after the prefix and no doubled `_`.
//!
//! The checksum is modelled symbolically ([`checksum::crc32_term`]), the
//! constraints are collected by [`ConstraintBuilder`], and an [`Enumerator`]
//! asks an SMT solver for one solution at a time, blocking each one so the
//! next answer is different.
//!
//! ```no_run
//! use std::ops::ControlFlow;
//!
//! use crc_crack::{ConstraintBuilder, Enumerator, SearchConfig, StopPolicy};
//! use crc_crack_solver::{SolverKind, create_session};
//!
//! let config = SearchConfig::default();
//! let constraints = ConstraintBuilder::new(&config).build();
//! let session = create_session(SolverKind::Z3, None, 0).unwrap();
//! let mut enumerator = Enumerator::new(session, constraints).unwrap();
//! let outcome = enumerator
//!     .search(&StopPolicy::exhaustive().with_limit(10), |candidate| {
//!         println!("{candidate}");
//!         ControlFlow::Continue(())
//!     })
//!     .unwrap();
//! println!("{outcome:?}");
//! ```

pub mod candidate;
pub mod checksum;
pub mod config;
pub mod constraints;
pub mod enumerate;
pub mod error;

pub use candidate::Candidate;
pub use config::{Alphabet, ConfigIssue, SearchConfig};
pub use constraints::{ConstraintBuilder, ConstraintSet};
pub use enumerate::{Enumerator, SearchOutcome, StopPolicy, blocking_clause};
pub use error::SearchError;
