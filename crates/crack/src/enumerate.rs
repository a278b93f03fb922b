//! Solve, extract, block, repeat.

use std::ops::ControlFlow;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crc_crack_smtlib::term::Term;
use crc_crack_solver::{SolverResult, SolverSession};

use crate::candidate::Candidate;
use crate::constraints::{BYTE, ConstraintSet};
use crate::error::SearchError;

/// The clause excluding exactly the assignment `bytes`:
/// `(not (and (= s0 v0) ... (= sN vN)))`.
pub fn blocking_clause(constraints: &ConstraintSet, bytes: &[u8]) -> Term {
    Term::negate(Term::And(
        constraints
            .vars()
            .iter()
            .zip(bytes)
            .map(|(var, &byte)| {
                Term::equal(Term::var(var.as_str()), Term::bv(u128::from(byte), 8))
            })
            .collect(),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Exhausted,
    Cancelled,
}

/// When [`Enumerator::search`] stops before exhaustion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopPolicy {
    /// Stop with success once a candidate's text equals this.
    pub plaintext: Option<String>,
    /// Stop after this many candidates.
    pub limit: Option<usize>,
}

impl StopPolicy {
    /// Run until the solver runs out of candidates.
    pub fn exhaustive() -> Self {
        Self::default()
    }

    pub fn until_plaintext(plaintext: impl Into<String>) -> Self {
        Self {
            plaintext: Some(plaintext.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// How a search ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A candidate matched the known plaintext.
    Found(Candidate),
    /// No candidates remain.
    Exhausted { emitted: usize },
    /// The policy's candidate limit was reached.
    LimitReached { emitted: usize },
    /// Cancelled by the flag or by the sink.
    Cancelled { emitted: usize },
}

/// Lazily enumerates distinct candidates satisfying a [`ConstraintSet`].
///
/// Each `next()` runs one solver check. On `sat` the model is decoded into a
/// [`Candidate`], and a blocking clause for it is appended to the constraint
/// set and to the session before the candidate is returned. On `unsat` the
/// sequence ends for good. Solver failures are yielded once as `Err`, after
/// which the sequence also ends.
pub struct Enumerator<S> {
    session: S,
    constraints: ConstraintSet,
    state: State,
    emitted: usize,
    cancel: Option<Arc<AtomicBool>>,
}

impl<S: SolverSession> Enumerator<S> {
    /// Declare every byte variable and add every formula to `session`.
    pub fn new(mut session: S, constraints: ConstraintSet) -> Result<Self, SearchError> {
        for var in constraints.vars() {
            session.declare(var, BYTE)?;
        }
        for formula in constraints.formulas() {
            session.add(formula.clone())?;
        }
        Ok(Self {
            session,
            constraints,
            state: State::Ready,
            emitted: 0,
            cancel: None,
        })
    }

    /// Stop before the next check once `flag` is raised.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Candidates returned so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == State::Exhausted
    }

    pub fn is_cancelled(&self) -> bool {
        self.state == State::Cancelled
    }

    fn cancel_requested(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// One check. `Ok(None)` on unsat.
    fn solve(&mut self) -> Result<Option<Candidate>, SearchError> {
        let start = Instant::now();
        let result = self.session.check()?;
        tracing::debug!(
            "check #{}: {} in {:?} ({} clauses)",
            self.emitted + 1,
            result.label(),
            start.elapsed(),
            self.session.assertion_count()
        );

        match result {
            SolverResult::Unsat => Ok(None),
            SolverResult::Unknown(reason) => Err(SearchError::Inconclusive(reason)),
            SolverResult::Sat(_) => {
                let bytes = self.decode_model()?;
                let clause = blocking_clause(&self.constraints, &bytes);
                self.constraints.push_blocking(clause.clone());
                self.session.add(clause)?;
                self.emitted += 1;
                Ok(Some(Candidate::new(bytes)))
            }
        }
    }

    /// Read every byte variable from the session's model. Variables the
    /// model leaves out are unconstrained and read as 0.
    fn decode_model(&self) -> Result<Vec<u8>, SearchError> {
        let model = self.session.model().ok_or(SearchError::MissingModel)?;
        self.constraints
            .vars()
            .iter()
            .map(|var| match model.bitvec(var) {
                None => Ok(0),
                Some(Ok(value)) => u8::try_from(value).map_err(|_| SearchError::BadModelValue {
                    var: var.clone(),
                    value: format!("{value:#x}"),
                }),
                Some(Err(raw)) => Err(SearchError::BadModelValue {
                    var: var.clone(),
                    value: raw,
                }),
            })
            .collect()
    }

    /// Drive the enumeration, handing each candidate to `sink`.
    ///
    /// A candidate matching `policy.plaintext` ends the search as
    /// [`SearchOutcome::Found`] and is not passed to `sink`. A sink returning
    /// `Break` cancels the search.
    pub fn search<F>(
        &mut self,
        policy: &StopPolicy,
        mut sink: F,
    ) -> Result<SearchOutcome, SearchError>
    where
        F: FnMut(&Candidate) -> ControlFlow<()>,
    {
        while let Some(next) = self.next() {
            let candidate = next?;
            if let Some(plaintext) = &policy.plaintext
                && candidate.text() == Some(plaintext.as_str())
            {
                return Ok(SearchOutcome::Found(candidate));
            }
            if sink(&candidate).is_break() {
                self.state = State::Cancelled;
                break;
            }
            if policy.limit.is_some_and(|limit| self.emitted >= limit) {
                return Ok(SearchOutcome::LimitReached {
                    emitted: self.emitted,
                });
            }
        }

        let emitted = self.emitted;
        Ok(match self.state {
            State::Cancelled => SearchOutcome::Cancelled { emitted },
            State::Ready | State::Exhausted => SearchOutcome::Exhausted { emitted },
        })
    }
}

impl<S: SolverSession> Iterator for Enumerator<S> {
    type Item = Result<Candidate, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != State::Ready {
            return None;
        }
        if self.cancel_requested() {
            tracing::debug!("Cancelled after {} candidates", self.emitted);
            self.state = State::Cancelled;
            return None;
        }
        match self.solve() {
            Ok(Some(candidate)) => Some(Ok(candidate)),
            Ok(None) => {
                tracing::debug!("Exhausted after {} candidates", self.emitted);
                self.state = State::Exhausted;
                None
            }
            Err(e) => {
                self.state = State::Exhausted;
                Some(Err(e))
            }
        }
    }
}
