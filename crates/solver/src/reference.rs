//! Exhaustive reference solver.
//!
//! Enumerates every assignment of the declared constants and evaluates the
//! assertions directly. Constants pinned by a top-level `(= c literal)`
//! assertion take that value and are not enumerated. Only usable for a
//! handful of free bits, but needs no external solver, which makes it the
//! oracle for unit tests.

use crc_crack_smtlib::eval::{Assignment, Value, eval_bool};
use crc_crack_smtlib::sort::Sort;
use crc_crack_smtlib::term::Term;

use crate::error::SolverError;
use crate::model::Model;
use crate::result::SolverResult;
use crate::session::SolverSession;

/// Brute-force session over at most `max_bits` free bits.
#[derive(Debug, Clone)]
pub struct ReferenceSolver {
    declared: Vec<(String, Sort)>,
    assertions: Vec<Term>,
    max_bits: u32,
    model: Option<Model>,
}

impl ReferenceSolver {
    pub const DEFAULT_MAX_BITS: u32 = 24;

    pub fn new() -> Self {
        Self::with_max_bits(Self::DEFAULT_MAX_BITS)
    }

    pub fn with_max_bits(max_bits: u32) -> Self {
        Self {
            declared: Vec::new(),
            assertions: Vec::new(),
            max_bits: max_bits.min(63),
            model: None,
        }
    }

    /// Split the declarations into constants fixed by a top-level equality
    /// with a literal and constants left to enumerate. The pinning
    /// assertions are still evaluated, so conflicting pins come out unsat.
    fn partition(&self) -> (Vec<(String, Value)>, Vec<(String, Sort)>) {
        let mut pinned: Vec<(String, Value)> = Vec::new();
        let mut free = Vec::new();
        for (name, sort) in &self.declared {
            let pin = self
                .assertions
                .iter()
                .find_map(|assertion| pinned_value(assertion, name, *sort));
            match pin {
                Some(value) => pinned.push((name.clone(), value)),
                None => free.push((name.clone(), *sort)),
            }
        }
        (pinned, free)
    }
}

fn pinned_value(assertion: &Term, name: &str, sort: Sort) -> Option<Value> {
    let Term::Eq(a, b) = assertion else {
        return None;
    };
    let (constant, value, width) = match (a.as_ref(), b.as_ref()) {
        (Term::Const(n), Term::BitVecLit(v, w)) | (Term::BitVecLit(v, w), Term::Const(n)) => {
            (n, *v, *w)
        }
        _ => return None,
    };
    (constant == name && sort == Sort::BitVec(width)).then(|| Value::bitvec(value, width))
}

/// Decode the `index`-th assignment of the `free` constants. The first one
/// occupies the lowest bits.
fn assign_free(free: &[(String, Sort)], mut index: u64, assignment: &mut Assignment) {
    for (name, sort) in free {
        let value = match sort {
            Sort::Bool => {
                let bit = index & 1 == 1;
                index >>= 1;
                Value::Bool(bit)
            }
            Sort::BitVec(width) => {
                let mask = (1u64 << width) - 1;
                let bits = index & mask;
                index >>= width;
                Value::bitvec(u128::from(bits), *width)
            }
        };
        assignment.set(name.clone(), value);
    }
}

impl Default for ReferenceSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverSession for ReferenceSolver {
    fn declare(&mut self, name: &str, sort: Sort) -> Result<(), SolverError> {
        if self.declared.iter().any(|(n, _)| n == name) {
            return Err(SolverError::ParseError(format!(
                "constant {name} declared twice"
            )));
        }
        self.declared.push((name.to_string(), sort));
        Ok(())
    }

    fn add(&mut self, formula: Term) -> Result<(), SolverError> {
        self.assertions.push(formula);
        Ok(())
    }

    fn check(&mut self) -> Result<SolverResult, SolverError> {
        self.model = None;
        let (pinned, free) = self.partition();
        let bits: u32 = free.iter().map(|(_, sort)| sort.width()).sum();
        if bits > self.max_bits {
            return Err(SolverError::Unsupported(format!(
                "{bits} free bits exceeds the reference solver limit of {}",
                self.max_bits
            )));
        }

        // Cheap assertions first so most candidates are rejected early.
        let mut order: Vec<&Term> = self.assertions.iter().collect();
        order.sort_by_key(|t| t.size());

        let mut assignment = Assignment::new();
        for (name, value) in pinned {
            assignment.set(name, value);
        }
        for index in 0..(1u64 << bits) {
            assign_free(&free, index, &mut assignment);
            let mut holds = true;
            for assertion in &order {
                let value = eval_bool(assertion, &assignment)
                    .map_err(|e| SolverError::Unsupported(format!("cannot evaluate: {e}")))?;
                if !value {
                    holds = false;
                    break;
                }
            }
            if holds {
                let model = Model::with_assignments(
                    self.declared
                        .iter()
                        .filter_map(|(name, _)| {
                            assignment.get(name).map(|v| (name.clone(), v.to_string()))
                        })
                        .collect(),
                );
                tracing::trace!("reference solver: sat after {} candidates", index + 1);
                self.model = Some(model.clone());
                return Ok(SolverResult::Sat(Some(model)));
            }
        }
        tracing::trace!("reference solver: unsat over {bits} bits");
        Ok(SolverResult::Unsat)
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn assertion_count(&self) -> usize {
        self.assertions.len()
    }
}
