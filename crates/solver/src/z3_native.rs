//! Native Z3 API session using the z3 crate.
//!
//! `Z3NativeSession` keeps one Z3 solver alive for the whole enumeration, so
//! each check only pays for the formulas added since the previous one instead
//! of replaying a script through a fresh process.
//!
//! ## Requirements
//!
//! The z3 crate links against the system Z3 library.
//!
//! - macOS: `brew install z3`
//! - Ubuntu/Debian: `apt-get install libz3-dev`
//!
//! The `bundled` feature is not used. The subprocess session remains the
//! default when this feature is off.

use std::collections::HashMap;
use std::time::Instant;

use crc_crack_smtlib::sort::Sort;
use crc_crack_smtlib::term::Term;
use z3::ast::{BV, Bool};
use z3::{Params, SatResult, Solver};

use crate::error::SolverError;
use crate::model::Model;
use crate::result::SolverResult;
use crate::session::SolverSession;

/// Incremental session backed by the in-process Z3 API.
///
/// z3 0.19 uses a global context, so no `Context` is threaded through.
pub struct Z3NativeSession {
    solver: Solver,
    /// Declared constants in declaration order, for model extraction.
    declared: Vec<(String, Z3Value)>,
    symbols: HashMap<String, Z3Value>,
    asserted: usize,
    model: Option<Model>,
}

impl Z3NativeSession {
    /// Create a session. A `timeout_ms` of 0 means no limit.
    pub fn new(timeout_ms: u64) -> Self {
        let solver = Solver::new();
        if timeout_ms > 0 {
            let mut params = Params::new();
            params.set_u32("timeout", u32::try_from(timeout_ms).unwrap_or(u32::MAX));
            solver.set_params(&params);
        }
        Self {
            solver,
            declared: Vec::new(),
            symbols: HashMap::new(),
            asserted: 0,
            model: None,
        }
    }
}

impl SolverSession for Z3NativeSession {
    fn declare(&mut self, name: &str, sort: Sort) -> Result<(), SolverError> {
        let value = match sort {
            Sort::Bool => Z3Value::Bool(Bool::new_const(name)),
            Sort::BitVec(width) => Z3Value::BV(BV::new_const(name, width)),
        };
        self.symbols.insert(name.to_string(), value.clone());
        self.declared.push((name.to_string(), value));
        Ok(())
    }

    fn add(&mut self, formula: Term) -> Result<(), SolverError> {
        let mut scope = Vec::new();
        match translate_term(&self.symbols, &mut scope, &formula)? {
            Z3Value::Bool(b) => self.solver.assert(&b),
            Z3Value::BV(_) => {
                return Err(SolverError::ParseError(
                    "Assert requires Bool term".to_string(),
                ));
            }
        }
        self.asserted += 1;
        Ok(())
    }

    fn check(&mut self) -> Result<SolverResult, SolverError> {
        let start = Instant::now();
        self.model = None;

        let result = match self.solver.check() {
            SatResult::Sat => {
                self.model = self
                    .solver
                    .get_model()
                    .map(|m| extract_model(&m, &self.declared));
                SolverResult::Sat(self.model.clone())
            }
            SatResult::Unsat => SolverResult::Unsat,
            SatResult::Unknown => SolverResult::Unknown(
                self.solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "unknown".to_string()),
            ),
        };
        tracing::debug!("Z3 native: {} in {:?}", result.label(), start.elapsed());
        Ok(result)
    }

    fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    fn assertion_count(&self) -> usize {
        self.asserted
    }
}

/// Z3 value wrapper supporting different AST types.
#[derive(Clone, Debug)]
enum Z3Value {
    Bool(Bool),
    BV(BV),
}

/// Translate a term into a Z3 AST.
///
/// `scope` holds the `let` bindings in force, innermost last; they shadow
/// declared constants.
fn translate_term(
    symbols: &HashMap<String, Z3Value>,
    scope: &mut Vec<(String, Z3Value)>,
    term: &Term,
) -> Result<Z3Value, SolverError> {
    match term {
        Term::BoolLit(b) => Ok(Z3Value::Bool(Bool::from_bool(*b))),

        Term::BitVecLit(val, width) => {
            if *width > 64 {
                return Err(SolverError::Unsupported(format!(
                    "bit-vector literal of width {width} in native backend"
                )));
            }
            let mask = if *width == 64 { u64::MAX as u128 } else { (1u128 << width) - 1 };
            Ok(Z3Value::BV(BV::from_u64((val & mask) as u64, *width)))
        }

        Term::Const(name) => scope
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value.clone())
            .or_else(|| symbols.get(name).cloned())
            .ok_or_else(|| SolverError::ParseError(format!("Undefined symbol: {name}"))),

        Term::Not(a) => match translate_term(symbols, scope, a)? {
            Z3Value::Bool(b) => Ok(Z3Value::Bool(b.not())),
            Z3Value::BV(_) => Err(SolverError::ParseError("Not requires Bool".to_string())),
        },
        Term::And(terms) => {
            let bools = translate_bools(symbols, scope, terms, "And")?;
            let refs: Vec<&Bool> = bools.iter().collect();
            Ok(Z3Value::Bool(Bool::and(&refs)))
        }
        Term::Or(terms) => {
            let bools = translate_bools(symbols, scope, terms, "Or")?;
            let refs: Vec<&Bool> = bools.iter().collect();
            Ok(Z3Value::Bool(Bool::or(&refs)))
        }

        Term::Eq(a, b) => {
            let a_ast = translate_term(symbols, scope, a)?;
            let b_ast = translate_term(symbols, scope, b)?;
            match (a_ast, b_ast) {
                (Z3Value::Bool(a_b), Z3Value::Bool(b_b)) => Ok(Z3Value::Bool(a_b.eq(&b_b))),
                (Z3Value::BV(a_bv), Z3Value::BV(b_bv)) => Ok(Z3Value::Bool(a_bv.eq(&b_bv))),
                _ => Err(SolverError::ParseError(
                    "Eq requires matching sorts".to_string(),
                )),
            }
        }
        Term::Ite(cond, then_val, else_val) => {
            let cond_ast = translate_term(symbols, scope, cond)?;
            let then_ast = translate_term(symbols, scope, then_val)?;
            let else_ast = translate_term(symbols, scope, else_val)?;
            match (cond_ast, then_ast, else_ast) {
                (Z3Value::Bool(c), Z3Value::BV(t), Z3Value::BV(e)) => {
                    Ok(Z3Value::BV(c.ite(&t, &e)))
                }
                (Z3Value::Bool(c), Z3Value::Bool(t), Z3Value::Bool(e)) => {
                    Ok(Z3Value::Bool(c.ite(&t, &e)))
                }
                _ => Err(SolverError::ParseError(
                    "ITE requires Bool condition and matching branches".to_string(),
                )),
            }
        }

        Term::BvULe(a, b) => translate_bv_cmp(symbols, scope, a, b, |x, y| x.bvule(&y)),
        Term::BvUGe(a, b) => translate_bv_cmp(symbols, scope, a, b, |x, y| x.bvuge(&y)),
        Term::BvXor(a, b) => translate_bv_binary(symbols, scope, a, b, |x, y| x.bvxor(&y)),
        Term::BvShl(a, b) => translate_bv_binary(symbols, scope, a, b, |x, y| x.bvshl(&y)),
        Term::Concat(a, b) => translate_bv_binary(symbols, scope, a, b, |x, y| x.concat(&y)),

        Term::Extract(hi, lo, a) => match translate_term(symbols, scope, a)? {
            Z3Value::BV(bv) => Ok(Z3Value::BV(bv.extract(*hi, *lo))),
            Z3Value::Bool(_) => Err(SolverError::ParseError(
                "Extract requires BV argument".to_string(),
            )),
        },

        Term::Let(bindings, body) => {
            // Parallel let: every value sees the outer scope only.
            let mut bound = Vec::with_capacity(bindings.len());
            for (name, value) in bindings {
                bound.push((name.clone(), translate_term(symbols, scope, value)?));
            }
            let depth = scope.len();
            scope.extend(bound);
            let result = translate_term(symbols, scope, body);
            scope.truncate(depth);
            result
        }
    }
}

fn translate_bools(
    symbols: &HashMap<String, Z3Value>,
    scope: &mut Vec<(String, Z3Value)>,
    terms: &[Term],
    op: &str,
) -> Result<Vec<Bool>, SolverError> {
    terms
        .iter()
        .map(|t| match translate_term(symbols, scope, t)? {
            Z3Value::Bool(b) => Ok(b),
            Z3Value::BV(_) => Err(SolverError::ParseError(format!("{op} requires Bool"))),
        })
        .collect()
}

/// Helper for bitvector binary operations.
fn translate_bv_binary<F>(
    symbols: &HashMap<String, Z3Value>,
    scope: &mut Vec<(String, Z3Value)>,
    a: &Term,
    b: &Term,
    op: F,
) -> Result<Z3Value, SolverError>
where
    F: FnOnce(BV, BV) -> BV,
{
    let a_ast = translate_term(symbols, scope, a)?;
    let b_ast = translate_term(symbols, scope, b)?;
    match (a_ast, b_ast) {
        (Z3Value::BV(a_bv), Z3Value::BV(b_bv)) => Ok(Z3Value::BV(op(a_bv, b_bv))),
        _ => Err(SolverError::ParseError(
            "BV operation requires BV arguments".to_string(),
        )),
    }
}

/// Helper for bitvector comparison operations.
fn translate_bv_cmp<F>(
    symbols: &HashMap<String, Z3Value>,
    scope: &mut Vec<(String, Z3Value)>,
    a: &Term,
    b: &Term,
    op: F,
) -> Result<Z3Value, SolverError>
where
    F: FnOnce(BV, BV) -> Bool,
{
    let a_ast = translate_term(symbols, scope, a)?;
    let b_ast = translate_term(symbols, scope, b)?;
    match (a_ast, b_ast) {
        (Z3Value::BV(a_bv), Z3Value::BV(b_bv)) => Ok(Z3Value::Bool(op(a_bv, b_bv))),
        _ => Err(SolverError::ParseError(
            "BV comparison requires BV arguments".to_string(),
        )),
    }
}

/// Read every declared constant out of a Z3 model.
fn extract_model(model: &z3::Model, declared: &[(String, Z3Value)]) -> Model {
    let assignments = declared
        .iter()
        .filter_map(|(name, value)| {
            let text = match value {
                Z3Value::Bool(b) => model.eval(b, true).map(|v: Bool| v.to_string()),
                Z3Value::BV(bv) => model.eval(bv, true).map(|v: BV| v.to_string()),
            };
            text.map(|t| (name.clone(), t))
        })
        .collect();
    Model::with_assignments(assignments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte(name: &str) -> Term {
        Term::var(name)
    }

    #[test]
    fn basic_sat_with_model() {
        let mut session = Z3NativeSession::new(0);
        session.declare("s0", Sort::BitVec(8)).unwrap();
        session
            .add(Term::equal(byte("s0"), Term::bv(0x41, 8)))
            .unwrap();

        let result = session.check().expect("check failed");
        assert!(result.is_sat());
        assert_eq!(session.model().and_then(|m| m.bitvec("s0")), Some(Ok(0x41)));
    }

    #[test]
    fn blocking_makes_unsat() {
        let mut session = Z3NativeSession::new(0);
        session.declare("s0", Sort::BitVec(8)).unwrap();
        session
            .add(Term::bvule(byte("s0"), Term::bv(0x01, 8)))
            .unwrap();
        for value in [0x00, 0x01] {
            assert!(session.check().unwrap().is_sat());
            session
                .add(Term::negate(Term::equal(byte("s0"), Term::bv(value, 8))))
                .unwrap();
        }
        assert!(session.check().unwrap().is_unsat());
        assert_eq!(session.model(), None);
        assert_eq!(session.assertion_count(), 3);
    }

    #[test]
    fn let_bindings_shadow_and_scope() {
        let mut session = Z3NativeSession::new(0);
        session.declare("s0", Sort::BitVec(8)).unwrap();
        // (let ((s0 #x01)) (= s0 #x01)) holds regardless of the outer s0.
        let formula = Term::And(vec![
            Term::let_in(
                "s0",
                Term::bv(0x01, 8),
                Term::equal(byte("s0"), Term::bv(0x01, 8)),
            ),
            Term::equal(byte("s0"), Term::bv(0x7f, 8)),
        ]);
        session.add(formula).unwrap();
        assert!(session.check().unwrap().is_sat());
        assert_eq!(session.model().and_then(|m| m.bitvec("s0")), Some(Ok(0x7f)));
    }

    #[test]
    fn extract_and_concat() {
        let mut session = Z3NativeSession::new(0);
        session.declare("s0", Sort::BitVec(8)).unwrap();
        session.declare("s1", Sort::BitVec(8)).unwrap();
        let word = Term::concat(byte("s1"), byte("s0"));
        session
            .add(Term::equal(word, Term::bv(0x6261, 16)))
            .unwrap();
        session
            .add(Term::equal(Term::extract(7, 7, byte("s0")), Term::bv(0, 1)))
            .unwrap();
        assert!(session.check().unwrap().is_sat());
        let model = session.model().unwrap();
        assert_eq!(model.bitvec("s0"), Some(Ok(0x61)));
        assert_eq!(model.bitvec("s1"), Some(Ok(0x62)));
    }

    #[test]
    fn undefined_symbol_is_error() {
        let mut session = Z3NativeSession::new(0);
        let err = session
            .add(Term::equal(byte("nope"), Term::bv(0, 8)))
            .unwrap_err();
        assert!(matches!(err, SolverError::ParseError(_)));
    }

    #[test]
    fn bitvector_assertion_rejected() {
        let mut session = Z3NativeSession::new(0);
        session.declare("s0", Sort::BitVec(8)).unwrap();
        assert!(session.add(byte("s0")).is_err());
        assert_eq!(session.assertion_count(), 0);
    }
}
