//! Concrete evaluation of terms under a variable assignment.
//!
//! The evaluator is the ground truth used to cross-check symbolic encodings
//! against their concrete counterparts, and the engine of the in-process
//! reference solver. Bitvectors up to 128 bits wide are supported.

use std::collections::HashMap;
use std::fmt;

use crate::term::Term;

/// Widest bitvector the evaluator can represent.
pub const MAX_WIDTH: u32 = 128;

/// A concrete value of a Bool or bitvector sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    BitVec { value: u128, width: u32 },
}

impl Value {
    /// Build a bitvector value, truncating `value` to `width` bits.
    pub fn bitvec(value: u128, width: u32) -> Self {
        Value::BitVec {
            value: value & mask(width),
            width,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::BitVec { .. } => None,
        }
    }

    pub fn as_bitvec(&self) -> Option<(u128, u32)> {
        match self {
            Value::BitVec { value, width } => Some((*value, *width)),
            Value::Bool(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::BitVec { value, width } => {
                // Same spelling as the term formatter so models round-trip.
                fmt::Display::fmt(&Term::BitVecLit(*value, *width), f)
            }
        }
    }
}

/// Errors raised while evaluating a term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A constant has no value in the assignment or enclosing lets.
    Unbound(String),
    /// An operator received an operand of the wrong sort.
    SortMismatch(&'static str),
    /// Bitvector operands of an operator have different widths.
    WidthMismatch { op: &'static str, left: u32, right: u32 },
    /// `extract` indices fall outside the operand.
    BadExtract { hi: u32, lo: u32, width: u32 },
    /// A result would exceed [`MAX_WIDTH`] bits.
    TooWide(u32),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Unbound(name) => write!(f, "unbound constant: {name}"),
            EvalError::SortMismatch(op) => write!(f, "sort mismatch in {op}"),
            EvalError::WidthMismatch { op, left, right } => {
                write!(f, "width mismatch in {op}: {left} vs {right}")
            }
            EvalError::BadExtract { hi, lo, width } => {
                write!(f, "extract [{hi}:{lo}] out of range for width {width}")
            }
            EvalError::TooWide(width) => {
                write!(f, "bitvector width {width} exceeds {MAX_WIDTH} bits")
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Values for free constants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    values: HashMap<String, Value>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Evaluate `term` with free constants taken from `assignment`.
pub fn eval(term: &Term, assignment: &Assignment) -> Result<Value, EvalError> {
    Evaluator {
        base: assignment,
        locals: Vec::new(),
    }
    .eval(term)
}

/// Evaluate a Bool `term`; bitvector results are a sort error.
pub fn eval_bool(term: &Term, assignment: &Assignment) -> Result<bool, EvalError> {
    eval(term, assignment)?
        .as_bool()
        .ok_or(EvalError::SortMismatch("assertion"))
}

fn mask(width: u32) -> u128 {
    if width >= MAX_WIDTH {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

struct Evaluator<'a> {
    base: &'a Assignment,
    /// Let-bound names, innermost last.
    locals: Vec<(String, Value)>,
}

impl Evaluator<'_> {
    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.locals
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
            .or_else(|| self.base.get(name))
            .ok_or_else(|| EvalError::Unbound(name.to_string()))
    }

    fn eval(&mut self, term: &Term) -> Result<Value, EvalError> {
        match term {
            Term::BoolLit(b) => Ok(Value::Bool(*b)),
            Term::BitVecLit(value, width) => {
                if *width > MAX_WIDTH {
                    return Err(EvalError::TooWide(*width));
                }
                Ok(Value::bitvec(*value, *width))
            }
            Term::Const(name) => self.lookup(name),

            Term::Not(a) => Ok(Value::Bool(!self.bool_of(a, "not")?)),
            Term::And(terms) => {
                for t in terms {
                    if !self.bool_of(t, "and")? {
                        return Ok(Value::Bool(false));
                    }
                }
                Ok(Value::Bool(true))
            }
            Term::Or(terms) => {
                for t in terms {
                    if self.bool_of(t, "or")? {
                        return Ok(Value::Bool(true));
                    }
                }
                Ok(Value::Bool(false))
            }

            Term::Eq(a, b) => {
                let a = self.eval(a)?;
                let b = self.eval(b)?;
                match (a, b) {
                    (Value::Bool(x), Value::Bool(y)) => Ok(Value::Bool(x == y)),
                    (
                        Value::BitVec { value: x, width: wx },
                        Value::BitVec { value: y, width: wy },
                    ) => {
                        check_widths("=", wx, wy)?;
                        Ok(Value::Bool(x == y))
                    }
                    _ => Err(EvalError::SortMismatch("=")),
                }
            }
            Term::Ite(cond, then_val, else_val) => {
                if self.bool_of(cond, "ite")? {
                    self.eval(then_val)
                } else {
                    self.eval(else_val)
                }
            }

            Term::BvULe(a, b) => {
                let (x, y, _) = self.bv_pair(a, b, "bvule")?;
                Ok(Value::Bool(x <= y))
            }
            Term::BvUGe(a, b) => {
                let (x, y, _) = self.bv_pair(a, b, "bvuge")?;
                Ok(Value::Bool(x >= y))
            }
            Term::BvXor(a, b) => {
                let (x, y, width) = self.bv_pair(a, b, "bvxor")?;
                Ok(Value::bitvec(x ^ y, width))
            }
            Term::BvShl(a, b) => {
                let (x, y, width) = self.bv_pair(a, b, "bvshl")?;
                let shifted = if y >= u128::from(width) { 0 } else { x << y };
                Ok(Value::bitvec(shifted, width))
            }
            Term::Extract(hi, lo, a) => {
                let (x, width) = self.bv_of(a, "extract")?;
                if hi < lo || *hi >= width {
                    return Err(EvalError::BadExtract {
                        hi: *hi,
                        lo: *lo,
                        width,
                    });
                }
                Ok(Value::bitvec(x >> lo, hi - lo + 1))
            }
            Term::Concat(a, b) => {
                let (x, wx) = self.bv_of(a, "concat")?;
                let (y, wy) = self.bv_of(b, "concat")?;
                let width = wx + wy;
                if width > MAX_WIDTH {
                    return Err(EvalError::TooWide(width));
                }
                Ok(Value::bitvec((x << wy) | y, width))
            }

            Term::Let(bindings, body) => {
                // Parallel let: every value is computed in the outer scope.
                let mut bound = Vec::with_capacity(bindings.len());
                for (name, value) in bindings {
                    bound.push((name.clone(), self.eval(value)?));
                }
                let depth = self.locals.len();
                self.locals.extend(bound);
                let result = self.eval(body);
                self.locals.truncate(depth);
                result
            }
        }
    }

    fn bool_of(&mut self, term: &Term, op: &'static str) -> Result<bool, EvalError> {
        self.eval(term)?.as_bool().ok_or(EvalError::SortMismatch(op))
    }

    fn bv_of(&mut self, term: &Term, op: &'static str) -> Result<(u128, u32), EvalError> {
        self.eval(term)?
            .as_bitvec()
            .ok_or(EvalError::SortMismatch(op))
    }

    fn bv_pair(
        &mut self,
        a: &Term,
        b: &Term,
        op: &'static str,
    ) -> Result<(u128, u128, u32), EvalError> {
        let (x, wx) = self.bv_of(a, op)?;
        let (y, wy) = self.bv_of(b, op)?;
        check_widths(op, wx, wy)?;
        Ok((x, y, wx))
    }
}

fn check_widths(op: &'static str, left: u32, right: u32) -> Result<(), EvalError> {
    if left == right {
        Ok(())
    } else {
        Err(EvalError::WidthMismatch { op, left, right })
    }
}
