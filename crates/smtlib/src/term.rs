/// SMT-LIB term (expression) representation.
///
/// Only the quantifier-free bit-vector fragment is modelled. Constructor
/// helpers (`Term::equal`, `Term::bvxor`, ...) box their operands so callers can
/// build formulas without spelling out `Box::new` at every level.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    // === Literals ===
    /// Boolean literal
    BoolLit(bool),
    /// Bitvector literal with value and width
    BitVecLit(u128, u32),

    // === Variables ===
    /// Named constant/variable reference
    Const(String),

    // === Boolean operations ===
    /// Logical NOT
    Not(Box<Term>),
    /// Logical AND (n-ary); empty is `true`
    And(Vec<Term>),
    /// Logical OR (n-ary); empty is `false`
    Or(Vec<Term>),

    // === Core ===
    /// Equality: `(= a b)`
    Eq(Box<Term>, Box<Term>),
    /// If-then-else: `(ite cond then else)`
    Ite(Box<Term>, Box<Term>, Box<Term>),

    // === Bitvector comparison (unsigned) ===
    /// `(bvule a b)`, unsigned less-or-equal
    BvULe(Box<Term>, Box<Term>),
    /// `(bvuge a b)`, unsigned greater-or-equal
    BvUGe(Box<Term>, Box<Term>),

    // === Bitvector bitwise ===
    /// `(bvxor a b)`
    BvXor(Box<Term>, Box<Term>),
    /// `(bvshl a b)`, shift left
    BvShl(Box<Term>, Box<Term>),

    // === Bitvector structure ===
    /// `((_ extract hi lo) a)`
    Extract(u32, u32, Box<Term>),
    /// `(concat a b)`, `a` supplies the high bits
    Concat(Box<Term>, Box<Term>),

    // === Let bindings ===
    /// `(let ((x t) ...) body)`
    Let(Vec<(String, Term)>, Box<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Const(name.into())
    }

    pub fn bv(value: u128, width: u32) -> Self {
        Term::BitVecLit(value, width)
    }

    pub fn negate(a: Term) -> Self {
        Term::Not(Box::new(a))
    }

    pub fn equal(a: Term, b: Term) -> Self {
        Term::Eq(Box::new(a), Box::new(b))
    }

    pub fn ite(cond: Term, then_val: Term, else_val: Term) -> Self {
        Term::Ite(Box::new(cond), Box::new(then_val), Box::new(else_val))
    }

    pub fn bvule(a: Term, b: Term) -> Self {
        Term::BvULe(Box::new(a), Box::new(b))
    }

    pub fn bvuge(a: Term, b: Term) -> Self {
        Term::BvUGe(Box::new(a), Box::new(b))
    }

    pub fn bvxor(a: Term, b: Term) -> Self {
        Term::BvXor(Box::new(a), Box::new(b))
    }

    pub fn bvshl(a: Term, b: Term) -> Self {
        Term::BvShl(Box::new(a), Box::new(b))
    }

    pub fn extract(hi: u32, lo: u32, a: Term) -> Self {
        Term::Extract(hi, lo, Box::new(a))
    }

    pub fn concat(hi: Term, lo: Term) -> Self {
        Term::Concat(Box::new(hi), Box::new(lo))
    }

    /// Concatenate a non-empty list of terms, first element in the high bits.
    ///
    /// Returns `None` for an empty list since SMT-LIB has no zero-width
    /// bitvectors.
    pub fn concat_all(parts: impl IntoIterator<Item = Term>) -> Option<Self> {
        parts.into_iter().reduce(Term::concat)
    }

    /// Bind `name` to `value` inside `body`.
    pub fn let_in(name: impl Into<String>, value: Term, body: Term) -> Self {
        Term::Let(vec![(name.into(), value)], Box::new(body))
    }

    /// Number of nodes in the term tree, counting let-bound values once.
    pub fn size(&self) -> usize {
        match self {
            Term::BoolLit(_) | Term::BitVecLit(_, _) | Term::Const(_) => 1,
            Term::Not(a) | Term::Extract(_, _, a) => 1 + a.size(),
            Term::And(terms) | Term::Or(terms) => 1 + terms.iter().map(Term::size).sum::<usize>(),
            Term::Eq(a, b)
            | Term::BvULe(a, b)
            | Term::BvUGe(a, b)
            | Term::BvXor(a, b)
            | Term::BvShl(a, b)
            | Term::Concat(a, b) => 1 + a.size() + b.size(),
            Term::Ite(c, t, e) => 1 + c.size() + t.size() + e.size(),
            Term::Let(bindings, body) => {
                1 + bindings.iter().map(|(_, t)| t.size()).sum::<usize>() + body.size()
            }
        }
    }
}
