//! SMT-LIB2 text formatting for AST types.
//!
//! Implements `Display` for [`Sort`], [`Term`], [`Command`], and [`Script`],
//! producing valid SMT-LIB2 output that can be piped into Z3, CVC5 or Yices.

use std::fmt;

use crate::command::Command;
use crate::script::Script;
use crate::sort::Sort;
use crate::term::Term;

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::BitVec(width) => write!(f, "(_ BitVec {width})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// Format a bitvector literal: `#x..` when the width is a multiple of four,
/// `#b..` otherwise. Bits above `width` are dropped.
fn fmt_bv_lit(value: u128, width: u32, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let masked = if width >= 128 {
        value
    } else {
        value & ((1u128 << width) - 1)
    };
    let width = width as usize;
    if width % 4 == 0 {
        write!(f, "#x{:0>digits$x}", masked, digits = width / 4)
    } else {
        write!(f, "#b{:0>width$b}", masked, width = width)
    }
}

/// Write a binary SMT-LIB operator: `(op lhs rhs)`.
fn fmt_binop(op: &str, lhs: &Term, rhs: &Term, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "({op} {lhs} {rhs})")
}

/// Write an n-ary operator, or `empty` when there are no operands.
fn fmt_nary(op: &str, empty: &str, terms: &[Term], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if terms.is_empty() {
        return write!(f, "{empty}");
    }
    write!(f, "({op}")?;
    for t in terms {
        write!(f, " {t}")?;
    }
    write!(f, ")")
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // --- Literals ---
            Term::BoolLit(true) => write!(f, "true"),
            Term::BoolLit(false) => write!(f, "false"),
            Term::BitVecLit(value, width) => fmt_bv_lit(*value, *width, f),

            // --- Variables ---
            Term::Const(name) => write!(f, "{name}"),

            // --- Boolean operations ---
            Term::Not(inner) => write!(f, "(not {inner})"),
            Term::And(terms) => fmt_nary("and", "true", terms, f),
            Term::Or(terms) => fmt_nary("or", "false", terms, f),

            // --- Core ---
            Term::Eq(lhs, rhs) => fmt_binop("=", lhs, rhs, f),
            Term::Ite(cond, then_branch, else_branch) => {
                write!(f, "(ite {cond} {then_branch} {else_branch})")
            }

            // --- Bitvector ---
            Term::BvULe(a, b) => fmt_binop("bvule", a, b, f),
            Term::BvUGe(a, b) => fmt_binop("bvuge", a, b, f),
            Term::BvXor(a, b) => fmt_binop("bvxor", a, b, f),
            Term::BvShl(a, b) => fmt_binop("bvshl", a, b, f),
            Term::Extract(hi, lo, a) => write!(f, "((_ extract {hi} {lo}) {a})"),
            Term::Concat(a, b) => fmt_binop("concat", a, b, f),

            // --- Let bindings ---
            Term::Let(bindings, body) => {
                write!(f, "(let (")?;
                for (i, (name, value)) in bindings.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "({name} {value})")?;
                }
                write!(f, ") {body})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::SetLogic(logic) => write!(f, "(set-logic {logic})"),
            Command::SetOption(key, value) => write!(f, "(set-option :{key} {value})"),
            Command::DeclareConst(name, sort) => write!(f, "(declare-const {name} {sort})"),
            Command::Assert(term) => write!(f, "(assert {term})"),
            Command::CheckSat => write!(f, "(check-sat)"),
            Command::GetModel => write!(f, "(get-model)"),
            Command::Comment(text) => write!(f, ";; {text}"),
            Command::Exit => write!(f, "(exit)"),
        }
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cmd in self.commands() {
            writeln!(f, "{cmd}")?;
        }
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use crate::command::Command;
    use crate::script::Script;
    use crate::sort::Sort;
    use crate::term::Term;

    #[test]
    fn sort_bool() {
        assert_eq!(Sort::Bool.to_string(), "Bool");
    }

    #[test]
    fn sort_bitvec() {
        assert_eq!(Sort::BitVec(8).to_string(), "(_ BitVec 8)");
        assert_eq!(Sort::BitVec(32).to_string(), "(_ BitVec 32)");
    }

    // -----------------------------------------------------------------------
    // Literals
    // -----------------------------------------------------------------------

    #[test]
    fn bool_lit() {
        assert_eq!(Term::BoolLit(true).to_string(), "true");
        assert_eq!(Term::BoolLit(false).to_string(), "false");
    }

    #[test]
    fn bitvec_lit_hex() {
        assert_eq!(Term::bv(0x5f, 8).to_string(), "#x5f");
        assert_eq!(Term::bv(0x04c1_1db7, 32).to_string(), "#x04c11db7");
        assert_eq!(Term::bv(0, 24).to_string(), "#x000000");
    }

    #[test]
    fn bitvec_lit_binary_for_odd_widths() {
        assert_eq!(Term::bv(1, 1).to_string(), "#b1");
        assert_eq!(Term::bv(5, 3).to_string(), "#b101");
    }

    #[test]
    fn bitvec_lit_masks_to_width() {
        assert_eq!(Term::bv(0x1ff, 8).to_string(), "#xff");
    }

    // -----------------------------------------------------------------------
    // Operators
    // -----------------------------------------------------------------------

    #[test]
    fn empty_and_or() {
        assert_eq!(Term::And(vec![]).to_string(), "true");
        assert_eq!(Term::Or(vec![]).to_string(), "false");
    }

    #[test]
    fn nary_and() {
        let t = Term::And(vec![Term::var("a"), Term::var("b"), Term::var("c")]);
        assert_eq!(t.to_string(), "(and a b c)");
    }

    #[test]
    fn not_eq() {
        let t = Term::negate(Term::equal(Term::var("s0"), Term::bv(0x5f, 8)));
        assert_eq!(t.to_string(), "(not (= s0 #x5f))");
    }

    #[test]
    fn ite_shift_xor() {
        let c = Term::var("c");
        let shifted = Term::bvshl(c.clone(), Term::bv(1, 32));
        let t = Term::ite(
            Term::equal(Term::extract(31, 31, c), Term::bv(1, 1)),
            Term::bvxor(shifted.clone(), Term::bv(0x04c1_1db7, 32)),
            shifted,
        );
        assert_eq!(
            t.to_string(),
            "(ite (= ((_ extract 31 31) c) #b1) (bvxor (bvshl c #x00000001) #x04c11db7) (bvshl c #x00000001))"
        );
    }

    #[test]
    fn range_comparisons() {
        let t = Term::And(vec![
            Term::bvuge(Term::var("x"), Term::bv(b'0' as u128, 8)),
            Term::bvule(Term::var("x"), Term::bv(b'9' as u128, 8)),
        ]);
        assert_eq!(t.to_string(), "(and (bvuge x #x30) (bvule x #x39))");
    }

    #[test]
    fn concat() {
        let t = Term::concat(Term::var("hi"), Term::var("lo"));
        assert_eq!(t.to_string(), "(concat hi lo)");
    }

    #[test]
    fn let_binding() {
        let t = Term::let_in("a", Term::bv(1, 8), Term::equal(Term::var("a"), Term::var("b")));
        assert_eq!(t.to_string(), "(let ((a #x01)) (= a b))");
    }

    #[test]
    fn let_multiple_bindings() {
        let t = Term::Let(
            vec![("a".into(), Term::bv(1, 4)), ("b".into(), Term::bv(2, 4))],
            Box::new(Term::equal(Term::var("a"), Term::var("b"))),
        );
        assert_eq!(t.to_string(), "(let ((a #x1) (b #x2)) (= a b))");
    }

    // -----------------------------------------------------------------------
    // Commands and scripts
    // -----------------------------------------------------------------------

    #[test]
    fn commands() {
        assert_eq!(Command::SetLogic("QF_BV".into()).to_string(), "(set-logic QF_BV)");
        assert_eq!(
            Command::SetOption("produce-models".into(), "true".into()).to_string(),
            "(set-option :produce-models true)"
        );
        assert_eq!(
            Command::DeclareConst("s0".into(), Sort::BitVec(8)).to_string(),
            "(declare-const s0 (_ BitVec 8))"
        );
        assert_eq!(Command::Assert(Term::BoolLit(false)).to_string(), "(assert false)");
        assert_eq!(Command::CheckSat.to_string(), "(check-sat)");
        assert_eq!(Command::GetModel.to_string(), "(get-model)");
        assert_eq!(Command::Comment("blocking".into()).to_string(), ";; blocking");
        assert_eq!(Command::Exit.to_string(), "(exit)");
    }

    #[test]
    fn script_one_command_per_line() {
        let script = Script::with_commands(vec![
            Command::SetLogic("QF_BV".into()),
            Command::DeclareConst("s0".into(), Sort::BitVec(8)),
            Command::CheckSat,
        ]);
        assert_eq!(
            script.to_string(),
            "(set-logic QF_BV)\n(declare-const s0 (_ BitVec 8))\n(check-sat)\n"
        );
    }
}
