//! The formulas a candidate must satisfy.

use crc_crack_smtlib::command::Command as SmtCmd;
use crc_crack_smtlib::script::Script;
use crc_crack_smtlib::sort::Sort;
use crc_crack_smtlib::term::Term;

use crate::checksum::crc32_term;
use crate::config::{Alphabet, SEPARATOR, SearchConfig};

/// Sort of every byte variable.
pub const BYTE: Sort = Sort::BitVec(8);

/// Name of the variable for byte `index`.
pub fn byte_var(index: usize) -> String {
    format!("s{index}")
}

fn byte_lit(byte: u8) -> Term {
    Term::bv(u128::from(byte), 8)
}

/// Byte variables plus the Bool formulas over them.
///
/// Built once by [`ConstraintBuilder`]; afterwards it only grows through
/// [`push_blocking`](Self::push_blocking).
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintSet {
    vars: Vec<String>,
    formulas: Vec<Term>,
    blocking: usize,
}

impl ConstraintSet {
    pub fn vars(&self) -> &[String] {
        &self.vars
    }

    pub fn formulas(&self) -> &[Term] {
        &self.formulas
    }

    /// Number of candidate positions.
    pub fn length(&self) -> usize {
        self.vars.len()
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Number of blocking clauses appended so far.
    pub fn blocking_count(&self) -> usize {
        self.blocking
    }

    /// Append the clause excluding one reported candidate.
    pub fn push_blocking(&mut self, clause: Term) {
        self.formulas.push(clause);
        self.blocking += 1;
    }

    /// The whole set as a standalone `QF_BV` script.
    pub fn to_script(&self) -> Script {
        let mut script = Script::with_commands(vec![
            SmtCmd::SetLogic("QF_BV".to_string()),
            SmtCmd::SetOption("produce-models".to_string(), "true".to_string()),
        ]);
        script.extend(
            self.vars
                .iter()
                .map(|name| SmtCmd::DeclareConst(name.clone(), BYTE)),
        );
        script.extend(self.formulas.iter().cloned().map(SmtCmd::Assert));
        script.push(SmtCmd::CheckSat);
        script.push(SmtCmd::GetModel);
        script
    }
}

/// Builds the initial [`ConstraintSet`] for a [`SearchConfig`].
pub struct ConstraintBuilder<'a> {
    config: &'a SearchConfig,
    vars: Vec<Term>,
}

impl<'a> ConstraintBuilder<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        let vars = (0..config.length).map(|i| Term::var(byte_var(i))).collect();
        Self { config, vars }
    }

    /// Assemble every rule, in order: checksum, separators, alphabet,
    /// prefix, substring, suffix.
    ///
    /// Contradictory settings are not rejected here; they make the set
    /// unsatisfiable.
    pub fn build(self) -> ConstraintSet {
        let mut formulas = vec![self.checksum()];
        formulas.extend(self.no_double_separator());
        formulas.extend(self.alphabet());

        let pins_fit =
            self.config.prefix.len() + self.config.suffix.len() <= self.config.length;
        if pins_fit {
            formulas.extend(self.prefix());
        } else {
            formulas.push(Term::BoolLit(false));
        }
        if !self.config.substring.is_empty() {
            formulas.push(self.substring());
        }
        if pins_fit {
            formulas.extend(self.suffix());
        }

        tracing::debug!(
            "Built {} formulas over {} bytes (target {:#010x})",
            formulas.len(),
            self.vars.len(),
            self.config.target
        );
        ConstraintSet {
            vars: (0..self.vars.len()).map(byte_var).collect(),
            formulas,
            blocking: 0,
        }
    }

    fn checksum(&self) -> Term {
        Term::equal(
            crc32_term(&self.vars),
            Term::bv(u128::from(self.config.target), 32),
        )
    }

    fn no_double_separator(&self) -> impl Iterator<Item = Term> + '_ {
        self.vars.windows(2).map(|pair| {
            Term::negate(Term::And(vec![
                Term::equal(pair[0].clone(), byte_lit(SEPARATOR)),
                Term::equal(pair[1].clone(), byte_lit(SEPARATOR)),
            ]))
        })
    }

    fn alphabet(&self) -> Vec<Term> {
        match self.config.alphabet {
            Alphabet::Any => Vec::new(),
            Alphabet::Identifier => {
                let start = self.config.prefix.len().min(self.vars.len());
                self.vars[start..].iter().map(identifier_byte).collect()
            }
        }
    }

    fn prefix(&self) -> impl Iterator<Item = Term> + '_ {
        self.config
            .prefix
            .bytes()
            .zip(&self.vars)
            .map(|(byte, var)| Term::equal(var.clone(), byte_lit(byte)))
    }

    fn suffix(&self) -> impl Iterator<Item = Term> + '_ {
        self.config
            .suffix
            .bytes()
            .rev()
            .zip(self.vars.iter().rev())
            .map(|(byte, var)| Term::equal(var.clone(), byte_lit(byte)))
    }

    /// Disjunction over every offset where the substring fits entirely.
    fn substring(&self) -> Term {
        let needle = self.config.substring.as_bytes();
        let windows = self
            .vars
            .windows(needle.len())
            .map(|window| {
                Term::And(
                    window
                        .iter()
                        .zip(needle)
                        .map(|(var, &byte)| Term::equal(var.clone(), byte_lit(byte)))
                        .collect(),
                )
            })
            .collect();
        Term::Or(windows)
    }
}

fn identifier_byte(var: &Term) -> Term {
    let within = |lo: u8, hi: u8| {
        Term::And(vec![
            Term::bvuge(var.clone(), byte_lit(lo)),
            Term::bvule(var.clone(), byte_lit(hi)),
        ])
    };
    Term::Or(vec![
        within(b'0', b'9'),
        within(b'a', b'z'),
        Term::equal(var.clone(), byte_lit(SEPARATOR)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc32;
    use crc_crack_smtlib::eval::{Assignment, Value, eval_bool};

    fn assign(bytes: &[u8]) -> Assignment {
        let mut assignment = Assignment::new();
        for (i, &b) in bytes.iter().enumerate() {
            assignment.set(byte_var(i), Value::bitvec(u128::from(b), 8));
        }
        assignment
    }

    fn satisfies(set: &ConstraintSet, bytes: &[u8]) -> bool {
        let assignment = assign(bytes);
        set.formulas()
            .iter()
            .all(|f| eval_bool(f, &assignment).unwrap())
    }

    fn config_for(text: &[u8]) -> SearchConfig {
        SearchConfig::new(text.len(), crc32(text))
    }

    #[test]
    fn variables_are_named_per_position() {
        let set = ConstraintBuilder::new(&SearchConfig::new(3, 0)).build();
        assert_eq!(set.vars(), &["s0", "s1", "s2"]);
        assert_eq!(set.length(), 3);
        assert_eq!(set.blocking_count(), 0);
    }

    #[test]
    fn rule_counts() {
        // 1 checksum + 5 separator pairs + 3 alphabet + 3 prefix + 1 substring + 1 suffix
        let config = SearchConfig::new(6, 0)
            .with_prefix("ab_")
            .with_substring("q")
            .with_suffix("z");
        let set = ConstraintBuilder::new(&config).build();
        assert_eq!(set.len(), 14);
    }

    #[test]
    fn matching_text_satisfies_every_rule() {
        let text = b"ex_bad_q1w2";
        let config = config_for(text)
            .with_prefix("ex_bad_")
            .with_substring("q1")
            .with_suffix("2");
        let set = ConstraintBuilder::new(&config).build();
        assert!(satisfies(&set, text));
    }

    #[test]
    fn wrong_checksum_fails() {
        let config = SearchConfig::new(3, crc32(b"abc"));
        let set = ConstraintBuilder::new(&config).build();
        assert!(satisfies(&set, b"abc"));
        assert!(!satisfies(&set, b"abd"));
    }

    #[test]
    fn doubled_separator_fails() {
        let text = b"a__b";
        let set = ConstraintBuilder::new(&config_for(text)).build();
        assert!(!satisfies(&set, text));
        let set = ConstraintBuilder::new(&config_for(b"a_b_")).build();
        assert!(satisfies(&set, b"a_b_"));
    }

    #[test]
    fn alphabet_applies_after_prefix_only() {
        let text = b"AB-c";
        let set = ConstraintBuilder::new(&config_for(text).with_prefix("AB")).build();
        assert!(!satisfies(&set, text));

        let text = b"AB9c";
        let set = ConstraintBuilder::new(&config_for(text).with_prefix("AB")).build();
        assert!(satisfies(&set, text));

        let set = ConstraintBuilder::new(
            &config_for(b"AB-c")
                .with_prefix("AB")
                .with_alphabet(Alphabet::Any),
        )
        .build();
        assert!(satisfies(&set, b"AB-c"));
    }

    #[test]
    fn alphabet_bounds() {
        for (byte, ok) in [
            (b'/', false),
            (b'0', true),
            (b'9', true),
            (b':', false),
            (b'`', false),
            (b'a', true),
            (b'z', true),
            (b'{', false),
            (b'_', true),
        ] {
            let set = ConstraintBuilder::new(&config_for(&[byte])).build();
            assert_eq!(satisfies(&set, &[byte]), ok, "byte {byte:#x}");
        }
    }

    #[test]
    fn prefix_and_suffix_are_pinned() {
        let config = config_for(b"abcd").with_prefix("ab").with_suffix("cd");
        let set = ConstraintBuilder::new(&config).build();
        assert!(satisfies(&set, b"abcd"));

        // Same checksum target, different pins.
        let config = config_for(b"abcd").with_prefix("ax");
        assert!(!satisfies(&ConstraintBuilder::new(&config).build(), b"abcd"));
        let config = config_for(b"abcd").with_suffix("xd");
        assert!(!satisfies(&ConstraintBuilder::new(&config).build(), b"abcd"));
    }

    #[test]
    fn overlong_pins_are_false() {
        let config = SearchConfig::new(4, 0).with_prefix("abc").with_suffix("de");
        let set = ConstraintBuilder::new(&config).build();
        assert!(set.formulas().contains(&Term::BoolLit(false)));
    }

    #[test]
    fn substring_includes_last_offset() {
        let text = b"abxy";
        let config = config_for(text).with_substring("xy");
        let set = ConstraintBuilder::new(&config).build();
        assert!(satisfies(&set, text));

        let Some(Term::Or(windows)) = set.formulas().last() else {
            panic!("substring rule should be last");
        };
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn substring_anywhere() {
        let config = config_for(b"1xy2").with_substring("xy");
        assert!(satisfies(&ConstraintBuilder::new(&config).build(), b"1xy2"));
        let config = config_for(b"1yx2").with_substring("xy");
        assert!(!satisfies(&ConstraintBuilder::new(&config).build(), b"1yx2"));
    }

    #[test]
    fn unplaceable_substring_is_empty_or() {
        let config = SearchConfig::new(2, 0).with_substring("abc");
        let set = ConstraintBuilder::new(&config).build();
        assert_eq!(set.formulas().last(), Some(&Term::Or(Vec::new())));
    }

    #[test]
    fn push_blocking_grows_the_set() {
        let mut set = ConstraintBuilder::new(&SearchConfig::new(1, 0)).build();
        let before = set.len();
        set.push_blocking(Term::BoolLit(true));
        assert_eq!(set.len(), before + 1);
        assert_eq!(set.blocking_count(), 1);
    }

    #[test]
    fn script_declares_and_asserts() {
        let set = ConstraintBuilder::new(&SearchConfig::new(2, 0)).build();
        let script = set.to_script();
        assert_eq!(script.assertion_count(), set.len());
        let text = script.to_string();
        assert!(text.starts_with("(set-logic QF_BV)\n"));
        assert!(text.contains("(declare-const s0 (_ BitVec 8))\n"));
        assert!(text.contains("(declare-const s1 (_ BitVec 8))\n"));
        assert!(text.ends_with("(check-sat)\n(get-model)\n"));
    }
}
