//! Reflected, complemented CRC-32 (IEEE 802.3), concrete and symbolic.
//!
//! [`crc32`] is the reference implementation over bytes. [`crc32_term`]
//! builds the same computation as a 32-bit bit-vector term over symbolic
//! bytes. The two are written independently and cross-checked by evaluating
//! the term.

use crc_crack_smtlib::term::Term;

/// CRC-32 generator polynomial, MSB-first.
pub const POLY: u32 = 0x04C1_1DB7;

/// Name of the let-binding holding the pre-reflection register.
const OUT: &str = "crc_out";

/// Reverse the bit order of a byte.
pub fn reflect8(byte: u8) -> u8 {
    let mut out = 0u8;
    for i in 0..8 {
        if byte & (1 << i) != 0 {
            out |= 1 << (7 - i);
        }
    }
    out
}

/// Reverse the bit order of a 32-bit word.
pub fn reflect32(word: u32) -> u32 {
    let mut out = 0u32;
    for i in 0..32 {
        if word & (1 << i) != 0 {
            out |= 1 << (31 - i);
        }
    }
    out
}

/// CRC-32 of `bytes`.
///
/// ```
/// assert_eq!(crc_crack::checksum::crc32(b"123456789"), 0xCBF4_3926);
/// ```
pub fn crc32(bytes: &[u8]) -> u32 {
    let mut reg = u32::MAX;
    for &byte in bytes {
        reg ^= u32::from(reflect8(byte)) << 24;
        for _ in 0..8 {
            reg = if reg & (1 << 31) != 0 {
                (reg << 1) ^ POLY
            } else {
                reg << 1
            };
        }
    }
    reflect32(!reg)
}

/// Reverse the low `width` bits of a term: bit 0 becomes the MSB.
fn reflect_term(term: &Term, width: u32) -> Term {
    (1..width).fold(Term::extract(0, 0, term.clone()), |acc, i| {
        Term::concat(acc, Term::extract(i, i, term.clone()))
    })
}

/// One shift-and-reduce round on a register term.
fn round(reg: Term) -> Term {
    let shifted = Term::bvshl(reg.clone(), Term::bv(1, 32));
    Term::ite(
        Term::equal(Term::extract(31, 31, reg), Term::bv(1, 1)),
        Term::bvxor(shifted.clone(), Term::bv(u128::from(POLY), 32)),
        shifted,
    )
}

/// CRC-32 of the 8-bit terms in `bytes`, as a 32-bit term.
///
/// Every intermediate register value gets its own `let` binding
/// (`crc_b{i}_in`, `crc_b{i}_r{k}`), so each round refers to the previous
/// register by name instead of copying its whole term.
pub fn crc32_term(bytes: &[Term]) -> Term {
    let mut bindings: Vec<(String, Term)> = Vec::with_capacity(bytes.len() * 9);
    let mut reg = Term::bv(u128::from(u32::MAX), 32);

    for (i, byte) in bytes.iter().enumerate() {
        let widened = Term::concat(reflect_term(byte, 8), Term::bv(0, 24));
        let name = format!("crc_b{i}_in");
        bindings.push((name.clone(), Term::bvxor(reg, widened)));
        reg = Term::var(name);

        for k in 0..8 {
            let name = format!("crc_b{i}_r{k}");
            bindings.push((name.clone(), round(reg)));
            reg = Term::var(name);
        }
    }

    let body = Term::let_in(
        OUT,
        Term::bvxor(reg, Term::bv(u128::from(u32::MAX), 32)),
        reflect_term(&Term::var(OUT), 32),
    );
    bindings
        .into_iter()
        .rev()
        .fold(body, |body, (name, value)| Term::let_in(name, value, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crc_crack_smtlib::eval::{Assignment, Value, eval};
    use proptest::prelude::*;

    fn eval_crc_term(bytes: &[u8]) -> u32 {
        let vars: Vec<Term> = (0..bytes.len()).map(|i| Term::var(format!("s{i}"))).collect();
        let mut assignment = Assignment::new();
        for (i, &b) in bytes.iter().enumerate() {
            assignment.set(format!("s{i}"), Value::bitvec(u128::from(b), 8));
        }
        let value = eval(&crc32_term(&vars), &assignment).unwrap();
        let (bits, width) = value.as_bitvec().unwrap();
        assert_eq!(width, 32);
        bits as u32
    }

    #[test]
    fn check_vector() {
        assert_eq!(crc32(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn known_values() {
        assert_eq!(crc32(b""), 0);
        assert_eq!(crc32(b"a"), 0xE8B7_BE43);
        assert_eq!(crc32(b"The quick brown fox jumps over the lazy dog"), 0x414F_A339);
    }

    #[test]
    fn reflections() {
        assert_eq!(reflect8(0x01), 0x80);
        assert_eq!(reflect8(0b1100_0010), 0b0100_0011);
        assert_eq!(reflect32(0x0000_0001), 0x8000_0000);
        assert_eq!(reflect32(0x04C1_1DB7), 0xEDB8_8320);
    }

    #[test]
    fn symbolic_matches_check_vector() {
        assert_eq!(eval_crc_term(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn symbolic_of_no_bytes_is_zero() {
        assert_eq!(eval_crc_term(b""), 0);
    }

    #[test]
    fn term_grows_linearly() {
        let vars: Vec<Term> = (0..16).map(|i| Term::var(format!("s{i}"))).collect();
        let small = crc32_term(&vars[..8]).size();
        let large = crc32_term(&vars).size();
        // Doubling the input must not come close to squaring the term.
        assert!(large < small * 3, "{small} -> {large}");
    }

    #[test]
    fn term_names_every_round() {
        let text = crc32_term(&[Term::var("s0")]).to_string();
        assert!(text.contains("crc_b0_in"));
        assert!(text.contains("crc_b0_r7"));
        assert!(text.contains(OUT));
    }

    proptest! {
        #[test]
        fn symbolic_equals_concrete(bytes in proptest::collection::vec(any::<u8>(), 0..12)) {
            prop_assert_eq!(eval_crc_term(&bytes), crc32(&bytes));
        }

        #[test]
        fn reflect_is_an_involution(word in any::<u32>(), byte in any::<u8>()) {
            prop_assert_eq!(reflect32(reflect32(word)), word);
            prop_assert_eq!(reflect8(reflect8(byte)), byte);
        }
    }
}
