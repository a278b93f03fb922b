use std::fmt;

use crate::checksum::crc32;

/// The separator that may not appear twice in a row.
pub const SEPARATOR: u8 = b'_';

/// Bytes allowed at positions after the prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alphabet {
    /// `0-9`, `a-z` and `_`.
    #[default]
    Identifier,
    /// Any byte.
    Any,
}

impl Alphabet {
    pub fn allows(&self, byte: u8) -> bool {
        match self {
            Alphabet::Identifier => {
                byte.is_ascii_digit() || byte.is_ascii_lowercase() || byte == SEPARATOR
            }
            Alphabet::Any => true,
        }
    }
}

/// Parameters of one preimage search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Number of bytes in every candidate.
    pub length: usize,
    /// CRC-32 the candidates must hash to.
    pub target: u32,
    pub prefix: String,
    pub suffix: String,
    /// Must occur somewhere; empty means no requirement.
    pub substring: String,
    /// Stop as soon as this text is found.
    pub plaintext: Option<String>,
    pub alphabet: Alphabet,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            length: 16,
            target: 0xB5B6_9A26,
            prefix: "ex_bad_".to_string(),
            suffix: String::new(),
            substring: String::new(),
            plaintext: None,
            alphabet: Alphabet::Identifier,
        }
    }
}

impl SearchConfig {
    /// Unconstrained search for `length` bytes hashing to `target`.
    pub fn new(length: usize, target: u32) -> Self {
        Self {
            length,
            target,
            prefix: String::new(),
            ..Self::default()
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_substring(mut self, substring: impl Into<String>) -> Self {
        self.substring = substring.into();
        self
    }

    pub fn with_plaintext(mut self, plaintext: impl Into<String>) -> Self {
        self.plaintext = Some(plaintext.into());
        self
    }

    pub fn with_alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Diagnose settings that make the search trivially empty.
    ///
    /// The search itself never fails on these; an unsatisfiable configuration
    /// simply produces no candidates. This is for callers who want to say why.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        let prefix = self.prefix.as_bytes();
        let suffix = self.suffix.as_bytes();

        // The empty string is the only zero-length candidate.
        if self.length == 0 && self.target != crc32(&[]) {
            issues.push(ConfigIssue::ZeroLength);
        }
        if prefix.len() + suffix.len() > self.length {
            issues.push(ConfigIssue::PinsExceedLength {
                prefix: prefix.len(),
                suffix: suffix.len(),
                length: self.length,
            });
        }
        if self.substring.len() > self.length {
            issues.push(ConfigIssue::SubstringTooLong {
                substring: self.substring.len(),
                length: self.length,
            });
        }

        let suffix_start = self.length.saturating_sub(suffix.len());
        for (i, &byte) in suffix.iter().enumerate() {
            let position = suffix_start + i;
            if position >= prefix.len() && !self.alphabet.allows(byte) {
                issues.push(ConfigIssue::SuffixOutsideAlphabet { position, byte });
            }
        }

        for (what, pinned) in [("prefix", prefix), ("suffix", suffix)] {
            if pinned.windows(2).any(|w| w == [SEPARATOR, SEPARATOR]) {
                issues.push(ConfigIssue::DoubleSeparator { within: what });
            }
        }
        if prefix.len() + suffix.len() == self.length
            && prefix.last() == Some(&SEPARATOR)
            && suffix.first() == Some(&SEPARATOR)
        {
            issues.push(ConfigIssue::DoubleSeparator {
                within: "prefix and suffix",
            });
        }

        issues
    }
}

/// A reason a configuration cannot produce any candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    ZeroLength,
    PinsExceedLength {
        prefix: usize,
        suffix: usize,
        length: usize,
    },
    SubstringTooLong {
        substring: usize,
        length: usize,
    },
    SuffixOutsideAlphabet {
        position: usize,
        byte: u8,
    },
    DoubleSeparator {
        within: &'static str,
    },
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigIssue::ZeroLength => {
                write!(f, "length is zero and the target is not the empty string's CRC")
            }
            ConfigIssue::PinsExceedLength {
                prefix,
                suffix,
                length,
            } => write!(
                f,
                "prefix ({prefix} bytes) and suffix ({suffix} bytes) do not fit in {length} bytes"
            ),
            ConfigIssue::SubstringTooLong { substring, length } => {
                write!(f, "substring ({substring} bytes) is longer than {length} bytes")
            }
            ConfigIssue::SuffixOutsideAlphabet { position, byte } => write!(
                f,
                "suffix byte {:?} at position {position} is outside the alphabet",
                char::from(*byte)
            ),
            ConfigIssue::DoubleSeparator { within } => {
                write!(f, "{within} contains a doubled '_'")
            }
        }
    }
}

/// Parse a CRC target given in hex, with or without a `0x` prefix.
pub fn parse_target(text: &str) -> Result<u32, String> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid CRC-32 target {text:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_reference_deployment() {
        let config = SearchConfig::default();
        assert_eq!(config.length, 16);
        assert_eq!(config.target, 0xB5B6_9A26);
        assert_eq!(config.prefix, "ex_bad_");
        assert!(config.suffix.is_empty() && config.substring.is_empty());
        assert_eq!(config.plaintext, None);
        assert_eq!(config.alphabet, Alphabet::Identifier);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn identifier_alphabet() {
        let alphabet = Alphabet::Identifier;
        for byte in b"09az_".iter().copied() {
            assert!(alphabet.allows(byte));
        }
        for byte in b"AZ-/ {".iter().copied() {
            assert!(!alphabet.allows(byte));
        }
        assert!(Alphabet::Any.allows(0xff));
    }

    #[test]
    fn zero_length_matches_only_the_empty_crc() {
        assert!(SearchConfig::new(0, crc32(b"")).validate().is_empty());
        assert_eq!(
            SearchConfig::new(0, 0xB5B6_9A26).validate(),
            vec![ConfigIssue::ZeroLength]
        );
    }

    #[test]
    fn pins_exceeding_length() {
        let config = SearchConfig::new(4, 0).with_prefix("abc").with_suffix("de");
        assert!(config.validate().contains(&ConfigIssue::PinsExceedLength {
            prefix: 3,
            suffix: 2,
            length: 4
        }));
    }

    #[test]
    fn substring_too_long() {
        let config = SearchConfig::new(2, 0).with_substring("abc");
        assert_eq!(
            config.validate(),
            vec![ConfigIssue::SubstringTooLong {
                substring: 3,
                length: 2
            }]
        );
    }

    #[test]
    fn suffix_outside_alphabet() {
        let config = SearchConfig::new(4, 0).with_suffix("aB");
        assert_eq!(
            config.validate(),
            vec![ConfigIssue::SuffixOutsideAlphabet {
                position: 3,
                byte: b'B'
            }]
        );
        assert!(config.with_alphabet(Alphabet::Any).validate().is_empty());
    }

    #[test]
    fn suffix_inside_prefix_region_is_exempt() {
        // Suffix overlaps the prefix; the pins conflict but the alphabet
        // rule does not apply there.
        let config = SearchConfig::new(3, 0).with_prefix("AB").with_suffix("B!");
        let issues = config.validate();
        assert!(!issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::SuffixOutsideAlphabet { position: 1, .. })));
        assert!(issues
            .iter()
            .any(|i| matches!(i, ConfigIssue::SuffixOutsideAlphabet { position: 2, .. })));
    }

    #[test]
    fn double_separators() {
        let config = SearchConfig::new(8, 0).with_prefix("a__");
        assert_eq!(
            config.validate(),
            vec![ConfigIssue::DoubleSeparator { within: "prefix" }]
        );
        let config = SearchConfig::new(4, 0).with_prefix("a_").with_suffix("_b");
        assert_eq!(
            config.validate(),
            vec![ConfigIssue::DoubleSeparator {
                within: "prefix and suffix"
            }]
        );
    }

    #[test]
    fn issue_messages() {
        assert_eq!(
            ConfigIssue::ZeroLength.to_string(),
            "length is zero and the target is not the empty string's CRC"
        );
        assert_eq!(
            ConfigIssue::SuffixOutsideAlphabet {
                position: 5,
                byte: b'Q'
            }
            .to_string(),
            "suffix byte 'Q' at position 5 is outside the alphabet"
        );
    }

    #[test]
    fn targets() {
        assert_eq!(parse_target("0xb5b69a26"), Ok(0xB5B6_9A26));
        assert_eq!(parse_target("0XCBF43926"), Ok(0xCBF4_3926));
        assert_eq!(parse_target("cbf43926"), Ok(0xCBF4_3926));
        assert!(parse_target("0x1_0000_0000").is_err());
        assert!(parse_target("xyz").is_err());
        assert!(parse_target("").is_err());
    }
}
