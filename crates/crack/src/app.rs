use std::path::PathBuf;

use clap::Parser;
use crc_crack::config::parse_target;
use crc_crack::{Alphabet, SearchConfig, StopPolicy};
use crc_crack_solver::SolverKind;

/// crc-crack - find strings with a given CRC-32
#[derive(Debug, Parser)]
#[command(name = "crc-crack", version, about, long_about = None)]
pub struct Cli {
    /// Length of the strings to search for, in bytes.
    #[arg(short = 'n', long, default_value_t = 16)]
    pub length: usize,

    /// CRC-32 to match, in hex.
    #[arg(short, long, default_value = "0xb5b69a26", value_parser = parse_target)]
    pub target: u32,

    /// Every string starts with this.
    #[arg(long, default_value = "ex_bad_")]
    pub prefix: String,

    /// Every string ends with this.
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Every string contains this somewhere.
    #[arg(long, default_value = "")]
    pub substring: String,

    /// Known answer: stop with success once it is found, print nothing else.
    #[arg(long)]
    pub plaintext: Option<String>,

    /// Allow any byte after the prefix instead of [0-9a-z_].
    #[arg(long)]
    pub any_byte: bool,

    /// SMT solver to use: z3, cvc5, or yices.
    #[arg(long, default_value = "z3")]
    pub solver: SolverKind,

    /// Path to the solver binary (auto-detected otherwise).
    #[arg(long, value_name = "PATH")]
    pub solver_path: Option<PathBuf>,

    /// Per-check solver timeout in milliseconds (0 = none).
    #[arg(long, default_value_t = 0)]
    pub timeout: u64,

    /// Stop after this many strings.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print the SMT-LIB2 query instead of solving it.
    #[arg(long)]
    pub emit_smt: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn search_config(&self) -> SearchConfig {
        let alphabet = if self.any_byte {
            Alphabet::Any
        } else {
            Alphabet::Identifier
        };
        let config = SearchConfig::new(self.length, self.target)
            .with_prefix(self.prefix.as_str())
            .with_suffix(self.suffix.as_str())
            .with_substring(self.substring.as_str())
            .with_alphabet(alphabet);
        match &self.plaintext {
            Some(plaintext) => config.with_plaintext(plaintext.as_str()),
            None => config,
        }
    }

    pub fn stop_policy(&self) -> StopPolicy {
        StopPolicy {
            plaintext: self.plaintext.clone(),
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_config() {
        let cli = Cli::parse_from(["crc-crack"]);
        assert_eq!(cli.search_config(), SearchConfig::default());
        assert_eq!(cli.stop_policy(), StopPolicy::exhaustive());
        assert_eq!(cli.solver, SolverKind::Z3);
    }

    #[test]
    fn flags_map_onto_config() {
        let cli = Cli::parse_from([
            "crc-crack",
            "-n",
            "10",
            "--target",
            "cbf43926",
            "--prefix",
            "",
            "--suffix",
            "_x",
            "--substring",
            "ab",
            "--plaintext",
            "12345678_x",
            "--any-byte",
            "--limit",
            "3",
            "--solver",
            "cvc5",
        ]);
        let config = cli.search_config();
        assert_eq!(config.length, 10);
        assert_eq!(config.target, 0xCBF4_3926);
        assert_eq!(config.prefix, "");
        assert_eq!(config.suffix, "_x");
        assert_eq!(config.substring, "ab");
        assert_eq!(config.plaintext.as_deref(), Some("12345678_x"));
        assert_eq!(config.alphabet, Alphabet::Any);
        assert_eq!(
            cli.stop_policy(),
            StopPolicy::until_plaintext("12345678_x").with_limit(3)
        );
        assert_eq!(cli.solver, SolverKind::Cvc5);
    }

    #[test]
    fn bad_target_is_rejected() {
        assert!(Cli::try_parse_from(["crc-crack", "--target", "nothex"]).is_err());
    }
}
