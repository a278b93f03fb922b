//! Candidate and status output.
//!
//! Candidates go to stdout, one per line. Status lines go to stderr:
//!   cracking: 0xb5b69a26
//!   Success!            (green)
//!   Done                (bold)
//! When stdout is not a terminal, a progress count is also written to
//! stderr every [`PROGRESS_EVERY`] candidates.
use std::io::{self, Write};
use std::ops::ControlFlow;

use colored::Colorize;
use crc_crack::Candidate;

pub const PROGRESS_EVERY: usize = 100;

/// Writes candidates and status lines for one search.
pub struct Reporter<W> {
    out: W,
    /// stdout is a terminal.
    interactive: bool,
    /// Candidates are printed (not in known-plaintext mode).
    print_candidates: bool,
    seen: usize,
    error: Option<io::Error>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, interactive: bool, print_candidates: bool) -> Self {
        Self {
            out,
            interactive,
            print_candidates,
            seen: 0,
            error: None,
        }
    }

    pub fn cracking(&self, target: u32) {
        eprintln!("{} {:#x}", "cracking:".bold(), target);
    }

    /// Sink for the search. Breaks when stdout can no longer be written.
    pub fn candidate(&mut self, candidate: &Candidate) -> ControlFlow<()> {
        self.seen += 1;
        if self.print_candidates
            && let Err(e) = writeln!(self.out, "{candidate}").and_then(|()| self.out.flush())
        {
            self.error = Some(e);
            return ControlFlow::Break(());
        }
        if !self.interactive && self.seen % PROGRESS_EVERY == 0 {
            eprintln!("{}", format!("{} candidates", self.seen).dimmed());
        }
        ControlFlow::Continue(())
    }

    pub fn success(&self, candidate: &Candidate) {
        eprintln!("{}", "Success!".green().bold());
        tracing::debug!("plaintext found after {} candidates: {candidate}", self.seen);
    }

    pub fn done(&self) {
        eprintln!("{}", "Done".bold());
    }

    pub fn limit_reached(&self, emitted: usize) {
        eprintln!("{}", format!("Stopped after {emitted} candidates").yellow());
    }

    pub fn cancelled(&self, emitted: usize) {
        eprintln!("{}", format!("Cancelled after {emitted} candidates").yellow());
    }

    /// Write failure that stopped the search, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn prints_one_candidate_per_line() {
        let mut reporter = Reporter::new(Vec::new(), true, true);
        assert!(reporter.candidate(&Candidate::new(b"ex_a".to_vec())).is_continue());
        assert!(reporter.candidate(&Candidate::new(vec![0xff])).is_continue());
        assert_eq!(String::from_utf8(reporter.out.clone()).unwrap(), "ex_a\nNone\n");
        assert_eq!(reporter.seen, 2);
    }

    #[test]
    fn plaintext_mode_prints_nothing() {
        let mut reporter = Reporter::new(Vec::new(), false, false);
        assert!(reporter.candidate(&Candidate::new(b"ex_a".to_vec())).is_continue());
        assert!(reporter.out.is_empty());
        assert_eq!(reporter.seen, 1);
    }

    #[test]
    fn write_failure_breaks() {
        let mut reporter = Reporter::new(Closed, false, true);
        assert!(reporter.candidate(&Candidate::new(b"x".to_vec())).is_break());
        let err = reporter.take_error().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(reporter.take_error().is_none());
    }
}
