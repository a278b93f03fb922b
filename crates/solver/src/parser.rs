//! Parsing of solver stdout: the `check-sat` verdict and the `get-model` block.

use crate::error::SolverError;
use crate::model::Model;
use crate::result::SolverResult;

/// Parse solver stdout into a `SolverResult`.
///
/// Expected output:
/// - a verdict atom: `sat`, `unsat` or `unknown`
/// - if `sat`: the `(get-model)` response, either `(model (define-fun ...) ...)`
///   (older Z3) or a bare list of `define-fun` entries (Z3 4.8+, CVC5, Yices)
///
/// An `(error "...")` response before the verdict, or after `sat`, is a
/// process error. Z3 answers `(get-model)` with an error after `unsat` and
/// `unknown`; those are ignored.
pub fn parse_solver_output(stdout: &str, stderr: &str) -> Result<SolverResult, SolverError> {
    if stdout.trim().is_empty() {
        if stderr.contains("timeout") {
            return Ok(SolverResult::Unknown("timeout".to_string()));
        }
        return Err(SolverError::ParseError(format!(
            "Empty solver output. stderr: {}",
            stderr.trim()
        )));
    }

    let items = read_all(stdout)?;
    let verdict_at = items.iter().enumerate().find_map(|(i, item)| match item {
        Sexp::Atom(atom) => Some((i, atom.as_str())),
        Sexp::List(_) => None,
    });
    let preamble_end = verdict_at.map_or(items.len(), |(i, _)| i);

    if let Some(message) = items[..preamble_end].iter().find_map(error_message) {
        return Err(SolverError::ProcessError(message));
    }

    let Some((at, verdict)) = verdict_at else {
        return Err(match items.first() {
            Some(first) => SolverError::ParseError(format!("Unexpected solver output: {first}")),
            None => SolverError::ParseError("Empty solver output".to_string()),
        });
    };
    let rest = &items[at + 1..];

    match verdict {
        "unsat" => Ok(SolverResult::Unsat),
        "sat" => {
            if let Some(message) = rest.iter().find_map(error_message) {
                return Err(SolverError::ProcessError(message));
            }
            Ok(SolverResult::Sat(rest.first().and_then(parse_model)))
        }
        "unknown" => Ok(SolverResult::Unknown(unknown_reason(rest.first(), stderr))),
        "timeout" => Ok(SolverResult::Unknown("timeout".to_string())),
        other => Err(SolverError::ParseError(format!(
            "Unexpected solver output: {other}"
        ))),
    }
}

/// A parsed S-expression. Strings keep their quotes stripped.
#[derive(Debug, Clone, PartialEq)]
enum Sexp {
    Atom(String),
    List(Vec<Sexp>),
}

impl std::fmt::Display for Sexp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sexp::Atom(atom) => write!(f, "{atom}"),
            Sexp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Read every top-level S-expression in `input`.
fn read_all(input: &str) -> Result<Vec<Sexp>, SolverError> {
    let mut reader = Reader {
        chars: input.char_indices().peekable(),
        input,
    };
    let mut items = Vec::new();
    while let Some(item) = reader.next_sexp()? {
        items.push(item);
    }
    Ok(items)
}

struct Reader<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl Reader<'_> {
    fn skip_blank(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.chars.next();
            } else if c == ';' {
                // Line comment.
                for (_, c) in self.chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn next_sexp(&mut self) -> Result<Option<Sexp>, SolverError> {
        self.skip_blank();
        let Some(&(start, c)) = self.chars.peek() else {
            return Ok(None);
        };
        match c {
            '(' => {
                self.chars.next();
                let mut items = Vec::new();
                loop {
                    self.skip_blank();
                    match self.chars.peek() {
                        Some(&(_, ')')) => {
                            self.chars.next();
                            return Ok(Some(Sexp::List(items)));
                        }
                        Some(_) => {
                            if let Some(item) = self.next_sexp()? {
                                items.push(item);
                            }
                        }
                        None => {
                            return Err(SolverError::ParseError(
                                "Unbalanced parentheses in solver output".to_string(),
                            ));
                        }
                    }
                }
            }
            ')' => Err(SolverError::ParseError(format!(
                "Unexpected ')' at offset {start}"
            ))),
            '"' => {
                self.chars.next();
                let mut text = String::new();
                while let Some((_, c)) = self.chars.next() {
                    if c == '"' {
                        // SMT-LIB escapes a quote by doubling it.
                        if matches!(self.chars.peek(), Some(&(_, '"'))) {
                            self.chars.next();
                            text.push('"');
                            continue;
                        }
                        return Ok(Some(Sexp::Atom(text)));
                    }
                    text.push(c);
                }
                Err(SolverError::ParseError(
                    "Unterminated string in solver output".to_string(),
                ))
            }
            '|' => {
                self.chars.next();
                let mut text = String::new();
                for (_, c) in self.chars.by_ref() {
                    if c == '|' {
                        return Ok(Some(Sexp::Atom(text)));
                    }
                    text.push(c);
                }
                Err(SolverError::ParseError(
                    "Unterminated quoted symbol in solver output".to_string(),
                ))
            }
            _ => {
                let mut end = self.input.len();
                while let Some(&(i, c)) = self.chars.peek() {
                    if c.is_whitespace() || c == '(' || c == ')' {
                        end = i;
                        break;
                    }
                    self.chars.next();
                }
                Ok(Some(Sexp::Atom(self.input[start..end].to_string())))
            }
        }
    }
}

/// `(error "msg")` → `Some(msg)`.
fn error_message(sexp: &Sexp) -> Option<String> {
    match sexp {
        Sexp::List(items) => match items.as_slice() {
            [Sexp::Atom(head), Sexp::Atom(msg)] if head == "error" => Some(msg.clone()),
            _ => None,
        },
        Sexp::Atom(_) => None,
    }
}

/// Reason for an `unknown` verdict: Z3 may follow it with `(timeout)` or
/// similar, otherwise fall back to stderr.
fn unknown_reason(next: Option<&Sexp>, stderr: &str) -> String {
    match next {
        Some(Sexp::Atom(reason)) => reason.clone(),
        Some(Sexp::List(items)) if items.len() == 1 => items[0].to_string(),
        _ if !stderr.trim().is_empty() => stderr.trim().to_string(),
        _ => "unknown".to_string(),
    }
}

/// Collect nullary `define-fun` entries of a `get-model` response.
fn parse_model(block: &Sexp) -> Option<Model> {
    let Sexp::List(items) = block else {
        return None;
    };
    let entries = match items.first() {
        Some(Sexp::Atom(head)) if head == "model" => &items[1..],
        _ => &items[..],
    };

    let assignments: Vec<(String, String)> = entries.iter().filter_map(parse_define_fun).collect();

    if assignments.is_empty() {
        None
    } else {
        Some(Model::with_assignments(assignments))
    }
}

/// `(define-fun name () Sort value)` → `(name, value)`.
///
/// Functions with parameters are skipped; the model of a `QF_BV` problem
/// only needs constants.
fn parse_define_fun(entry: &Sexp) -> Option<(String, String)> {
    let Sexp::List(parts) = entry else {
        return None;
    };
    match parts.as_slice() {
        [Sexp::Atom(head), Sexp::Atom(name), Sexp::List(params), _sort, value]
            if head == "define-fun" && params.is_empty() =>
        {
            Some((name.clone(), value.to_string()))
        }
        _ => None,
    }
}
