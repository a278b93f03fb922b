/// A satisfying assignment reported by the solver.
///
/// Values are kept as the solver printed them (`#x41`, `#b1`, `true`, ...);
/// [`Model::bitvec`] decodes bitvector constants.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Variable assignments: `(name, value_string)` pairs.
    pub assignments: Vec<(String, String)>,
}

impl Model {
    pub fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    pub fn with_assignments(assignments: Vec<(String, String)>) -> Self {
        Self { assignments }
    }

    /// Look up a variable's value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Decode a bitvector constant.
    ///
    /// `None` when the variable is absent; `Some(Err(raw))` when its value is
    /// not a bitvector literal.
    pub fn bitvec(&self, name: &str) -> Option<Result<u128, String>> {
        self.get(name)
            .map(|raw| parse_bitvec_literal(raw).ok_or_else(|| raw.to_string()))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an SMT-LIB bitvector literal: `#xHH..`, `#bBB..` or `(_ bvN W)`.
pub fn parse_bitvec_literal(text: &str) -> Option<u128> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("#x") {
        return u128::from_str_radix(hex, 16).ok();
    }
    if let Some(bin) = text.strip_prefix("#b") {
        return u128::from_str_radix(bin, 2).ok();
    }
    let inner = text.strip_prefix('(')?.strip_suffix(')')?;
    let mut parts = inner.split_whitespace();
    if parts.next()? != "_" {
        return None;
    }
    let value = parts.next()?.strip_prefix("bv")?.parse().ok()?;
    let _width: u32 = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(value)
}
