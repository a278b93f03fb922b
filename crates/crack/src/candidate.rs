use std::fmt;

/// A byte string found by the search.
///
/// `text` is present only when the bytes are valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    bytes: Vec<u8>,
    text: Option<String>,
}

impl Candidate {
    pub fn new(bytes: Vec<u8>) -> Self {
        let text = std::str::from_utf8(&bytes).ok().map(str::to_string);
        Self { bytes, text }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// The text, or `None` when the bytes do not decode.
impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => f.write_str(text),
            None => f.write_str("None"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_utf8() {
        let candidate = Candidate::new(b"ex_bad_q1".to_vec());
        assert_eq!(candidate.text(), Some("ex_bad_q1"));
        assert_eq!(candidate.to_string(), "ex_bad_q1");
        assert_eq!(candidate.len(), 9);
    }

    #[test]
    fn undecodable_keeps_bytes() {
        let candidate = Candidate::new(vec![b'a', 0xff, 0xfe]);
        assert_eq!(candidate.text(), None);
        assert_eq!(candidate.bytes(), &[b'a', 0xff, 0xfe]);
        assert_eq!(candidate.to_string(), "None");
    }

    #[test]
    fn empty() {
        let candidate = Candidate::new(Vec::new());
        assert!(candidate.is_empty());
        assert_eq!(candidate.text(), Some(""));
    }
}
