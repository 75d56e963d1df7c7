//! Resettable, case-insensitive literal matcher.
//!
//! Used to recognise the `Content-Type` header name as it streams byte by
//! byte out of [`crate::parse::rfc822::Scanner`], without ever materialising
//! the header name as a `String`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Bytes seen so far still agree with the literal; more may follow.
    Matching,
    /// The byte just fed completed an exact, case-insensitive match.
    Eq,
    /// The byte just fed diverged from the literal; no further bytes can
    /// make this matcher match again without a [`CaseInsensitiveMatcher::reset`].
    Neq,
}

#[derive(Debug, Clone)]
pub struct CaseInsensitiveMatcher {
    literal: &'static [u8],
    pos: usize,
    failed: bool,
}

impl CaseInsensitiveMatcher {
    pub fn new(literal: &'static [u8]) -> Self {
        Self {
            literal,
            pos: 0,
            failed: false,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.failed = false;
    }

    pub fn feed(&mut self, byte: u8) -> Outcome {
        if self.failed || self.pos >= self.literal.len() {
            self.failed = true;
            return Outcome::Neq;
        }
        if byte.to_ascii_lowercase() == self.literal[self.pos].to_ascii_lowercase() {
            self.pos += 1;
            if self.pos == self.literal.len() {
                Outcome::Eq
            } else {
                Outcome::Matching
            }
        } else {
            self.failed = true;
            Outcome::Neq
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(lit: &'static [u8], input: &[u8]) -> Vec<Outcome> {
        let mut m = CaseInsensitiveMatcher::new(lit);
        input.iter().map(|&b| m.feed(b)).collect()
    }

    #[test]
    fn exact_case_matches() {
        let out = feed_all(b"To", b"To");
        assert_eq!(out, vec![Outcome::Matching, Outcome::Eq]);
    }

    #[test]
    fn mixed_case_still_matches() {
        let out = feed_all(b"content-type", b"Content-Type");
        assert_eq!(*out.last().unwrap(), Outcome::Eq);
        assert!(out[..out.len() - 1].iter().all(|o| *o == Outcome::Matching));
    }

    #[test]
    fn divergence_is_neq_and_sticky() {
        let mut m = CaseInsensitiveMatcher::new(b"To");
        assert_eq!(m.feed(b'T'), Outcome::Matching);
        assert_eq!(m.feed(b'x'), Outcome::Neq);
        assert_eq!(m.feed(b'o'), Outcome::Neq);
    }

    #[test]
    fn extra_trailing_byte_past_literal_length_is_neq() {
        let mut m = CaseInsensitiveMatcher::new(b"To");
        assert_eq!(m.feed(b'T'), Outcome::Matching);
        assert_eq!(m.feed(b'o'), Outcome::Eq);
        assert_eq!(m.feed(b'o'), Outcome::Neq);
    }

    #[test]
    fn reset_allows_reuse() {
        let mut m = CaseInsensitiveMatcher::new(b"To");
        m.feed(b'x');
        assert_eq!(m.feed(b'x'), Outcome::Neq);
        m.reset();
        assert_eq!(m.feed(b'T'), Outcome::Matching);
        assert_eq!(m.feed(b'o'), Outcome::Eq);
    }
}
