//! Minimal RFC 822 header scanner.
//!
//! Segments a stream of message bytes (already destuffed by
//! [`crate::parse::multiline::Framer`]) into header name/value events, and
//! signals the header/body boundary. Folded continuation lines (a line
//! starting with space or tab) are treated as part of the previous header's
//! value, per RFC 822 §3.1.1.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    NameByte(u8),
    NameEnd,
    ValueByte(u8),
    ValueEnd,
    /// The blank line separating headers from the body has been consumed.
    BodyStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// At the start of a header line (or the blank line ending the block).
    LineStart,
    InName,
    /// Consumed the `:` after a name; skipping at most one leading space.
    AfterColon,
    InValue,
    /// Saw `\r` while in a value; `\n` either folds into the next line or
    /// ends the value, depending on what follows.
    ValueCr,
    /// Saw `CRLF` in a value; this byte decides fold vs. end.
    ValueCrLf,
    /// Saw `\r` at a line start; `\n` here is the header/body blank line.
    BlankCr,
    Body,
}

#[derive(Debug, Clone)]
pub struct Scanner {
    state: State,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner {
    pub fn new() -> Self {
        Self {
            state: State::LineStart,
        }
    }

    pub fn in_body(&self) -> bool {
        self.state == State::Body
    }

    pub fn feed(&mut self, byte: u8) -> Vec<Event> {
        match self.state {
            State::Body => vec![Event::ValueByte(byte)],

            State::LineStart => match byte {
                b'\r' => {
                    self.state = State::BlankCr;
                    Vec::new()
                }
                b' ' | b'\t' => {
                    // Unexpected fold with no preceding header: treat the
                    // byte as the start of a (degenerate) value rather than
                    // panicking the pipeline.
                    self.state = State::InValue;
                    vec![Event::ValueByte(byte)]
                }
                b':' => {
                    // Empty header name; still a name boundary.
                    self.state = State::AfterColon;
                    vec![Event::NameEnd]
                }
                b => {
                    self.state = State::InName;
                    vec![Event::NameByte(b)]
                }
            },

            State::InName => match byte {
                b':' => {
                    self.state = State::AfterColon;
                    vec![Event::NameEnd]
                }
                b'\r' => {
                    // Header line with no `:` at all; close the name and
                    // fall through to value handling so the line still
                    // terminates cleanly.
                    self.state = State::ValueCr;
                    vec![Event::NameEnd, Event::ValueEnd]
                }
                b => vec![Event::NameByte(b)],
            },

            State::AfterColon => match byte {
                b' ' => {
                    self.state = State::InValue;
                    Vec::new()
                }
                b'\r' => {
                    self.state = State::ValueCr;
                    Vec::new()
                }
                b => {
                    self.state = State::InValue;
                    vec![Event::ValueByte(b)]
                }
            },

            State::InValue => match byte {
                b'\r' => {
                    self.state = State::ValueCr;
                    Vec::new()
                }
                b => vec![Event::ValueByte(b)],
            },

            State::ValueCr => match byte {
                b'\n' => {
                    self.state = State::ValueCrLf;
                    Vec::new()
                }
                b => {
                    // Bare CR inside a value: treat as content.
                    self.state = State::InValue;
                    vec![Event::ValueByte(b'\r'), Event::ValueByte(byte)]
                }
            },

            State::ValueCrLf => match byte {
                b' ' | b'\t' => {
                    // Folded continuation: the value keeps going, with the
                    // CRLF collapsed to a single space (RFC 822 §3.1.1).
                    self.state = State::InValue;
                    vec![Event::ValueByte(b' ')]
                }
                b'\r' => {
                    self.state = State::BlankCr;
                    vec![Event::ValueEnd]
                }
                b':' => {
                    self.state = State::AfterColon;
                    vec![Event::ValueEnd, Event::NameEnd]
                }
                b => {
                    self.state = State::InName;
                    vec![Event::ValueEnd, Event::NameByte(b)]
                }
            },

            State::BlankCr => match byte {
                b'\n' => {
                    self.state = State::Body;
                    vec![Event::BodyStart]
                }
                b => {
                    // Not actually blank; resume as a new header name,
                    // treating the swallowed CR as part of it is incorrect
                    // RFC822, but we degrade gracefully rather than panic.
                    self.state = State::InName;
                    vec![Event::NameByte(byte)]
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &[u8]) -> Vec<Event> {
        let mut s = Scanner::new();
        input.iter().flat_map(|&b| s.feed(b)).collect()
    }

    #[test]
    fn single_header_emits_name_then_value() {
        let events = run(b"To: x\r\n\r\n");
        assert_eq!(
            events,
            vec![
                Event::NameByte(b'T'),
                Event::NameByte(b'o'),
                Event::NameEnd,
                Event::ValueByte(b'x'),
                Event::ValueEnd,
                Event::BodyStart,
            ]
        );
    }

    #[test]
    fn folded_continuation_joins_into_one_value() {
        let events = run(b"X: a\r\n b\r\n\r\n");
        let values: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                Event::ValueByte(b) => Some(*b),
                _ => None,
            })
            .collect();
        assert_eq!(values, b" a b");
    }

    #[test]
    fn blank_line_transitions_to_body() {
        let mut s = Scanner::new();
        for &b in b"A: 1\r\n\r\n" {
            s.feed(b);
        }
        assert!(s.in_body());
    }

    #[test]
    fn body_bytes_pass_through_as_value_bytes() {
        let mut s = Scanner::new();
        for &b in b"\r\n" {
            s.feed(b);
        }
        let events = s.feed(b'X');
        assert_eq!(events, vec![Event::ValueByte(b'X')]);
    }
}
