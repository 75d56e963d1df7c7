//! The POP3 multi-line response framer.
//!
//! A multi-line response (`CAPA`, `LIST`, `RETR`, `TOP`, `UIDL`) is a
//! sequence of lines terminated by a line containing only `.`. A line of
//! actual content that starts with `.` is sent over the wire with an extra
//! leading dot (dot-stuffing); this framer undoes that stuffing and emits
//! [`Event::Fin`] exactly once, when the real terminator is consumed.
//!
//! This does not buffer a whole message: each byte produces zero or more
//! [`Event`]s immediately, so the caller can stream straight through to the
//! next pipeline stage (or to the client socket) without holding the body in
//! memory.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// One byte of real message content (already destuffed).
    Byte(u8),
    /// The `CRLF . CRLF` terminator has just been consumed in full.
    Fin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Not at a line boundary.
    Data,
    /// Just emitted a `\r`, waiting to see if `\n` follows.
    SeenCr,
    /// Just completed a `CRLF`; at the first byte of a new line.
    AfterCrLf,
    /// At line start, saw a leading `.`; not yet known to be stuffing or the
    /// terminator.
    SeenDot,
    /// After `SeenDot`, saw a `\r`; the terminator iff `\n` follows.
    SeenDotCr,
    /// Terminator consumed; no further bytes should be fed.
    Done,
}

#[derive(Debug, Clone)]
pub struct Framer {
    state: State,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framer {
    pub fn new() -> Self {
        Self {
            state: State::AfterCrLf,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    /// Resets the framer to parse another multi-line response.
    pub fn reset(&mut self) {
        self.state = State::AfterCrLf;
    }

    /// Feeds one byte, returning the events it produced (at most two: a
    /// buffered byte released from an earlier ambiguous state, plus this
    /// byte's own outcome).
    pub fn feed(&mut self, byte: u8) -> Vec<Event> {
        match self.state {
            State::Done => Vec::new(),
            State::Data => match byte {
                b'\r' => {
                    self.state = State::SeenCr;
                    vec![Event::Byte(b'\r')]
                }
                b => vec![Event::Byte(b)],
            },
            State::SeenCr => match byte {
                b'\n' => {
                    self.state = State::AfterCrLf;
                    vec![Event::Byte(b'\n')]
                }
                b'\r' => vec![Event::Byte(b'\r')],
                b => {
                    self.state = State::Data;
                    vec![Event::Byte(b)]
                }
            },
            State::AfterCrLf => match byte {
                b'.' => {
                    self.state = State::SeenDot;
                    Vec::new()
                }
                b'\r' => {
                    self.state = State::SeenCr;
                    vec![Event::Byte(b'\r')]
                }
                b => {
                    self.state = State::Data;
                    vec![Event::Byte(b)]
                }
            },
            State::SeenDot => match byte {
                b'\r' => {
                    self.state = State::SeenDotCr;
                    Vec::new()
                }
                b => {
                    self.state = State::Data;
                    vec![Event::Byte(b'.'), Event::Byte(b)]
                }
            },
            State::SeenDotCr => match byte {
                b'\n' => {
                    self.state = State::Done;
                    vec![Event::Fin]
                }
                b'\r' => {
                    self.state = State::SeenCr;
                    vec![Event::Byte(b'.'), Event::Byte(b'\r')]
                }
                b => {
                    self.state = State::Data;
                    vec![Event::Byte(b'.'), Event::Byte(b'\r'), Event::Byte(b)]
                }
            },
        }
    }
}
