//! Parses a `Content-Type` header's value into `type`/`subtype`, per
//! RFC 2045 §5.1: `type "/" subtype *(";" parameter)`.
//!
//! Parameters (`charset=...`, `boundary=...`) are scanned past but not
//! retained; nothing downstream needs them for the filtering decision.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    TypeByte(u8),
    TypeEnd,
    SubtypeByte(u8),
    SubtypeEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Type,
    Subtype,
    /// Past the subtype; parameters (if any) are discarded.
    Trailer,
}

#[derive(Debug, Clone)]
pub struct ValueParser {
    state: State,
}

impl Default for ValueParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueParser {
    pub fn new() -> Self {
        Self {
            state: State::Type,
        }
    }

    pub fn feed(&mut self, byte: u8) -> Vec<Event> {
        match self.state {
            State::Type => match byte {
                b'/' => {
                    self.state = State::Subtype;
                    vec![Event::TypeEnd]
                }
                b if b.is_ascii_whitespace() => Vec::new(),
                b => vec![Event::TypeByte(b)],
            },
            State::Subtype => match byte {
                b';' => {
                    self.state = State::Trailer;
                    vec![Event::SubtypeEnd]
                }
                b if b.is_ascii_whitespace() => {
                    self.state = State::Trailer;
                    vec![Event::SubtypeEnd]
                }
                b => vec![Event::SubtypeByte(b)],
            },
            State::Trailer => Vec::new(),
        }
    }

    /// Call once the header value is fully consumed, to flush a pending
    /// `SubtypeEnd` for values with no trailing `;` or whitespace.
    pub fn finish(&mut self) -> Vec<Event> {
        match self.state {
            State::Subtype => {
                self.state = State::Trailer;
                vec![Event::SubtypeEnd]
            }
            _ => Vec::new(),
        }
    }
}

/// Convenience wrapper over [`ValueParser`] for call sites that already have
/// the whole header value as a byte slice.
pub fn parse_type_subtype(value: &[u8]) -> Option<(String, String)> {
    let mut parser = ValueParser::new();
    let mut typ = Vec::new();
    let mut subtype = Vec::new();
    let mut events = Vec::new();
    for &b in value {
        events.extend(parser.feed(b));
    }
    events.extend(parser.finish());
    for ev in events {
        match ev {
            Event::TypeByte(b) => typ.push(b),
            Event::SubtypeByte(b) => subtype.push(b),
            Event::TypeEnd | Event::SubtypeEnd => {}
        }
    }
    if typ.is_empty() || subtype.is_empty() {
        return None;
    }
    Some((
        String::from_utf8_lossy(&typ).to_lowercase(),
        String::from_utf8_lossy(&subtype).to_lowercase(),
    ))
}
