//! POP3 command identifiers (RFC 1939 plus the `CAPA` extension, RFC 2449).

use std::fmt;
use std::str::FromStr;

/// A canonical POP3 command id, independent of the argument text that came
/// with it.
///
/// Command tokens are matched case-insensitively, per spec.md's "do not
/// assume UTF-8, all command tokens are byte-level and case-insensitive"
/// rule — [`Command::from_bytes`] lower-cases with ASCII semantics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    User,
    Pass,
    Apop,
    Auth,
    Capa,
    Stat,
    List,
    Retr,
    Dele,
    Noop,
    Rset,
    Top,
    Uidl,
    Quit,
}

impl Command {
    /// Parses a command token from the first whitespace-delimited word of a
    /// POP3 command line. Returns `None` for anything not in the table
    /// above; the caller maps that to `PARSE_INVALID`.
    pub fn from_bytes(token: &[u8]) -> Option<Self> {
        // Case-fold ASCII only: POP3 command tokens are ASCII, and
        // non-ASCII bytes here simply never match any arm below.
        let mut lower = [0u8; 4];
        if token.len() > 4 {
            return None;
        }
        for (i, b) in token.iter().enumerate() {
            lower[i] = b.to_ascii_lowercase();
        }
        match &lower[..token.len()] {
            b"user" => Some(Self::User),
            b"pass" => Some(Self::Pass),
            b"apop" => Some(Self::Apop),
            b"auth" => Some(Self::Auth),
            b"capa" => Some(Self::Capa),
            b"stat" => Some(Self::Stat),
            b"list" => Some(Self::List),
            b"retr" => Some(Self::Retr),
            b"dele" => Some(Self::Dele),
            b"noop" => Some(Self::Noop),
            b"rset" => Some(Self::Rset),
            b"top" => Some(Self::Top),
            b"uidl" => Some(Self::Uidl),
            b"quit" => Some(Self::Quit),
            _ => None,
        }
    }

    /// Whether the origin's reply to this command is a multi-line response
    /// (terminated by `CRLF . CRLF`) as opposed to a single status line.
    pub fn multiline_response(self) -> bool {
        matches!(self, Self::Capa | Self::List | Self::Retr | Self::Top | Self::Uidl)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::User => "USER",
            Self::Pass => "PASS",
            Self::Apop => "APOP",
            Self::Auth => "AUTH",
            Self::Capa => "CAPA",
            Self::Stat => "STAT",
            Self::List => "LIST",
            Self::Retr => "RETR",
            Self::Dele => "DELE",
            Self::Noop => "NOOP",
            Self::Rset => "RSET",
            Self::Top => "TOP",
            Self::Uidl => "UIDL",
            Self::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_bytes(s.as_bytes()).ok_or(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Command::from_bytes(b"RETR"), Some(Command::Retr));
        assert_eq!(Command::from_bytes(b"retr"), Some(Command::Retr));
        assert_eq!(Command::from_bytes(b"ReTr"), Some(Command::Retr));
    }

    #[test]
    fn unknown_token_is_none() {
        assert_eq!(Command::from_bytes(b"FOO"), None);
    }

    #[test]
    fn multiline_classification_matches_rfc1939() {
        assert!(Command::Retr.multiline_response());
        assert!(Command::List.multiline_response());
        assert!(!Command::Stat.multiline_response());
        assert!(!Command::Quit.multiline_response());
    }

    #[test]
    fn display_round_trips_through_from_bytes() {
        for cmd in [
            Command::User,
            Command::Pass,
            Command::Apop,
            Command::Auth,
            Command::Capa,
            Command::Stat,
            Command::List,
            Command::Retr,
            Command::Dele,
            Command::Noop,
            Command::Rset,
            Command::Top,
            Command::Uidl,
            Command::Quit,
        ] {
            let rendered = cmd.to_string();
            assert_eq!(Command::from_bytes(rendered.as_bytes()), Some(cmd));
        }
    }
}
