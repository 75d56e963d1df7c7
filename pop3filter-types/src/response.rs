//! The origin's (or the proxy's own) reply to a [`crate::Request`].

/// POP3 status indicator: the first token of a response line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Err,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "+OK",
            Self::Err => "-ERR",
        }
    }
}

/// One response: a status plus the optional text that followed it on the
/// status line. The multi-line payload that may follow (for `CAPA`, `LIST`,
/// `RETR`, `TOP`, `UIDL`) is not buffered here — it is streamed
/// buffer-to-buffer by the session state machine, which only needs to know
/// *that* a response is multi-line (via `Command::multiline_response`), not
/// hold its bytes in this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub text: Option<String>,
}

impl Response {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            text: Some(text.into()),
        }
    }

    pub fn err(text: impl Into<String>) -> Self {
        Self {
            status: Status::Err,
            text: Some(text.into()),
        }
    }

    /// Renders the status line, `CRLF`-terminated.
    pub fn status_line(&self) -> String {
        match &self.text {
            Some(text) => format!("{} {}\r\n", self.status.as_str(), text),
            None => format!("{}\r\n", self.status.as_str()),
        }
    }

    /// A proxy-originated error line, tagged `(POPG)` so clients can tell it
    /// apart from an error forwarded from the origin (spec.md §7).
    pub fn proxy_err(text: impl std::fmt::Display) -> String {
        format!("-ERR {text} (POPG)\r\n")
    }
}
