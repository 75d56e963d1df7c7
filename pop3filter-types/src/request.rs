//! A parsed POP3 command line, queued until its paired response arrives.

use crate::command::Command;

/// One parsed client command: a canonical [`Command`] id plus whatever
/// argument text followed it on the line (trimmed, not yet validated against
/// command-specific syntax — e.g. `RETR`'s argument is still just text here,
/// parsed to a message number by the session state machine when needed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub argument: Option<String>,
}

impl Request {
    pub fn new(command: Command, argument: Option<String>) -> Self {
        Self { command, argument }
    }

    /// Re-serializes the request as a POP3 command line, `CRLF`-terminated,
    /// ready to be forwarded to the origin server.
    pub fn marshal(&self) -> String {
        match &self.argument {
            Some(arg) => format!("{} {}\r\n", self.command, arg),
            None => format!("{}\r\n", self.command),
        }
    }
}

/// Strict FIFO of in-flight requests. Responses from the origin are matched
/// to requests in enqueue order; a request is only removed once its paired
/// response has been fully delivered to the client.
#[derive(Debug, Default)]
pub struct RequestQueue {
    inner: std::collections::VecDeque<Request>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.inner.push_back(request);
    }

    /// Removes and returns the oldest still-unanswered request.
    pub fn pop_front(&mut self) -> Option<Request> {
        self.inner.pop_front()
    }

    pub fn front(&self) -> Option<&Request> {
        self.inner.front()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Drains every queued request, in order, for pipelined dispatch.
    pub fn drain_all(&mut self) -> Vec<Request> {
        self.inner.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marshal_includes_argument_when_present() {
        let r = Request::new(Command::User, Some("alice".into()));
        assert_eq!(r.marshal(), "USER alice\r\n");
    }

    #[test]
    fn marshal_omits_argument_when_absent() {
        let r = Request::new(Command::Quit, None);
        assert_eq!(r.marshal(), "QUIT\r\n");
    }

    #[test]
    fn queue_is_strict_fifo() {
        let mut q = RequestQueue::new();
        q.push(Request::new(Command::Stat, None));
        q.push(Request::new(Command::List, None));
        assert_eq!(q.pop_front().unwrap().command, Command::Stat);
        assert_eq!(q.pop_front().unwrap().command, Command::List);
        assert!(q.pop_front().is_none());
    }
}
