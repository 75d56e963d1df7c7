//! Per-connection state: everything a [`Session`] needs to carry across the
//! lifetime of one client ↔ proxy ↔ origin dialogue.

use std::net::SocketAddr;

use crate::request::RequestQueue;

/// The three POP3 session phases (RFC 1939 §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authorization,
    Transaction,
    Update,
}

/// Consecutive malformed commands after which the session is terminated
/// (spec.md §4.4, §8).
pub const MAX_CONCURRENT_INVALID_COMMANDS: u32 = 3;

#[derive(Debug)]
pub struct Session {
    pub client_addr: SocketAddr,
    pub origin_addr: SocketAddr,

    /// FIFO of requests sent to the origin but not yet fully answered.
    pub requests: RequestQueue,

    /// Set from the origin's `CAPA` response: does it advertise
    /// `PIPELINING`?
    pub pipelining: bool,

    /// Set once `USER` has been accepted (i.e. sent onward; success is
    /// confirmed later by `PASS`).
    pub user: Option<String>,

    pub phase: Phase,

    /// Consecutive malformed client command lines. Reset to zero on any
    /// valid command; at [`MAX_CONCURRENT_INVALID_COMMANDS`] the session
    /// moves to `DONE`.
    pub consecutive_invalid_commands: u32,
}

impl Session {
    pub fn new(client_addr: SocketAddr, origin_addr: SocketAddr) -> Self {
        Self {
            client_addr,
            origin_addr,
            requests: RequestQueue::new(),
            pipelining: false,
            user: None,
            phase: Phase::Authorization,
            consecutive_invalid_commands: 0,
        }
    }

    pub fn register_invalid_command(&mut self) -> bool {
        self.consecutive_invalid_commands += 1;
        self.consecutive_invalid_commands >= MAX_CONCURRENT_INVALID_COMMANDS
    }

    pub fn register_valid_command(&mut self) {
        self.consecutive_invalid_commands = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> SocketAddr {
        "127.0.0.1:110".parse().unwrap()
    }

    #[test]
    fn three_consecutive_invalid_commands_trip_the_limit() {
        let mut s = Session::new(addr(), addr());
        assert!(!s.register_invalid_command());
        assert!(!s.register_invalid_command());
        assert!(s.register_invalid_command());
    }

    #[test]
    fn a_valid_command_resets_the_counter() {
        let mut s = Session::new(addr(), addr());
        s.register_invalid_command();
        s.register_invalid_command();
        s.register_valid_command();
        assert_eq!(s.consecutive_invalid_commands, 0);
    }
}
