//! Error kinds from spec.md §7, as a `thiserror` enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("connection reset by peer")]
    IoReset,

    #[error("I/O error: {0}")]
    IoUnavailable(#[from] std::io::Error),

    #[error("unrecognised or malformed POP3 command")]
    ParseInvalid,

    #[error("command or argument exceeds the length limit")]
    ParseTooLong,

    #[error("could not resolve origin server address")]
    ResolutionFailed,

    #[error("origin server refused the connection")]
    ConnectRefused,

    #[error("could not spawn the external filter")]
    FilterSpawnFailed,

    #[error("the external filter's stream failed mid-transfer")]
    FilterStreamFailed,

    #[error("parser pipeline error: {0}")]
    Codec(String),
}

impl ProxyError {
    /// Whether this error kind should terminate the session outright, as
    /// opposed to being recovered locally with a `-ERR` reply (spec.md §7).
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::ParseInvalid | Self::ParseTooLong)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_are_not_fatal() {
        assert!(!ProxyError::ParseInvalid.is_fatal());
        assert!(!ProxyError::ParseTooLong.is_fatal());
    }

    #[test]
    fn io_and_resolution_errors_are_fatal() {
        assert!(ProxyError::ResolutionFailed.is_fatal());
        assert!(ProxyError::ConnectRefused.is_fatal());
        assert!(ProxyError::FilterStreamFailed.is_fatal());
    }
}
