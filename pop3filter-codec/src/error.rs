//! Errors raised by the parser pipeline, independent of I/O.

use thiserror::Error;

use pop3filter_types::ProxyError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("command line exceeds the maximum of {max} bytes")]
    LineTooLong { max: usize },

    #[error("command token exceeds the maximum of {max} bytes")]
    TokenTooLong { max: usize },

    #[error("unrecognised command")]
    UnknownCommand,

    #[error("malformed multi-line terminator")]
    BadTerminator,

    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

impl From<CodecError> for ProxyError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::LineTooLong { .. } | CodecError::TokenTooLong { .. } => {
                ProxyError::ParseTooLong
            }
            CodecError::UnknownCommand | CodecError::BadTerminator => ProxyError::ParseInvalid,
            CodecError::Io(msg) => ProxyError::Codec(msg),
        }
    }
}
