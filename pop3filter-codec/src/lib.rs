#![deny(missing_debug_implementations)]

//! The framing and MIME-aware body-filtering pipeline sitting between the
//! raw sockets and the session state machine: [`codec::RequestCodec`] /
//! [`codec::ResponseCodec`] frame single status lines, while
//! [`parse::multiline::Framer`] and friends stream-parse multi-line bodies
//! without buffering them.

pub mod codec;
pub mod error;
pub mod parse;

pub use codec::{RequestCodec, ResponseCodec};
pub use error::CodecError;
pub use parse::pipeline::MimeFilter;
pub use parse::tree::MatcherTree;
