//! The layered parser pipeline: POP3 multi-line framer → RFC 822 header
//! scanner → case-insensitive literal matcher → MIME value parser →
//! compiled matcher tree.
//!
//! [`pipeline::MimeFilter`] composes all five stages to answer one
//! question per `RETR`/`TOP` body: does this MIME part's `Content-Type`
//! match a filtered media type, and if so, where do its bytes start and end
//! so they can be replaced wholesale?

pub mod literal;
pub mod mime;
pub mod multiline;
pub mod pipeline;
pub mod rfc822;
pub mod tree;
