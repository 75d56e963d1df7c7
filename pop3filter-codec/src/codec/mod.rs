//! [`tokio_util::codec`] adapters over [`Request`]/[`Response`] line framing.
//!
//! Only the status line is decoded/encoded here; a multi-line response body
//! is handled separately by [`crate::parse::pipeline::MimeFilter`] and
//! streamed buffer-to-buffer by the session task rather than being
//! collected into one `Response` value.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use pop3filter_types::{Command, Request, Response, Status};

use crate::error::CodecError;

/// Command lines longer than this are rejected with
/// [`CodecError::LineTooLong`] (spec: proxy-enforced length cap, matching
/// the origin C implementation's fixed-size line buffer).
pub const MAX_LINE_LENGTH: usize = 255;

fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\r\n")
}

/// Decodes client command lines into [`Request`]s.
#[derive(Debug, Default)]
pub struct RequestCodec;

impl Decoder for RequestCodec {
    type Item = Request;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Request>, CodecError> {
        let Some(n) = find_crlf(src) else {
            if src.len() > MAX_LINE_LENGTH {
                return Err(CodecError::LineTooLong {
                    max: MAX_LINE_LENGTH,
                });
            }
            return Ok(None);
        };
        if n > MAX_LINE_LENGTH {
            src.advance(n + 2);
            return Err(CodecError::LineTooLong {
                max: MAX_LINE_LENGTH,
            });
        }
        let line = src.split_to(n + 2);
        let line = &line[..n];

        let mut parts = line.splitn(2, |&b| b == b' ');
        let token = parts.next().unwrap_or(b"");
        if token.len() > 4 {
            return Err(CodecError::TokenTooLong { max: 4 });
        }
        let command = Command::from_bytes(token).ok_or(CodecError::UnknownCommand)?;
        let argument = parts
            .next()
            .map(|a| String::from_utf8_lossy(a).trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(Some(Request::new(command, argument)))
    }
}

impl Encoder<Request> for RequestCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.put_slice(item.marshal().as_bytes());
        Ok(())
    }
}

/// Decodes an origin's single-line status reply into a [`Response`]. Only
/// used for non-multiline commands; `CAPA`/`LIST`/`RETR`/`TOP`/`UIDL`
/// responses are streamed raw past the status line.
#[derive(Debug, Default)]
pub struct ResponseCodec;

impl Decoder for ResponseCodec {
    type Item = Response;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Response>, CodecError> {
        let Some(n) = find_crlf(src) else {
            if src.len() > MAX_LINE_LENGTH {
                return Err(CodecError::LineTooLong {
                    max: MAX_LINE_LENGTH,
                });
            }
            return Ok(None);
        };
        let line = src.split_to(n + 2);
        let line = String::from_utf8_lossy(&line[..n]).into_owned();

        let (status, rest) = if let Some(rest) = line.strip_prefix("+OK") {
            (Status::Ok, rest)
        } else if let Some(rest) = line.strip_prefix("-ERR") {
            (Status::Err, rest)
        } else {
            return Err(CodecError::UnknownCommand);
        };
        let text = rest.trim_start();
        let text = if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        };
        Ok(Some(Response { status, text }))
    }
}

impl Encoder<Response> for ResponseCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), CodecError> {
        dst.put_slice(item.status_line().as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_command_with_argument() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"USER alice\r\n"[..]);
        let req = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(req.command, Command::User);
        assert_eq!(req.argument.as_deref(), Some("alice"));
        assert!(buf.is_empty());
    }

    #[test]
    fn decodes_command_without_argument() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"QUIT\r\n"[..]);
        let req = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(req.command, Command::Quit);
        assert_eq!(req.argument, None);
    }

    #[test]
    fn incomplete_line_returns_none() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"QUIT"[..]);
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn unknown_command_is_an_error() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(&b"FROB\r\n"[..]);
        assert!(codec.decode(&mut buf).is_err());
    }

    #[test]
    fn oversized_line_without_crlf_errors_eagerly() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::from(vec![b'a'; MAX_LINE_LENGTH + 1].as_slice());
        assert!(matches!(
            codec.decode(&mut buf),
            Err(CodecError::LineTooLong { .. })
        ));
    }

    #[test]
    fn decodes_ok_response_with_text() {
        let mut codec = ResponseCodec;
        let mut buf = BytesMut::from(&b"+OK 2 320\r\n"[..]);
        let resp = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(resp.status, Status::Ok);
        assert_eq!(resp.text.as_deref(), Some("2 320"));
    }

    #[test]
    fn decodes_err_response() {
        let mut codec = ResponseCodec;
        let mut buf = BytesMut::from(&b"-ERR no such message\r\n"[..]);
        let resp = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(resp.status, Status::Err);
    }

    #[test]
    fn encode_request_round_trips_marshal() {
        let mut codec = RequestCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(Request::new(Command::Stat, None), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"STAT\r\n");
    }
}
