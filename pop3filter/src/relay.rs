//! Byte-level relay helpers sitting between the session state machine and
//! the raw client/origin sockets: single status lines (bounded, `CRLF`
//! terminated) and multi-line bodies (streamed, never buffered whole).
//!
//! All reads for one socket go through a single [`ByteSource`] that the
//! caller owns for the lifetime of the connection. It fills a
//! [`pop3filter_types::Buffer`] with one syscall and hands bytes out one at
//! a time to whichever parser state machine is driving; because the same
//! `ByteSource` is reused across `read_line` and the body-relay calls,
//! bytes a `read()` over-delivers (the origin's status line and the start
//! of the body arriving in the same TCP segment, say) stay buffered for the
//! next call instead of being dropped.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use pop3filter_codec::codec::MAX_LINE_LENGTH;
use pop3filter_codec::parse::multiline;
use pop3filter_codec::{MatcherTree, MimeFilter};
use pop3filter_types::{Buffer, Config, ProxyError};

use crate::filter;

fn io_err() -> ProxyError {
    ProxyError::IoUnavailable(std::io::Error::other("write failed"))
}

/// Owns a reader plus a reusable [`Buffer`], refilling it with one `read()`
/// whenever it runs dry. One `ByteSource` per socket lives for the whole
/// connection, so unconsumed bytes carry over between calls.
pub(crate) struct ByteSource<R> {
    reader: R,
    buf: Buffer,
}

impl<R: AsyncRead + Unpin> ByteSource<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self::with_capacity(reader, pop3filter_types::buffer::DEFAULT_CAPACITY)
    }

    pub(crate) fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader,
            buf: Buffer::new(capacity),
        }
    }

    /// `Ok(None)` means the peer closed the connection with nothing left
    /// buffered — a clean EOF. Any I/O failure is `IoReset`.
    async fn next_byte(&mut self) -> Result<Option<u8>, ProxyError> {
        if !self.buf.can_read() {
            self.buf.reset();
            let n = self
                .reader
                .read(self.buf.reserve_write())
                .await
                .map_err(|_| ProxyError::IoReset)?;
            if n == 0 {
                return Ok(None);
            }
            self.buf.advance_write(n);
        }
        let byte = self.buf.reserve_read()[0];
        self.buf.advance_read(1);
        Ok(Some(byte))
    }
}

/// Reads one `CRLF`-terminated line, stripping the terminator. `Ok(None)`
/// means the peer closed the connection before sending anything.
///
/// A line exceeding [`MAX_LINE_LENGTH`] is drained up to its terminator (so
/// the next call starts clean) and reported as `ParseTooLong` rather than
/// silently truncated — callers recover locally per spec §4.4 rather than
/// propagating it as fatal.
pub(crate) async fn read_line<R: AsyncRead + Unpin>(
    source: &mut ByteSource<R>,
) -> Result<Option<String>, ProxyError> {
    let mut line: Vec<u8> = Vec::new();
    let mut too_long = false;
    loop {
        let Some(byte) = source.next_byte().await? else {
            if too_long {
                return Err(ProxyError::ParseTooLong);
            }
            return if line.is_empty() {
                Ok(None)
            } else {
                Err(ProxyError::IoReset)
            };
        };
        if byte == b'\n' && line.last() == Some(&b'\r') {
            line.pop();
            break;
        }
        line.push(byte);
        if line.len() > MAX_LINE_LENGTH {
            too_long = true;
            let last = *line.last().unwrap();
            line.clear();
            line.push(last);
        }
    }
    if too_long {
        return Err(ProxyError::ParseTooLong);
    }
    Ok(Some(String::from_utf8_lossy(&line).into_owned()))
}

pub(crate) async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    line: &str,
) -> Result<(), ProxyError> {
    writer.write_all(line.as_bytes()).await.map_err(|_| io_err())
}

/// Copies a multi-line response through byte-for-byte, undisturbed. Used
/// for `CAPA`/`LIST`/`UIDL` and for `RETR`/`TOP` bodies when filtering is
/// switched off. Returns the number of bytes relayed to the client.
pub(crate) async fn relay_passthrough<R, W>(
    source: &mut ByteSource<R>,
    client: &mut W,
) -> Result<u64, ProxyError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut framer = multiline::Framer::new();
    let mut n: u64 = 0;
    loop {
        let byte = source.next_byte().await?.ok_or(ProxyError::IoReset)?;
        let done = framer
            .feed(byte)
            .iter()
            .any(|ev| matches!(ev, multiline::Event::Fin));
        client.write_all(&[byte]).await.map_err(|_| io_err())?;
        n += 1;
        if done {
            return Ok(n);
        }
    }
}

/// Relays a `RETR`/`TOP` body, replacing it wholesale with
/// `Config::replacement_msg` (or the output of the external filter, if one
/// is configured) whenever its `Content-Type` matches a filtered media
/// type. Passes through byte-for-byte otherwise. Returns whether the body
/// was filtered and the number of bytes relayed to the client.
pub(crate) async fn relay_filtered_body<R, W>(
    source: &mut ByteSource<R>,
    client: &mut W,
    config: &Config,
    username: &str,
    server: &str,
) -> Result<(bool, u64), ProxyError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let tree = MatcherTree::compile(&config.filtered_media_types);
    let mut mime_filter = MimeFilter::new();
    let mut term_framer = multiline::Framer::new();
    let mut prefix = Vec::new();
    let mut decision: Option<bool> = None;
    let mut child: Option<tokio::process::Child> = None;
    let mut bytes_written: u64 = 0;

    loop {
        let byte = source.next_byte().await?.ok_or(ProxyError::IoReset)?;
        let done = term_framer
            .feed(byte)
            .iter()
            .any(|ev| matches!(ev, multiline::Event::Fin));

        match decision {
            None => {
                prefix.push(byte);
                if let Some(d) = mime_filter.feed(byte, &tree) {
                    decision = Some(d);
                    if d {
                        let media = mime_filter
                            .content_type()
                            .map(|(t, s)| format!("{t}/{s}"))
                            .unwrap_or_default();
                        if config.filter_command.trim().is_empty() {
                            log::info!("filtering matched media type with no external filter configured; substituting replacement text");
                        } else {
                            match filter::spawn(config, &media, username, server).await {
                                Ok(c) => child = Some(c),
                                Err(err) => {
                                    log::warn!("external filter unavailable, falling back to replacement text: {err}");
                                }
                            }
                        }
                    } else {
                        client.write_all(&prefix).await.map_err(|_| io_err())?;
                        bytes_written += prefix.len() as u64;
                        prefix.clear();
                    }
                }
            }
            Some(false) => {
                client.write_all(&[byte]).await.map_err(|_| io_err())?;
                bytes_written += 1;
            }
            Some(true) => {
                if let Some(c) = child.as_mut() {
                    if let Some(stdin) = c.stdin.as_mut() {
                        let _ = stdin.write_all(&[byte]).await;
                    }
                }
            }
        }

        if done {
            break;
        }
    }

    let filtered = decision.unwrap_or(false);
    if filtered {
        if let Some(mut c) = child.take() {
            drop(c.stdin.take());
            match c.wait_with_output().await {
                Ok(output) if output.status.success() => {
                    bytes_written += write_replacement_body(client, &output.stdout).await?;
                }
                _ => {
                    bytes_written +=
                        write_replacement_body(client, config.replacement_msg.as_bytes()).await?;
                }
            }
        } else {
            bytes_written +=
                write_replacement_body(client, config.replacement_msg.as_bytes()).await?;
        }
    }
    Ok((filtered, bytes_written))
}

/// Relays the `CAPA` multi-line response through unmodified, reporting
/// whether it advertises `PIPELINING` (spec: the proxy learns this once at
/// session start and never rewrites the advertisement itself).
pub(crate) async fn relay_capa<R, W>(
    source: &mut ByteSource<R>,
    client: &mut W,
) -> Result<bool, ProxyError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut framer = multiline::Framer::new();
    let mut body = Vec::new();
    loop {
        let byte = source.next_byte().await?.ok_or(ProxyError::IoReset)?;
        let done = framer
            .feed(byte)
            .iter()
            .any(|ev| matches!(ev, multiline::Event::Fin));
        body.push(byte);
        if done {
            break;
        }
    }
    client.write_all(&body).await.map_err(|_| io_err())?;
    let text = String::from_utf8_lossy(&body).to_lowercase();
    Ok(text.contains("pipelining"))
}

/// Dot-stuffs `body` and appends the `CRLF . CRLF` terminator. Returns the
/// number of bytes written to `client`.
async fn write_replacement_body<W: AsyncWrite + Unpin>(
    client: &mut W,
    body: &[u8],
) -> Result<u64, ProxyError> {
    let mut n: u64 = 0;
    for line in body.split(|&b| b == b'\n') {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.starts_with(b".") {
            client.write_all(b".").await.map_err(|_| io_err())?;
            n += 1;
        }
        client.write_all(line).await.map_err(|_| io_err())?;
        client.write_all(b"\r\n").await.map_err(|_| io_err())?;
        n += line.len() as u64 + 2;
    }
    client.write_all(b".\r\n").await.map_err(|_| io_err())?;
    n += 3;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_line_strips_crlf() {
        let input: &[u8] = b"USER alice\r\n";
        let mut source = ByteSource::new(input);
        let line = read_line(&mut source).await.unwrap().unwrap();
        assert_eq!(line, "USER alice");
    }

    #[tokio::test]
    async fn read_line_returns_none_on_clean_eof() {
        let input: &[u8] = b"";
        let mut source = ByteSource::new(input);
        assert_eq!(read_line(&mut source).await.unwrap(), None);
    }

    #[tokio::test]
    async fn passthrough_copies_bytes_verbatim() {
        let origin: &[u8] = b"line one\r\nline two\r\n.\r\n";
        let mut source = ByteSource::new(origin);
        let mut out = Vec::new();
        let n = relay_passthrough(&mut source, &mut out).await.unwrap();
        assert_eq!(out, b"line one\r\nline two\r\n.\r\n");
        assert_eq!(n, out.len() as u64);
    }

    #[tokio::test]
    async fn unfiltered_body_passes_through() {
        let origin: &[u8] = b"Content-Type: text/plain\r\n\r\nhello\r\n.\r\n";
        let mut source = ByteSource::new(origin);
        let mut out = Vec::new();
        let config = Config::default();
        let (filtered, n) = relay_filtered_body(&mut source, &mut out, &config, "alice", "pop.example")
            .await
            .unwrap();
        assert!(!filtered);
        assert_eq!(out, b"Content-Type: text/plain\r\n\r\nhello\r\n.\r\n");
        assert_eq!(n, out.len() as u64);
    }

    #[tokio::test]
    async fn relay_capa_detects_pipelining_case_insensitively() {
        let origin: &[u8] = b"+OK\r\nEXPIRE 1\r\nPIPELINING\r\nUIDL\r\n.\r\n";
        let mut source = ByteSource::new(origin);
        let mut out = Vec::new();
        let pipelining = relay_capa(&mut source, &mut out).await.unwrap();
        assert!(pipelining);
        assert_eq!(out, b"+OK\r\nEXPIRE 1\r\nPIPELINING\r\nUIDL\r\n.\r\n");
    }

    #[tokio::test]
    async fn filtered_body_is_replaced() {
        let origin: &[u8] = b"Content-Type: text/html\r\n\r\n<html/>\r\n.\r\n";
        let mut source = ByteSource::new(origin);
        let mut out = Vec::new();
        let mut config = Config::default();
        config.ban(("text".to_string(), "html".to_string()));
        config.replacement_msg = "removed".to_string();
        let (filtered, n) = relay_filtered_body(&mut source, &mut out, &config, "alice", "pop.example")
            .await
            .unwrap();
        assert!(filtered);
        assert_eq!(out, b"removed\r\n.\r\n");
        assert_eq!(n, out.len() as u64);
    }

    #[tokio::test]
    async fn read_line_rejects_overlong_lines() {
        let mut input = vec![b'a'; MAX_LINE_LENGTH + 10];
        input.extend_from_slice(b"\r\n");
        let mut source = ByteSource::new(input.as_slice());
        assert!(matches!(read_line(&mut source).await, Err(ProxyError::ParseTooLong)));
    }

    /// Regression test for the bug where a fresh `ByteSource` per call
    /// discarded whatever a single `read()` over-delivered past the line
    /// it was looking for: here the status line and the entire body arrive
    /// in one chunk, the same way a real socket read often coalesces them.
    #[tokio::test]
    async fn byte_source_persists_unconsumed_bytes_across_calls() {
        let origin: &[u8] =
            b"+OK 2 octets\r\nContent-Type: text/plain\r\n\r\nhi\r\n.\r\n";
        let mut source = ByteSource::new(origin);

        let status = read_line(&mut source).await.unwrap().unwrap();
        assert_eq!(status, "+OK 2 octets");

        let mut out = Vec::new();
        let n = relay_passthrough(&mut source, &mut out).await.unwrap();
        assert_eq!(out, b"Content-Type: text/plain\r\n\r\nhi\r\n.\r\n");
        assert_eq!(n, out.len() as u64);
    }

    /// A second pipelined command line queued right behind the first in the
    /// same `read()` must not be dropped when only the first is consumed.
    #[tokio::test]
    async fn byte_source_keeps_a_pipelined_second_line_for_the_next_read() {
        let input: &[u8] = b"STAT\r\nLIST\r\n";
        let mut source = ByteSource::new(input);
        assert_eq!(read_line(&mut source).await.unwrap().unwrap(), "STAT");
        assert_eq!(read_line(&mut source).await.unwrap().unwrap(), "LIST");
    }
}
