//! Drives one client connection through the nine session states
//! (`ORIGIN_RESOLV -> CONNECTING -> HELLO -> CAPA -> REQUEST <-> RESPONSE
//! [-> EXTERNAL_TRANSFORMATION] -> DONE`, with any handler error routing to
//! `ERROR`).
//!
//! Each `Session` is driven by exactly one Tokio task and touches no shared
//! mutable state directly; the only cross-task state is the shared
//! `Config` (read each time a decision needs it) and the lock-free
//! `Metrics`.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;

use pop3filter_codec::codec::MAX_LINE_LENGTH;
use pop3filter_types::{Command, Phase, ProxyError, Request, Response, Session};

use crate::app::AppState;
use crate::relay::{self, ByteSource};

pub async fn handle_client(client: TcpStream, client_addr: SocketAddr, app: Arc<AppState>) {
    app.metrics.session_opened();
    if let Err(err) = run(client, client_addr, &app).await {
        log::warn!("session with {client_addr} ended: {err}");
    }
    app.metrics.session_closed();
}

async fn run(client: TcpStream, client_addr: SocketAddr, app: &Arc<AppState>) -> Result<(), ProxyError> {
    let (origin_addr, buffer_capacity) = {
        let config = app.config.read().await;
        (config.origin_addr, config.buffer_capacity)
    };
    log::debug!("resolving/connecting origin {origin_addr} for {client_addr}");

    // ORIGIN_RESOLV + CONNECTING collapse into one step: `TcpStream::connect`
    // resolves (if given a hostname) and connects in one future, the same
    // way `notify_block` handed DNS results straight into the reactor's
    // `CONNECTING` state in the source design.
    let origin = TcpStream::connect(origin_addr)
        .await
        .map_err(|_| ProxyError::ConnectRefused)?;

    let (client_rd, mut client_wr) = client.into_split();
    let (origin_rd, mut origin_wr) = origin.into_split();

    // One `ByteSource` per socket, held for the session's whole lifetime:
    // bytes a `read()` over-delivers past whatever `read_line`/`relay_*`
    // was looking for stay buffered here for the next call instead of
    // being dropped.
    let mut client_src = ByteSource::with_capacity(client_rd, buffer_capacity);
    let mut origin_src = ByteSource::with_capacity(origin_rd, buffer_capacity);

    let mut session = Session::new(client_addr, origin_addr);

    // HELLO: relay the origin's greeting verbatim.
    let greeting = relay::read_line(&mut origin_src).await?;
    let greeting = greeting.ok_or(ProxyError::IoReset)?;
    relay::write_line(&mut client_wr, &format!("{greeting}\r\n")).await?;

    // CAPA: the proxy learns PIPELINING for itself; the response is
    // forwarded to the client unmodified (see the open-question resolution
    // in DESIGN.md — we do not rewrite the advertisement).
    relay::write_line(&mut origin_wr, "CAPA\r\n").await?;
    session.pipelining = relay::relay_capa(&mut origin_src, &mut client_wr).await?;
    log::debug!("origin for {client_addr} advertises PIPELINING={}", session.pipelining);

    loop {
        // REQUEST
        let line = match relay::read_line(&mut client_src).await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(ProxyError::ParseTooLong) => {
                if reject(&mut client_wr, &mut session, client_addr, "Command too long.").await? {
                    break;
                }
                continue;
            }
            Err(err) => return Err(err),
        };
        let request = match parse_request_line(&line) {
            Ok(request) => request,
            Err(RequestParseError::ArgumentTooLong) => {
                if reject(&mut client_wr, &mut session, client_addr, "Parameter too long.").await? {
                    break;
                }
                continue;
            }
            Err(RequestParseError::Unrecognized) => {
                if reject(&mut client_wr, &mut session, client_addr, "Unknown command.").await? {
                    break;
                }
                continue;
            }
        };
        session.register_valid_command();
        let command = request.command;
        let is_quit = command == Command::Quit;
        session.requests.push(request.clone());

        relay::write_line(&mut origin_wr, &request.marshal()).await?;

        // RESPONSE
        let status_line = relay::read_line(&mut origin_src).await?.ok_or(ProxyError::IoReset)?;
        relay::write_line(&mut client_wr, &format!("{status_line}\r\n")).await?;
        session.requests.pop_front();

        let ok = status_line.starts_with("+OK");
        if ok && command.multiline_response() {
            if matches!(command, Command::Retr | Command::Top) {
                let config = app.config.read().await;
                let body_bytes = if config.et_activated {
                    let username = session.user.clone().unwrap_or_default();
                    let server = origin_addr.to_string();
                    let (filtered, bytes) = relay::relay_filtered_body(
                        &mut origin_src,
                        &mut client_wr,
                        &config,
                        &username,
                        &server,
                    )
                    .await?;
                    drop(config);
                    if filtered {
                        log::info!("{client_addr}: RETR body filtered");
                    }
                    bytes
                } else {
                    drop(config);
                    relay::relay_passthrough(&mut origin_src, &mut client_wr).await?
                };
                if command == Command::Retr {
                    app.metrics.message_retrieved();
                    app.metrics.add_transferred_bytes(body_bytes);
                }
            } else {
                relay::relay_passthrough(&mut origin_src, &mut client_wr).await?;
            }
        }

        if command == Command::User {
            session.user = request_argument(&line);
        }
        if ok && command == Command::Pass && session.phase == Phase::Authorization {
            session.phase = Phase::Transaction;
        }

        if is_quit {
            break;
        }
    }

    log::debug!("session with {client_addr} done");
    Ok(())
}

/// Replies locally with a tagged `-ERR` and bumps the consecutive-invalid
/// counter, without ever contacting the origin (spec §4.4/§7). Returns
/// whether the counter has now tripped and the session should close.
async fn reject(
    client_wr: &mut OwnedWriteHalf,
    session: &mut Session,
    client_addr: SocketAddr,
    text: &str,
) -> Result<bool, ProxyError> {
    let tripped = session.register_invalid_command();
    relay::write_line(client_wr, &Response::proxy_err(text)).await?;
    if tripped {
        log::warn!("{client_addr} sent too many invalid commands, closing");
    }
    Ok(tripped)
}

fn request_argument(line: &str) -> Option<String> {
    line.splitn(2, ' ').nth(1).map(str::trim).map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestParseError {
    Unrecognized,
    ArgumentTooLong,
}

/// Parses one client command line. Bounds both the whole line and the
/// argument independently of whatever length cap the caller's reader
/// already enforces, so "parameter too long" (spec §4.4/§7) is reported
/// even if this function is ever reached with an unbounded `line`.
fn parse_request_line(line: &str) -> Result<Request, RequestParseError> {
    if line.len() > MAX_LINE_LENGTH {
        return Err(RequestParseError::ArgumentTooLong);
    }
    let mut parts = line.splitn(2, ' ');
    let token = parts.next().unwrap_or("");
    if token.is_empty() || token.len() > 4 {
        return Err(RequestParseError::Unrecognized);
    }
    let command = Command::from_bytes(token.as_bytes()).ok_or(RequestParseError::Unrecognized)?;
    let argument = parts.next().map(str::trim).filter(|s| !s.is_empty());
    if let Some(arg) = argument {
        if arg.len() > MAX_LINE_LENGTH {
            return Err(RequestParseError::ArgumentTooLong);
        }
    }
    Ok(Request::new(command, argument.map(str::to_string)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_plain_command() {
        let req = parse_request_line("STAT").unwrap();
        assert_eq!(req.command, Command::Stat);
        assert_eq!(req.argument, None);
    }

    #[test]
    fn parses_a_command_with_argument() {
        let req = parse_request_line("RETR 3").unwrap();
        assert_eq!(req.command, Command::Retr);
        assert_eq!(req.argument.as_deref(), Some("3"));
    }

    #[test]
    fn unknown_command_is_err() {
        assert_eq!(parse_request_line("FROBNICATE"), Err(RequestParseError::Unrecognized));
    }

    #[test]
    fn empty_line_is_err() {
        assert_eq!(parse_request_line(""), Err(RequestParseError::Unrecognized));
    }

    #[test]
    fn overlong_argument_is_rejected() {
        let line = format!("RETR {}", "9".repeat(MAX_LINE_LENGTH));
        assert_eq!(parse_request_line(&line), Err(RequestParseError::ArgumentTooLong));
    }
}
