//! The management protocol: a separate, newline-terminated line protocol
//! (not POP3's `CRLF`) for authenticating and mutating the live [`Config`].
//!
//! States: `HELO -> USER -> PASS -> CONFIG`. A failed `PASS` sends the
//! session back to `USER`. `QUIT` is accepted in any state.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

use crate::app::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Helo,
    User,
    Pass,
    Config,
}

pub async fn handle_connection(socket: TcpStream, app: Arc<AppState>) {
    let (read_half, mut write_half) = socket.into_split();
    let mut reader = BufReader::new(read_half);
    let mut state = State::Helo;
    let mut pending_user: Option<String> = None;

    if send(&mut write_half, ok("pop3filter management")).await.is_err() {
        return;
    }
    state = State::User;

    let mut line = String::new();
    loop {
        line.clear();
        let n = match reader.read_line(&mut line).await {
            Ok(n) => n,
            Err(_) => break,
        };
        if n == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        let mut parts = line.splitn(2, ' ');
        let verb = parts.next().unwrap_or("").to_ascii_uppercase();
        let arg = parts.next().map(str::trim).filter(|s| !s.is_empty());

        if verb == "QUIT" {
            let _ = send(&mut write_half, ok("Goodbye.")).await;
            break;
        }

        let reply = match state {
            State::Helo => ok("ready"),
            State::User => match verb.as_str() {
                "USER" if arg.is_some() => {
                    pending_user = arg.map(str::to_string);
                    state = State::Pass;
                    ok("send PASS")
                }
                _ => err("USER <name> required"),
            },
            State::Pass => match verb.as_str() {
                "PASS" => {
                    let config = app.config.read().await;
                    let ok_auth = pending_user.as_deref() == Some(config.management_user.as_str())
                        && arg == Some(config.management_pass.as_str());
                    drop(config);
                    if ok_auth {
                        state = State::Config;
                        ok("authenticated")
                    } else {
                        state = State::User;
                        err("authentication failed")
                    }
                }
                _ => err("PASS <password> required"),
            },
            State::Config => handle_config_command(&verb, arg, &app).await,
        };
        if send(&mut write_half, reply).await.is_err() {
            break;
        }
    }
}

async fn handle_config_command(verb: &str, arg: Option<&str>, app: &Arc<AppState>) -> String {
    match verb {
        "CMD" => {
            let mut config = app.config.write().await;
            match arg {
                Some(cmd) => {
                    config.filter_command = cmd.to_string();
                    ok(&format!("filter command set to {cmd}"))
                }
                None => {
                    config.et_activated = !config.et_activated;
                    ok(&format!("external transformation {}", if config.et_activated { "enabled" } else { "disabled" }))
                }
            }
        }
        "MSG" => match arg {
            Some(msg) => {
                app.config.write().await.replacement_msg = msg.to_string();
                ok("replacement message updated")
            }
            None => err("MSG <text> required"),
        },
        "LIST" => {
            let config = app.config.read().await;
            ok(&config.list_media_types())
        }
        "BAN" => match arg.and_then(parse_media_type) {
            Some(media) => {
                app.config.write().await.ban(media);
                ok("banned")
            }
            None => err("BAN <type/subtype> required"),
        },
        "UNBAN" => match arg.and_then(parse_media_type) {
            Some(media) => {
                if app.config.write().await.unban(&media) {
                    ok("unbanned")
                } else {
                    err("not banned")
                }
            }
            None => err("UNBAN <type/subtype> required"),
        },
        "STATS" => ok(&app.metrics.render()),
        _ => err("unknown command"),
    }
}

fn parse_media_type(arg: &str) -> Option<(String, String)> {
    let (t, s) = arg.split_once('/')?;
    Some((t.to_lowercase(), s.to_lowercase()))
}

fn ok(text: &str) -> String {
    format!("+OK {text}\n")
}

fn err(text: &str) -> String {
    format!("-ERR {text}\n")
}

async fn send(
    writer: &mut tokio::net::tcp::OwnedWriteHalf,
    text: String,
) -> std::io::Result<()> {
    writer.write_all(text.as_bytes()).await
}
