//! Spawns the external filter configured by `CMD` on the management
//! protocol, reproducing the origin's env-var contract: the child is run as
//! `bash -c "<VAR=val ...> <filter_command>"`, relying on the shell's
//! per-command environment-prefix syntax rather than passing an explicit
//! environment map, so a filter script can be as simple as
//! `cat > /tmp/$POP3_USERNAME.eml`.

use std::fs::OpenOptions;
use std::process::Stdio;

use pop3filter_types::{Config, ProxyError};
use tokio::process::{Child, Command};

fn shell_quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Builds the `bash -c` script exactly as the origin proxy did: one line of
/// `VAR="value"` assignments immediately followed by the configured filter
/// command.
fn build_script(config: &Config, media: &str, username: &str, server: &str) -> String {
    format!(
        "FILTER_MEDIAS=\"{media}\" FILTER_MSG=\"{msg}\" POP3_FILTER_VERSION=\"1.0\" POP3_USERNAME=\"{user}\" POP3_SERVER=\"{server}\" {cmd}",
        media = shell_quote(media),
        msg = shell_quote(&config.replacement_msg),
        user = shell_quote(username),
        server = shell_quote(server),
        cmd = config.filter_command,
    )
}

/// Spawns the filter with piped stdin/stdout and stderr appended to
/// `Config::error_log_path`.
pub async fn spawn(
    config: &Config,
    media: &str,
    username: &str,
    server: &str,
) -> Result<Child, ProxyError> {
    if config.filter_command.trim().is_empty() {
        return Err(ProxyError::FilterSpawnFailed);
    }
    let script = build_script(config, media, username, server);
    log::debug!("spawning external filter for media type {media}");

    let stderr_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.error_log_path)
        .map_err(|_| ProxyError::FilterSpawnFailed)?;

    Command::new("bash")
        .arg("-c")
        .arg(script)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::from(stderr_file))
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| {
            log::warn!("failed to spawn external filter: {err}");
            ProxyError::FilterSpawnFailed
        })
}
