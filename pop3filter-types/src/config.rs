//! Mutable proxy configuration, owned by the management subsystem and read
//! (behind a lock) by every session task.

use std::collections::HashSet;
use std::net::SocketAddr;

use serde::Deserialize;

/// One `type/subtype` MIME literal, e.g. `("text", "html")`. Either half may
/// be `"*"`, matched as a wildcard by the compiled matcher tree.
pub type MediaType = (String, String);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub origin_addr: SocketAddr,
    pub management_addr: SocketAddr,
    pub management_user: String,
    pub management_pass: String,

    /// Whether `RETR` bodies are piped through `filter_command` at all.
    pub et_activated: bool,
    /// Shell command invoked as `bash -c "<env-prefix> <filter_command>"`.
    pub filter_command: String,
    /// Text substituted for the body when the filter cannot be spawned.
    pub replacement_msg: String,
    pub filtered_media_types: HashSet<MediaType>,

    /// Append-mode log file for the filter child's stderr.
    pub error_log_path: String,

    pub buffer_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:1110".parse().unwrap(),
            origin_addr: "127.0.0.1:110".parse().unwrap(),
            management_addr: "127.0.0.1:1111".parse().unwrap(),
            management_user: "admin".to_string(),
            management_pass: "admin".to_string(),
            et_activated: false,
            filter_command: String::new(),
            replacement_msg: "This message was removed by the proxy.".to_string(),
            filtered_media_types: HashSet::new(),
            error_log_path: "pop3filter-errors.log".to_string(),
            buffer_capacity: crate::buffer::DEFAULT_CAPACITY,
        }
    }
}

impl Config {
    pub fn ban(&mut self, media_type: MediaType) {
        self.filtered_media_types.insert(media_type);
    }

    pub fn unban(&mut self, media_type: &MediaType) -> bool {
        self.filtered_media_types.remove(media_type)
    }

    /// Renders the filtered set as a newline-joined `type/subtype` list, for
    /// the management protocol's `LIST` command.
    pub fn list_media_types(&self) -> String {
        self.filtered_media_types
            .iter()
            .map(|(t, s)| format!("{t}/{s}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ban_then_unban_round_trips() {
        let mut c = Config::default();
        let html = ("text".to_string(), "html".to_string());
        c.ban(html.clone());
        assert!(c.filtered_media_types.contains(&html));
        assert!(c.unban(&html));
        assert!(!c.filtered_media_types.contains(&html));
    }

    #[test]
    fn list_media_types_is_newline_joined() {
        let mut c = Config::default();
        c.filtered_media_types.clear();
        c.ban(("text".to_string(), "html".to_string()));
        assert_eq!(c.list_media_types(), "text/html");
    }
}
