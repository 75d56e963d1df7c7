//! Loads `Config` from an optional TOML file, then applies CLI overrides.
//! This is the ambient process-surface concern; runtime mutation of
//! `et_activated`, `filter_command`, `replacement_msg` and the filtered
//! media-type set happens only through the management protocol
//! ([`crate::management`]).

use pop3filter_types::Config;

use crate::cli::Args;

pub fn load(args: &Args) -> Config {
    let mut config = match &args.config {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("failed to parse {}: {err}, using defaults", path.display());
                Config::default()
            }),
            Err(err) => {
                log::warn!("failed to read {}: {err}, using defaults", path.display());
                Config::default()
            }
        },
        None => Config::default(),
    };

    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(origin) = args.origin {
        config.origin_addr = origin;
    }
    if let Some(management) = args.management_listen {
        config.management_addr = management;
    }
    if let Some(user) = &args.management_user {
        config.management_user = user.clone();
    }
    if let Some(pass) = &args.management_pass {
        config.management_pass = pass.clone();
    }
    config
}
