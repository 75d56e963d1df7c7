//! Command-line surface: where to listen, where the origin server and the
//! management listener live, and how loud to log. Everything else comes
//! from the optional `--config` file or the built-in defaults.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "pop3filter", about = "POP3 intercepting proxy with MIME-aware body filtering")]
pub struct Args {
    /// Address the proxy accepts client connections on.
    #[arg(long)]
    pub listen: Option<SocketAddr>,

    /// Address of the real POP3 origin server.
    #[arg(long)]
    pub origin: Option<SocketAddr>,

    /// Address the management protocol listens on.
    #[arg(long = "management-listen")]
    pub management_listen: Option<SocketAddr>,

    #[arg(long = "management-user")]
    pub management_user: Option<String>,

    #[arg(long = "management-pass")]
    pub management_pass: Option<String>,

    /// Optional TOML file overriding `Config::default()`.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub verbosity: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,
}
