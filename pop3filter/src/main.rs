//! `pop3filter`: accepts POP3 clients, relays them to a real origin server,
//! and optionally filters `RETR`/`TOP` bodies whose `Content-Type` matches a
//! configured media type. See `management` for the separate protocol used
//! to change that configuration at runtime.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use pop3filter::app::AppState;
use pop3filter::cli::Args;
use pop3filter::{config_loader, management, session};

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .parse_default_env()
        .init();

    let config = config_loader::load(&args);
    let listen_addr = config.listen_addr;
    let management_addr = config.management_addr;
    let app = AppState::new(config);

    let pop3_listener = match TcpListener::bind(listen_addr).await {
        Ok(l) => l,
        Err(err) => {
            log::error!("failed to bind {listen_addr}: {err}");
            std::process::exit(1);
        }
    };
    let management_listener = match TcpListener::bind(management_addr).await {
        Ok(l) => l,
        Err(err) => {
            log::error!("failed to bind management {management_addr}: {err}");
            std::process::exit(1);
        }
    };

    log::info!("listening on {listen_addr}, management on {management_addr}");

    let management_app = Arc::clone(&app);
    tokio::spawn(async move {
        loop {
            match management_listener.accept().await {
                Ok((socket, addr)) => {
                    log::debug!("management connection from {addr}");
                    let app = Arc::clone(&management_app);
                    tokio::spawn(management::handle_connection(socket, app));
                }
                Err(err) => log::warn!("management accept failed: {err}"),
            }
        }
    });

    loop {
        match pop3_listener.accept().await {
            Ok((socket, addr)) => {
                log::info!("accepted connection from {addr}");
                let app = Arc::clone(&app);
                tokio::spawn(session::handle_client(socket, addr, app));
            }
            Err(err) => log::warn!("accept failed: {err}"),
        }
    }
}
