#![deny(missing_debug_implementations)]

//! Library half of the `pop3filter` binary: everything except `main`'s CLI
//! glue, so integration tests can drive a real session/management loop
//! against a fake origin server on loopback.

pub mod app;
pub mod cli;
pub mod config_loader;
pub mod filter;
pub mod management;
pub mod relay;
pub mod session;
