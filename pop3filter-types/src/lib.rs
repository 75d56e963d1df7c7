#![deny(missing_debug_implementations)]

//! Data structures shared by the POP3 filtering proxy's parser pipeline and
//! session state machine: the fixed-capacity [`buffer::Buffer`], the
//! [`command::Command`]/[`request::Request`]/[`response::Response`] trio
//! that models one POP3 exchange, [`session::Session`] (all per-connection
//! state), and the ambient [`config::Config`], [`metrics::Metrics`] and
//! [`error::ProxyError`] types.

pub mod buffer;
pub mod command;
pub mod config;
pub mod error;
pub mod metrics;
pub mod request;
pub mod response;
pub mod session;

pub use buffer::Buffer;
pub use command::Command;
pub use config::Config;
pub use error::ProxyError;
pub use metrics::Metrics;
pub use request::Request;
pub use response::{Response, Status};
pub use session::{Phase, Session};
