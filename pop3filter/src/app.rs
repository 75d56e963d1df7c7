//! Process-wide shared state: the mutable [`Config`] (sole writer is the
//! management task) and the lock-free [`Metrics`].

use std::sync::Arc;

use pop3filter_types::{Config, Metrics};
use tokio::sync::RwLock;

#[derive(Debug)]
pub struct AppState {
    pub config: RwLock<Config>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        Arc::new(Self {
            config: RwLock::new(config),
            metrics: Metrics::new(),
        })
    }
}
