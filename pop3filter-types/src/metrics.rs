//! Lock-free counters exposed to the management protocol's `STATS` command.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    concurrent_connections: AtomicI64,
    historical_access: AtomicU64,
    transferred_bytes: AtomicU64,
    retrieved_messages: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session_opened(&self) {
        self.concurrent_connections.fetch_add(1, Ordering::Relaxed);
        self.historical_access.fetch_add(1, Ordering::Relaxed);
    }

    pub fn session_closed(&self) {
        self.concurrent_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn add_transferred_bytes(&self, n: u64) {
        self.transferred_bytes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn message_retrieved(&self) {
        self.retrieved_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn concurrent_connections(&self) -> i64 {
        self.concurrent_connections.load(Ordering::Relaxed)
    }

    pub fn historical_access(&self) -> u64 {
        self.historical_access.load(Ordering::Relaxed)
    }

    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }

    pub fn retrieved_messages(&self) -> u64 {
        self.retrieved_messages.load(Ordering::Relaxed)
    }

    pub fn render(&self) -> String {
        format!(
            "Metrics\nConcurrent connections: {}\nHistorical Access: {}\nTransferred Bytes: {}\nRetrieved Messages: {}",
            self.concurrent_connections(),
            self.historical_access(),
            self.transferred_bytes(),
            self.retrieved_messages(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_nets_to_zero_concurrent() {
        let m = Metrics::new();
        m.session_opened();
        m.session_opened();
        assert_eq!(m.concurrent_connections(), 2);
        assert_eq!(m.historical_access(), 2);
        m.session_closed();
        assert_eq!(m.concurrent_connections(), 1);
        assert_eq!(m.historical_access(), 2);
    }
}
