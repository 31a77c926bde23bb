use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use wordspy_core::words::WordList;

use crate::config::ServerConfig;
use crate::registry::LobbyRegistry;

pub type SharedIpCounts = Arc<Mutex<HashMap<IpAddr, usize>>>;

#[derive(Clone)]
pub struct AppState {
    pub lobbies: Arc<LobbyRegistry>,
    pub config: Arc<ServerConfig>,
    pub ws_connection_count: Arc<AtomicUsize>,
    pub ws_per_ip: SharedIpCounts,
}

impl AppState {
    pub fn new(config: ServerConfig, words: WordList) -> Self {
        Self {
            lobbies: Arc::new(LobbyRegistry::new(words)),
            config: Arc::new(config),
            ws_connection_count: Arc::new(AtomicUsize::new(0)),
            ws_per_ip: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// RAII guard for the global WebSocket connection count.
pub struct ConnectionGuard {
    count: Arc<AtomicUsize>,
}

impl ConnectionGuard {
    pub fn new(count: Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::Relaxed);
        Self { count }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::Relaxed);
    }
}

/// RAII guard for the per-IP WebSocket connection count. Dropping the guard
/// releases the slot; an IP's entry disappears with its last connection.
pub struct IpConnectionGuard {
    ip: IpAddr,
    counts: SharedIpCounts,
}

impl IpConnectionGuard {
    /// Returns `None` when the IP is already at its cap.
    pub fn try_acquire(ip: IpAddr, counts: SharedIpCounts, max_per_ip: usize) -> Option<Self> {
        {
            let mut map = counts.lock().unwrap();
            let count = map.entry(ip).or_insert(0);
            if *count >= max_per_ip {
                return None;
            }
            *count += 1;
        }
        Some(Self { ip, counts })
    }
}

impl Drop for IpConnectionGuard {
    fn drop(&mut self) {
        let mut map = self.counts.lock().unwrap();
        if let Some(count) = map.get_mut(&self.ip) {
            *count -= 1;
            if *count == 0 {
                map.remove(&self.ip);
            }
        }
    }
}
