//! Connection registry and idle reaper
//!
//! Tracks every live connection by id and sweeps out the idle ones on a
//! fixed interval. The sweep only reads handle atomics and the map lock;
//! it never touches a connection's I/O path, so it cannot deadlock against
//! engine tasks.

use super::handle::ConnectionHandle;
use crate::types::ConnectionId;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Thread-safe collection of live connections keyed by connection id
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Arc<ConnectionHandle>>,
    next_id: AtomicU64,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an id to a newly accepted connection and start tracking it
    #[must_use]
    pub fn register(&self, peer: SocketAddr) -> Arc<ConnectionHandle> {
        let id = ConnectionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = ConnectionHandle::new(id, peer);
        self.connections.insert(id, handle.clone());
        handle
    }

    /// Stop tracking a connection; idempotent
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    #[must_use]
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Evict connections idle beyond `idle_timeout`
    ///
    /// A connection with undrained output is never evicted: the client
    /// must receive the full response to its last command first. Returns
    /// the ids evicted by this sweep.
    pub fn sweep(&self, idle_timeout: Duration) -> Vec<ConnectionId> {
        let mut evicted = Vec::new();
        self.connections.retain(|id, handle| {
            if handle.is_closing() {
                // Close already in progress elsewhere; let it finish
                return true;
            }
            if handle.idle_for() >= idle_timeout && handle.pending_outputs() == 0 {
                debug!("evicting {} (idle {:?})", id, handle.idle_for());
                handle.begin_close();
                evicted.push(*id);
                return false;
            }
            true
        });
        evicted
    }

    /// Signal every tracked connection to close (graceful shutdown)
    pub fn close_all(&self) {
        for entry in self.connections.iter() {
            entry.value().begin_close();
        }
    }
}

/// Run the reaper sweep on its own timer, decoupled from connection I/O
pub fn spawn_reaper(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    idle_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick fires immediately; skip it so a fresh connection
        // is never measured against an empty history
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = registry.sweep(idle_timeout);
            if !evicted.is_empty() {
                info!("reaper evicted {} idle connection(s)", evicted.len());
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:9999".parse().unwrap()
    }

    #[test]
    fn test_register_and_remove() {
        let registry = ConnectionRegistry::new();
        let handle = registry.register(peer());
        assert!(registry.contains(handle.id()));
        assert_eq!(registry.len(), 1);

        assert!(registry.remove(handle.id()));
        assert!(!registry.remove(handle.id()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ConnectionRegistry::new();
        let a = registry.register(peer());
        let b = registry.register(peer());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_sweep_evicts_idle_connection() {
        let registry = ConnectionRegistry::new();
        let handle = registry.register(peer());

        // Zero timeout: everything idle is immediately eligible
        let evicted = registry.sweep(Duration::ZERO);
        assert_eq!(evicted, vec![handle.id()]);
        assert!(handle.is_closing());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_spares_active_connection() {
        let registry = ConnectionRegistry::new();
        let handle = registry.register(peer());
        handle.touch();

        let evicted = registry.sweep(Duration::from_secs(3600));
        assert!(evicted.is_empty());
        assert!(!handle.is_closing());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sweep_spares_connection_with_pending_output() {
        let registry = ConnectionRegistry::new();
        let handle = registry.register(peer());
        let (sender, _rx) = super::super::handle::output_channel(handle.clone());
        sender.send_line("220 1 <a@b>");

        // Idle beyond any timeout, but output is still queued
        let evicted = registry.sweep(Duration::ZERO);
        assert!(evicted.is_empty());
        assert!(!handle.is_closing());

        // Once drained it becomes eligible
        handle.output_drained();
        let evicted = registry.sweep(Duration::ZERO);
        assert_eq!(evicted, vec![handle.id()]);
    }

    #[test]
    fn test_sweep_skips_already_closing() {
        let registry = ConnectionRegistry::new();
        let handle = registry.register(peer());
        handle.begin_close();

        let evicted = registry.sweep(Duration::ZERO);
        assert!(evicted.is_empty());
        // Still tracked until its engine deregisters
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_close_all() {
        let registry = ConnectionRegistry::new();
        let a = registry.register(peer());
        let b = registry.register(peer());
        registry.close_all();
        assert!(a.is_closing());
        assert!(b.is_closing());
    }
}
