//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host application implements for the registry.

use crate::domain::{KademliaConfig, SocketAddr, Timestamp};

/// Abstract interface for time.
///
/// Injected so tests can control `last_seen` stamps. The registry reads the
/// clock before taking its lock.
pub trait TimeSource: Send + Sync {
    /// Get current Unix timestamp in seconds.
    fn now(&self) -> Timestamp;
}

/// Abstract interface for registry configuration.
pub trait ConfigProvider: Send + Sync {
    /// Bucket and replacement cache sizes.
    fn kademlia_config(&self) -> KademliaConfig;

    /// Seed addresses the bootstrap collaborator feeds into `add`.
    fn bootstrap_nodes(&self) -> Vec<SocketAddr>;
}
