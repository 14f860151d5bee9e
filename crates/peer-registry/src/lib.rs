//! # Peer Registry
//!
//! Thread-safe registry of known remote peers for a Kademlia overlay node,
//! with the k-bucket routing table used for XOR-distance lookups.
//!
//! Peers are indexed by identifier and by address, kept in a quality-ordered
//! list for connection scheduling, and filed into k-buckets (primary list
//! plus replacement cache) once their identifier is known. All of it forms
//! one consistency domain behind a single reader/writer lock.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** node identifiers, XOR distance, peers, k-buckets,
//!   routing table, blacklist
//! - **Ports Layer:** `PeerDirectory` (read API), `TimeSource` and
//!   `ConfigProvider` (host services)
//! - **Service Layer:** `PeerRegistry`
//! - **Adapters Layer:** system clock, static and TOML configuration
//!
//! ## Features
//!
//! - `config` (default) - `TomlConfigProvider` (serde, toml)
//! - `test-utils` - `FixedTimeSource`, `ManualTimeSource`
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use peer_registry::{
//!     AddOutcome, IpAddr, KademliaConfig, NodeId, Peer, PeerRegistry, SocketAddr,
//!     SystemTimeSource,
//! };
//!
//! let registry = PeerRegistry::new(
//!     NodeId::new([0u8; 20]),
//!     KademliaConfig::default(),
//!     Box::new(SystemTimeSource::new()),
//! )
//! .unwrap();
//!
//! // Inbound connection: address known, identifier not yet.
//! let peer = Arc::new(Peer::new(SocketAddr::new(IpAddr::v4(192, 168, 1, 100), 8080)));
//! assert!(matches!(registry.add(Arc::clone(&peer)), AddOutcome::Inserted));
//!
//! // Handshake completed: file the peer into its k-bucket.
//! let id = NodeId::new([0x80; 20]);
//! registry.update_identity(&peer, id).unwrap();
//!
//! assert!(Arc::ptr_eq(&registry.get(&id).unwrap(), &peer));
//! assert_eq!(registry.closest_to(&id, 1).len(), 1);
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (FixedTimeSource, ManualTimeSource)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Domain entities
pub use domain::{
    Blacklist, BucketSnapshot, Distance, InsertOutcome, IpAddr, KBucket, KademliaConfig, NodeId,
    Peer, RegistryError, RemovalReason, RoutingTable, RoutingTableStats, Slot, SocketAddr,
    Timestamp,
};

// Domain services
pub use domain::{
    bucket_for_peer, calculate_bucket_index, find_k_closest, sort_by_quality,
    sort_peers_by_distance, xor_distance,
};

// Port traits
pub use ports::{ConfigProvider, PeerDirectory, TimeSource};

// Service
pub use service::{AddOutcome, PeerRegistry, RegistryStats};

// Adapters
pub use adapters::{StaticConfigProvider, SystemTimeSource};
#[cfg(feature = "config")]
pub use adapters::{ConfigError, TomlConfigProvider};

#[cfg(feature = "test-utils")]
pub use test_utils::{FixedTimeSource, ManualTimeSource};
