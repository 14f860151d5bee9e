//! Routing table result and statistics types.

use std::sync::Arc;

use crate::domain::Peer;

/// Which list of a bucket holds a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The bounded primary list (at most k entries)
    Primary,
    /// The replacement cache
    Replacement,
}

/// Result of [`RoutingTable::insert`](super::RoutingTable::insert).
#[derive(Debug, Clone)]
pub enum InsertOutcome<const N: usize = 20> {
    /// Added to the front of the bucket's primary list
    Inserted { bucket: usize },
    /// Already present; moved to the front of the list that holds it
    Refreshed { bucket: usize, slot: Slot },
    /// Primary list full; the peer went to the front of the replacement
    /// cache. `evicted` is the least-recently-seen replacement dropped to make
    /// room, if the cache was full.
    ///
    /// Not an error: the maintenance scheduler pings the oldest primary entry
    /// and calls `remove` if it is dead, which promotes a replacement.
    BucketFull {
        bucket: usize,
        evicted: Option<Arc<Peer<N>>>,
    },
    /// Peer has no identifier yet, or carries the local node's identifier
    Rejected,
}

impl<const N: usize> InsertOutcome<N> {
    /// Bucket the peer was classified into, if it was accepted.
    pub fn bucket(&self) -> Option<usize> {
        match self {
            Self::Inserted { bucket }
            | Self::Refreshed { bucket, .. }
            | Self::BucketFull { bucket, .. } => Some(*bucket),
            Self::Rejected => None,
        }
    }
}

/// Statistics about the routing table state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTableStats {
    /// Peers in primary lists
    pub total_peers: usize,
    /// Peers waiting in replacement caches
    pub replacement_peers: usize,
    /// Number of buckets with at least one primary peer
    pub buckets_used: usize,
    /// Age of the least recently seen primary peer in seconds
    pub oldest_peer_age_seconds: u64,
}
