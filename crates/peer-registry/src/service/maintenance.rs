use std::sync::Arc;

use crate::domain::{BucketSnapshot, Peer, RoutingTableStats};
use crate::service::PeerRegistry;

/// Point-in-time registry counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Registered peers
    pub peers: usize,
    /// Registered peers whose identifier is known
    pub identified_peers: usize,
    /// Blacklisted addresses
    pub blacklisted_addresses: usize,
    /// Routing table occupancy
    pub routing: RoutingTableStats,
}

impl<const N: usize> PeerRegistry<N> {
    /// Copy of one bucket's primary list and replacement cache.
    ///
    /// `None` if `index` is not below the identifier bit width.
    pub fn bucket(&self, index: usize) -> Option<BucketSnapshot<N>> {
        self.state.read().table.snapshot(index)
    }

    /// Least recently seen primary entry of a bucket.
    ///
    /// The maintenance scheduler pings this peer and calls
    /// [`PeerRegistry::remove`] if it does not answer; removal promotes the
    /// newest replacement into the freed slot.
    pub fn oldest(&self, index: usize) -> Option<Arc<Peer<N>>> {
        self.state.read().table.oldest(index)
    }

    /// Collect registry and routing table counters.
    pub fn stats(&self) -> RegistryStats {
        let now = self.now();
        let state = self.state.read();
        let blacklisted_addresses = self.blacklist.read().len();
        RegistryStats {
            peers: state.ordered.len(),
            identified_peers: state.by_id.len(),
            blacklisted_addresses,
            routing: state.table.stats(now),
        }
    }
}
