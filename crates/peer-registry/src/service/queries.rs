//! Read operations. All run under the shared read lock and may proceed
//! concurrently with each other.

use std::sync::Arc;

use crate::domain::{sort_by_quality, NodeId, Peer, SocketAddr};
use crate::service::PeerRegistry;

impl<const N: usize> PeerRegistry<N> {
    /// Peer registered under `node_id`.
    pub fn get(&self, node_id: &NodeId<N>) -> Option<Arc<Peer<N>>> {
        self.state.read().by_id.get(node_id).cloned()
    }

    /// Peer registered at `addr`, identified or not.
    pub fn get_by_address(&self, addr: &SocketAddr) -> Option<Arc<Peer<N>>> {
        self.state.read().by_addr.get(addr).cloned()
    }

    /// True if a peer is registered at `addr`.
    pub fn contains_address(&self, addr: &SocketAddr) -> bool {
        self.state.read().by_addr.contains_key(addr)
    }

    /// Number of registered peers.
    pub fn size(&self) -> usize {
        self.state.read().ordered.len()
    }

    /// True if no peer is registered.
    pub fn is_empty(&self) -> bool {
        self.state.read().ordered.is_empty()
    }

    /// Every registered peer, highest quality first.
    ///
    /// Peers of equal quality keep registration order. The copy is taken
    /// under the read lock and sorted after it is released, so later
    /// registry changes do not affect the returned list.
    pub fn ordered_snapshot(&self) -> Vec<Arc<Peer<N>>> {
        let mut peers = self.state.read().ordered.clone();
        sort_by_quality(&mut peers);
        peers
    }

    /// Up to `count` routing-table peers closest to `target` by XOR
    /// distance, nearest first. Replacement cache entries are not returned.
    pub fn closest_to(&self, target: &NodeId<N>, count: usize) -> Vec<Arc<Peer<N>>> {
        self.state.read().table.find_closest_peers(target, count)
    }
}
