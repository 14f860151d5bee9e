//! # Driving Ports (Inbound API)
//!
//! Read-only view of the registry handed to the lookup engine and the
//! connection scheduler.

use std::sync::Arc;

use crate::domain::{NodeId, Peer, SocketAddr};

/// Read access to the set of known peers.
///
/// Lookup code only needs to find peers, never to mutate membership, so it
/// depends on this trait rather than on [`PeerRegistry`](crate::PeerRegistry)
/// itself. Tests can substitute a fixed directory.
///
/// # Example
///
/// ```rust
/// use peer_registry::{NodeId, PeerDirectory};
///
/// fn pick_contacts<D: PeerDirectory<20>>(directory: &D, target: NodeId) -> usize {
///     directory.closest_to(&target, 3).len()
/// }
/// ```
pub trait PeerDirectory<const N: usize = 20>: Send + Sync {
    /// Peer registered under `node_id`.
    fn get(&self, node_id: &NodeId<N>) -> Option<Arc<Peer<N>>>;

    /// Peer registered at `addr`.
    fn get_by_address(&self, addr: &SocketAddr) -> Option<Arc<Peer<N>>>;

    /// Up to `count` routing-table peers ordered by XOR distance to `target`.
    fn closest_to(&self, target: &NodeId<N>, count: usize) -> Vec<Arc<Peer<N>>>;

    /// Every registered peer, best quality first.
    fn ordered_snapshot(&self) -> Vec<Arc<Peer<N>>>;

    /// Number of registered peers.
    fn size(&self) -> usize;
}
