//! Peer sorting and selection.

use std::cmp::Reverse;
use std::sync::Arc;

use super::distance::xor_distance;
use crate::domain::{NodeId, Peer};

/// Sort peers by XOR distance from a target node (closest first).
///
/// Peers whose identifier is still unknown cannot be placed in XOR space and
/// are dropped from the result.
pub fn sort_peers_by_distance<const N: usize>(
    peers: &[Arc<Peer<N>>],
    target: &NodeId<N>,
) -> Vec<Arc<Peer<N>>> {
    let mut keyed: Vec<_> = peers
        .iter()
        .filter_map(|p| p.node_id().map(|id| (xor_distance(&id, target), Arc::clone(p))))
        .collect();
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, p)| p).collect()
}

/// Find the k closest peers to a target from a list
///
/// # Returns
/// Up to k peers sorted by distance (closest first)
pub fn find_k_closest<const N: usize>(
    peers: &[Arc<Peer<N>>],
    target: &NodeId<N>,
    k: usize,
) -> Vec<Arc<Peer<N>>> {
    let mut sorted = sort_peers_by_distance(peers, target);
    sorted.truncate(k);
    sorted
}

/// Order peers for connection prioritization: highest quality first.
///
/// The sort is stable, so peers with equal quality keep their relative
/// (insertion) order. Quality is read once per peer so a concurrent score
/// update cannot make the comparator inconsistent mid-sort.
pub fn sort_by_quality<const N: usize>(peers: &mut [Arc<Peer<N>>]) {
    peers.sort_by_cached_key(|p| Reverse(p.quality()));
}
