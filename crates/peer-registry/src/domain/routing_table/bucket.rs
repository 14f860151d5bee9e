//! K-Bucket implementation for Kademlia routing.

use std::collections::VecDeque;
use std::sync::Arc;

use super::outcome::Slot;
use crate::domain::{NodeId, Peer, Timestamp};

/// A k-bucket storing up to k peers at a specific distance range
///
/// Both lists are ordered most-recently-seen first. The replacement cache is
/// only filled while the primary list is full and is drained by
/// [`KBucket::promote_replacement`] when a primary slot frees up.
#[derive(Debug, Clone)]
pub struct KBucket<const N: usize = 20> {
    /// Primary entries (max size = K, default 20)
    pub(crate) peers: VecDeque<Arc<Peer<N>>>,
    /// Overflow candidates waiting for a primary slot
    pub(crate) replacements: VecDeque<Arc<Peer<N>>>,
    /// Last time this bucket was updated
    pub(crate) last_updated: Timestamp,
}

impl<const N: usize> KBucket<N> {
    /// Create a new empty k-bucket
    pub fn new() -> Self {
        Self {
            peers: VecDeque::new(),
            replacements: VecDeque::new(),
            last_updated: Timestamp::new(0),
        }
    }

    /// Get the number of primary peers in this bucket
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if the primary list is empty
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Check if the primary list is full
    pub fn is_full(&self, k: usize) -> bool {
        self.peers.len() >= k
    }

    /// Number of peers in the replacement cache
    pub fn replacement_len(&self) -> usize {
        self.replacements.len()
    }

    /// Primary peers, most recently seen first
    pub fn peers(&self) -> &VecDeque<Arc<Peer<N>>> {
        &self.peers
    }

    /// Replacement peers, most recently seen first
    pub fn replacements(&self) -> &VecDeque<Arc<Peer<N>>> {
        &self.replacements
    }

    /// The least recently seen primary peer (first to be pinged)
    pub fn oldest_peer(&self) -> Option<&Arc<Peer<N>>> {
        self.peers.back()
    }

    /// Last time a peer was added, refreshed or promoted
    pub fn last_updated(&self) -> Timestamp {
        self.last_updated
    }

    /// Which list holds `node_id`, if any
    pub fn slot_of(&self, node_id: &NodeId<N>) -> Option<Slot> {
        if position(&self.peers, node_id).is_some() {
            Some(Slot::Primary)
        } else if position(&self.replacements, node_id).is_some() {
            Some(Slot::Replacement)
        } else {
            None
        }
    }

    /// Check if either list contains the peer
    pub fn contains(&self, node_id: &NodeId<N>) -> bool {
        self.slot_of(node_id).is_some()
    }

    /// Add a peer to the front of the primary list (assumes not full)
    pub(crate) fn add_peer(&mut self, peer: Arc<Peer<N>>, now: Timestamp) {
        peer.mark_seen(now);
        self.peers.push_front(peer);
        self.last_updated = now;
    }

    /// Add a peer to the front of the replacement cache.
    ///
    /// Returns the least recently seen replacement if the cache overflowed.
    /// With a capacity of zero the candidate itself is returned.
    pub(crate) fn add_replacement(
        &mut self,
        peer: Arc<Peer<N>>,
        capacity: usize,
        now: Timestamp,
    ) -> Option<Arc<Peer<N>>> {
        if capacity == 0 {
            return Some(peer);
        }
        peer.mark_seen(now);
        self.replacements.push_front(peer);
        self.last_updated = now;
        if self.replacements.len() > capacity {
            self.replacements.pop_back()
        } else {
            None
        }
    }

    /// Move a peer to the front of whichever list holds it
    pub(crate) fn move_to_front(&mut self, node_id: &NodeId<N>, now: Timestamp) -> Option<Slot> {
        let (list, pos, slot) = if let Some(pos) = position(&self.peers, node_id) {
            (&mut self.peers, pos, Slot::Primary)
        } else if let Some(pos) = position(&self.replacements, node_id) {
            (&mut self.replacements, pos, Slot::Replacement)
        } else {
            return None;
        };
        if let Some(peer) = list.remove(pos) {
            peer.mark_seen(now);
            list.push_front(peer);
        }
        self.last_updated = now;
        Some(slot)
    }

    /// Remove a peer from whichever list holds it
    pub(crate) fn remove_peer(&mut self, node_id: &NodeId<N>) -> Option<(Slot, Arc<Peer<N>>)> {
        if let Some(pos) = position(&self.peers, node_id) {
            return self.peers.remove(pos).map(|p| (Slot::Primary, p));
        }
        position(&self.replacements, node_id)
            .and_then(|pos| self.replacements.remove(pos))
            .map(|p| (Slot::Replacement, p))
    }

    /// Move the most recently seen replacement into a free primary slot.
    ///
    /// No-op if the primary list is full or the cache is empty.
    pub(crate) fn promote_replacement(&mut self, k: usize, now: Timestamp) -> Option<Arc<Peer<N>>> {
        if self.is_full(k) {
            return None;
        }
        let peer = self.replacements.pop_front()?;
        self.peers.push_front(Arc::clone(&peer));
        self.last_updated = now;
        Some(peer)
    }
}

impl<const N: usize> Default for KBucket<N> {
    fn default() -> Self {
        Self::new()
    }
}

fn position<const N: usize>(list: &VecDeque<Arc<Peer<N>>>, node_id: &NodeId<N>) -> Option<usize> {
    list.iter().position(|p| p.node_id().as_ref() == Some(node_id))
}

/// Point-in-time copy of one bucket, for maintenance and diagnostics.
#[derive(Debug, Clone)]
pub struct BucketSnapshot<const N: usize = 20> {
    /// Bucket index (highest differing bit)
    pub index: usize,
    /// Primary peers, most recently seen first
    pub primary: Vec<Arc<Peer<N>>>,
    /// Replacement peers, most recently seen first
    pub replacements: Vec<Arc<Peer<N>>>,
}

impl<const N: usize> BucketSnapshot<N> {
    pub(crate) fn of(index: usize, bucket: &KBucket<N>) -> Self {
        Self {
            index,
            primary: bucket.peers.iter().cloned().collect(),
            replacements: bucket.replacements.iter().cloned().collect(),
        }
    }

    /// True if the peer is in the primary list (pointer identity)
    pub fn in_primary(&self, peer: &Arc<Peer<N>>) -> bool {
        self.primary.iter().any(|p| Arc::ptr_eq(p, peer))
    }

    /// True if the peer is in the replacement cache (pointer identity)
    pub fn in_replacements(&self, peer: &Arc<Peer<N>>) -> bool {
        self.replacements.iter().any(|p| Arc::ptr_eq(p, peer))
    }
}
