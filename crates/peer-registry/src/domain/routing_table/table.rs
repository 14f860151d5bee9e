//! Main RoutingTable implementation.

use std::sync::Arc;

use crate::domain::{bucket_for_peer, sort_peers_by_distance, KademliaConfig, NodeId, Peer, Timestamp};

use super::bucket::{BucketSnapshot, KBucket};
use super::outcome::{InsertOutcome, RoutingTableStats, Slot};

/// The Kademlia routing table.
///
/// One bucket per identifier bit. A remote peer lives in the bucket whose
/// index is the highest set bit of its XOR distance to the local node, in
/// either the primary list or the replacement cache, never both.
///
/// Full buckets do not evict on their own. `insert` parks the newcomer in the
/// replacement cache and reports [`InsertOutcome::BucketFull`]; whoever owns
/// liveness checks decides whether the oldest primary entry is dead and calls
/// [`RoutingTable::remove`], which promotes the newest replacement.
#[derive(Debug)]
pub struct RoutingTable<const N: usize = 20> {
    /// Our own node ID (immutable after creation)
    local_node_id: NodeId<N>,
    /// One k-bucket per identifier bit
    buckets: Vec<KBucket<N>>,
    /// Bucket and replacement cache sizes
    config: KademliaConfig,
}

impl<const N: usize> RoutingTable<N> {
    /// Create a new routing table
    pub fn new(local_node_id: NodeId<N>, config: KademliaConfig) -> Self {
        let buckets = (0..NodeId::<N>::BITS).map(|_| KBucket::new()).collect();

        Self {
            local_node_id,
            buckets,
            config,
        }
    }

    /// Get our local node ID
    pub fn local_node_id(&self) -> &NodeId<N> {
        &self.local_node_id
    }

    /// Get the configuration
    pub fn config(&self) -> &KademliaConfig {
        &self.config
    }

    /// Number of buckets (identifier bit width)
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket index for a remote identifier; `None` for the local id.
    pub fn classify(&self, node_id: &NodeId<N>) -> Option<usize> {
        bucket_for_peer(&self.local_node_id, node_id)
    }

    /// Insert or refresh a peer.
    ///
    /// - already present (either list): moved to the front, `Refreshed`
    /// - primary list has room: pushed to the front, `Inserted`
    /// - primary list full: pushed to the front of the replacement cache,
    ///   `BucketFull` (carrying any replacement that fell off the end)
    pub fn insert(&mut self, peer: &Arc<Peer<N>>, now: Timestamp) -> InsertOutcome<N> {
        let Some(node_id) = peer.node_id() else {
            return InsertOutcome::Rejected;
        };
        let Some(bucket_idx) = self.classify(&node_id) else {
            return InsertOutcome::Rejected;
        };
        let k = self.config.k;
        let capacity = self.config.replacement_capacity;
        let bucket = &mut self.buckets[bucket_idx];

        if let Some(slot) = bucket.move_to_front(&node_id, now) {
            return InsertOutcome::Refreshed {
                bucket: bucket_idx,
                slot,
            };
        }

        if !bucket.is_full(k) {
            bucket.add_peer(Arc::clone(peer), now);
            return InsertOutcome::Inserted { bucket: bucket_idx };
        }

        let evicted = bucket.add_replacement(Arc::clone(peer), capacity, now);
        InsertOutcome::BucketFull {
            bucket: bucket_idx,
            evicted,
        }
    }

    /// Remove a peer from whichever list of its bucket holds it.
    ///
    /// Removing a primary entry promotes the newest replacement into the freed
    /// slot. Returns the list the peer was found in.
    pub fn remove(&mut self, peer: &Peer<N>, now: Timestamp) -> Option<Slot> {
        let node_id = peer.node_id()?;
        self.remove_id(&node_id, now).map(|(slot, _)| slot)
    }

    /// Remove by identifier. See [`RoutingTable::remove`].
    pub fn remove_id(&mut self, node_id: &NodeId<N>, now: Timestamp) -> Option<(Slot, Arc<Peer<N>>)> {
        let bucket_idx = self.classify(node_id)?;
        let removed = self.buckets[bucket_idx].remove_peer(node_id)?;
        if removed.0 == Slot::Primary {
            self.promote_replacement(bucket_idx, now);
        }
        Some(removed)
    }

    /// Fill a free primary slot of `bucket_idx` from its replacement cache.
    ///
    /// Returns the promoted peer, or `None` if the primary list is full, the
    /// cache is empty or the index is out of range.
    pub fn promote_replacement(&mut self, bucket_idx: usize, now: Timestamp) -> Option<Arc<Peer<N>>> {
        let k = self.config.k;
        self.buckets
            .get_mut(bucket_idx)?
            .promote_replacement(k, now)
    }

    /// Mark a peer as recently seen, moving it to the front of its list.
    pub fn touch(&mut self, node_id: &NodeId<N>, now: Timestamp) -> Option<Slot> {
        let bucket_idx = self.classify(node_id)?;
        self.buckets[bucket_idx].move_to_front(node_id, now)
    }

    /// Bucket index and list currently holding `node_id`.
    pub fn slot_of(&self, node_id: &NodeId<N>) -> Option<(usize, Slot)> {
        let bucket_idx = self.classify(node_id)?;
        self.buckets[bucket_idx]
            .slot_of(node_id)
            .map(|slot| (bucket_idx, slot))
    }

    /// True if the identifier is in any bucket list.
    pub fn contains(&self, node_id: &NodeId<N>) -> bool {
        self.slot_of(node_id).is_some()
    }

    /// Find up to `count` primary peers closest to `target`.
    ///
    /// Buckets are scanned outward from the target's own bucket `b`:
    /// everything in `b` is strictly closer to the target than anything
    /// else, buckets below `b` come next (as one group, since they all share
    /// the target's bit `b` as their highest differing bit), then buckets
    /// `b + 1, b + 2, …` each strictly farther than the last. Each group is
    /// sorted by exact distance, so the result equals a full sort.
    pub fn find_closest_peers(&self, target: &NodeId<N>, count: usize) -> Vec<Arc<Peer<N>>> {
        let mut closest = Vec::with_capacity(count.min(self.len()));
        if count == 0 {
            return closest;
        }

        let bits = self.buckets.len();
        match self.classify(target) {
            Some(b) => {
                if self.append_group(std::iter::once(b), target, count, &mut closest) {
                    return closest;
                }
                if self.append_group(0..b, target, count, &mut closest) {
                    return closest;
                }
                for i in b + 1..bits {
                    if self.append_group(std::iter::once(i), target, count, &mut closest) {
                        break;
                    }
                }
            }
            // Target is the local node: bucket i is exactly distance bit i.
            None => {
                for i in 0..bits {
                    if self.append_group(std::iter::once(i), target, count, &mut closest) {
                        break;
                    }
                }
            }
        }
        closest
    }

    /// Append the primary peers of `indices`, nearest first, until `out`
    /// holds `count` entries. Returns true once full.
    fn append_group(
        &self,
        indices: impl Iterator<Item = usize>,
        target: &NodeId<N>,
        count: usize,
        out: &mut Vec<Arc<Peer<N>>>,
    ) -> bool {
        let group: Vec<_> = indices
            .flat_map(|i| self.buckets[i].peers().iter().cloned())
            .collect();
        if !group.is_empty() {
            let remaining = count - out.len();
            out.extend(sort_peers_by_distance(&group, target).into_iter().take(remaining));
        }
        out.len() >= count
    }

    /// Least recently seen primary peer of a bucket (the one to ping).
    pub fn oldest(&self, bucket_idx: usize) -> Option<Arc<Peer<N>>> {
        self.buckets.get(bucket_idx)?.oldest_peer().cloned()
    }

    /// Copy out one bucket's lists.
    pub fn snapshot(&self, index: usize) -> Option<BucketSnapshot<N>> {
        self.buckets
            .get(index)
            .map(|bucket| BucketSnapshot::of(index, bucket))
    }

    /// Peers across all primary lists
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }

    /// True if no primary list holds a peer
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|b| b.is_empty())
    }

    /// Peers across all replacement caches
    pub fn replacement_len(&self) -> usize {
        self.buckets.iter().map(|b| b.replacement_len()).sum()
    }

    /// Get routing table statistics
    pub fn stats(&self, now: Timestamp) -> RoutingTableStats {
        let oldest_peer_age_seconds = self
            .buckets
            .iter()
            .flat_map(|b| b.peers().iter())
            .map(|p| p.last_seen().age(now))
            .max()
            .unwrap_or(0);

        RoutingTableStats {
            total_peers: self.len(),
            replacement_peers: self.replacement_len(),
            buckets_used: self.buckets.iter().filter(|b| !b.is_empty()).count(),
            oldest_peer_age_seconds,
        }
    }
}
