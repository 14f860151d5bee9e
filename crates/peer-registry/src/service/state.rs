//! Containers guarded by the registry lock.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{InsertOutcome, KademliaConfig, NodeId, Peer, RoutingTable, SocketAddr, Timestamp};

/// Everything the registry keeps consistent under one write lock.
///
/// Methods assume the caller holds the appropriate guard and never call out
/// of the crate.
#[derive(Debug)]
pub(crate) struct RegistryState<const N: usize> {
    /// Identifier index (peers whose identifier is known)
    pub(crate) by_id: HashMap<NodeId<N>, Arc<Peer<N>>>,
    /// Address index (every registered peer)
    pub(crate) by_addr: HashMap<SocketAddr, Arc<Peer<N>>>,
    /// Registration order; sorted by quality only in snapshots
    pub(crate) ordered: Vec<Arc<Peer<N>>>,
    /// Kademlia buckets
    pub(crate) table: RoutingTable<N>,
}

impl<const N: usize> RegistryState<N> {
    pub(crate) fn new(local_id: NodeId<N>, config: KademliaConfig) -> Self {
        Self {
            by_id: HashMap::new(),
            by_addr: HashMap::new(),
            ordered: Vec::new(),
            table: RoutingTable::new(local_id, config),
        }
    }

    /// First-writer-wins duplicate lookup: identifier first, then address.
    pub(crate) fn find_duplicate(
        &self,
        node_id: Option<&NodeId<N>>,
        addr: &SocketAddr,
    ) -> Option<Arc<Peer<N>>> {
        node_id
            .and_then(|id| self.by_id.get(id))
            .or_else(|| self.by_addr.get(addr))
            .cloned()
    }

    /// True if this exact allocation is the peer registered at its address.
    pub(crate) fn is_registered(&self, peer: &Arc<Peer<N>>) -> bool {
        self.by_addr
            .get(&peer.addr())
            .is_some_and(|registered| Arc::ptr_eq(registered, peer))
    }

    /// Insert a peer that passed the duplicate checks.
    ///
    /// Returns the routing outcome when the identifier is known.
    pub(crate) fn register(&mut self, peer: Arc<Peer<N>>, now: Timestamp) -> Option<InsertOutcome<N>> {
        peer.clear_blacklisted();
        peer.mark_seen(now);
        self.by_addr.insert(peer.addr(), Arc::clone(&peer));
        self.ordered.push(Arc::clone(&peer));

        let node_id = peer.node_id()?;
        self.by_id.insert(node_id, Arc::clone(&peer));
        Some(self.route(&peer, now))
    }

    /// Assign `new_id` to a registered peer and re-bucket it.
    pub(crate) fn reassign_identity(
        &mut self,
        peer: &Arc<Peer<N>>,
        new_id: NodeId<N>,
        now: Timestamp,
    ) -> InsertOutcome<N> {
        peer.mark_seen(now);
        match peer.node_id() {
            // Same identifier: only a recency refresh.
            Some(old_id) if old_id == new_id => return self.route(peer, now),
            Some(old_id) => {
                self.by_id.remove(&old_id);
                self.table.remove_id(&old_id, now);
            }
            None => {}
        }
        peer.set_node_id(new_id);
        self.by_id.insert(new_id, Arc::clone(peer));
        self.route(peer, now)
    }

    /// Insert into the routing table. A peer pushed out of a full replacement
    /// cache loses its last bucket slot and is unregistered here so every
    /// identified peer keeps exactly one slot.
    fn route(&mut self, peer: &Arc<Peer<N>>, now: Timestamp) -> InsertOutcome<N> {
        let outcome = self.table.insert(peer, now);
        if let InsertOutcome::BucketFull {
            evicted: Some(evicted),
            ..
        } = &outcome
        {
            self.unregister(evicted, now);
        }
        outcome
    }

    /// Remove a peer from every container. Returns false if it was not
    /// registered.
    pub(crate) fn unregister(&mut self, peer: &Arc<Peer<N>>, now: Timestamp) -> bool {
        if !self.is_registered(peer) {
            return false;
        }
        self.by_addr.remove(&peer.addr());
        if let Some(node_id) = peer.node_id() {
            if self
                .by_id
                .get(&node_id)
                .is_some_and(|indexed| Arc::ptr_eq(indexed, peer))
            {
                self.by_id.remove(&node_id);
            }
            self.table.remove_id(&node_id, now);
        }
        if let Some(pos) = self.ordered.iter().position(|p| Arc::ptr_eq(p, peer)) {
            self.ordered.remove(pos);
        }
        true
    }

    /// Verify the cross-container invariants. Test support.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        assert_eq!(self.ordered.len(), self.by_addr.len(), "ordered list / address index size");
        for peer in &self.ordered {
            assert_eq!(
                self.ordered.iter().filter(|p| Arc::ptr_eq(p, peer)).count(),
                1,
                "peer listed twice: {peer:?}"
            );
            assert!(self.is_registered(peer), "ordered peer missing from address index");
            match peer.node_id() {
                Some(id) => {
                    let indexed = self.by_id.get(&id).expect("identified peer missing from id index");
                    assert!(Arc::ptr_eq(indexed, peer));
                    let (bucket, _) = self.table.slot_of(&id).expect("identified peer has no bucket slot");
                    let snapshot = self.table.snapshot(bucket).expect("bucket in range");
                    assert!(
                        snapshot.in_primary(peer) ^ snapshot.in_replacements(peer),
                        "peer must occupy exactly one list"
                    );
                }
                None => assert!(!self.by_id.values().any(|p| Arc::ptr_eq(p, peer))),
            }
        }
        assert_eq!(
            self.by_id.len(),
            self.ordered.iter().filter(|p| p.has_node_id()).count(),
            "id index size"
        );
        assert_eq!(
            self.table.len() + self.table.replacement_len(),
            self.by_id.len(),
            "bucket membership count"
        );
    }
}
