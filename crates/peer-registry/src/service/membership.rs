//! Write operations. Each one takes the state write lock exactly once, so a
//! concurrent reader sees either none or all of its effects.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{InsertOutcome, NodeId, Peer, RegistryError, RemovalReason, SocketAddr};
use crate::service::{AddOutcome, PeerRegistry};

impl<const N: usize> PeerRegistry<N> {
    /// Register a peer.
    ///
    /// The first writer wins: if a peer with the same identifier (checked
    /// first) or the same address is already registered, that peer is
    /// returned in [`AddOutcome::Duplicate`] and `peer` is not stored.
    /// Blacklisted addresses are rejected without touching the main lock.
    ///
    /// A peer whose identifier is known also enters the routing table. If
    /// its bucket and replacement cache are both full, the least recently
    /// seen replacement entry is dropped and unregistered.
    pub fn add(&self, peer: Arc<Peer<N>>) -> AddOutcome<N> {
        let addr = peer.addr();
        if self.blacklist.read().contains(&addr) {
            debug!(peer = %addr, "Rejected blacklisted address");
            return AddOutcome::Blacklisted;
        }
        let node_id = peer.node_id();
        if node_id == Some(self.local_id) {
            debug!(peer = %addr, "Rejected peer carrying the local node id");
            return AddOutcome::LocalNode;
        }

        // Fast path under the read lock; re-checked below.
        let existing = self.state.read().find_duplicate(node_id.as_ref(), &addr);
        if let Some(existing) = existing {
            debug!(peer = %addr, existing = %existing.addr(), "Peer already registered");
            return AddOutcome::Duplicate(existing);
        }

        let now = self.now();
        let routed = {
            let mut state = self.state.write();
            if self.blacklist.read().contains(&addr) {
                return AddOutcome::Blacklisted;
            }
            let node_id = peer.node_id();
            if let Some(existing) = state.find_duplicate(node_id.as_ref(), &addr) {
                return AddOutcome::Duplicate(existing);
            }
            state.register(peer, now)
        };

        match routed {
            Some(outcome) => log_routing(&addr, &outcome),
            None => debug!(peer = %addr, "Registered peer without identity"),
        }
        AddOutcome::Inserted
    }

    /// Unregister `peer` if this exact allocation is registered.
    ///
    /// Removing a primary bucket entry promotes the newest replacement of
    /// that bucket.
    pub fn remove(&self, peer: &Arc<Peer<N>>) -> Option<Arc<Peer<N>>> {
        let now = self.now();
        let removed = self.state.write().unregister(peer, now);
        if !removed {
            return None;
        }
        log_removal(peer, RemovalReason::ExplicitRemoval);
        Some(Arc::clone(peer))
    }

    /// Unregister the peer owning `node_id`.
    pub fn remove_by_id(&self, node_id: &NodeId<N>) -> Option<Arc<Peer<N>>> {
        let now = self.now();
        let removed = {
            let mut state = self.state.write();
            let peer = state.by_id.get(node_id).cloned()?;
            state.unregister(&peer, now);
            peer
        };
        log_removal(&removed, RemovalReason::ExplicitRemoval);
        Some(removed)
    }

    /// Unregister the peer registered at `addr`.
    pub fn remove_by_address(&self, addr: &SocketAddr) -> Option<Arc<Peer<N>>> {
        let now = self.now();
        let removed = {
            let mut state = self.state.write();
            let peer = state.by_addr.get(addr).cloned()?;
            state.unregister(&peer, now);
            peer
        };
        log_removal(&removed, RemovalReason::ExplicitRemoval);
        Some(removed)
    }

    /// Assign the identifier learned from a handshake.
    ///
    /// Drops the old identifier's index entry and bucket slot, stores the
    /// new identifier on the peer, indexes it and inserts the peer into the
    /// bucket of the new identifier. Re-assigning the identifier the peer
    /// already has only refreshes its bucket position.
    ///
    /// # Errors
    ///
    /// Nothing is modified when an error is returned.
    /// - `RegistryError::LocalNodeId`: `new_id` is the local node's id
    /// - `RegistryError::IdentityInUse`: another registered peer owns `new_id`
    ///
    /// # Panics
    ///
    /// If `peer` is not registered. Callers obtain peers from this registry,
    /// so an unregistered peer here is a bug in the caller.
    pub fn update_identity(&self, peer: &Arc<Peer<N>>, new_id: NodeId<N>) -> Result<(), RegistryError> {
        let addr = peer.addr();
        let now = self.now();
        let result = {
            let mut state = self.state.write();
            assert!(
                state.is_registered(peer),
                "update_identity called for unregistered peer at {addr}"
            );

            let owner = state
                .by_id
                .get(&new_id)
                .filter(|owner| !Arc::ptr_eq(owner, peer))
                .map(|owner| owner.addr());

            if new_id == self.local_id {
                Err(RegistryError::LocalNodeId)
            } else if let Some(owner) = owner {
                Err(RegistryError::IdentityInUse {
                    node_id: new_id.to_string(),
                    owner: owner.to_string(),
                })
            } else {
                Ok(state.reassign_identity(peer, new_id, now))
            }
        };

        match result {
            Ok(outcome) => {
                debug!(peer = %addr, node_id = %new_id, "Updated peer identity");
                log_routing(&addr, &outcome);
                Ok(())
            }
            Err(err) => {
                warn!(peer = %addr, node_id = %new_id, error = %err, "Rejected identity update");
                Err(err)
            }
        }
    }

    /// Blacklist a misbehaving peer.
    ///
    /// The peer registered at `peer`'s address is removed from every
    /// container and flagged. The address is refused by future `add` calls.
    /// The flag is only raised once the peer has left every container.
    pub fn blacklist(&self, peer: &Arc<Peer<N>>) {
        let removed = self.blacklist_address(&peer.addr());
        if !removed.is_some_and(|registered| Arc::ptr_eq(&registered, peer)) {
            peer.mark_blacklisted();
        }
    }

    /// Blacklist an address, unregistering whichever peer holds it.
    ///
    /// Returns the peer that was unregistered, if any.
    pub fn blacklist_address(&self, addr: &SocketAddr) -> Option<Arc<Peer<N>>> {
        let now = self.now();
        let (removed, newly_listed) = {
            let mut state = self.state.write();
            let removed = state.by_addr.get(addr).cloned();
            if let Some(peer) = &removed {
                state.unregister(peer, now);
                peer.mark_blacklisted();
            }
            let newly_listed = self.blacklist.write().insert(*addr, now);
            (removed, newly_listed)
        };

        if newly_listed {
            info!(peer = %addr, "Blacklisted address");
        }
        if let Some(peer) = &removed {
            log_removal(peer, RemovalReason::Blacklisted);
        }
        removed
    }

    /// True if `add` would reject `addr`.
    pub fn is_blacklisted(&self, addr: &SocketAddr) -> bool {
        self.blacklist.read().contains(addr)
    }

    /// Lift a blacklist entry. The peer must be added again to be registered.
    pub fn unblacklist(&self, addr: &SocketAddr) -> bool {
        let lifted = self.blacklist.write().remove(addr);
        if lifted {
            info!(peer = %addr, "Lifted blacklist entry");
        }
        lifted
    }

    /// Record activity from a peer: refresh `last_seen` and move it to the
    /// front of its bucket list. Returns false for unknown identifiers.
    pub fn touch(&self, node_id: &NodeId<N>) -> bool {
        let now = self.now();
        let mut state = self.state.write();
        let Some(peer) = state.by_id.get(node_id).cloned() else {
            return false;
        };
        peer.mark_seen(now);
        state.table.touch(node_id, now);
        true
    }
}

fn log_routing<const N: usize>(addr: &SocketAddr, outcome: &InsertOutcome<N>) {
    match outcome {
        InsertOutcome::Inserted { bucket } => {
            debug!(peer = %addr, bucket, "Inserted peer into bucket");
        }
        InsertOutcome::Refreshed { bucket, slot } => {
            debug!(peer = %addr, bucket, slot = ?slot, "Refreshed bucket entry");
        }
        InsertOutcome::BucketFull { bucket, evicted } => {
            debug!(peer = %addr, bucket, "Bucket full, parked in replacement cache");
            if let Some(evicted) = evicted {
                log_removal(evicted, RemovalReason::BucketReplacement);
            }
        }
        InsertOutcome::Rejected => {}
    }
}

fn log_removal<const N: usize>(peer: &Peer<N>, reason: RemovalReason) {
    debug!(peer = %peer.addr(), node_id = ?peer.node_id(), reason = %reason, "Removed peer");
}
