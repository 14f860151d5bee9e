//! Peer record shared by every registry container.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::domain::{NodeId, SocketAddr, Timestamp};

/// A known remote peer.
///
/// Peers are handed around as `Arc<Peer>`: the address index, the identifier
/// index, the ordered list and the routing table all hold the same
/// allocation, and membership is tested by pointer identity.
///
/// The address never changes. The identifier starts out unknown for peers
/// first seen on an inbound connection and is assigned by
/// [`PeerRegistry::update_identity`](crate::PeerRegistry::update_identity)
/// once a handshake reveals it; there is no public setter, so a registered
/// peer cannot drift out of the identifier index.
pub struct Peer<const N: usize = 20> {
    addr: SocketAddr,
    node_id: RwLock<Option<NodeId<N>>>,
    quality: AtomicI64,
    blacklisted: AtomicBool,
    last_seen: AtomicU64,
}

impl<const N: usize> Peer<N> {
    /// Peer known only by address.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            node_id: RwLock::new(None),
            quality: AtomicI64::new(0),
            blacklisted: AtomicBool::new(false),
            last_seen: AtomicU64::new(0),
        }
    }

    /// Peer whose identifier is already known (e.g. a bootstrap entry).
    pub fn with_node_id(addr: SocketAddr, node_id: NodeId<N>) -> Self {
        let peer = Self::new(addr);
        *peer.node_id.write() = Some(node_id);
        peer
    }

    /// Peer from a standard library socket address.
    pub fn from_std(addr: std::net::SocketAddr) -> Self {
        Self::new(addr.into())
    }

    /// Network address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Identifier, if the handshake has completed.
    pub fn node_id(&self) -> Option<NodeId<N>> {
        *self.node_id.read()
    }

    /// True once the identifier is known.
    pub fn has_node_id(&self) -> bool {
        self.node_id.read().is_some()
    }

    /// Connection quality score. Higher is better.
    pub fn quality(&self) -> i64 {
        self.quality.load(Ordering::Relaxed)
    }

    /// Replace the quality score.
    pub fn set_quality(&self, quality: i64) {
        self.quality.store(quality, Ordering::Relaxed);
    }

    /// Add `delta` to the quality score, saturating at the `i64` bounds.
    pub fn adjust_quality(&self, delta: i64) -> i64 {
        let previous = self
            .quality
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |q| {
                Some(q.saturating_add(delta))
            })
            .unwrap_or_else(|q| q);
        previous.saturating_add(delta)
    }

    /// True once the registry has blacklisted this peer.
    pub fn is_blacklisted(&self) -> bool {
        self.blacklisted.load(Ordering::Acquire)
    }

    /// Last time the registry saw activity from this peer.
    pub fn last_seen(&self) -> Timestamp {
        Timestamp::new(self.last_seen.load(Ordering::Relaxed))
    }

    pub(crate) fn set_node_id(&self, node_id: NodeId<N>) {
        *self.node_id.write() = Some(node_id);
    }

    pub(crate) fn mark_blacklisted(&self) {
        self.blacklisted.store(true, Ordering::Release);
    }

    pub(crate) fn clear_blacklisted(&self) {
        self.blacklisted.store(false, Ordering::Release);
    }

    pub(crate) fn mark_seen(&self, now: Timestamp) {
        self.last_seen.store(now.as_secs(), Ordering::Relaxed);
    }
}

impl<const N: usize> fmt::Debug for Peer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Peer")
            .field("addr", &self.addr)
            .field("node_id", &self.node_id())
            .field("quality", &self.quality())
            .field("blacklisted", &self.is_blacklisted())
            .field("last_seen", &self.last_seen())
            .finish()
    }
}
