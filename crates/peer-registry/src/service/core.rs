use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::{Blacklist, KademliaConfig, NodeId, Peer, RegistryError, Timestamp};
use crate::ports::TimeSource;

use super::state::RegistryState;

/// Result of [`PeerRegistry::add`].
#[derive(Debug, Clone)]
pub enum AddOutcome<const N: usize = 20> {
    /// The peer is now registered.
    Inserted,
    /// A peer with the same identifier or address was already registered;
    /// the existing peer wins and is returned.
    Duplicate(Arc<Peer<N>>),
    /// The address is blacklisted. Nothing was stored.
    Blacklisted,
    /// The peer carries the local node's identifier. Nothing was stored.
    LocalNode,
}

impl<const N: usize> AddOutcome<N> {
    /// True if the call registered the peer.
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted)
    }

    /// The previously registered peer, for `Duplicate`.
    pub fn existing(&self) -> Option<&Arc<Peer<N>>> {
        match self {
            Self::Duplicate(existing) => Some(existing),
            _ => None,
        }
    }
}

/// Thread-safe registry of every peer the node knows about.
///
/// Owns the identifier index, the address index, the ordered peer list and
/// the routing table as one consistency domain behind a single
/// reader/writer lock: readers never observe a peer that is in one container
/// but not yet in another. The address blacklist sits behind its own lock so
/// `add` can reject blacklisted addresses without contending on the main one.
///
/// There is no global instance; build one per node and share it as
/// `Arc<PeerRegistry>`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use peer_registry::{KademliaConfig, NodeId, Peer, PeerRegistry, SystemTimeSource};
///
/// let registry = PeerRegistry::new(
///     NodeId::new([0u8; 20]),
///     KademliaConfig::default(),
///     Box::new(SystemTimeSource),
/// )
/// .unwrap();
///
/// let peer = Arc::new(Peer::from_std("10.0.0.1:30303".parse().unwrap()));
/// assert!(registry.add(Arc::clone(&peer)).is_inserted());
/// assert_eq!(registry.size(), 1);
/// ```
pub struct PeerRegistry<const N: usize = 20> {
    /// Our own identifier (never registered, never bucketed)
    pub(crate) local_id: NodeId<N>,
    /// Bucket and replacement cache sizes
    pub(crate) config: KademliaConfig,
    /// Indexes, ordered list and routing table
    pub(crate) state: RwLock<RegistryState<N>>,
    /// Rejected addresses; lock order is `state` then `blacklist`
    pub(crate) blacklist: RwLock<Blacklist>,
    /// Time source for `last_seen` stamps
    pub(crate) time_source: Box<dyn TimeSource>,
}

impl<const N: usize> PeerRegistry<N> {
    /// Create an empty registry.
    ///
    /// # Errors
    ///
    /// `RegistryError::InvalidConfig` if `config` fails
    /// [`KademliaConfig::validate`].
    pub fn new(
        local_id: NodeId<N>,
        config: KademliaConfig,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, RegistryError> {
        config.validate()?;
        Ok(Self {
            local_id,
            state: RwLock::new(RegistryState::new(local_id, config.clone())),
            config,
            blacklist: RwLock::new(Blacklist::new()),
            time_source,
        })
    }

    /// Our own node identifier.
    pub fn local_id(&self) -> &NodeId<N> {
        &self.local_id
    }

    /// Routing table configuration.
    pub fn config(&self) -> &KademliaConfig {
        &self.config
    }

    /// Get the current timestamp from the time source.
    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }
}

impl<const N: usize> std::fmt::Debug for PeerRegistry<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeerRegistry")
            .field("local_id", &self.local_id)
            .field("config", &self.config)
            .field("peers", &self.state.read().ordered.len())
            .field("blacklisted", &self.blacklist.read().len())
            .finish()
    }
}
