//! Blacklisted addresses.

use std::collections::HashMap;

use crate::domain::{SocketAddr, Timestamp};

/// Addresses the registry refuses to register.
///
/// Keyed by (ip, port). Entries do not expire; they are cleared only by an
/// explicit [`Blacklist::remove`].
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    entries: HashMap<SocketAddr, Timestamp>,
}

impl Blacklist {
    /// Create an empty blacklist.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record an address. Returns false if it was already listed.
    pub fn insert(&mut self, addr: SocketAddr, now: Timestamp) -> bool {
        if self.entries.contains_key(&addr) {
            return false;
        }
        self.entries.insert(addr, now);
        true
    }

    /// Check if an address is blacklisted.
    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.entries.contains_key(addr)
    }

    /// When the address was blacklisted.
    pub fn listed_at(&self, addr: &SocketAddr) -> Option<Timestamp> {
        self.entries.get(addr).copied()
    }

    /// Lift a blacklist entry. Returns false if the address was not listed.
    pub fn remove(&mut self, addr: &SocketAddr) -> bool {
        self.entries.remove(addr).is_some()
    }

    /// Number of blacklisted addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
