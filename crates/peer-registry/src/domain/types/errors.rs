//! Domain Errors for the Peer Registry

use std::fmt;

use thiserror::Error;

/// Errors returned by registry operations.
///
/// Expected outcomes such as duplicates, blacklisted addresses or full buckets
/// are reported through outcome enums, not through this type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A remote peer presented the local node's own identifier
    #[error("identifier equals the local node identifier")]
    LocalNodeId,

    /// Another registered peer already owns the identifier
    #[error("identifier {node_id} is already owned by peer at {owner}")]
    IdentityInUse { node_id: String, owner: String },

    /// Raw identifier bytes had the wrong width
    #[error("invalid node identifier length: expected {expected} bytes, got {actual}")]
    InvalidNodeIdLength { expected: usize, actual: usize },

    /// Identifier string was not valid hex
    #[error("invalid hex node identifier: {0}")]
    InvalidHex(String),

    /// Configuration the routing table cannot operate with
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Why a peer left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalReason {
    /// Removed by a collaborator (disconnect, failed ping)
    ExplicitRemoval,
    /// Removed because the peer misbehaved
    Blacklisted,
    /// Dropped from a full replacement cache
    BucketReplacement,
}

impl fmt::Display for RemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExplicitRemoval => write!(f, "explicit removal"),
            Self::Blacklisted => write!(f, "blacklisted"),
            Self::BucketReplacement => write!(f, "bucket replacement"),
        }
    }
}
