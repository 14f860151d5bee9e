//! Value Objects for the Peer Registry

use super::errors::RegistryError;

/// XOR distance between two node identifiers.
///
/// Holds the raw XOR of both identifiers and orders as an unsigned
/// big-endian magnitude, so `a < b` means "closer". The bucket a remote node
/// lands in is the index of the highest set bit of this value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Distance<const N: usize = 20>(pub [u8; N]);

impl<const N: usize> Distance<N> {
    /// Create a distance from raw XOR bytes.
    pub fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// The zero distance (identical identifiers).
    pub fn zero() -> Self {
        Self([0u8; N])
    }

    /// The largest representable distance (all bits set).
    pub fn max() -> Self {
        Self([0xFF; N])
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// True when both identifiers were equal.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Number of leading zero bits (the common prefix length of both ids).
    pub fn leading_zeros(&self) -> usize {
        let mut zeros = 0;
        for byte in &self.0 {
            if *byte == 0 {
                zeros += 8;
            } else {
                zeros += byte.leading_zeros() as usize;
                break;
            }
        }
        zeros
    }

    /// Index of the highest set bit, counted from the least significant bit.
    ///
    /// `None` for the zero distance.
    pub fn highest_bit(&self) -> Option<usize> {
        let zeros = self.leading_zeros();
        (zeros < N * 8).then(|| N * 8 - 1 - zeros)
    }
}

/// Configuration for the Kademlia routing table.
///
/// The thresholds that decide when a primary entry is stale (ping timeout,
/// retry count) belong to the maintenance scheduler and are not configured
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KademliaConfig {
    /// Primary bucket size (default: 20)
    pub k: usize,
    /// Replacement cache size per bucket (default: 20)
    pub replacement_capacity: usize,
}

impl Default for KademliaConfig {
    fn default() -> Self {
        Self {
            k: 20,
            replacement_capacity: 20,
        }
    }
}

impl KademliaConfig {
    /// Create a config suitable for testing (smaller values)
    pub fn for_testing() -> Self {
        Self {
            k: 3,
            replacement_capacity: 2,
        }
    }

    /// Reject configurations the routing table cannot operate with.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.k == 0 {
            return Err(RegistryError::InvalidConfig(
                "bucket size k must be at least 1".to_string(),
            ));
        }
        // A registry needs somewhere to park a newcomer when a bucket is full.
        if self.replacement_capacity == 0 {
            return Err(RegistryError::InvalidConfig(
                "replacement_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
