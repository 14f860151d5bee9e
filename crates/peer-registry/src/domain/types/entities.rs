//! Core Domain Entities for the Peer Registry
//!
//! Node identifiers, network addresses and timestamps. Everything here is a
//! plain value type; shared mutable peer state lives in [`crate::domain::Peer`].

use std::fmt;
use std::str::FromStr;

use rand::RngCore;

use super::errors::RegistryError;
use super::value_objects::Distance;
use crate::domain::services::{calculate_bucket_index, xor_distance};

/// Fixed-width node identifier.
///
/// `N` is the width in bytes, so a `NodeId<N>` carries `N * 8` bits and a
/// routing table over it has `N * 8` buckets. The default is the 160-bit
/// identifier used on the overlay; tests shrink it to a single byte.
///
/// # Security (Timing Attack Prevention)
///
/// Equality is evaluated in constant time. Standard `PartialEq` for byte
/// arrays short-circuits on the first difference, which leaks how many
/// leading bytes of a probed identifier match.
// Hash over the raw bytes stays consistent with the manual `PartialEq`:
// equal identifiers have identical bytes.
#[allow(clippy::derived_hash_with_manual_eq)]
#[derive(Clone, Copy, Hash)]
pub struct NodeId<const N: usize = 20>(pub [u8; N]);

impl<const N: usize> PartialEq for NodeId<N> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        let mut result = 0u8;
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            result |= a ^ b;
        }
        result == 0
    }
}

impl<const N: usize> Eq for NodeId<N> {}

impl<const N: usize> PartialOrd for NodeId<N> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<const N: usize> Ord for NodeId<N> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl<const N: usize> NodeId<N> {
    /// Number of bits in the identifier (and buckets in a routing table).
    pub const BITS: usize = N * 8;

    /// Create a NodeId from raw bytes (big-endian, most significant first).
    pub fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Create a NodeId from a byte slice of exactly `N` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RegistryError> {
        let array: [u8; N] =
            bytes
                .try_into()
                .map_err(|_| RegistryError::InvalidNodeIdLength {
                    expected: N,
                    actual: bytes.len(),
                })?;
        Ok(Self(array))
    }

    /// Generate a uniformly random identifier.
    pub fn random() -> Self {
        let mut bytes = [0u8; N];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The all-zero identifier.
    pub fn zero() -> Self {
        Self([0u8; N])
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    /// Value of the bit with weight `2^index` (index 0 is the least
    /// significant bit of the last byte).
    ///
    /// Returns `false` for indices outside the identifier.
    pub fn bit(&self, index: usize) -> bool {
        if index >= Self::BITS {
            return false;
        }
        let byte = self.0[N - 1 - index / 8];
        (byte >> (index % 8)) & 1 == 1
    }

    /// XOR distance to another identifier.
    pub fn distance(&self, other: &Self) -> Distance<N> {
        xor_distance(self, other)
    }

    /// Bucket that `other` falls into when `self` is the local node.
    ///
    /// `None` when both identifiers are equal.
    pub fn bucket_index(&self, other: &Self) -> Option<usize> {
        calculate_bucket_index(self, other)
    }
}

impl<const N: usize> AsRef<[u8]> for NodeId<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> From<[u8; N]> for NodeId<N> {
    fn from(bytes: [u8; N]) -> Self {
        Self(bytes)
    }
}

impl<const N: usize> fmt::Display for NodeId<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl<const N: usize> fmt::Debug for NodeId<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self)
    }
}

impl<const N: usize> FromStr for NodeId<N> {
    type Err = RegistryError;

    /// Parse a lowercase or uppercase hex string of exactly `2 * N` digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != N * 2 {
            return Err(RegistryError::InvalidNodeIdLength {
                expected: N,
                actual: s.len() / 2,
            });
        }
        if !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RegistryError::InvalidHex(s.to_string()));
        }
        let mut bytes = [0u8; N];
        for (byte, pair) in bytes.iter_mut().zip(s.as_bytes().chunks(2)) {
            *byte = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        Ok(Self(bytes))
    }
}

/// Value of an ASCII hex digit (caller checks `is_ascii_hexdigit`).
fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Socket address (IP + Port) used as the registry's address key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketAddr {
    /// IP address (v4 or v6).
    pub ip: IpAddr,
    /// Port number.
    pub port: u16,
}

impl SocketAddr {
    /// Create a new socket address from IP and port.
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Convert to the standard library representation.
    pub fn to_std(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.ip.to_std(), self.port)
    }
}

impl From<std::net::SocketAddr> for SocketAddr {
    fn from(addr: std::net::SocketAddr) -> Self {
        Self::new(addr.ip().into(), addr.port())
    }
}

impl fmt::Display for SocketAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.to_std().fmt(f)
    }
}

/// IP address enum supporting both IPv4 and IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpAddr {
    /// IPv4 address (4 bytes).
    V4([u8; 4]),
    /// IPv6 address (16 bytes).
    V6([u8; 16]),
}

impl IpAddr {
    /// Create an IPv4 address
    pub fn v4(a: u8, b: u8, c: u8, d: u8) -> Self {
        IpAddr::V4([a, b, c, d])
    }

    /// Convert to the standard library representation.
    pub fn to_std(&self) -> std::net::IpAddr {
        match self {
            IpAddr::V4(octets) => std::net::IpAddr::from(*octets),
            IpAddr::V6(octets) => std::net::IpAddr::from(*octets),
        }
    }
}

impl From<std::net::IpAddr> for IpAddr {
    fn from(ip: std::net::IpAddr) -> Self {
        match ip {
            std::net::IpAddr::V4(v4) => IpAddr::V4(v4.octets()),
            std::net::IpAddr::V6(v6) => IpAddr::V6(v6.octets()),
        }
    }
}

/// Unix timestamp in seconds
///
/// # Security (Timestamp Bounds)
///
/// Timestamps are clamped to a reasonable maximum so a hostile clock value
/// cannot wrap age computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Maximum reasonable timestamp (year 9999).
    pub const MAX_REASONABLE: u64 = 253_402_300_799;

    /// Create a new timestamp, clamping to MAX_REASONABLE.
    pub fn new(secs: u64) -> Self {
        Self(secs.min(Self::MAX_REASONABLE))
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed between `self` and a later `now` (0 if `now` is earlier).
    pub fn age(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }
}
