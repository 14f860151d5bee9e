//! Kademlia distance calculations.

use crate::domain::{Distance, NodeId};

/// Calculate the XOR distance between two NodeIds
///
/// # Properties
/// - Symmetric: `xor_distance(a, b) == xor_distance(b, a)`
/// - Self is zero: `xor_distance(a, a).is_zero()`
/// - Totally ordered as an unsigned magnitude
pub fn xor_distance<const N: usize>(a: &NodeId<N>, b: &NodeId<N>) -> Distance<N> {
    let mut xor = [0u8; N];
    for (i, byte) in xor.iter_mut().enumerate() {
        *byte = a.0[i] ^ b.0[i];
    }
    Distance::new(xor)
}

/// Calculate the bucket index for a remote node relative to local node.
///
/// The index is the position of the highest set bit of the XOR distance,
/// counted from the least significant bit: a remote id differing from ours
/// in the top bit lands in bucket `BITS - 1`.
///
/// Returns `None` for identical ids; a node never buckets itself.
pub fn calculate_bucket_index<const N: usize>(local: &NodeId<N>, remote: &NodeId<N>) -> Option<usize> {
    xor_distance(local, remote).highest_bit()
}

/// Fused bucket lookup without materializing the intermediate `Distance`.
///
/// Same result as [`calculate_bucket_index`]; used on the routing table's
/// insert and remove paths.
#[inline]
pub fn bucket_for_peer<const N: usize>(local: &NodeId<N>, remote: &NodeId<N>) -> Option<usize> {
    for i in 0..N {
        let xor = local.0[i] ^ remote.0[i];
        if xor != 0 {
            let leading = i * 8 + xor.leading_zeros() as usize;
            return Some(N * 8 - 1 - leading);
        }
    }
    None
}
