//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use peer_registry::test_utils::ManualTimeSource;
use peer_registry::{IpAddr, KademliaConfig, NodeId, Peer, PeerRegistry, SocketAddr};
use tracing_subscriber::EnvFilter;

/// Install a test-friendly subscriber once. Set `RUST_LOG=peer_registry=debug`
/// to see registry events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn registry<const N: usize>(config: KademliaConfig) -> PeerRegistry<N> {
    PeerRegistry::new(NodeId::zero(), config, Box::new(ManualTimeSource::new(1_000)))
        .expect("valid test config")
}

/// Distinct address for every `i`.
pub fn addr(i: u32) -> SocketAddr {
    let [_, b, c, d] = i.to_be_bytes();
    SocketAddr::new(IpAddr::v4(10, b, c, d), 30303)
}

/// 160-bit identifier with `i` in the low bytes and a fixed high byte, so
/// distinct `i` give distinct non-local identifiers.
pub fn node_id(i: u32) -> NodeId {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xA5;
    bytes[16..].copy_from_slice(&i.to_be_bytes());
    NodeId::new(bytes)
}

pub fn anonymous<const N: usize>(i: u32) -> Arc<Peer<N>> {
    Arc::new(Peer::new(addr(i)))
}

/// Check the cross-container invariants through the public API.
pub fn assert_registry_consistent<const N: usize>(registry: &PeerRegistry<N>) {
    let snapshot = registry.ordered_snapshot();
    assert_eq!(snapshot.len(), registry.size());

    let mut identified = 0;
    for peer in &snapshot {
        let by_addr = registry
            .get_by_address(&peer.addr())
            .expect("snapshot peer missing from address index");
        assert!(Arc::ptr_eq(&by_addr, peer));

        if let Some(id) = peer.node_id() {
            identified += 1;
            let by_id = registry.get(&id).expect("identified peer missing from id index");
            assert!(Arc::ptr_eq(&by_id, peer));

            let bucket_idx = registry.local_id().bucket_index(&id).expect("remote id");
            let bucket = registry.bucket(bucket_idx).expect("bucket in range");
            assert!(
                bucket.in_primary(peer) ^ bucket.in_replacements(peer),
                "{peer:?} must hold exactly one bucket slot"
            );
        }
    }

    let stats = registry.stats();
    assert_eq!(stats.identified_peers, identified);
    assert_eq!(
        stats.routing.total_peers + stats.routing.replacement_peers,
        identified
    );
}
