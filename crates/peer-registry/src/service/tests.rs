//! Tests for PeerRegistry

use std::sync::Arc;

use super::*;
use crate::domain::{IpAddr, KademliaConfig, NodeId, Peer, RegistryError, SocketAddr, Timestamp};
use crate::ports::PeerDirectory;
use crate::test_utils::{FixedTimeSource, ManualTimeSource};

/// 8-bit identifiers, local id 0x00, k = 3, replacement cache = 2.
fn registry() -> PeerRegistry<1> {
    registry_with_clock(ManualTimeSource::new(1000))
}

fn registry_with_clock(clock: ManualTimeSource) -> PeerRegistry<1> {
    PeerRegistry::new(NodeId::zero(), KademliaConfig::for_testing(), Box::new(clock)).unwrap()
}

fn addr(host: u8) -> SocketAddr {
    SocketAddr::new(IpAddr::v4(10, 0, 0, host), 7000)
}

/// Peer known only by address.
fn anonymous(host: u8) -> Arc<Peer<1>> {
    Arc::new(Peer::new(addr(host)))
}

/// Peer with identifier `id` listening on 10.0.0.`id`.
fn identified(id: u8) -> Arc<Peer<1>> {
    Arc::new(Peer::with_node_id(addr(id), NodeId::new([id])))
}

fn assert_consistent(registry: &PeerRegistry<1>) {
    registry.state.read().assert_consistent();
}

fn snapshot_contains(registry: &PeerRegistry<1>, peer: &Arc<Peer<1>>) -> usize {
    registry
        .ordered_snapshot()
        .iter()
        .filter(|p| Arc::ptr_eq(p, peer))
        .count()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_new_rejects_invalid_config() {
    let config = KademliaConfig {
        k: 0,
        replacement_capacity: 2,
    };
    let result = PeerRegistry::<1>::new(NodeId::zero(), config, Box::new(FixedTimeSource::new(0)));

    assert!(matches!(result, Err(RegistryError::InvalidConfig(_))));
}

#[test]
fn test_new_registry_is_empty() {
    let registry = registry();

    assert!(registry.is_empty());
    assert_eq!(registry.size(), 0);
    assert_eq!(registry.local_id(), &NodeId::zero());
    assert_eq!(registry.config().k, 3);
    assert!(registry.closest_to(&NodeId::new([0x01]), 5).is_empty());
}

// =============================================================================
// Add
// =============================================================================

#[test]
fn test_add_registers_everywhere() {
    let registry = registry();
    let peer = identified(0x80);

    assert!(registry.add(Arc::clone(&peer)).is_inserted());

    assert!(Arc::ptr_eq(&registry.get(&NodeId::new([0x80])).unwrap(), &peer));
    assert!(Arc::ptr_eq(&registry.get_by_address(&addr(0x80)).unwrap(), &peer));
    assert_eq!(snapshot_contains(&registry, &peer), 1);
    assert!(registry.bucket(7).unwrap().in_primary(&peer));
    assert_eq!(peer.last_seen(), Timestamp::new(1000));
    assert_consistent(&registry);
}

#[test]
fn test_add_same_peer_twice_is_duplicate() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    let outcome = registry.add(Arc::clone(&peer));

    assert!(Arc::ptr_eq(outcome.existing().unwrap(), &peer));
    assert_eq!(registry.size(), 1);
    assert_consistent(&registry);
}

#[test]
fn test_same_address_first_writer_wins() {
    let registry = registry();
    let first = identified(0x80);
    let second = Arc::new(Peer::with_node_id(addr(0x80), NodeId::new([0x40])));
    registry.add(Arc::clone(&first));

    let outcome = registry.add(second);

    assert!(Arc::ptr_eq(outcome.existing().unwrap(), &first));
    assert_eq!(registry.size(), 1);
    assert!(registry.get(&NodeId::new([0x40])).is_none());
    assert_consistent(&registry);
}

#[test]
fn test_same_address_without_identity_is_duplicate() {
    let registry = registry();
    let first = anonymous(5);
    registry.add(Arc::clone(&first));

    let outcome = registry.add(anonymous(5));

    assert!(Arc::ptr_eq(outcome.existing().unwrap(), &first));
    assert_eq!(registry.size(), 1);
}

#[test]
fn test_same_identity_different_address_is_duplicate() {
    let registry = registry();
    let first = identified(0x80);
    let impostor = Arc::new(Peer::with_node_id(addr(99), NodeId::new([0x80])));
    registry.add(Arc::clone(&first));

    let outcome = registry.add(impostor);

    assert!(Arc::ptr_eq(outcome.existing().unwrap(), &first));
    assert!(!registry.contains_address(&addr(99)));
    assert_consistent(&registry);
}

#[test]
fn test_anonymous_peer_stays_out_of_routing_table() {
    let registry = registry();
    let peer = anonymous(5);

    assert!(registry.add(Arc::clone(&peer)).is_inserted());

    assert!(registry.contains_address(&addr(5)));
    assert_eq!(registry.stats().identified_peers, 0);
    assert_eq!(registry.stats().routing.total_peers, 0);
    assert_consistent(&registry);
}

#[test]
fn test_local_identity_is_never_stored() {
    let registry = registry();
    let echo = Arc::new(Peer::with_node_id(addr(1), NodeId::zero()));

    assert!(matches!(registry.add(echo), AddOutcome::LocalNode));
    assert!(registry.is_empty());
}

#[test]
fn test_blacklisted_address_is_rejected() {
    let registry = registry();
    registry.blacklist_address(&addr(0x80));

    let outcome = registry.add(identified(0x80));

    assert!(matches!(outcome, AddOutcome::Blacklisted));
    assert!(registry.is_empty());
    assert!(registry.get(&NodeId::new([0x80])).is_none());
    assert_consistent(&registry);
}

// =============================================================================
// Routing table overflow
// =============================================================================

#[test]
fn test_k_plus_one_peers_keep_everyone() {
    let registry = registry();
    for id in [0x81, 0x82, 0x83, 0x84] {
        registry.add(identified(id));
    }

    let bucket = registry.bucket(7).unwrap();
    assert_eq!(bucket.primary.len(), 3);
    assert_eq!(bucket.replacements.len(), 1);
    assert_eq!(registry.size(), 4);
    assert!(registry.get(&NodeId::new([0x84])).is_some());
    assert_consistent(&registry);
}

#[test]
fn test_replacement_overflow_unregisters_dropped_peer() {
    let registry = registry();
    for id in [0x81, 0x82, 0x83, 0x84, 0x85, 0x86] {
        assert!(registry.add(identified(id)).is_inserted());
    }

    // 0x84 was the least recently seen replacement
    assert_eq!(registry.size(), 5);
    assert!(registry.get(&NodeId::new([0x84])).is_none());
    assert!(registry.get_by_address(&addr(0x84)).is_none());
    assert_eq!(registry.bucket(7).unwrap().replacements.len(), 2);
    assert_consistent(&registry);
}

#[test]
fn test_removing_primary_promotes_replacement() {
    let registry = registry();
    let waiting = identified(0x84);
    for id in [0x81, 0x82, 0x83] {
        registry.add(identified(id));
    }
    registry.add(Arc::clone(&waiting));

    registry.remove_by_id(&NodeId::new([0x81]));

    let bucket = registry.bucket(7).unwrap();
    assert!(bucket.in_primary(&waiting));
    assert!(bucket.replacements.is_empty());
    assert_consistent(&registry);
}

// =============================================================================
// Remove
// =============================================================================

#[test]
fn test_remove_clears_every_container() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    let removed = registry.remove(&peer).unwrap();

    assert!(Arc::ptr_eq(&removed, &peer));
    assert!(registry.get(&NodeId::new([0x80])).is_none());
    assert!(registry.get_by_address(&addr(0x80)).is_none());
    assert_eq!(snapshot_contains(&registry, &peer), 0);
    let bucket = registry.bucket(7).unwrap();
    assert!(!bucket.in_primary(&peer));
    assert!(!bucket.in_replacements(&peer));
    assert_consistent(&registry);
}

#[test]
fn test_remove_unknown_peer_is_noop() {
    let registry = registry();
    registry.add(identified(0x80));

    assert!(registry.remove(&identified(0x40)).is_none());
    assert!(registry.remove_by_id(&NodeId::new([0x40])).is_none());
    assert!(registry.remove_by_address(&addr(0x40)).is_none());
    assert_eq!(registry.size(), 1);
}

#[test]
fn test_remove_requires_the_registered_allocation() {
    let registry = registry();
    registry.add(identified(0x80));

    // Equal address and id, but not the registered peer
    assert!(registry.remove(&identified(0x80)).is_none());
    assert_eq!(registry.size(), 1);
}

#[test]
fn test_remove_by_address_handles_anonymous_peers() {
    let registry = registry();
    let peer = anonymous(9);
    registry.add(Arc::clone(&peer));

    let removed = registry.remove_by_address(&addr(9)).unwrap();

    assert!(Arc::ptr_eq(&removed, &peer));
    assert!(registry.is_empty());
    assert_consistent(&registry);
}

// =============================================================================
// Identity updates
// =============================================================================

#[test]
fn test_update_identity_files_peer_into_bucket() {
    let registry = registry();
    let peer = anonymous(7);
    registry.add(Arc::clone(&peer));

    registry.update_identity(&peer, NodeId::new([0x40])).unwrap();

    assert_eq!(peer.node_id(), Some(NodeId::new([0x40])));
    assert!(Arc::ptr_eq(&registry.get(&NodeId::new([0x40])).unwrap(), &peer));
    assert!(registry.bucket(6).unwrap().in_primary(&peer));
    assert_consistent(&registry);
}

#[test]
fn test_update_identity_moves_between_buckets() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    registry.update_identity(&peer, NodeId::new([0x02])).unwrap();

    assert!(registry.get(&NodeId::new([0x80])).is_none());
    assert!(Arc::ptr_eq(&registry.get(&NodeId::new([0x02])).unwrap(), &peer));
    assert!(!registry.bucket(7).unwrap().in_primary(&peer));
    assert!(registry.bucket(1).unwrap().in_primary(&peer));
    assert_eq!(registry.size(), 1);
    assert_consistent(&registry);
}

#[test]
fn test_update_identity_to_current_id_refreshes() {
    let registry = registry();
    let peer = identified(0x81);
    registry.add(Arc::clone(&peer));
    registry.add(identified(0x82));

    registry.update_identity(&peer, NodeId::new([0x81])).unwrap();

    let bucket = registry.bucket(7).unwrap();
    assert!(Arc::ptr_eq(&bucket.primary[0], &peer));
    assert_eq!(bucket.primary.len(), 2);
    assert_consistent(&registry);
}

#[test]
fn test_update_identity_rejects_local_id() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    let result = registry.update_identity(&peer, NodeId::zero());

    assert_eq!(result, Err(RegistryError::LocalNodeId));
    assert_eq!(peer.node_id(), Some(NodeId::new([0x80])));
    assert!(registry.get(&NodeId::new([0x80])).is_some());
    assert_consistent(&registry);
}

#[test]
fn test_update_identity_rejects_id_owned_by_other_peer() {
    let registry = registry();
    let owner = identified(0x80);
    let peer = anonymous(7);
    registry.add(Arc::clone(&owner));
    registry.add(Arc::clone(&peer));

    let result = registry.update_identity(&peer, NodeId::new([0x80]));

    assert!(matches!(result, Err(RegistryError::IdentityInUse { .. })));
    assert!(peer.node_id().is_none());
    assert!(Arc::ptr_eq(&registry.get(&NodeId::new([0x80])).unwrap(), &owner));
    assert_consistent(&registry);
}

#[test]
#[should_panic(expected = "unregistered peer")]
fn test_update_identity_of_unregistered_peer_panics() {
    let registry = registry();
    let stranger = anonymous(3);

    let _ = registry.update_identity(&stranger, NodeId::new([0x10]));
}

// =============================================================================
// Blacklist
// =============================================================================

#[test]
fn test_blacklist_removes_and_flags_peer() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    registry.blacklist(&peer);

    assert!(peer.is_blacklisted());
    assert!(registry.is_blacklisted(&addr(0x80)));
    assert!(registry.get(&NodeId::new([0x80])).is_none());
    assert!(registry.is_empty());
    assert!(!registry.bucket(7).unwrap().in_primary(&peer));
    assert!(matches!(registry.add(Arc::clone(&peer)), AddOutcome::Blacklisted));
    assert_consistent(&registry);
}

#[test]
fn test_blacklist_flag_not_visible_while_peer_is_registered() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));

    std::thread::scope(|s| {
        let reader = registry.state.read();
        let writer = s.spawn(|| registry.blacklist(&peer));

        std::thread::sleep(std::time::Duration::from_millis(100));
        assert!(!peer.is_blacklisted());
        assert!(reader.by_id.contains_key(&NodeId::new([0x80])));

        drop(reader);
        writer.join().unwrap();
    });

    assert!(peer.is_blacklisted());
    assert!(registry.is_empty());
    assert_consistent(&registry);
}

#[test]
fn test_blacklist_flags_unregistered_allocation() {
    let registry = registry();
    registry.add(identified(0x80));
    let stale = identified(0x80);

    registry.blacklist(&stale);

    assert!(stale.is_blacklisted());
    assert!(registry.is_blacklisted(&addr(0x80)));
    assert!(registry.is_empty());
    assert_consistent(&registry);
}

#[test]
fn test_unblacklist_allows_re_adding() {
    let registry = registry();
    let peer = identified(0x80);
    registry.add(Arc::clone(&peer));
    registry.blacklist(&peer);

    assert!(registry.unblacklist(&addr(0x80)));
    assert!(!registry.unblacklist(&addr(0x80)));

    assert!(registry.add(Arc::clone(&peer)).is_inserted());
    assert!(!peer.is_blacklisted());
    assert_consistent(&registry);
}

#[test]
fn test_blacklist_address_returns_registered_peer() {
    let registry = registry();
    let peer = anonymous(4);
    registry.add(Arc::clone(&peer));

    let removed = registry.blacklist_address(&addr(4)).unwrap();

    assert!(Arc::ptr_eq(&removed, &peer));
    assert!(peer.is_blacklisted());
    assert!(registry.blacklist_address(&addr(4)).is_none());
    assert_eq!(registry.stats().blacklisted_addresses, 1);
}

// =============================================================================
// Snapshots and lookups
// =============================================================================

#[test]
fn test_ordered_snapshot_sorts_by_quality_stably() {
    let registry = registry();
    let (a, b, c) = (anonymous(1), anonymous(2), anonymous(3));
    for peer in [&a, &b, &c] {
        registry.add(Arc::clone(peer));
    }
    a.set_quality(1);
    b.set_quality(5);
    c.set_quality(5);

    let snapshot = registry.ordered_snapshot();

    assert!(Arc::ptr_eq(&snapshot[0], &b));
    assert!(Arc::ptr_eq(&snapshot[1], &c));
    assert!(Arc::ptr_eq(&snapshot[2], &a));
}

#[test]
fn test_snapshot_is_detached_from_registry() {
    let registry = registry();
    let peer = anonymous(1);
    registry.add(Arc::clone(&peer));
    let snapshot = registry.ordered_snapshot();

    registry.remove(&peer);
    registry.add(anonymous(2));

    assert_eq!(snapshot.len(), 1);
    assert!(Arc::ptr_eq(&snapshot[0], &peer));
}

#[test]
fn test_closest_to_prefers_smaller_distance() {
    let registry = registry();
    let a = identified(0x80);
    let b = identified(0x40);
    registry.add(Arc::clone(&a));
    registry.add(Arc::clone(&b));

    let closest = registry.closest_to(&NodeId::new([0x01]), 1);

    assert_eq!(closest.len(), 1);
    assert!(Arc::ptr_eq(&closest[0], &b));
}

#[test]
fn test_registry_serves_as_peer_directory() {
    let registry = registry();
    let peer = identified(0x20);
    registry.add(Arc::clone(&peer));

    let directory: &dyn PeerDirectory<1> = &registry;

    assert_eq!(directory.size(), 1);
    assert!(directory.get(&NodeId::new([0x20])).is_some());
    assert!(directory.get_by_address(&addr(0x20)).is_some());
    assert_eq!(directory.closest_to(&NodeId::new([0x21]), 3).len(), 1);
    assert_eq!(directory.ordered_snapshot().len(), 1);
}

// =============================================================================
// Maintenance
// =============================================================================

#[test]
fn test_touch_refreshes_recency() {
    let clock = ManualTimeSource::new(1000);
    let registry = registry_with_clock(clock.clone());
    for id in [0x81, 0x82, 0x83] {
        registry.add(identified(id));
    }
    clock.advance(50);

    assert!(registry.touch(&NodeId::new([0x81])));
    assert!(!registry.touch(&NodeId::new([0x99])));

    let peer = registry.get(&NodeId::new([0x81])).unwrap();
    assert_eq!(peer.last_seen(), Timestamp::new(1050));
    assert!(Arc::ptr_eq(&registry.bucket(7).unwrap().primary[0], &peer));
    assert_eq!(
        registry.oldest(7).and_then(|p| p.node_id()),
        Some(NodeId::new([0x82]))
    );
}

#[test]
fn test_stats_combine_registry_and_routing() {
    let clock = ManualTimeSource::new(1000);
    let registry = registry_with_clock(clock.clone());
    registry.add(identified(0x01));
    registry.add(anonymous(200));
    for id in [0x81, 0x82, 0x83, 0x84] {
        registry.add(identified(id));
    }
    registry.blacklist_address(&addr(250));
    clock.advance(30);

    let stats = registry.stats();

    assert_eq!(stats.peers, 6);
    assert_eq!(stats.identified_peers, 5);
    assert_eq!(stats.blacklisted_addresses, 1);
    assert_eq!(stats.routing.total_peers, 4);
    assert_eq!(stats.routing.replacement_peers, 1);
    assert_eq!(stats.routing.buckets_used, 2);
    assert_eq!(stats.routing.oldest_peer_age_seconds, 30);
}

#[test]
fn test_bucket_out_of_range_is_none() {
    let registry = registry();

    assert!(registry.bucket(8).is_none());
    assert!(registry.oldest(8).is_none());
}
