use std::sync::Arc;

use crate::domain::{NodeId, Peer, SocketAddr};
use crate::ports::PeerDirectory;
use crate::service::PeerRegistry;

impl<const N: usize> PeerDirectory<N> for PeerRegistry<N> {
    fn get(&self, node_id: &NodeId<N>) -> Option<Arc<Peer<N>>> {
        PeerRegistry::get(self, node_id)
    }

    fn get_by_address(&self, addr: &SocketAddr) -> Option<Arc<Peer<N>>> {
        PeerRegistry::get_by_address(self, addr)
    }

    fn closest_to(&self, target: &NodeId<N>, count: usize) -> Vec<Arc<Peer<N>>> {
        PeerRegistry::closest_to(self, target, count)
    }

    fn ordered_snapshot(&self) -> Vec<Arc<Peer<N>>> {
        PeerRegistry::ordered_snapshot(self)
    }

    fn size(&self) -> usize {
        PeerRegistry::size(self)
    }
}
