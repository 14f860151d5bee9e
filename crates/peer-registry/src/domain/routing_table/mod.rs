//! Routing Table Implementation
//!
//! Kademlia k-buckets indexed by XOR-distance bit length, each with a bounded
//! primary list and a replacement cache. The table owns no lock; the
//! [`PeerRegistry`](crate::PeerRegistry) mutates it under its write lock.

// Semantic submodules
mod bucket;
mod outcome;
mod table;

// Re-export public API
pub use bucket::{BucketSnapshot, KBucket};
pub use outcome::{InsertOutcome, RoutingTableStats, Slot};
pub use table::RoutingTable;
