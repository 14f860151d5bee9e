//! # Peer Registry Service
//!
//! `PeerRegistry` ties the domain containers together behind one lock and
//! implements the [`PeerDirectory`](crate::ports::PeerDirectory) port.
//!
//! ## Module Structure
//!
//! - `core` - Registry struct, constructor and `AddOutcome`
//! - `membership` - Add, remove, identity update, blacklist
//! - `queries` - Lookups and snapshots
//! - `maintenance` - Bucket inspection and statistics
//! - `api` - `PeerDirectory` implementation

mod api;
mod core;
mod maintenance;
mod membership;
mod queries;
mod state;

#[cfg(test)]
mod tests;

pub use self::core::{AddOutcome, PeerRegistry};
pub use maintenance::RegistryStats;
