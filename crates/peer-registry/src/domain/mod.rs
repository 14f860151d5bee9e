//! Domain Layer - Pure business logic with no I/O
//!
//! This module contains the core Kademlia logic including:
//! - Node identifiers and XOR distance calculation
//! - The shared peer record
//! - Routing table with k-buckets and replacement caches
//! - The address blacklist

pub mod blacklist;
pub mod peer;
pub mod routing_table;
pub mod services;
/// Core domain types (entities, values, errors)
pub mod types;

pub use blacklist::*;
pub use peer::*;
pub use routing_table::*;
pub use services::*;
pub use types::*;
