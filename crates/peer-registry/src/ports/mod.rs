//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the read API lookup and scheduling code
//!   depends on
//! - **Driven Ports (Outbound):** what the registry needs from its host

pub mod inbound;
pub mod outbound;

pub use inbound::PeerDirectory;
pub use outbound::{ConfigProvider, TimeSource};
