//! # Adapters
//!
//! Concrete implementations of the outbound ports.
//!
//! - `time` - System clock
//! - `config` - Static and TOML configuration providers (TOML requires the
//!   `config` feature)

mod config;
mod time;


pub use config::StaticConfigProvider;
#[cfg(feature = "config")]
pub use config::{ConfigError, TomlConfigProvider};
pub use time::SystemTimeSource;
