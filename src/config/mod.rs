//! Configuration model for cowork-bridge.
//!
//! This module defines the `BridgeConfig` struct that represents `cowork.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are preserved),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::BridgeConfig;
pub use types::{DEFAULT_CONFIG_FILE, DEFAULT_PROGRAM, DEFAULT_TIMEOUT_SECONDS};
