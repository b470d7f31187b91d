//! cowork-bridge: route chat messages to a headless coding agent.
//!
//! - [`routing`] decides whether a message belongs to the agent
//! - [`bridge`] runs the agent as a subprocess and tracks per-user sessions
//! - [`dispatch`] combines the two for chat front-ends
//!
//! ```no_run
//! use cowork_bridge::bridge::{ExecuteOptions, ExecutionBridge};
//! use cowork_bridge::config::BridgeConfig;
//! use cowork_bridge::routing::Router;
//!
//! let router = Router::new();
//! let bridge = ExecutionBridge::new(BridgeConfig::default())?;
//!
//! let message = "Read the contents of main.py";
//! if router.should_delegate(message) {
//!     let result = bridge.execute(message, "user-1", &ExecuteOptions::default());
//!     println!("{}", result.reply_text());
//! }
//! # Ok::<(), cowork_bridge::error::CoworkError>(())
//! ```

pub mod bridge;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod routing;

#[cfg(test)]
pub(crate) mod test_support;
