//! BridgeConfig struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration for the execution bridge and router.
///
/// This struct represents the contents of `cowork.yaml`. It is read-only once
/// a bridge has been constructed from it; per-call overrides never write back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    // =========================================================================
    // Agent invocation
    // =========================================================================
    /// Agent command, optionally with leading arguments (e.g. `"npx claude"`).
    /// Split with shell-words rules; never run through a shell.
    #[serde(default = "default_program")]
    pub program: String,

    /// Wall-clock limit for one agent run, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Capabilities passed to the agent on ordinary calls, in order.
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,

    /// Capabilities passed to the agent on restricted calls.
    #[serde(default = "default_restricted_tools")]
    pub restricted_tools: Vec<String>,

    /// Working directory for the agent process (inherits ours when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,

    // =========================================================================
    // Routing
    // =========================================================================
    /// Path to a JSON routing rule file merged with the built-in rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_rules: Option<PathBuf>,

    /// Agent confidence assumed when no routing rule matches.
    #[serde(default = "default_agent_bias")]
    pub default_bias: f64,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            timeout_seconds: default_timeout_seconds(),
            allowed_tools: default_allowed_tools(),
            restricted_tools: default_restricted_tools(),
            working_dir: None,
            routing_rules: None,
            default_bias: default_agent_bias(),
            extra: BTreeMap::new(),
        }
    }
}
