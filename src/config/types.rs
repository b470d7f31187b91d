//! Constants and default value functions used by `BridgeConfig`.

/// File name looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "cowork.yaml";

/// Agent program invoked when none is configured.
pub const DEFAULT_PROGRAM: &str = "claude";

/// Default wall-clock limit for one agent run.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;

/// Probability mass given to the agent when no routing rule matches.
pub const DEFAULT_AGENT_BIAS: f64 = 0.3;

/// Capabilities granted to the agent on an ordinary call.
pub const DEFAULT_TOOLS: &[&str] = &[
    "Read",
    "Write",
    "Edit",
    "Bash",
    "Glob",
    "Grep",
    "WebFetch",
    "WebSearch",
];

/// Read-only capabilities used by restricted calls.
pub const RESTRICTED_TOOLS: &[&str] = &["Read", "Glob", "Grep", "WebSearch"];

/// Tools that grant shell or write access; never allowed on restricted calls.
pub const DANGEROUS_TOOLS: &[&str] = &["Bash", "Write", "Edit"];

pub fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

pub fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

pub fn default_allowed_tools() -> Vec<String> {
    DEFAULT_TOOLS.iter().map(|s| s.to_string()).collect()
}

pub fn default_restricted_tools() -> Vec<String> {
    RESTRICTED_TOOLS.iter().map(|s| s.to_string()).collect()
}

pub fn default_agent_bias() -> f64 {
    DEFAULT_AGENT_BIAS
}
