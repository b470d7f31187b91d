//! Agent execution bridge.
//!
//! - **Sanitize**: strip flag-like tokens from prompts, escape for display
//! - **Invoker**: argv-based subprocess execution with timeout
//! - **Response**: JSON envelope decoding with a raw-text fallback
//! - **Session**: per-user session id tracking
//! - **Executor**: `ExecutionBridge`, which ties the above together
//!
//! The agent is any CLI that accepts `-p <prompt> --output-format json
//! --allowedTools <list> [--append-system-prompt <text>] [--resume <id>]`
//! and exits 0 on success.

mod executor;
pub mod invoker;
pub mod response;
pub mod sanitize;
mod session;

#[cfg(test)]
mod tests;

// Re-export public API
pub use executor::{
    ALLOWED_TOOLS_FLAG, ExecuteOptions, ExecutionBridge, ExecutionResult, OUTPUT_FORMAT_FLAG,
    PROMPT_FLAG, RESUME_FLAG, SYSTEM_PROMPT_FLAG, render_command,
};
pub use invoker::{CommandRunner, Invocation, InvocationOutput, ProcessInvoker};
pub use response::ParsedResponse;
pub use sanitize::{escape_for_transport, sanitize};
pub use session::{SessionInfo, SessionStore};
