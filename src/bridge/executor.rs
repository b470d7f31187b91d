//! The execution bridge: prompt in, agent run, result out.

use super::invoker::{CommandRunner, Invocation, InvocationOutput, ProcessInvoker};
use super::response;
use super::sanitize::{escape_for_transport, sanitize};
use super::session::{SessionInfo, SessionStore};
use crate::config::BridgeConfig;
use crate::error::{CoworkError, Result};
use chrono::Utc;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

pub const PROMPT_FLAG: &str = "-p";
pub const OUTPUT_FORMAT_FLAG: &str = "--output-format";
pub const OUTPUT_FORMAT_JSON: &str = "json";
pub const ALLOWED_TOOLS_FLAG: &str = "--allowedTools";
pub const SYSTEM_PROMPT_FLAG: &str = "--append-system-prompt";
pub const RESUME_FLAG: &str = "--resume";

/// Outcome of one `execute` call. Never an `Err`: failures are data.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    /// Agent response text (empty on failure).
    pub response: String,
    /// Session id reported by the agent, if any.
    pub session_id: Option<String>,
    /// Failure description (set iff `success` is false).
    pub error: Option<String>,
    pub execution_time: Duration,
}

impl ExecutionResult {
    fn succeeded(response: String, session_id: Option<String>, execution_time: Duration) -> Self {
        Self {
            success: true,
            response,
            session_id,
            error: None,
            execution_time,
        }
    }

    fn failed(error: impl Into<String>, execution_time: Duration) -> Self {
        Self {
            success: false,
            response: String::new(),
            session_id: None,
            error: Some(error.into()),
            execution_time,
        }
    }

    /// Execution time in fractional seconds.
    pub fn execution_secs(&self) -> f64 {
        self.execution_time.as_secs_f64()
    }

    /// Text to hand back to a chat user: the response, or `Error: ...`.
    pub fn reply_text(&self) -> String {
        if self.success {
            self.response.clone()
        } else {
            format!("Error: {}", self.error.as_deref().unwrap_or("unknown error"))
        }
    }

    /// Convert into a `Result`, for callers that want `?`.
    pub fn into_result(self) -> Result<String> {
        if self.success {
            Ok(self.response)
        } else {
            Err(CoworkError::ExecutionFailed(
                self.error.unwrap_or_else(|| "unknown error".to_string()),
            ))
        }
    }
}

/// Per-call overrides for [`ExecutionBridge::execute`].
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Start fresh instead of resuming the user's current session.
    pub new_session: bool,
    /// Working directory override.
    pub working_dir: Option<PathBuf>,
    /// Capability allowlist override (empty means "use the configured list").
    pub allowed_tools: Option<Vec<String>>,
    /// Extra system prompt appended by the agent.
    pub system_prompt: Option<String>,
    /// Timeout override in seconds (zero means "use the configured timeout").
    pub timeout_seconds: Option<u64>,
}

/// Turns user prompts into agent runs and tracks per-user sessions.
///
/// Configuration is fixed at construction; the session store is the only
/// shared mutable state and is safe to use from many threads.
pub struct ExecutionBridge<R: CommandRunner = ProcessInvoker> {
    config: BridgeConfig,
    command_prefix: Vec<String>,
    sessions: SessionStore,
    runner: R,
}

impl ExecutionBridge<ProcessInvoker> {
    /// Create a bridge that spawns real agent processes.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Self::with_runner(config, ProcessInvoker)
    }
}

impl<R: CommandRunner> ExecutionBridge<R> {
    /// Create a bridge with a custom runner.
    pub fn with_runner(config: BridgeConfig, runner: R) -> Result<Self> {
        config.validate()?;
        let command_prefix = config.command_prefix()?;
        Ok(Self {
            config,
            command_prefix,
            sessions: SessionStore::new(),
            runner,
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run `prompt` through the agent on behalf of `user_id`.
    ///
    /// Resumes the user's session unless `options.new_session` is set. Every
    /// fault, including failure to start the agent, comes back as a failed
    /// [`ExecutionResult`].
    pub fn execute(&self, prompt: &str, user_id: &str, options: &ExecuteOptions) -> ExecutionResult {
        let tools = options
            .allowed_tools
            .as_deref()
            .filter(|tools| !tools.is_empty())
            .unwrap_or(self.config.allowed_tools.as_slice());
        self.execute_with_tools(prompt, user_id, options, tools)
    }

    /// [`execute`](Self::execute) limited to the read-only capability set,
    /// whatever `options.allowed_tools` says. For untrusted callers.
    pub fn execute_restricted(
        &self,
        prompt: &str,
        user_id: &str,
        options: &ExecuteOptions,
    ) -> ExecutionResult {
        self.execute_with_tools(prompt, user_id, options, &self.config.restricted_tools)
    }

    /// Execute with default options and return chat-ready text.
    pub fn handle_request(&self, message: &str, user_id: &str) -> String {
        self.execute(message, user_id, &ExecuteOptions::default())
            .reply_text()
    }

    /// Restricted variant of [`handle_request`](Self::handle_request).
    pub fn handle_request_restricted(&self, message: &str, user_id: &str) -> String {
        self.execute_restricted(message, user_id, &ExecuteOptions::default())
            .reply_text()
    }

    fn execute_with_tools(
        &self,
        prompt: &str,
        user_id: &str,
        options: &ExecuteOptions,
        tools: &[String],
    ) -> ExecutionResult {
        let start = Instant::now();
        let invocation = self.build_invocation(prompt, user_id, options, tools);
        let timeout_secs = invocation.timeout.as_secs();

        info!(user_id, resume = invocation.args.iter().any(|a| a == RESUME_FLAG), "executing agent");
        debug!(command = %render_command(&invocation), "agent command");

        let output = match self.runner.run(&invocation) {
            Ok(output) => output,
            Err(e) => {
                let execution_time = start.elapsed();
                error!(user_id, error = %e, "agent invocation failed");
                return ExecutionResult::failed(e.to_string(), execution_time);
            }
        };
        let execution_time = start.elapsed();

        self.interpret(user_id, options, output, timeout_secs, execution_time)
    }

    fn interpret(
        &self,
        user_id: &str,
        options: &ExecuteOptions,
        output: InvocationOutput,
        timeout_secs: u64,
        execution_time: Duration,
    ) -> ExecutionResult {
        if output.timed_out {
            error!(
                user_id,
                elapsed = execution_time.as_secs_f64(),
                "agent execution timed out"
            );
            return ExecutionResult::failed(
                format!("Execution timed out after {} seconds", timeout_secs),
                execution_time,
            );
        }

        if output.exit_code != Some(0) {
            let stderr = output.stderr.trim();
            error!(user_id, exit_code = ?output.exit_code, stderr, "agent returned failure");
            let message = if !stderr.is_empty() {
                stderr.to_string()
            } else {
                match output.exit_code {
                    Some(code) => format!("Command failed with exit code {}", code),
                    None => "Command failed".to_string(),
                }
            };
            return ExecutionResult::failed(message, execution_time);
        }

        let (text, session_id) = response::parse(&output.stdout).into_parts();

        if let Some(id) = &session_id {
            let now = Utc::now();
            if options.new_session {
                self.sessions.restart(user_id, id, now);
            } else {
                self.sessions.upsert(user_id, id, now);
            }
        }

        info!(
            user_id,
            elapsed = execution_time.as_secs_f64(),
            "agent completed"
        );
        ExecutionResult::succeeded(text, session_id, execution_time)
    }

    /// Build the argument vector for one run.
    pub fn build_invocation(
        &self,
        prompt: &str,
        user_id: &str,
        options: &ExecuteOptions,
        tools: &[String],
    ) -> Invocation {
        let (program, prefix_args) = match self.command_prefix.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (self.config.program.clone(), Vec::new()),
        };

        let mut args = prefix_args;
        args.push(PROMPT_FLAG.to_string());
        args.push(prompt_argument(prompt));
        args.push(OUTPUT_FORMAT_FLAG.to_string());
        args.push(OUTPUT_FORMAT_JSON.to_string());
        args.push(ALLOWED_TOOLS_FLAG.to_string());
        args.push(tools.join(","));

        if let Some(system_prompt) = options.system_prompt.as_deref().filter(|s| !s.is_empty()) {
            args.push(SYSTEM_PROMPT_FLAG.to_string());
            args.push(system_prompt.to_string());
        }

        if !options.new_session
            && let Some(session) = self.sessions.get(user_id)
        {
            args.push(RESUME_FLAG.to_string());
            args.push(session.session_id);
        }

        let timeout = options
            .timeout_seconds
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.timeout());

        Invocation {
            program,
            args,
            cwd: options
                .working_dir
                .clone()
                .or_else(|| self.config.working_dir.clone()),
            timeout,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn session(&self, user_id: &str) -> Option<SessionInfo> {
        self.sessions.get(user_id)
    }

    /// Forget the user's session so the next run starts fresh.
    pub fn clear_session(&self, user_id: &str) -> bool {
        self.sessions.clear(user_id)
    }

    pub fn list_sessions(&self) -> HashMap<String, SessionInfo> {
        self.sessions.list()
    }
}

/// Sanitized prompt as it follows `-p`.
///
/// A leading `-` is shielded with a space so the agent's option parser never
/// reads the prompt as another flag.
fn prompt_argument(prompt: &str) -> String {
    let cleaned = sanitize(prompt);
    if cleaned.starts_with('-') {
        format!(" {}", cleaned)
    } else {
        cleaned
    }
}

/// Human-readable rendering of an invocation, each argument double-quoted.
/// For logs only; the process itself receives the discrete argv.
pub fn render_command(invocation: &Invocation) -> String {
    let mut rendered = invocation.program.clone();
    for arg in &invocation.args {
        if arg.starts_with('-') && !arg.contains(char::is_whitespace) {
            rendered.push(' ');
            rendered.push_str(arg);
        } else {
            rendered.push_str(" \"");
            rendered.push_str(&escape_for_transport(arg));
            rendered.push('"');
        }
    }
    rendered
}
