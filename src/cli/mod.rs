//! CLI argument parsing for cowork.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cowork: route messages to a headless coding agent.
///
/// Messages are scored against weighted routing rules; those that look like
/// file, code or shell work are run through the agent CLI with per-user
/// session continuity.
#[derive(Parser, Debug)]
#[command(name = "cowork")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: ./cowork.yaml if present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Routing rule file (JSON), overriding `routing_rules` from the config.
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for cowork.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show where a message would be routed.
    ///
    /// Prints the destination, confidence and the matched patterns.
    Route(RouteArgs),

    /// Run a prompt through the agent once.
    ///
    /// Prints the agent's response; exits 2 if the run fails.
    Run(RunArgs),

    /// Interactive session over stdin.
    ///
    /// Each line is sent to the agent, resuming the same session.
    /// `/new` starts a fresh session, `/sessions` lists sessions, `/quit` exits.
    Chat(ChatArgs),
}

/// Arguments for the `route` command.
#[derive(Parser, Debug)]
pub struct RouteArgs {
    /// Message text.
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,

    /// Print the decision as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Prompt text.
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// User identity for session tracking.
    #[arg(short, long, default_value = "cli_user")]
    pub user: String,

    /// Use the read-only capability set.
    #[arg(long)]
    pub safe: bool,

    /// Working directory for the agent.
    #[arg(long)]
    pub cwd: Option<PathBuf>,

    /// Extra system prompt appended by the agent.
    #[arg(long)]
    pub system_prompt: Option<String>,

    /// Timeout in seconds (overrides config).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Comma-separated capability allowlist (overrides config).
    #[arg(long, value_delimiter = ',')]
    pub tools: Vec<String>,
}

/// Arguments for the `chat` command.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    /// User identity for session tracking.
    #[arg(short, long, default_value = "cli_user")]
    pub user: String,

    /// Use the read-only capability set.
    #[arg(long)]
    pub safe: bool,

    /// Route each line first and only run agent-bound messages.
    #[arg(long)]
    pub route: bool,

    /// Working directory for the agent.
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
