//! Command implementations for cowork.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the config/router/bridge setup they share.

mod chat;
mod route;
mod run;

use crate::cli::{Cli, Command};
use cowork_bridge::bridge::ExecutionBridge;
use cowork_bridge::config::{BridgeConfig, DEFAULT_CONFIG_FILE};
use cowork_bridge::error::{CoworkError, Result};
use cowork_bridge::routing::{Router, RoutingRules};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let rules_path = cli.rules.or_else(|| config.routing_rules.clone());

    match cli.command {
        Command::Route(args) => {
            let router = build_router(&config, rules_path.as_deref())?;
            route::cmd_route(&router, args)
        }
        Command::Run(args) => {
            let bridge = ExecutionBridge::new(config)?;
            run::cmd_run(&bridge, args)
        }
        Command::Chat(args) => {
            let router = build_router(&config, rules_path.as_deref())?;
            let bridge = ExecutionBridge::new(config)?;
            chat::cmd_chat(router, bridge, args)
        }
    }
}

/// Load the config file named on the command line, or `./cowork.yaml` if it
/// exists, or the defaults.
fn load_config(explicit: Option<&Path>) -> Result<BridgeConfig> {
    match explicit {
        Some(path) => BridgeConfig::load(path)?.ok_or_else(|| {
            CoworkError::UserError(format!("config file '{}' not found", path.display()))
        }),
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            let config = BridgeConfig::load(&path)?;
            debug!(found = config.is_some(), path = %path.display(), "default config lookup");
            Ok(config.unwrap_or_default())
        }
    }
}

/// Built-in routing rules, plus the rule file if one is configured.
fn build_router(config: &BridgeConfig, rules_path: Option<&Path>) -> Result<Router> {
    let router = match rules_path {
        Some(path) => {
            let rules = RoutingRules::load(path)?.ok_or_else(|| {
                CoworkError::UserError(format!(
                    "routing rule file '{}' not found",
                    path.display()
                ))
            })?;
            Router::with_rules(&rules)?
        }
        None => Router::new(),
    };
    Ok(router.with_default_bias(config.default_bias))
}
