//! Implementation of the `cowork route` command.

use crate::cli::RouteArgs;
use cowork_bridge::error::{CoworkError, Result};
use cowork_bridge::routing::{Router, RoutingDecision};

pub fn cmd_route(router: &Router, args: RouteArgs) -> Result<()> {
    let message = args.message.join(" ");
    let decision = router.route(&message);

    if args.json {
        let json = serde_json::to_string_pretty(&decision).map_err(|e| {
            CoworkError::UserError(format!("failed to serialize routing decision: {}", e))
        })?;
        println!("{}", json);
    } else {
        println!("{}", format_decision(&message, &decision));
    }
    Ok(())
}

pub(crate) fn format_decision(message: &str, decision: &RoutingDecision) -> String {
    let destination = if decision.use_delegate {
        "agent"
    } else {
        "direct"
    };
    format!(
        "Message: \"{}\"\n  -> {} (confidence: {:.2})\n  Reason: {}",
        message, destination, decision.confidence, decision.reason
    )
}
